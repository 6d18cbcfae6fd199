//! Channel configuration.

use std::time::Duration;

use url::Url;

/// Default reconnect attempt budget.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default backoff unit; attempt N waits `base_delay * 2^N`.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Configuration for one channel: one topic, one room, one participant.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Base endpoint, e.g. `wss://play.wagerwars.io/ws`.
    pub base_url: Url,
    /// Room identifier appended to the topic path. Ignored by topics with a
    /// fixed path such as mines.
    pub room_id: String,
    /// Participant identity, sent as the `user_id` query parameter.
    pub user_id: String,
    /// How many reconnect attempts to make before giving up.
    pub max_attempts: u32,
    /// Backoff unit for the exponential reconnect delay.
    pub base_delay: Duration,
    /// Heartbeat interval override; `None` uses the topic default.
    pub heartbeat_interval: Option<Duration>,
}

impl ChannelConfig {
    pub fn new(base_url: Url, room_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            base_url,
            room_id: room_id.into(),
            user_id: user_id.into(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            heartbeat_interval: None,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = Some(interval);
        self
    }
}
