//! Connection state and shared status observation.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Lifecycle state of the channel's socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No socket exists.
    Closed,
    /// A connection attempt is in flight.
    Connecting,
    /// The socket is established and traffic flows.
    Open,
    /// A caller-initiated disconnect is tearing the socket down.
    Closing,
}

impl ConnectionState {
    pub fn to_u8(self) -> u8 {
        match self {
            ConnectionState::Closed => 0,
            ConnectionState::Connecting => 1,
            ConnectionState::Open => 2,
            ConnectionState::Closing => 3,
        }
    }

    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Open,
            3 => ConnectionState::Closing,
            _ => ConnectionState::Closed,
        }
    }
}

/// Point-in-time view of a channel, for status display.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelStatus {
    pub state: ConnectionState,
    /// Whether a reconnect is scheduled or in flight.
    pub reconnecting: bool,
    /// Reconnect attempts used since the last healthy open.
    pub attempts: u32,
    /// Most recent heartbeat round trip.
    pub latency: Option<Duration>,
    /// Most recent connection-level error, if any.
    pub last_error: Option<String>,
    /// Inbound frames dropped because they could not be decoded.
    pub decode_errors: u64,
}

// Sentinel for "no latency sample yet".
const LATENCY_UNSET: u64 = u64::MAX;

/// Shared status cell written by the connection task and read by consumers.
///
/// Cheap to clone; all clones observe the same channel.
#[derive(Clone)]
pub struct StatusObserver {
    inner: Arc<StatusInner>,
}

struct StatusInner {
    state: AtomicU8,
    reconnecting: AtomicBool,
    attempts: AtomicU32,
    latency_ms: AtomicU64,
    decode_errors: AtomicU64,
    last_error: Mutex<Option<String>>,
}

impl StatusObserver {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(StatusInner {
                state: AtomicU8::new(ConnectionState::Closed.to_u8()),
                reconnecting: AtomicBool::new(false),
                attempts: AtomicU32::new(0),
                latency_ms: AtomicU64::new(LATENCY_UNSET),
                decode_errors: AtomicU64::new(0),
                last_error: Mutex::new(None),
            }),
        }
    }

    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.inner.state.load(Ordering::SeqCst))
    }

    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    pub fn latency(&self) -> Option<Duration> {
        match self.inner.latency_ms.load(Ordering::SeqCst) {
            LATENCY_UNSET => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    pub fn snapshot(&self) -> ChannelStatus {
        ChannelStatus {
            state: self.state(),
            reconnecting: self.inner.reconnecting.load(Ordering::SeqCst),
            attempts: self.inner.attempts.load(Ordering::SeqCst),
            latency: self.latency(),
            last_error: self.last_error_guard().clone(),
            decode_errors: self.inner.decode_errors.load(Ordering::SeqCst),
        }
    }

    pub(crate) fn set_state(&self, state: ConnectionState) {
        self.inner.state.store(state.to_u8(), Ordering::SeqCst);
    }

    pub(crate) fn set_reconnecting(&self, reconnecting: bool) {
        self.inner.reconnecting.store(reconnecting, Ordering::SeqCst);
    }

    pub(crate) fn set_attempts(&self, attempts: u32) {
        self.inner.attempts.store(attempts, Ordering::SeqCst);
    }

    pub(crate) fn record_latency(&self, latency: Duration) {
        let ms = u64::try_from(latency.as_millis()).unwrap_or(LATENCY_UNSET - 1);
        self.inner.latency_ms.store(ms, Ordering::SeqCst);
    }

    pub(crate) fn record_decode_error(&self) {
        self.inner.decode_errors.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn set_last_error(&self, error: impl Into<String>) {
        *self.last_error_guard() = Some(error.into());
    }

    pub(crate) fn clear_last_error(&self) {
        *self.last_error_guard() = None;
    }

    fn last_error_guard(&self) -> MutexGuard<'_, Option<String>> {
        match self.inner.last_error.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for StatusObserver {
    fn default() -> Self {
        Self::new()
    }
}
