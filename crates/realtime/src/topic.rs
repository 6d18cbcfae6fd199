//! Topic parameterization for the channel client.
//!
//! A topic binds together one outbound and one inbound message set from
//! `wagerwars-protocol`, the endpoint it lives at, and its heartbeat tuning.
//! The client is generic over [`Topic`], so lobby, words, chat, and mines
//! channels all share one connection state machine.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;
use wagerwars_protocol::{chat, lobby, mines, words, WireMessage};

use crate::error::EndpointError;
use crate::transport::CloseFrame;

/// Close reason the platform sends when a session is over for good.
pub const TERMINAL_CLOSE_REASON: &str = "finished";

/// One logical channel kind.
pub trait Topic: Send + Sync + 'static {
    /// Messages this side may transmit.
    type Outbound: Serialize + WireMessage + Send + 'static;
    /// Messages the server may deliver.
    type Inbound: DeserializeOwned + WireMessage + Send + 'static;

    /// Path segment and log label for this topic.
    const NAME: &'static str;

    /// Default probe cadence; `ChannelConfig::heartbeat_interval` overrides.
    const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(10);

    /// Build the endpoint for a room and participant.
    ///
    /// Room topics extend the base with `<NAME>/<room_id>`; fixed-path topics
    /// override this and ignore the room.
    fn endpoint(base: &Url, room_id: &str, user_id: &str) -> Result<Url, EndpointError> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| EndpointError {
                base: base.to_string(),
            })?
            .pop_if_empty()
            .push(Self::NAME)
            .push(room_id);
        url.query_pairs_mut().append_pair("user_id", user_id);
        Ok(url)
    }

    /// The probe message carrying a monotonic millisecond sample.
    fn heartbeat(sent_at: u64) -> Self::Outbound;

    /// The echoed sample if `message` is a probe reply, `None` otherwise.
    fn pong(message: &Self::Inbound) -> Option<u64>;

    /// Whether a close frame means the session is finished and the client
    /// must not reconnect. The platform signals this through the close
    /// reason; close codes are not consulted.
    fn is_terminal_close(frame: &CloseFrame) -> bool {
        frame.reason == TERMINAL_CLOSE_REASON
    }
}

/// Lobby matchmaking channel.
pub struct Lobby;

impl Topic for Lobby {
    type Outbound = lobby::ClientMessage;
    type Inbound = lobby::ServerMessage;

    const NAME: &'static str = "lobby";

    fn heartbeat(sent_at: u64) -> Self::Outbound {
        lobby::ClientMessage::Ping { sent_at }
    }

    fn pong(message: &Self::Inbound) -> Option<u64> {
        match message {
            lobby::ServerMessage::Pong { sent_at } => Some(*sent_at),
            _ => None,
        }
    }
}

/// Word battle game channel.
pub struct Words;

impl Topic for Words {
    type Outbound = words::ClientMessage;
    type Inbound = words::ServerMessage;

    const NAME: &'static str = "words";

    fn heartbeat(sent_at: u64) -> Self::Outbound {
        words::ClientMessage::Ping { sent_at }
    }

    fn pong(message: &Self::Inbound) -> Option<u64> {
        match message {
            words::ServerMessage::Pong { sent_at } => Some(*sent_at),
            _ => None,
        }
    }
}

/// Room chat channel.
pub struct Chat;

impl Topic for Chat {
    type Outbound = chat::ClientMessage;
    type Inbound = chat::ServerMessage;

    const NAME: &'static str = "chat";

    fn heartbeat(sent_at: u64) -> Self::Outbound {
        chat::ClientMessage::Ping { sent_at }
    }

    fn pong(message: &Self::Inbound) -> Option<u64> {
        match message {
            chat::ServerMessage::Pong { sent_at } => Some(*sent_at),
            _ => None,
        }
    }
}

/// Single-player mines wagering channel.
pub struct Mines;

impl Topic for Mines {
    type Outbound = mines::ClientMessage;
    type Inbound = mines::ServerMessage;

    const NAME: &'static str = "mines";

    // mines rounds are short, so the probe cadence is tighter
    const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);

    /// Mines is single-player: the endpoint has no room segment.
    fn endpoint(base: &Url, _room_id: &str, user_id: &str) -> Result<Url, EndpointError> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| EndpointError {
                base: base.to_string(),
            })?
            .pop_if_empty()
            .push(Self::NAME);
        url.query_pairs_mut().append_pair("user_id", user_id);
        Ok(url)
    }

    fn heartbeat(sent_at: u64) -> Self::Outbound {
        mines::ClientMessage::Ping { sent_at }
    }

    fn pong(message: &Self::Inbound) -> Option<u64> {
        match message {
            mines::ServerMessage::Pong { sent_at } => Some(*sent_at),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("wss://play.test/ws").expect("valid url")
    }

    #[test]
    fn test_room_topics_build_room_endpoints() {
        let url = Lobby::endpoint(&base(), "room-7", "u-1").expect("endpoint");
        assert_eq!(url.as_str(), "wss://play.test/ws/lobby/room-7?user_id=u-1");

        let url = Chat::endpoint(&base(), "room-7", "u-1").expect("endpoint");
        assert_eq!(url.as_str(), "wss://play.test/ws/chat/room-7?user_id=u-1");
    }

    #[test]
    fn test_mines_endpoint_has_no_room_segment() {
        let url = Mines::endpoint(&base(), "room-7", "u-1").expect("endpoint");
        assert_eq!(url.as_str(), "wss://play.test/ws/mines?user_id=u-1");
    }

    #[test]
    fn test_trailing_slash_base_does_not_double_up() {
        let base = Url::parse("wss://play.test/ws/").expect("valid url");
        let url = Words::endpoint(&base, "r", "u").expect("endpoint");
        assert_eq!(url.as_str(), "wss://play.test/ws/words/r?user_id=u");
    }

    #[test]
    fn test_terminal_close_is_reason_based() {
        let finished = CloseFrame {
            code: 4001,
            reason: "finished".to_string(),
        };
        assert!(Lobby::is_terminal_close(&finished));
        assert!(Mines::is_terminal_close(&finished));

        // a normal-close code without the reason is not terminal
        let normal = CloseFrame {
            code: 1000,
            reason: String::new(),
        };
        assert!(!Lobby::is_terminal_close(&normal));
        assert!(!Mines::is_terminal_close(&normal));
    }

    #[test]
    fn test_probe_cadence_per_topic() {
        assert_eq!(Lobby::HEARTBEAT_INTERVAL, Duration::from_secs(10));
        assert_eq!(Words::HEARTBEAT_INTERVAL, Duration::from_secs(10));
        assert_eq!(Chat::HEARTBEAT_INTERVAL, Duration::from_secs(10));
        assert_eq!(Mines::HEARTBEAT_INTERVAL, Duration::from_secs(5));
    }

    #[test]
    fn test_pong_extraction() {
        let pong = lobby::ServerMessage::Pong { sent_at: 777 };
        assert_eq!(Lobby::pong(&pong), Some(777));

        let other = lobby::ServerMessage::Countdown { seconds: 3 };
        assert_eq!(Lobby::pong(&other), None);
    }
}
