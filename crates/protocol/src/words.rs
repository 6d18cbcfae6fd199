//! Word-battle topic messages
//!
//! Turn-based word game: the server drives turns and rules, clients submit
//! word entries and receive validation verdicts, live ranking, and payout
//! events. All tags are camelCase.

use serde::{Deserialize, Serialize};

use crate::codec::WireMessage;
use crate::types::{PlayerInfo, PlayerStanding};

// =============================================================================
// Client Messages (outbound)
// =============================================================================

/// Messages from client to the word-game server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Submit a word for the current turn
    WordEntry { user_id: String, word: String },
    /// Heartbeat probe; `sent_at` is echoed back in `pong`
    Ping { sent_at: u64 },
}

impl WireMessage for ClientMessage {
    fn message_type(&self) -> &'static str {
        match self {
            ClientMessage::WordEntry { .. } => "wordEntry",
            ClientMessage::Ping { .. } => "ping",
        }
    }
}

// =============================================================================
// Server Messages (inbound)
// =============================================================================

/// Messages from the word-game server to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// The game started with this roster
    Start { players: Vec<PlayerInfo> },
    /// The game could not start
    StartFailed {
        #[serde(default)]
        reason: Option<String>,
    },
    /// It is now this player's turn
    Turn { user_id: String },
    /// Constraint for the current round
    Rule {
        /// Required opening letters for valid words
        letters: String,
        min_length: u32,
    },
    /// Turn countdown tick
    Countdown { seconds: u32 },
    /// Live ranking update
    Rank { standings: Vec<PlayerStanding> },
    /// Verdict on this client's submitted word
    Validate {
        word: String,
        valid: bool,
        #[serde(default)]
        reason: Option<String>,
    },
    /// Another player's accepted word
    WordEntry { user_id: String, word: String },
    /// The submitted word was already played this game
    UsedWord { word: String },
    /// The game ended
    GameOver {
        #[serde(default)]
        winner_id: Option<String>,
    },
    /// Final ranking with payouts
    FinalStanding { standings: Vec<PlayerStanding> },
    /// Prize credited to a player
    Prize { user_id: String, amount: String },
    /// Platform points credited to a player
    WarsPoint { user_id: String, points: i64 },
    /// This connection is spectating, not playing
    Spectator,
    /// Seat count changed
    PlayersCount { count: u32 },
    /// Heartbeat reply echoing the probe's `sent_at`
    Pong { sent_at: u64 },
    /// Unknown variant for forward compatibility
    #[serde(other)]
    Unknown,
}

impl WireMessage for ServerMessage {
    fn message_type(&self) -> &'static str {
        match self {
            ServerMessage::Start { .. } => "start",
            ServerMessage::StartFailed { .. } => "startFailed",
            ServerMessage::Turn { .. } => "turn",
            ServerMessage::Rule { .. } => "rule",
            ServerMessage::Countdown { .. } => "countdown",
            ServerMessage::Rank { .. } => "rank",
            ServerMessage::Validate { .. } => "validate",
            ServerMessage::WordEntry { .. } => "wordEntry",
            ServerMessage::UsedWord { .. } => "usedWord",
            ServerMessage::GameOver { .. } => "gameOver",
            ServerMessage::FinalStanding { .. } => "finalStanding",
            ServerMessage::Prize { .. } => "prize",
            ServerMessage::WarsPoint { .. } => "warsPoint",
            ServerMessage::Spectator => "spectator",
            ServerMessage::PlayersCount { .. } => "playersCount",
            ServerMessage::Pong { .. } => "pong",
            ServerMessage::Unknown => "unknown",
        }
    }

    fn is_unknown(&self) -> bool {
        matches!(self, ServerMessage::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode, encode};

    #[test]
    fn test_word_entry_round() {
        let json = encode(&ClientMessage::WordEntry {
            user_id: "u-3".into(),
            word: "quixotic".into(),
        })
        .expect("encode");
        assert!(json.contains(r#""type":"wordEntry""#));

        let echo: ServerMessage =
            decode(r#"{"type":"wordEntry","user_id":"u-9","word":"zephyr"}"#).expect("decode");
        assert_eq!(
            echo,
            ServerMessage::WordEntry {
                user_id: "u-9".into(),
                word: "zephyr".into()
            }
        );
    }

    #[test]
    fn test_decode_final_standing() {
        let frame = r#"{
            "type": "finalStanding",
            "standings": [
                {"user_id": "u-1", "rank": 1, "score": 320, "prize": "12.5"},
                {"user_id": "u-2", "rank": 2, "score": 180}
            ]
        }"#;
        let msg: ServerMessage = decode(frame).expect("decode");
        match msg {
            ServerMessage::FinalStanding { standings } => {
                assert_eq!(standings.len(), 2);
                assert_eq!(standings[0].prize.as_deref(), Some("12.5"));
                assert_eq!(standings[1].prize, None);
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn test_two_word_tags_stay_camel_case() {
        let msg: ServerMessage = decode(r#"{"type":"playersCount","count":4}"#).expect("decode");
        assert_eq!(msg.message_type(), "playersCount");

        let msg: ServerMessage =
            decode(r#"{"type":"startFailed","reason":"not enough players"}"#).expect("decode");
        assert_eq!(msg.message_type(), "startFailed");
    }
}
