//! Mines topic messages
//!
//! Single-player minesweeper-style wagering: the client stakes an amount,
//! reveals cells with a growing payout multiplier, and cashes out before
//! hitting a mine. All tags are camelCase.

use serde::{Deserialize, Serialize};

use crate::codec::WireMessage;
use crate::types::BoardSnapshot;

// =============================================================================
// Client Messages (outbound)
// =============================================================================

/// Messages from client to the mines server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Stake and open a fresh board
    CreateBoard {
        user_id: String,
        /// Board is `size` x `size` cells
        size: u8,
        mines: u8,
        /// Staked amount as a decimal string
        stake: String,
    },
    /// Reveal a cell by row-major index
    CellReveal { index: u16 },
    /// Toggle a marker flag on a cell
    CellFlag { index: u16, flagged: bool },
    /// Set the auto-cashout multiplier target
    MultiplierTarget { target: f64 },
    /// Heartbeat probe; `sent_at` is echoed back in `pong`
    Ping { sent_at: u64 },
}

impl WireMessage for ClientMessage {
    fn message_type(&self) -> &'static str {
        match self {
            ClientMessage::CreateBoard { .. } => "createBoard",
            ClientMessage::CellReveal { .. } => "cellReveal",
            ClientMessage::CellFlag { .. } => "cellFlag",
            ClientMessage::MultiplierTarget { .. } => "multiplierTarget",
            ClientMessage::Ping { .. } => "ping",
        }
    }
}

// =============================================================================
// Server Messages (inbound)
// =============================================================================

/// Messages from the mines server to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Board state resync, sent after the channel opens mid-game
    GameBoard { board: BoardSnapshot },
    /// A fresh board was staked and created
    BoardCreated { board: BoardSnapshot },
    /// No board is active for this user
    NoBoard,
    /// The round ended; `mines` lists every hidden mine index
    GameOver {
        won: bool,
        #[serde(default)]
        payout: Option<String>,
        mines: Vec<u16>,
    },
    /// Round countdown tick
    Countdown { seconds: u32 },
    /// The round timer expired
    TimeUp,
    /// Echo of the auto-cashout target now in force
    MultiplierTarget { target: f64 },
    /// Winnings paid out at the given multiplier
    Cashout { amount: String, multiplier: f64 },
    /// Server-side error for this client
    Error { message: String },
    /// Heartbeat reply echoing the probe's `sent_at`
    Pong { sent_at: u64 },
    /// Unknown variant for forward compatibility
    #[serde(other)]
    Unknown,
}

impl WireMessage for ServerMessage {
    fn message_type(&self) -> &'static str {
        match self {
            ServerMessage::GameBoard { .. } => "gameBoard",
            ServerMessage::BoardCreated { .. } => "boardCreated",
            ServerMessage::NoBoard => "noBoard",
            ServerMessage::GameOver { .. } => "gameOver",
            ServerMessage::Countdown { .. } => "countdown",
            ServerMessage::TimeUp => "timeUp",
            ServerMessage::MultiplierTarget { .. } => "multiplierTarget",
            ServerMessage::Cashout { .. } => "cashout",
            ServerMessage::Error { .. } => "error",
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
    fn test_create_board_wire_shape() {
        let json = encode(&ClientMessage::CreateBoard {
            user_id: "u-5".into(),
            size: 5,
            mines: 3,
            stake: "1.25".into(),
        })
        .expect("encode");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["type"], "createBoard");
        assert_eq!(value["stake"], "1.25");
    }

    #[test]
    fn test_decode_game_over_reveals_mines() {
        let frame = r#"{"type":"gameOver","won":false,"mines":[3,11,19]}"#;
        let msg: ServerMessage = decode(frame).expect("decode");
        assert_eq!(
            msg,
            ServerMessage::GameOver {
                won: false,
                payout: None,
                mines: vec![3, 11, 19]
            }
        );
    }

    #[test]
    fn test_decode_board_snapshot() {
        let frame = r#"{
            "type": "gameBoard",
            "board": {
                "board_id": "b-42", "size": 5, "mines": 3, "stake": "2.0",
                "revealed": [0, 6], "flagged": [], "multiplier": 1.36
            }
        }"#;
        let msg: ServerMessage = decode(frame).expect("decode");
        match msg {
            ServerMessage::GameBoard { board } => {
                assert_eq!(board.cell_count(), 25);
                assert_eq!(board.revealed, vec![0, 6]);
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }
}
