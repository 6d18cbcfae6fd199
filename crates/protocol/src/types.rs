//! Shared payload types
//!
//! Common structs embedded in the per-topic message variants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Players
// =============================================================================

/// A participant in a lobby or game room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerInfo {
    /// Unique user identifier
    pub user_id: String,
    /// Display name (if available)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Whether the player has marked themselves ready
    #[serde(default)]
    pub ready: bool,
    /// Staked wager amount as a decimal string (wallet layer owns the units)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stake: Option<String>,
}

/// One row of a game ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStanding {
    pub user_id: String,
    /// 1-based rank
    pub rank: u32,
    pub score: i64,
    /// Prize amount as a decimal string, present for paying ranks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prize: Option<String>,
}

// =============================================================================
// Lobby Phase
// =============================================================================

/// Coarse lobby lifecycle as broadcast by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LobbyPhase {
    /// Accepting players
    Waiting,
    /// Start countdown running
    Counting,
    /// Game underway
    Started,
    /// Session over, room about to close
    Finished,
    /// Unknown variant for forward compatibility
    #[serde(other)]
    Unknown,
}

// =============================================================================
// Chat
// =============================================================================

/// A single chat message, as stored and broadcast by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatEntry {
    pub sender_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    pub body: String,
    /// Server-side receive time
    pub sent_at: DateTime<Utc>,
}

// =============================================================================
// Mines Board
// =============================================================================

/// Snapshot of a mines board, sent on creation and on resync
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub board_id: String,
    /// Board is `size` x `size` cells, indexed row-major
    pub size: u8,
    /// Number of hidden mines
    pub mines: u8,
    /// Staked amount as a decimal string
    pub stake: String,
    /// Row-major indices of cells already revealed
    #[serde(default)]
    pub revealed: Vec<u16>,
    /// Row-major indices of cells the player flagged
    #[serde(default)]
    pub flagged: Vec<u16>,
    /// Current payout multiplier
    pub multiplier: f64,
}

impl BoardSnapshot {
    /// Total cell count for this board
    pub fn cell_count(&self) -> u16 {
        u16::from(self.size) * u16::from(self.size)
    }
}
