//! WagerWars Protocol - Typed wire messages for the realtime channel topics
//!
//! This crate contains the message types exchanged over a channel's WebSocket
//! connection, one module per topic:
//! - `lobby` - matchmaking rooms (join requests, ready state, kicks)
//! - `words` - the word-battle game
//! - `chat` - room text chat
//! - `mines` - the minesweeper-style wagering game
//!
//! Each topic defines a closed `ClientMessage`/`ServerMessage` pair, tagged on
//! the wire by a `type` field. Server sets additionally carry an `Unknown`
//! variant so that new server-side tags never break an older client.
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - Only serde, serde_json, chrono, and thiserror
//! 2. **No business logic** - Pure data types and serialization
//! 3. **Immutable payloads** - Decoded messages are dispatched as-is, never mutated

pub mod chat;
pub mod codec;
pub mod lobby;
pub mod mines;
pub mod types;
pub mod words;

// =============================================================================
// Codec
// =============================================================================
pub use codec::{decode, encode, DecodeError, EncodeError, WireMessage};

// =============================================================================
// Shared Payload Types
// =============================================================================
pub use types::{BoardSnapshot, ChatEntry, LobbyPhase, PlayerInfo, PlayerStanding};
