//! Chat topic messages
//!
//! Room text chat. Outbound tags are lowercase, inbound camelCase.

use serde::{Deserialize, Serialize};

use crate::codec::WireMessage;
use crate::types::ChatEntry;

// =============================================================================
// Client Messages (outbound)
// =============================================================================

/// Messages from client to the chat server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    /// Post a message to the room
    Chat { user_id: String, body: String },
    /// Heartbeat probe; `sent_at` is echoed back in `pong`
    Ping { sent_at: u64 },
}

impl WireMessage for ClientMessage {
    fn message_type(&self) -> &'static str {
        match self {
            ClientMessage::Chat { .. } => "chat",
            ClientMessage::Ping { .. } => "ping",
        }
    }
}

// =============================================================================
// Server Messages (inbound)
// =============================================================================

/// Messages from the chat server to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Whether this client may post (muted users receive `false`)
    PermitChat { allowed: bool },
    /// A message broadcast to the room
    Chat { message: ChatEntry },
    /// Backlog sent once after the channel opens
    ChatHistory { messages: Vec<ChatEntry> },
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
            ServerMessage::PermitChat { .. } => "permitChat",
            ServerMessage::Chat { .. } => "chat",
            ServerMessage::ChatHistory { .. } => "chatHistory",
            ServerMessage::Error { .. } => "error",
            ServerMessage::Pong { .. } => "pong",
            ServerMessage::Unknown => "unknown",
        }
    }

    fn is_unknown(&self) -> bool {
        matches!(self, ServerMessage::Unknown)
    }
}
