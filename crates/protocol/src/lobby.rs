//! Lobby topic messages
//!
//! Matchmaking rooms: join requests with host approval, ready state, kicks,
//! and the pre-game countdown. Outbound tags are flat lowercase
//! (`requestjoin`), inbound tags are camelCase (`playerUpdated`); both are the
//! server's historical spelling and must not be normalized.

use serde::{Deserialize, Serialize};

use crate::codec::WireMessage;
use crate::types::{LobbyPhase, PlayerInfo};

// =============================================================================
// Client Messages (outbound)
// =============================================================================

/// Messages from client to the lobby server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    /// Ask the host for permission to join the room
    RequestJoin { user_id: String },
    /// Join after the stake transaction confirmed on chain
    JoinLobby {
        user_id: String,
        /// Confirmed stake transaction id from the wallet layer
        tx_id: String,
    },
    /// Leave the room voluntarily
    LeaveRoom { user_id: String },
    /// Host removes a player
    KickPlayer {
        user_id: String,
        /// The player being removed
        target_id: String,
    },
    /// Host decides on a pending join request
    PermitJoin {
        user_id: String,
        target_id: String,
        allow: bool,
    },
    /// Host advances the lobby lifecycle
    UpdateGameState { state: LobbyPhase },
    /// Player toggles their ready flag
    UpdatePlayerState { user_id: String, ready: bool },
    /// Heartbeat probe; `sent_at` is echoed back in `pong`
    Ping { sent_at: u64 },
}

impl WireMessage for ClientMessage {
    fn message_type(&self) -> &'static str {
        match self {
            ClientMessage::RequestJoin { .. } => "requestjoin",
            ClientMessage::JoinLobby { .. } => "joinlobby",
            ClientMessage::LeaveRoom { .. } => "leaveroom",
            ClientMessage::KickPlayer { .. } => "kickplayer",
            ClientMessage::PermitJoin { .. } => "permitjoin",
            ClientMessage::UpdateGameState { .. } => "updategamestate",
            ClientMessage::UpdatePlayerState { .. } => "updateplayerstate",
            ClientMessage::Ping { .. } => "ping",
        }
    }
}

// =============================================================================
// Server Messages (inbound)
// =============================================================================

/// Messages from the lobby server to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// A player's info changed (ready flag, stake, profile)
    PlayerUpdated { player: PlayerInfo },
    /// A player was removed from the room
    PlayerKicked { user_id: String },
    /// This client was removed from the room
    NotifyKicked {
        #[serde(default)]
        reason: Option<String>,
    },
    /// Pre-game countdown tick
    Countdown { seconds: u32 },
    /// Full room snapshot, sent on join and on phase changes
    LobbyState {
        phase: LobbyPhase,
        players: Vec<PlayerInfo>,
    },
    /// Join requests awaiting the host's decision
    PendingPlayers { players: Vec<PlayerInfo> },
    /// Players blocking a start because they are not ready
    PlayersNotReady { user_ids: Vec<String> },
    /// This client's join request was approved
    Allowed,
    /// This client's join request was declined
    Rejected {
        #[serde(default)]
        reason: Option<String>,
    },
    /// This client's join request awaits the host
    Pending,
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
            ServerMessage::PlayerUpdated { .. } => "playerUpdated",
            ServerMessage::PlayerKicked { .. } => "playerKicked",
            ServerMessage::NotifyKicked { .. } => "notifyKicked",
            ServerMessage::Countdown { .. } => "countdown",
            ServerMessage::LobbyState { .. } => "lobbyState",
            ServerMessage::PendingPlayers { .. } => "pendingPlayers",
            ServerMessage::PlayersNotReady { .. } => "playersNotReady",
            ServerMessage::Allowed => "allowed",
            ServerMessage::Rejected { .. } => "rejected",
            ServerMessage::Pending => "pending",
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
    fn test_outbound_tags_are_flat_lowercase() {
        let json = encode(&ClientMessage::RequestJoin {
            user_id: "u-77".into(),
        })
        .expect("encode");
        assert!(json.contains(r#""type":"requestjoin""#));

        let json = encode(&ClientMessage::JoinLobby {
            user_id: "u-77".into(),
            tx_id: "0xabc".into(),
        })
        .expect("encode");
        assert!(json.contains(r#""type":"joinlobby""#));
        assert!(json.contains(r#""tx_id":"0xabc""#));

        let json = encode(&ClientMessage::UpdatePlayerState {
            user_id: "u-77".into(),
            ready: true,
        })
        .expect("encode");
        assert!(json.contains(r#""type":"updateplayerstate""#));
    }

    #[test]
    fn test_decode_player_updated() {
        let frame = r#"{
            "type": "playerUpdated",
            "player": {"user_id": "u-1", "display_name": "ada", "ready": true}
        }"#;
        let msg: ServerMessage = decode(frame).expect("decode");
        match msg {
            ServerMessage::PlayerUpdated { player } => {
                assert_eq!(player.user_id, "u-1");
                assert!(player.ready);
                assert_eq!(player.stake, None);
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn test_decode_bare_pending() {
        let msg: ServerMessage = decode(r#"{"type":"pending"}"#).expect("decode");
        assert_eq!(msg, ServerMessage::Pending);
    }
}
