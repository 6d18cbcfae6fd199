//! WagerWars Realtime - resilient channel client for the game topics.
//!
//! Each game surface (lobby, words, chat, mines) talks to the platform over
//! its own WebSocket topic. This crate provides one client for all of them:
//!
//! - [`ChannelClient`] owns a single socket per channel and exposes
//!   `connect` / `send` / `disconnect` / `force_reconnect`
//! - messages sent while the socket is down queue up and replay in order on
//!   the next open connection
//! - a heartbeat probe measures round-trip latency per topic cadence
//! - unexpected closes reconnect with exponential backoff, while terminal
//!   closes ("session finished") and manual disconnects stay down
//!
//! The wire format lives in `wagerwars-protocol`; this crate only moves
//! frames and tracks connection health.

pub mod client;
pub mod config;
pub mod error;
pub mod heartbeat;
pub mod queue;
pub mod retry;
pub mod state;
pub mod topic;
pub mod transport;


pub use client::ChannelClient;
pub use config::ChannelConfig;
pub use error::{EndpointError, SendError, TransportError};
pub use state::{ChannelStatus, ConnectionState, StatusObserver};
pub use topic::{Chat, Lobby, Mines, Topic, Words, TERMINAL_CLOSE_REASON};
pub use transport::{CloseFrame, FrameSink, FrameStream, Transport, TransportEvent, WsTransport};
