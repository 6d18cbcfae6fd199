//! Error types for the realtime channel client.

use thiserror::Error;

/// Failures raised by the transport layer.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The socket could not be established.
    #[error("connect failed: {0}")]
    Connect(String),

    /// An established socket failed mid-stream.
    #[error("socket error: {0}")]
    Socket(String),
}

/// Why an outbound message was not delivered.
///
/// Every [`SendError`] is cloneable so a single failure can settle a whole
/// batch of queued completions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    /// The caller disconnected the channel before the message went out.
    #[error("channel was disconnected before the message could be sent")]
    Disconnected,

    /// The reconnect budget ran out while the message was queued.
    #[error("reconnect attempts exhausted")]
    RetriesExhausted,

    /// The server ended the session with a terminal close.
    #[error("session ended by server: {0}")]
    Terminated(String),

    /// The transport rejected the write.
    #[error("transport write failed: {0}")]
    Transport(String),

    /// The message could not be serialized to a frame.
    #[error("failed to encode message: {0}")]
    Encode(String),

    /// The channel task is gone; no one will ever send this message.
    #[error("channel client has shut down")]
    ChannelGone,
}

/// The configured base URL cannot carry a topic path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("base url `{base}` cannot be extended with a topic path")]
pub struct EndpointError {
    pub base: String,
}
