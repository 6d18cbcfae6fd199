//! Transport seam between the channel client and the wire.
//!
//! The client is written against [`Transport`] so the connection state
//! machine can be driven by a scripted fake in tests. Production code uses
//! [`WsTransport`], a thin adapter over tokio-tungstenite.

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio_tungstenite::tungstenite::{self, Message};
use url::Url;

use crate::error::TransportError;

/// A close frame observed on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseFrame {
    pub code: u16,
    pub reason: String,
}

/// One event from the read half of a socket.
#[derive(Debug)]
pub enum TransportEvent {
    /// A text frame arrived.
    Frame(String),
    /// The peer closed the stream. The frame is absent on an abrupt EOF.
    Closed(Option<CloseFrame>),
}

/// Write half of an established socket; accepts text frames.
pub type FrameSink = Pin<Box<dyn Sink<String, Error = TransportError> + Send>>;

/// Read half of an established socket.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<TransportEvent, TransportError>> + Send>>;

/// Connection factory the channel client is built against.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn connect(&self, url: &Url) -> Result<(FrameSink, FrameStream), TransportError>;
}

/// WebSocket transport over tokio-tungstenite.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsTransport;

#[async_trait]
impl Transport for WsTransport {
    async fn connect(&self, url: &Url) -> Result<(FrameSink, FrameStream), TransportError> {
        let (ws_stream, _) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|err| TransportError::Connect(err.to_string()))?;
        let (write, read) = ws_stream.split();

        let sink = write
            .with(|frame: String| {
                futures_util::future::ready(Ok::<Message, tungstenite::Error>(Message::Text(
                    frame,
                )))
            })
            .sink_map_err(|err| TransportError::Socket(err.to_string()));

        let stream = read.filter_map(|item| async move {
            match item {
                Ok(Message::Text(text)) => Some(Ok(TransportEvent::Frame(text))),
                Ok(Message::Close(frame)) => {
                    Some(Ok(TransportEvent::Closed(frame.map(|f| CloseFrame {
                        code: f.code.into(),
                        reason: f.reason.into_owned(),
                    }))))
                }
                // binary and ping/pong control frames are not part of the
                // channel protocol
                Ok(_) => None,
                Err(err) => Some(Err(TransportError::Socket(err.to_string()))),
            }
        });

        Ok((Box::pin(sink), Box::pin(stream)))
    }
}
