//! The channel client and its connection task.
//!
//! A [`ChannelClient`] is a cheap cloneable handle. All socket state lives in
//! a single spawned task that owns the transport halves, the outbound queue,
//! the heartbeat timer, and the retry policy. Handles talk to the task over
//! an unbounded command channel, so `connect`, `send`, `disconnect`, and
//! `force_reconnect` never block on socket IO. The task processes one event
//! at a time, which keeps the ordering guarantees simple: queued messages
//! replay before anything submitted after the socket opened, and a probe is
//! never started while the previous probe's send is still in flight.

use std::marker::PhantomData;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use url::Url;
use wagerwars_protocol::{decode, encode, WireMessage};

use crate::config::ChannelConfig;
use crate::error::{EndpointError, SendError};
use crate::heartbeat::HeartbeatTimer;
use crate::queue::MessageQueue;
use crate::retry::RetryPolicy;
use crate::state::{ChannelStatus, ConnectionState, StatusObserver};
use crate::topic::Topic;
use crate::transport::{
    CloseFrame, FrameSink, FrameStream, Transport, TransportEvent, WsTransport,
};

enum Command {
    Connect,
    Send {
        frame: String,
        kind: &'static str,
        done: oneshot::Sender<Result<(), SendError>>,
    },
    Disconnect,
    ForceReconnect,
}

/// Handle to one realtime channel.
///
/// Dropping every handle shuts the connection task down and rejects anything
/// still queued.
pub struct ChannelClient<T: Topic> {
    cmd_tx: mpsc::UnboundedSender<Command>,
    status: StatusObserver,
    _topic: PhantomData<T>,
}

impl<T: Topic> ChannelClient<T> {
    /// Create a client over the production WebSocket transport.
    ///
    /// The channel starts out `Closed`; call [`connect`](Self::connect) to
    /// bring it up.
    pub fn new<F>(config: ChannelConfig, handler: F) -> Result<Self, EndpointError>
    where
        F: Fn(T::Inbound) + Send + 'static,
    {
        Self::with_transport(config, WsTransport, handler)
    }

    /// Create a client over a custom [`Transport`].
    pub fn with_transport<Tr, F>(
        config: ChannelConfig,
        transport: Tr,
        handler: F,
    ) -> Result<Self, EndpointError>
    where
        Tr: Transport + 'static,
        F: Fn(T::Inbound) + Send + 'static,
    {
        let endpoint = T::endpoint(&config.base_url, &config.room_id, &config.user_id)?;
        let interval = config.heartbeat_interval.unwrap_or(T::HEARTBEAT_INTERVAL);
        let status = StatusObserver::new();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();

        let state = ActorState::<T> {
            endpoint,
            handler: Box::new(handler),
            status: status.clone(),
            queue: MessageQueue::default(),
            heartbeat: HeartbeatTimer::new(interval),
            retry: RetryPolicy::new(config.max_attempts, config.base_delay),
            origin: Instant::now(),
            abandoned: None,
        };
        tokio::spawn(run_channel(Box::new(transport), state, cmd_rx));

        Ok(Self {
            cmd_tx,
            status,
            _topic: PhantomData,
        })
    }

    /// Open the channel. No-op while a socket already exists, and after a
    /// disconnect or terminal close; [`force_reconnect`](Self::force_reconnect)
    /// is the way back from those.
    pub fn connect(&self) {
        let _ = self.cmd_tx.send(Command::Connect);
    }

    /// Send a message, queueing it if the channel is not open yet.
    ///
    /// Resolves once the transport accepted the write, or with the reason the
    /// message will never go out.
    pub async fn send(&self, message: T::Outbound) -> Result<(), SendError> {
        let kind = message.message_type();
        let frame = encode(&message).map_err(|err| SendError::Encode(err.to_string()))?;
        let (done, completion) = oneshot::channel();
        self.cmd_tx
            .send(Command::Send { frame, kind, done })
            .map_err(|_| SendError::ChannelGone)?;
        completion.await.map_err(|_| SendError::ChannelGone)?
    }

    /// Tear the channel down and reject everything still queued. Idempotent.
    pub fn disconnect(&self) {
        let _ = self.cmd_tx.send(Command::Disconnect);
    }

    /// Drop whatever the channel is doing, reset the retry budget, and
    /// connect from scratch. This also clears the manual-disconnect latch.
    pub fn force_reconnect(&self) {
        let _ = self.cmd_tx.send(Command::ForceReconnect);
    }

    pub fn state(&self) -> ConnectionState {
        self.status.state()
    }

    pub fn status(&self) -> ChannelStatus {
        self.status.snapshot()
    }

    /// Shared status cell, for wiring into UI without holding the client.
    pub fn status_observer(&self) -> StatusObserver {
        self.status.clone()
    }
}

impl<T: Topic> Clone for ChannelClient<T> {
    fn clone(&self) -> Self {
        Self {
            cmd_tx: self.cmd_tx.clone(),
            status: self.status.clone(),
            _topic: PhantomData,
        }
    }
}

/// Everything the connection task owns.
struct ActorState<T: Topic> {
    endpoint: Url,
    handler: Box<dyn Fn(T::Inbound) + Send>,
    status: StatusObserver,
    queue: MessageQueue,
    heartbeat: HeartbeatTimer,
    retry: RetryPolicy,
    /// Base for the monotonic millisecond samples carried by probes.
    origin: Instant,
    /// Set once the channel is done for good: manual disconnect, terminal
    /// close, or an exhausted retry budget. New sends fail fast with this
    /// error and `connect` is ignored until `force_reconnect` clears it.
    abandoned: Option<SendError>,
}

impl<T: Topic> ActorState<T> {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn on_open(&mut self) {
        self.retry.reset();
        self.status.set_state(ConnectionState::Open);
        self.status.set_reconnecting(false);
        self.status.set_attempts(0);
        self.status.clear_last_error();
        tracing::info!(topic = T::NAME, "channel open");
    }

    /// Decode one inbound frame. Pong replies feed the latency gauge and stop
    /// here; everything else decodable goes to the handler. Frames that do
    /// not decode are counted and dropped without disturbing the connection.
    fn on_frame(&mut self, text: &str) {
        match decode::<T::Inbound>(text) {
            Ok(message) => {
                if let Some(echoed) = T::pong(&message) {
                    let now = self.now_ms();
                    if let Some(rtt) = self.heartbeat.record_pong(echoed, now) {
                        self.status.record_latency(rtt);
                        tracing::trace!(
                            topic = T::NAME,
                            latency_ms = rtt.as_millis() as u64,
                            "heartbeat round trip"
                        );
                    }
                    return;
                }
                (self.handler)(message);
            }
            Err(err) => {
                self.status.record_decode_error();
                tracing::warn!(topic = T::NAME, error = %err, "dropping inbound frame");
            }
        }
    }

    fn enqueue_send(
        &mut self,
        frame: String,
        kind: &'static str,
        done: oneshot::Sender<Result<(), SendError>>,
    ) {
        self.queue.enqueue(frame, done);
        tracing::debug!(
            topic = T::NAME,
            kind,
            queued = self.queue.len(),
            "queued message for next open socket"
        );
    }

    /// A send arriving while no session is running: queue it, unless the
    /// channel was abandoned, in which case it fails right away.
    fn accept_idle_send(
        &mut self,
        frame: String,
        kind: &'static str,
        done: oneshot::Sender<Result<(), SendError>>,
    ) {
        if let Some(err) = &self.abandoned {
            let _ = done.send(Err(err.clone()));
            return;
        }
        self.enqueue_send(frame, kind, done);
    }

    fn reset_for_restart(&mut self) {
        self.abandoned = None;
        self.retry.reset();
        self.status.set_attempts(0);
        self.status.set_reconnecting(false);
    }

    fn manual_shutdown(&mut self) {
        self.status.set_state(ConnectionState::Closing);
        let dropped = self.queue.flush_with_failure(&SendError::Disconnected);
        if dropped > 0 {
            tracing::debug!(
                topic = T::NAME,
                dropped,
                "rejected queued messages on disconnect"
            );
        }
        self.abandoned = Some(SendError::Disconnected);
        self.status.set_reconnecting(false);
        self.status.set_state(ConnectionState::Closed);
        tracing::info!(topic = T::NAME, "channel disconnected");
    }

    fn terminal_shutdown(&mut self, frame: &CloseFrame) {
        tracing::info!(
            topic = T::NAME,
            code = frame.code,
            reason = %frame.reason,
            "session ended by server"
        );
        let err = SendError::Terminated(frame.reason.clone());
        let dropped = self.queue.flush_with_failure(&err);
        if dropped > 0 {
            tracing::debug!(
                topic = T::NAME,
                dropped,
                "rejected queued messages on session end"
            );
        }
        self.abandoned = Some(err);
        self.status.set_reconnecting(false);
        self.status.set_state(ConnectionState::Closed);
    }

    fn exhausted_shutdown(&mut self) {
        tracing::error!(
            topic = T::NAME,
            attempts = self.retry.attempts(),
            "giving up after exhausting reconnect attempts"
        );
        let dropped = self.queue.flush_with_failure(&SendError::RetriesExhausted);
        if dropped > 0 {
            tracing::debug!(
                topic = T::NAME,
                dropped,
                "rejected queued messages after final attempt"
            );
        }
        self.abandoned = Some(SendError::RetriesExhausted);
        self.status.set_last_error("reconnect attempts exhausted");
        self.status.set_reconnecting(false);
        self.status.set_state(ConnectionState::Closed);
    }
}

#[derive(PartialEq)]
enum SessionEnd {
    /// Back to idle; the task keeps serving commands.
    Idle,
    /// Every handle is gone.
    Shutdown,
}

enum ConnectPhase {
    Opened(FrameSink, FrameStream),
    Failed(String),
    Forced,
    Manual,
    HandlesDropped,
}

enum CloseCause {
    Manual,
    Forced,
    Remote(Option<CloseFrame>),
    Failed(String),
    HandlesDropped,
}

enum BackoffOutcome {
    Proceed,
    Manual,
    GiveUp,
    HandlesDropped,
}

/// Top-level task loop: idle until a connect arrives, then run the session
/// state machine until the channel settles back down.
async fn run_channel<T: Topic>(
    transport: Box<dyn Transport>,
    mut state: ActorState<T>,
    mut cmd_rx: mpsc::UnboundedReceiver<Command>,
) {
    loop {
        let cmd = match cmd_rx.recv().await {
            Some(cmd) => cmd,
            None => break,
        };
        let end = match cmd {
            Command::Connect => {
                if state.abandoned.is_some() {
                    tracing::debug!(topic = T::NAME, "connect ignored, channel was shut down");
                    continue;
                }
                run_session(transport.as_ref(), &mut state, &mut cmd_rx).await
            }
            Command::ForceReconnect => {
                state.reset_for_restart();
                run_session(transport.as_ref(), &mut state, &mut cmd_rx).await
            }
            Command::Send { frame, kind, done } => {
                state.accept_idle_send(frame, kind, done);
                continue;
            }
            Command::Disconnect => {
                state.manual_shutdown();
                continue;
            }
        };
        if end == SessionEnd::Shutdown {
            break;
        }
    }

    let dropped = state.queue.flush_with_failure(&SendError::ChannelGone);
    if dropped > 0 {
        tracing::debug!(topic = T::NAME, dropped, "rejected queued messages on shutdown");
    }
    state.status.set_state(ConnectionState::Closed);
    tracing::debug!(topic = T::NAME, "channel task ended");
}

/// Connect, serve the open socket, and decide what each close means. Returns
/// once the channel is idle again or the task should shut down.
async fn run_session<T: Topic>(
    transport: &dyn Transport,
    state: &mut ActorState<T>,
    cmd_rx: &mut mpsc::UnboundedReceiver<Command>,
) -> SessionEnd {
    loop {
        let cause = match connect_phase(transport, state, cmd_rx).await {
            ConnectPhase::Opened(sink, stream) => open_phase(state, cmd_rx, sink, stream).await,
            ConnectPhase::Failed(message) => CloseCause::Failed(message),
            ConnectPhase::Forced => {
                state.reset_for_restart();
                continue;
            }
            ConnectPhase::Manual => CloseCause::Manual,
            ConnectPhase::HandlesDropped => CloseCause::HandlesDropped,
        };

        // whatever happened, the socket is gone; a pong can no longer arrive
        state.heartbeat.disarm();

        match cause {
            CloseCause::Manual => {
                state.manual_shutdown();
                return SessionEnd::Idle;
            }
            CloseCause::HandlesDropped => return SessionEnd::Shutdown,
            CloseCause::Forced => {
                tracing::info!(topic = T::NAME, "forcing a fresh connection");
                state.status.set_state(ConnectionState::Closed);
                state.reset_for_restart();
                continue;
            }
            CloseCause::Remote(frame) => {
                if let Some(frame) = frame.as_ref().filter(|f| T::is_terminal_close(f)) {
                    state.terminal_shutdown(frame);
                    return SessionEnd::Idle;
                }
                match frame {
                    Some(f) => tracing::warn!(
                        topic = T::NAME,
                        code = f.code,
                        reason = %f.reason,
                        "connection closed unexpectedly"
                    ),
                    None => {
                        tracing::warn!(topic = T::NAME, "connection dropped without a close frame")
                    }
                }
            }
            CloseCause::Failed(message) => {
                state.status.set_last_error(message.clone());
                tracing::warn!(topic = T::NAME, error = %message, "connection failed");
            }
        }

        match backoff_wait(state, cmd_rx).await {
            BackoffOutcome::Proceed => continue,
            BackoffOutcome::Manual => {
                state.manual_shutdown();
                return SessionEnd::Idle;
            }
            BackoffOutcome::GiveUp => return SessionEnd::Idle,
            BackoffOutcome::HandlesDropped => return SessionEnd::Shutdown,
        }
    }
}

/// Dial the endpoint while still accepting commands. A disconnect or force
/// here aborts the in-flight attempt by dropping its future.
async fn connect_phase<T: Topic>(
    transport: &dyn Transport,
    state: &mut ActorState<T>,
    cmd_rx: &mut mpsc::UnboundedReceiver<Command>,
) -> ConnectPhase {
    state.status.set_state(ConnectionState::Connecting);
    tracing::info!(topic = T::NAME, endpoint = %state.endpoint, "connecting");

    let endpoint = state.endpoint.clone();
    let mut connect_fut = transport.connect(&endpoint);
    loop {
        tokio::select! {
            result = &mut connect_fut => {
                return match result {
                    Ok((sink, stream)) => ConnectPhase::Opened(sink, stream),
                    Err(err) => ConnectPhase::Failed(err.to_string()),
                };
            }
            cmd = cmd_rx.recv() => match cmd {
                None => return ConnectPhase::HandlesDropped,
                Some(Command::Send { frame, kind, done }) => state.enqueue_send(frame, kind, done),
                Some(Command::Disconnect) => return ConnectPhase::Manual,
                Some(Command::ForceReconnect) => return ConnectPhase::Forced,
                Some(Command::Connect) => {}
            },
        }
    }
}

/// Serve an open socket: replay the queue, then multiplex inbound frames,
/// commands, and the probe timer until something closes the connection.
async fn open_phase<T: Topic>(
    state: &mut ActorState<T>,
    cmd_rx: &mut mpsc::UnboundedReceiver<Command>,
    mut sink: FrameSink,
    mut stream: FrameStream,
) -> CloseCause {
    state.on_open();

    match state.queue.drain(&mut sink).await {
        Ok(0) => {}
        Ok(count) => tracing::debug!(topic = T::NAME, count, "replayed queued messages"),
        Err(err) => return CloseCause::Failed(err.to_string()),
    }

    let interval = state.heartbeat.interval();
    let mut next_probe = Instant::now() + interval;

    loop {
        tokio::select! {
            event = stream.next() => match event {
                Some(Ok(TransportEvent::Frame(text))) => state.on_frame(&text),
                Some(Ok(TransportEvent::Closed(frame))) => return CloseCause::Remote(frame),
                Some(Err(err)) => return CloseCause::Failed(err.to_string()),
                None => return CloseCause::Remote(None),
            },
            cmd = cmd_rx.recv() => match cmd {
                None => return CloseCause::HandlesDropped,
                Some(Command::Send { frame, kind, done }) => {
                    tracing::debug!(topic = T::NAME, kind, "sending");
                    match sink.send(frame).await {
                        Ok(()) => {
                            let _ = done.send(Ok(()));
                        }
                        Err(err) => {
                            let message = err.to_string();
                            let _ = done.send(Err(SendError::Transport(message.clone())));
                            return CloseCause::Failed(message);
                        }
                    }
                }
                Some(Command::Disconnect) => return CloseCause::Manual,
                Some(Command::ForceReconnect) => return CloseCause::Forced,
                Some(Command::Connect) => {}
            },
            _ = tokio::time::sleep_until(next_probe) => {
                let sample = state.heartbeat.begin_probe(state.now_ms());
                match encode(&T::heartbeat(sample)) {
                    Ok(frame) => {
                        let result = sink.send(frame).await;
                        // the next probe is scheduled only once this send settled
                        next_probe = Instant::now() + interval;
                        match result {
                            Ok(()) => tracing::trace!(topic = T::NAME, sample, "probe sent"),
                            Err(err) => return CloseCause::Failed(err.to_string()),
                        }
                    }
                    Err(err) => {
                        tracing::warn!(topic = T::NAME, error = %err, "failed to encode probe");
                        next_probe = Instant::now() + interval;
                    }
                }
            }
        }
    }
}

/// Wait out the backoff delay for the next attempt, still serving commands.
async fn backoff_wait<T: Topic>(
    state: &mut ActorState<T>,
    cmd_rx: &mut mpsc::UnboundedReceiver<Command>,
) -> BackoffOutcome {
    let delay = match state.retry.next_delay_and_advance() {
        Some(delay) => delay,
        None => {
            state.exhausted_shutdown();
            return BackoffOutcome::GiveUp;
        }
    };

    state.status.set_state(ConnectionState::Closed);
    state.status.set_reconnecting(true);
    state.status.set_attempts(state.retry.attempts());
    tracing::warn!(
        topic = T::NAME,
        attempt = state.retry.attempts(),
        delay_ms = delay.as_millis() as u64,
        "connection lost, waiting to reconnect"
    );

    let sleep = tokio::time::sleep(delay);
    tokio::pin!(sleep);
    loop {
        tokio::select! {
            _ = &mut sleep => return BackoffOutcome::Proceed,
            cmd = cmd_rx.recv() => match cmd {
                None => return BackoffOutcome::HandlesDropped,
                Some(Command::Send { frame, kind, done }) => state.enqueue_send(frame, kind, done),
                Some(Command::Disconnect) => return BackoffOutcome::Manual,
                Some(Command::ForceReconnect) => {
                    tracing::info!(topic = T::NAME, "force reconnect requested, skipping backoff");
                    state.reset_for_restart();
                    return BackoffOutcome::Proceed;
                }
                Some(Command::Connect) => {}
            },
        }
    }
}
