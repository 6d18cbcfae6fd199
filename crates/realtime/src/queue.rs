//! Outbound message queue.

use std::collections::VecDeque;

use futures_util::{Sink, SinkExt};
use tokio::sync::oneshot;

use crate::error::{SendError, TransportError};

/// A frame waiting for an open socket, paired with its completion.
struct QueuedMessage {
    frame: String,
    done: oneshot::Sender<Result<(), SendError>>,
}

/// FIFO queue of outbound frames.
///
/// Messages submitted while the channel is not open wait here and are
/// replayed, oldest first, once a socket opens. Each entry settles its
/// completion exactly once: `Ok` when the transport accepts the write, `Err`
/// when the write fails or the channel is abandoned.
#[derive(Default)]
pub struct MessageQueue {
    inner: VecDeque<QueuedMessage>,
}

impl MessageQueue {
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn enqueue(&mut self, frame: String, done: oneshot::Sender<Result<(), SendError>>) {
        self.inner.push_back(QueuedMessage { frame, done });
    }

    /// Replay queued frames into `sink` in FIFO order.
    ///
    /// Stops at the first write failure: that message's completion gets the
    /// error and everything behind it stays queued for the next open socket.
    /// Returns how many frames went out.
    pub async fn drain<S>(&mut self, sink: &mut S) -> Result<usize, SendError>
    where
        S: Sink<String, Error = TransportError> + Unpin,
    {
        let mut sent = 0;
        while let Some(QueuedMessage { frame, done }) = self.inner.pop_front() {
            match sink.send(frame).await {
                Ok(()) => {
                    let _ = done.send(Ok(()));
                    sent += 1;
                }
                Err(err) => {
                    let send_err = SendError::Transport(err.to_string());
                    let _ = done.send(Err(send_err.clone()));
                    return Err(send_err);
                }
            }
        }
        Ok(sent)
    }

    /// Reject everything still queued with `error`. Returns how many
    /// completions were settled.
    pub fn flush_with_failure(&mut self, error: &SendError) -> usize {
        let count = self.inner.len();
        for QueuedMessage { done, .. } in self.inner.drain(..) {
            let _ = done.send(Err(error.clone()));
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use super::*;

    /// Records writes; fails once the configured capacity is reached.
    struct VecSink {
        sent: Vec<String>,
        fail_after: Option<usize>,
    }

    impl VecSink {
        fn new() -> Self {
            Self {
                sent: Vec::new(),
                fail_after: None,
            }
        }

        fn failing_after(count: usize) -> Self {
            Self {
                sent: Vec::new(),
                fail_after: Some(count),
            }
        }
    }

    impl Sink<String> for VecSink {
        type Error = TransportError;

        fn poll_ready(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn start_send(mut self: Pin<&mut Self>, frame: String) -> Result<(), Self::Error> {
            if let Some(limit) = self.fail_after {
                if self.sent.len() >= limit {
                    return Err(TransportError::Socket("write failed".to_string()));
                }
            }
            self.sent.push(frame);
            Ok(())
        }

        fn poll_flush(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn poll_close(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }
    }

    fn enqueue_tracked(
        queue: &mut MessageQueue,
        frame: &str,
    ) -> oneshot::Receiver<Result<(), SendError>> {
        let (done, rx) = oneshot::channel();
        queue.enqueue(frame.to_string(), done);
        rx
    }

    #[tokio::test]
    async fn test_drain_sends_in_order_and_resolves() {
        let mut queue = MessageQueue::default();
        let rx_a = enqueue_tracked(&mut queue, "a");
        let rx_b = enqueue_tracked(&mut queue, "b");
        assert_eq!(queue.len(), 2);

        let mut sink = VecSink::new();
        let sent = queue.drain(&mut sink).await.expect("drain");
        assert_eq!(sent, 2);
        assert_eq!(sink.sent, vec!["a", "b"]);
        assert!(queue.is_empty());
        assert_eq!(rx_a.await.expect("completion"), Ok(()));
        assert_eq!(rx_b.await.expect("completion"), Ok(()));
    }

    #[tokio::test]
    async fn test_drain_stops_at_first_write_failure() {
        let mut queue = MessageQueue::default();
        let rx_a = enqueue_tracked(&mut queue, "a");
        let rx_b = enqueue_tracked(&mut queue, "b");
        let rx_c = enqueue_tracked(&mut queue, "c");

        let mut sink = VecSink::failing_after(1);
        let err = queue.drain(&mut sink).await.expect_err("second write fails");
        assert!(matches!(err, SendError::Transport(_)));

        // "a" went out, "b" was rejected, "c" is still waiting
        assert_eq!(sink.sent, vec!["a"]);
        assert_eq!(rx_a.await.expect("completion"), Ok(()));
        assert!(matches!(
            rx_b.await.expect("completion"),
            Err(SendError::Transport(_))
        ));
        assert_eq!(queue.len(), 1);
        drop(queue);
        assert!(matches!(rx_c.await, Err(_)));
    }

    #[tokio::test]
    async fn test_flush_rejects_everything() {
        let mut queue = MessageQueue::default();
        let rx_a = enqueue_tracked(&mut queue, "a");
        let rx_b = enqueue_tracked(&mut queue, "b");

        let count = queue.flush_with_failure(&SendError::Disconnected);
        assert_eq!(count, 2);
        assert!(queue.is_empty());
        assert_eq!(rx_a.await.expect("completion"), Err(SendError::Disconnected));
        assert_eq!(rx_b.await.expect("completion"), Err(SendError::Disconnected));

        // flushing an empty queue is a no-op
        assert_eq!(queue.flush_with_failure(&SendError::Disconnected), 0);
    }
}
