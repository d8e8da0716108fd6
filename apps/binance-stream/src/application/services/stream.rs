//! Feed Stream
//!
//! The caller-facing handle of a running feed: a pull-based
//! [`Stream`](futures::Stream) of decoded events that owns the cancellation
//! of every task behind it.
//!
//! Dropping the stream cancels the feed. [`FeedStream::close`] does the same
//! and also waits for the tasks to finish.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::{CancellationToken, DropGuard};

use super::diagnostics::{DiagnosticsSender, FeedDiagnostic};

/// Lazy, logically infinite sequence of decoded events.
pub struct FeedStream<E> {
    events: ReceiverStream<E>,
    diagnostics: DiagnosticsSender,
    cancel: CancellationToken,
    _guard: DropGuard,
    tasks: Vec<JoinHandle<()>>,
}

impl<E> FeedStream<E> {
    pub(crate) fn new(
        events: mpsc::Receiver<E>,
        diagnostics: DiagnosticsSender,
        cancel: CancellationToken,
        tasks: Vec<JoinHandle<()>>,
    ) -> Self {
        Self {
            events: ReceiverStream::new(events),
            diagnostics,
            _guard: cancel.clone().drop_guard(),
            cancel,
            tasks,
        }
    }

    /// Subscribe to the feed's diagnostics.
    ///
    /// Only diagnostics emitted after subscribing are delivered; subscribe
    /// before the first poll to see the initial connection.
    #[must_use]
    pub fn diagnostics(&self) -> broadcast::Receiver<FeedDiagnostic> {
        self.diagnostics.subscribe()
    }

    /// Whether the feed has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Cancel the feed and wait for its tasks to exit.
    pub async fn close(mut self) {
        self.cancel.cancel();
        for task in self.tasks.drain(..) {
            if let Err(e) = task.await
                && e.is_panic()
            {
                tracing::error!(error = %e, "Feed task panicked");
            }
        }
    }
}

impl<E> Stream for FeedStream<E> {
    type Item = E;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<E>> {
        Pin::new(&mut self.events).poll_next(cx)
    }
}

impl<E> std::fmt::Debug for FeedStream<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedStream")
            .field("cancelled", &self.cancel.is_cancelled())
            .field("tasks", &self.tasks.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn yields_channel_items_in_order() {
        let (tx, rx) = mpsc::channel(4);
        let mut stream = FeedStream::new(rx, DiagnosticsSender::new(), CancellationToken::new(), vec![]);

        tx.send(1).await.unwrap();
        tx.send(2).await.unwrap();
        drop(tx);

        assert_eq!(stream.next().await, Some(1));
        assert_eq!(stream.next().await, Some(2));
        assert_eq!(stream.next().await, None);
    }

    #[tokio::test]
    async fn drop_cancels_token() {
        let (_tx, rx) = mpsc::channel::<u8>(1);
        let cancel = CancellationToken::new();
        let stream = FeedStream::new(rx, DiagnosticsSender::new(), cancel.clone(), vec![]);

        assert!(!cancel.is_cancelled());
        drop(stream);
        assert!(cancel.is_cancelled());
    }

    #[tokio::test]
    async fn close_waits_for_tasks() {
        let (_tx, rx) = mpsc::channel::<u8>(1);
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        let task = tokio::spawn(async move { task_cancel.cancelled().await });
        let stream = FeedStream::new(rx, DiagnosticsSender::new(), cancel.clone(), vec![task]);

        tokio::time::timeout(std::time::Duration::from_secs(1), stream.close())
            .await
            .expect("close should finish once tasks observe cancellation");
        assert!(cancel.is_cancelled());
    }
}
