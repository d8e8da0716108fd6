//! Stream Listener
//!
//! The reconnect/decode engine behind every feed. One listener owns one
//! connection at a time and cycles through
//!
//! ```text
//! Disconnected ─► Connecting ─► Streaming ─► Closing ─► Disconnected ─► ...
//!                     │                                     ▲
//!                     └──────────── Faulted ────────────────┘
//! ```
//!
//! until its consumer goes away. Decode failures are reported and the
//! message discarded; handshake failures, transport errors and remote
//! closes are reported and followed by a reconnect after the delay chosen
//! by the [`ReconnectPolicy`]. Nothing the remote side does ends the loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::diagnostics::{DiagnosticsSender, FeedDiagnostic};
use super::reconnect::{ReconnectConfig, ReconnectPolicy};
use super::stream::FeedStream;
use crate::application::ports::{Decoder, Frame, Transport, TransportError, TransportSession};
use crate::domain::endpoint::FeedEndpoint;
use crate::infrastructure::metrics;

/// Upper bound on a best-effort close handshake.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// How a streaming session ended.
#[derive(Debug)]
enum SessionEnd {
    /// The feed was cancelled.
    Cancelled,
    /// The event receiver was dropped.
    ConsumerGone,
    /// The far end sent a close frame.
    RemoteClosed { code: Option<u16>, reason: String },
    /// The inbound stream ended without a close frame.
    Ended,
    /// The transport failed mid-stream.
    Failed(TransportError),
}

/// Self-healing consumer of one feed endpoint.
pub struct StreamListener<T: Transport, D: Decoder> {
    transport: Arc<T>,
    endpoint: FeedEndpoint,
    decoder: D,
    reconnect: ReconnectConfig,
    feed: &'static str,
}

impl<T: Transport, D: Decoder> StreamListener<T, D> {
    /// Create a listener with the default (immediate) reconnect policy.
    pub fn new(transport: Arc<T>, endpoint: FeedEndpoint, decoder: D) -> Self {
        Self {
            transport,
            endpoint,
            decoder,
            reconnect: ReconnectConfig::default(),
            feed: "feed",
        }
    }

    /// Use a different reconnect policy.
    #[must_use]
    pub fn with_reconnect(mut self, reconnect: ReconnectConfig) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// Label used in logs and metrics.
    #[must_use]
    pub const fn with_feed_label(mut self, feed: &'static str) -> Self {
        self.feed = feed;
        self
    }

    /// Endpoint this listener connects to.
    #[must_use]
    pub const fn endpoint(&self) -> &FeedEndpoint {
        &self.endpoint
    }

    /// Start the listener on the current Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn spawn(self) -> FeedStream<D::Event> {
        let cancel = CancellationToken::new();
        let diagnostics = DiagnosticsSender::new();
        let (events, task) = self.spawn_with(cancel.clone(), diagnostics.clone());
        FeedStream::new(events, diagnostics, cancel, vec![task])
    }

    /// Start the listener under an externally owned cancellation token.
    pub(crate) fn spawn_with(
        self,
        cancel: CancellationToken,
        diagnostics: DiagnosticsSender,
    ) -> (mpsc::Receiver<D::Event>, JoinHandle<()>) {
        // One slot: the listener never reads ahead of its consumer by more
        // than a single decoded event.
        let (tx, rx) = mpsc::channel(1);
        let task = tokio::spawn(self.run(tx, diagnostics, cancel));
        (rx, task)
    }

    async fn run(
        self,
        events: mpsc::Sender<D::Event>,
        diagnostics: DiagnosticsSender,
        cancel: CancellationToken,
    ) {
        let url = self.endpoint.url();
        let feed = self.feed;
        let mut policy = ReconnectPolicy::new(self.reconnect.clone());

        loop {
            tracing::debug!(feed, url = %url, "Connecting to feed");

            let connected = tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                result = self.transport.connect(&url) => result,
            };

            match connected {
                Ok(mut session) => {
                    policy.reset();
                    tracing::info!(feed, url = %url, "Feed connected");
                    metrics::record_connection_state(feed, true);
                    diagnostics.emit(FeedDiagnostic::Connected { url: url.clone() });

                    let end = self
                        .stream_session(&mut session, &events, &diagnostics, &cancel)
                        .await;

                    metrics::record_connection_state(feed, false);
                    match tokio::time::timeout(CLOSE_TIMEOUT, session.close()).await {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => tracing::debug!(feed, error = %e, "Error closing session"),
                        Err(_) => tracing::debug!(feed, "Timed out closing session"),
                    }

                    let reason = match end {
                        SessionEnd::Cancelled | SessionEnd::ConsumerGone => break,
                        SessionEnd::RemoteClosed { code, reason } => {
                            tracing::info!(feed, ?code, reason = %reason, "Feed closed by remote");
                            format!("closed by remote (code {code:?}): {reason}")
                        }
                        SessionEnd::Ended => {
                            tracing::info!(feed, "Feed stream ended");
                            "stream ended".to_string()
                        }
                        SessionEnd::Failed(e) => {
                            tracing::warn!(feed, error = %e, "Feed connection error");
                            metrics::record_connection_failure(feed);
                            e.to_string()
                        }
                    };
                    diagnostics.emit(FeedDiagnostic::Disconnected { reason });
                }
                Err(e) => {
                    tracing::warn!(feed, url = %url, error = %e, "Feed connection failed");
                    metrics::record_connection_failure(feed);
                    diagnostics.emit(FeedDiagnostic::Disconnected {
                        reason: e.to_string(),
                    });
                }
            }

            if events.is_closed() {
                break;
            }

            let delay = policy.next_delay();
            let attempt = policy.attempt_count();
            tracing::info!(
                feed,
                attempt,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "Reconnecting to feed"
            );
            metrics::record_reconnect(feed);
            diagnostics.emit(FeedDiagnostic::Reconnecting { attempt, delay });

            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(delay) => {}
            }
        }

        tracing::debug!(feed, "Feed listener stopped");
    }

    async fn stream_session(
        &self,
        session: &mut T::Session,
        events: &mpsc::Sender<D::Event>,
        diagnostics: &DiagnosticsSender,
        cancel: &CancellationToken,
    ) -> SessionEnd {
        let feed = self.feed;

        loop {
            let frame = tokio::select! {
                biased;
                () = cancel.cancelled() => return SessionEnd::Cancelled,
                frame = session.next_frame() => frame,
            };

            let text = match frame {
                Some(Ok(Frame::Text(text))) => text,
                Some(Ok(Frame::Close { code, reason })) => {
                    return SessionEnd::RemoteClosed { code, reason };
                }
                Some(Err(e)) => return SessionEnd::Failed(e),
                None => return SessionEnd::Ended,
            };

            let event = match self.decoder.decode(&text) {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!(feed, error = %e, len = text.len(), "Discarding undecodable message");
                    metrics::record_decode_failure(feed);
                    diagnostics.emit(FeedDiagnostic::DecodeFailed {
                        error: e.to_string(),
                    });
                    continue;
                }
            };
            metrics::record_message_decoded(feed);

            tokio::select! {
                biased;
                () = cancel.cancelled() => return SessionEnd::Cancelled,
                sent = events.send(event) => {
                    if sent.is_err() {
                        return SessionEnd::ConsumerGone;
                    }
                }
            }
        }
    }
}

impl<T: Transport, D: Decoder> std::fmt::Debug for StreamListener<T, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamListener")
            .field("endpoint", &self.endpoint)
            .field("reconnect", &self.reconnect)
            .field("feed", &self.feed)
            .finish_non_exhaustive()
    }
}
