//! Keep-Alive Task
//!
//! Refreshes a listen key on a fixed interval while its user feed runs.
//! The task shares the feed's cancellation token: once the token is
//! cancelled no further refresh is started, and a refresh already waiting
//! on the network is abandoned.
//!
//! A failed refresh is logged, reported as a diagnostic and counted; the
//! task keeps running and the next tick tries again. A listen key stays
//! valid for 60 minutes, so with the default 30-minute interval one missed
//! refresh is recoverable.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::diagnostics::{DiagnosticsSender, FeedDiagnostic};
use crate::application::ports::UserDataStreamApi;
use crate::domain::token::FeedToken;
use crate::infrastructure::metrics;

/// Default interval between listen key refreshes.
pub const DEFAULT_KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// Longest accepted refresh interval. Listen keys expire 60 minutes after
/// their last refresh.
pub const MAX_KEEPALIVE_INTERVAL: Duration = Duration::from_secs(59 * 60);

/// Shortest accepted refresh interval.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Periodic listen key refresher.
pub struct KeepAliveTask<A: UserDataStreamApi + ?Sized> {
    api: Arc<A>,
    token: FeedToken,
    interval: Duration,
    diagnostics: DiagnosticsSender,
    cancel: CancellationToken,
}

impl<A: UserDataStreamApi + ?Sized> KeepAliveTask<A> {
    /// Create a keep-alive task.
    #[must_use]
    pub fn new(
        api: Arc<A>,
        token: FeedToken,
        interval: Duration,
        diagnostics: DiagnosticsSender,
        cancel: CancellationToken,
    ) -> Self {
        if interval > MAX_KEEPALIVE_INTERVAL {
            tracing::warn!(
                requested_secs = interval.as_secs(),
                max_secs = MAX_KEEPALIVE_INTERVAL.as_secs(),
                "Keep-alive interval exceeds listen key lifetime, clamping"
            );
        }
        Self {
            api,
            token,
            interval: interval.clamp(MIN_INTERVAL, MAX_KEEPALIVE_INTERVAL),
            diagnostics,
            cancel,
        }
    }

    /// Run until cancelled. The first refresh happens one interval after
    /// start, since the token was just created.
    pub async fn run(self) {
        let now = Instant::now();
        let first = now.checked_add(self.interval).unwrap_or(now);
        let mut ticker = tokio::time::interval_at(first, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            // A tick and a cancellation can become ready together.
            if self.cancel.is_cancelled() {
                break;
            }

            let refreshed = tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                result = self.api.refresh_feed_token(&self.token) => result,
            };

            match refreshed {
                Ok(()) => {
                    tracing::debug!("Listen key refreshed");
                    metrics::record_keepalive(true);
                    self.diagnostics.emit(FeedDiagnostic::KeepAliveRefreshed);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Listen key refresh failed, retrying next interval");
                    metrics::record_keepalive(false);
                    self.diagnostics.emit(FeedDiagnostic::KeepAliveFailed {
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::debug!("Keep-alive task cancelled");
    }
}
