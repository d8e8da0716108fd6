//! User-Feed Coordinator
//!
//! Composes the authenticated user data stream from three parts that share
//! one cancellation token:
//!
//! 1. a listen key acquired over REST before any socket is opened,
//! 2. a [`KeepAliveTask`] refreshing that key on a fixed interval,
//! 3. a [`StreamListener`] connected to `{base}/{listenKey}`.
//!
//! Dropping or closing the returned [`FeedStream`] cancels the token, which
//! stops the listener and the keep-alive task together. The listen key is
//! not deleted on teardown; the exchange expires it.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use super::diagnostics::DiagnosticsSender;
use super::keepalive::{DEFAULT_KEEPALIVE_INTERVAL, KeepAliveTask};
use super::listener::StreamListener;
use super::reconnect::ReconnectConfig;
use super::stream::FeedStream;
use crate::application::ports::{Decoder, RemoteError, Transport, UserDataStreamApi};
use crate::domain::endpoint::FeedEndpoint;

/// Failure to start the user feed.
#[derive(Debug, Error)]
pub enum UserFeedError {
    /// The REST call creating the listen key failed. No connection was
    /// attempted.
    #[error("failed to acquire listen key: {0}")]
    TokenAcquisition(#[source] RemoteError),
}

/// Builder and launcher for the user data stream.
pub struct UserFeed<A: UserDataStreamApi + ?Sized, T: Transport, D: Decoder> {
    api: Arc<A>,
    transport: Arc<T>,
    base: String,
    decoder: D,
    keep_alive_interval: Duration,
    reconnect: ReconnectConfig,
}

impl<A, T, D> UserFeed<A, T, D>
where
    A: UserDataStreamApi + ?Sized,
    T: Transport,
    D: Decoder,
{
    /// Create a coordinator with the default keep-alive interval and
    /// reconnect policy.
    pub fn new(api: Arc<A>, transport: Arc<T>, base: impl Into<String>, decoder: D) -> Self {
        Self {
            api,
            transport,
            base: base.into(),
            decoder,
            keep_alive_interval: DEFAULT_KEEPALIVE_INTERVAL,
            reconnect: ReconnectConfig::default(),
        }
    }

    /// Interval between listen key refreshes.
    #[must_use]
    pub const fn with_keep_alive_interval(mut self, interval: Duration) -> Self {
        self.keep_alive_interval = interval;
        self
    }

    /// Reconnect policy for the socket loop.
    #[must_use]
    pub fn with_reconnect(mut self, reconnect: ReconnectConfig) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// Acquire a listen key, then start the keep-alive task and listener.
    ///
    /// # Errors
    ///
    /// Returns [`UserFeedError::TokenAcquisition`] if the listen key cannot
    /// be created. Nothing is spawned in that case.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub async fn start(self) -> Result<FeedStream<D::Event>, UserFeedError> {
        let token = self
            .api
            .acquire_feed_token()
            .await
            .map_err(UserFeedError::TokenAcquisition)?;
        tracing::info!(
            keep_alive_secs = self.keep_alive_interval.as_secs(),
            "Listen key acquired, starting user feed"
        );

        let cancel = CancellationToken::new();
        let diagnostics = DiagnosticsSender::new();

        let keep_alive = KeepAliveTask::new(
            self.api,
            token.clone(),
            self.keep_alive_interval,
            diagnostics.clone(),
            cancel.clone(),
        );
        let keep_alive_task = tokio::spawn(keep_alive.run());

        let listener = StreamListener::new(
            self.transport,
            FeedEndpoint::user(self.base, &token),
            self.decoder,
        )
        .with_reconnect(self.reconnect)
        .with_feed_label("user");
        let (events, listener_task) = listener.spawn_with(cancel.clone(), diagnostics.clone());

        Ok(FeedStream::new(
            events,
            diagnostics,
            cancel,
            vec![listener_task, keep_alive_task],
        ))
    }
}

impl<A, T, D> std::fmt::Debug for UserFeed<A, T, D>
where
    A: UserDataStreamApi + ?Sized,
    T: Transport,
    D: Decoder,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserFeed")
            .field("base", &self.base)
            .field("keep_alive_interval", &self.keep_alive_interval)
            .field("reconnect", &self.reconnect)
            .finish_non_exhaustive()
    }
}
