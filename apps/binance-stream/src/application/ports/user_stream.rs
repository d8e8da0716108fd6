use async_trait::async_trait;
use thiserror::Error;

use crate::domain::token::FeedToken;

/// Failure reported by the REST collaborator.
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    /// The exchange rejected the request with its own error body.
    #[error("API error (HTTP {status}, code {code}): {message}")]
    Api {
        /// HTTP status
        status: u16,
        /// Exchange error code
        code: i64,
        /// Exchange error message
        message: String,
    },

    /// Non-success response whose body is not an exchange error, usually
    /// from a proxy or gateway in front of the exchange.
    #[error("proxy error (HTTP {status}): {body}")]
    Proxy {
        /// HTTP status
        status: u16,
        /// Raw response body
        body: String,
    },

    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// Success response with an unexpected body.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The call needs an API key the client was not given.
    #[error("missing API credentials")]
    MissingCredentials,
}

impl RemoteError {
    /// HTTP status, if a response was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::Proxy { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// REST operations backing the user data stream.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDataStreamApi: Send + Sync + 'static {
    /// Create a listen key.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] on any non-success response.
    async fn acquire_feed_token(&self) -> Result<FeedToken, RemoteError>;

    /// Extend the validity of an existing listen key.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] on any non-success response.
    async fn refresh_feed_token(&self, token: &FeedToken) -> Result<(), RemoteError>;
}
