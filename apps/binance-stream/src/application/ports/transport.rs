use async_trait::async_trait;
use thiserror::Error;

/// Inbound frame surfaced by a transport session.
///
/// Control frames other than close (ping, pong) are handled inside the
/// transport and never reach the listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// UTF-8 text message.
    Text(String),
    /// Close notification from the far end.
    Close {
        /// Close code, if one was sent
        code: Option<u16>,
        /// Close reason (may be empty)
        reason: String,
    },
}

/// Transport failure during handshake or mid-stream.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Handshake failed (DNS, TCP, TLS, HTTP upgrade refused).
    #[error("connection failed: {0}")]
    Connect(String),

    /// Error on an established connection.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// No handshake within the configured timeout.
    #[error("connection timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// Factory for duplex text-message sessions.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Session handle produced per connection.
    type Session: TransportSession;

    /// Open a session to `url`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the handshake fails.
    async fn connect(&self, url: &str) -> Result<Self::Session, TransportError>;
}

/// One open duplex connection.
#[async_trait]
pub trait TransportSession: Send + 'static {
    /// Wait for the next inbound frame.
    ///
    /// Returns `None` once the underlying stream has ended. Must be safe to
    /// drop mid-await without losing an already-received frame.
    async fn next_frame(&mut self) -> Option<Result<Frame, TransportError>>;

    /// Close the connection.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the close handshake fails. Callers
    /// treat this as best-effort.
    async fn close(&mut self) -> Result<(), TransportError>;
}
