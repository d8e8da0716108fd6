//! Feed Diagnostics
//!
//! Side channel for everything a feed survives without ending: lost
//! connections, reconnect attempts, undecodable messages and failed
//! keep-alive calls. The event stream itself only ever carries events.

use std::time::Duration;

use tokio::sync::broadcast;

/// Capacity of the diagnostics broadcast channel. Slow subscribers lag
/// and skip older entries rather than blocking the feed.
pub const DIAGNOSTICS_CAPACITY: usize = 64;

/// Non-fatal condition observed by a running feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedDiagnostic {
    /// Handshake succeeded.
    Connected {
        /// Resolved feed URL
        url: String,
    },
    /// Session ended (handshake failure, transport error or remote close).
    Disconnected {
        /// Human-readable cause
        reason: String,
    },
    /// Waiting before the next handshake.
    Reconnecting {
        /// Attempts since the last successful handshake
        attempt: u32,
        /// Delay before the attempt
        delay: Duration,
    },
    /// A message was discarded because it could not be decoded.
    DecodeFailed {
        /// Decoder error
        error: String,
    },
    /// Keep-alive refresh succeeded.
    KeepAliveRefreshed,
    /// Keep-alive refresh failed; the next tick will try again.
    KeepAliveFailed {
        /// REST error
        error: String,
    },
}

/// Sending half shared by the tasks behind one feed.
#[derive(Debug, Clone)]
pub struct DiagnosticsSender(broadcast::Sender<FeedDiagnostic>);

impl Default for DiagnosticsSender {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticsSender {
    /// Create a sender with [`DIAGNOSTICS_CAPACITY`].
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(DIAGNOSTICS_CAPACITY);
        Self(tx)
    }

    /// Publish a diagnostic. Having no subscribers is not an error.
    pub fn emit(&self, diagnostic: FeedDiagnostic) {
        let _ = self.0.send(diagnostic);
    }

    /// Subscribe to diagnostics emitted from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<FeedDiagnostic> {
        self.0.subscribe()
    }
}
