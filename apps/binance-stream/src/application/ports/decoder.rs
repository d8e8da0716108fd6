use thiserror::Error;

/// Decoder failure for a single wire message.
///
/// A decode failure discards that one message; it never ends the session.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Not valid JSON, or JSON that does not match the event shape.
    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    /// Valid JSON with a structure the decoder cannot interpret.
    #[error("invalid message format: {0}")]
    InvalidFormat(String),
}

/// Pure mapping from one raw text message to one typed event.
///
/// Per-feed context the payload omits (e.g. the requested depth level)
/// lives in the implementing type, set when the feed is instantiated.
/// Implementations must be deterministic and free of side effects.
pub trait Decoder: Send + Sync + 'static {
    /// Event produced per message.
    type Event: Send + 'static;

    /// Decode one message.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] for malformed input.
    fn decode(&self, text: &str) -> Result<Self::Event, DecodeError>;
}
