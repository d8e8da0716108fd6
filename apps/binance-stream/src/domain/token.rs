//! Feed token (listen key) for the authenticated user stream.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque credential that opens the user data stream.
///
/// Obtained once from the REST API, then kept alive with periodic
/// refresh calls. It is never regenerated while a feed is running.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedToken(String);

impl FeedToken {
    /// Wrap a listen key.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw listen key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for FeedToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}
