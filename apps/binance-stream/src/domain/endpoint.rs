//! Feed Endpoint Descriptors
//!
//! A [`FeedEndpoint`] is the immutable `{base, stream path}` pair a listener
//! connects to. Market feeds use `{base}/{symbol}@{suffix}`; the user feed
//! uses `{base}/{listenKey}`.

use std::fmt;

use super::token::FeedToken;

/// Immutable descriptor of one feed connection target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeedEndpoint {
    base: String,
    path: String,
}

impl FeedEndpoint {
    /// Create an endpoint from a base URL and a stream path.
    pub fn new(base: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            path: path.into(),
        }
    }

    /// Endpoint for a per-symbol market stream: `{base}/{symbol}@{suffix}`.
    ///
    /// The exchange only accepts lower-case symbols in stream names.
    pub fn market(base: impl Into<String>, symbol: &str, suffix: &str) -> Self {
        Self::new(base, format!("{}@{suffix}", symbol.to_lowercase()))
    }

    /// Endpoint for the authenticated user stream: `{base}/{listenKey}`.
    pub fn user(base: impl Into<String>, token: &FeedToken) -> Self {
        Self::new(base, token.as_str())
    }

    /// Base URL.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Stream path below the base.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Resolved connection URL.
    #[must_use]
    pub fn url(&self) -> String {
        format!("{}/{}", self.base.trim_end_matches('/'), self.path)
    }
}

impl fmt::Display for FeedEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "wss://stream.binance.com:9443/ws";

    #[test]
    fn market_endpoint_lowercases_symbol() {
        let endpoint = FeedEndpoint::market(BASE, "BTCUSDT", "trade");
        assert_eq!(endpoint.path(), "btcusdt@trade");
        assert_eq!(endpoint.url(), format!("{BASE}/btcusdt@trade"));
    }

    #[test]
    fn user_endpoint_uses_token_verbatim() {
        let token = FeedToken::new("pqia91ma19a5s61cv6a81va65sdf19v8a65a1a5s61cv6a81va65sdf19v8a65a1");
        let endpoint = FeedEndpoint::user(BASE, &token);
        assert_eq!(endpoint.url(), format!("{BASE}/{}", token.as_str()));
    }

    #[test]
    fn trailing_slash_on_base_is_ignored() {
        let endpoint = FeedEndpoint::market(format!("{BASE}/"), "ethbtc", "ticker");
        assert_eq!(endpoint.url(), format!("{BASE}/ethbtc@ticker"));
    }
}
