//! Request Signing
//!
//! Binance validates `SIGNED` endpoints byte-for-byte against
//! `HMAC-SHA256(secret, query)`, so the query string must be built exactly
//! as the signature was computed:
//!
//! - parameters in insertion order,
//! - absent (`None`) parameters left out entirely,
//! - keys and values escaped like JavaScript's `encodeURIComponent`,
//! - the lowercase hex digest appended last as `signature`.

use std::fmt;

use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Characters `encodeURIComponent` leaves unescaped besides ASCII
/// alphanumerics.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Insertion-ordered query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryString {
    pairs: Vec<(String, String)>,
}

impl QueryString {
    /// Empty query.
    #[must_use]
    pub const fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Append a parameter.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.pairs.push((key.into(), value.to_string()));
        self
    }

    /// Append a parameter if it has a value.
    #[must_use]
    pub fn param_opt<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.param(key, value),
            None => self,
        }
    }

    /// Whether no parameters were added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Canonical `k1=v1&k2=v2` encoding.
    #[must_use]
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Canonical encoding with `signature=<hex>` appended, where the
    /// signature covers everything before it.
    #[must_use]
    pub fn signed(self, secret: &str) -> String {
        let payload = self.encode();
        let signature = sign(secret, &payload);
        if payload.is_empty() {
            format!("signature={signature}")
        } else {
            format!("{payload}&signature={signature}")
        }
    }
}

impl fmt::Display for QueryString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.pairs.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(
                f,
                "{}={}",
                utf8_percent_encode(key, URI_COMPONENT),
                utf8_percent_encode(value, URI_COMPONENT)
            )?;
        }
        Ok(())
    }
}

/// Lowercase hex HMAC-SHA256 of `payload` under `secret`.
#[must_use]
#[allow(clippy::expect_used)]
pub fn sign(secret: &str, payload: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC-SHA256 accepts keys of any length");
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
