//! Order book events: incremental diffs (`<symbol>@depth`) and top-N
//! snapshots (`<symbol>@depth<level>`).

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::parse_decimal;

// =============================================================================
// Price Levels
// =============================================================================

/// One side-of-book entry.
///
/// On the wire a level is a two-element array `["price", "quantity"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)")]
pub struct PriceLevel {
    /// Price
    pub price: String,
    /// Quantity at this price ("0" removes the level)
    pub quantity: String,
}

impl From<(String, String)> for PriceLevel {
    fn from((price, quantity): (String, String)) -> Self {
        Self { price, quantity }
    }
}

impl PriceLevel {
    /// Price as a decimal.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange sent a non-numeric price.
    pub fn price_decimal(&self) -> Result<Decimal, rust_decimal::Error> {
        parse_decimal(&self.price)
    }

    /// Quantity as a decimal.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange sent a non-numeric quantity.
    pub fn quantity_decimal(&self) -> Result<Decimal, rust_decimal::Error> {
        parse_decimal(&self.quantity)
    }

    /// Whether this level deletes the price from the book.
    #[must_use]
    pub fn is_removal(&self) -> bool {
        self.quantity_decimal().is_ok_and(|q| q.is_zero())
    }
}

// =============================================================================
// Depth Diff
// =============================================================================

/// Incremental order book update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct DepthUpdate {
    /// Event type (always "depthUpdate")
    #[serde(rename(deserialize = "e"))]
    pub event_type: String,

    /// Event time (ms since epoch)
    #[serde(rename(deserialize = "E"))]
    pub event_time: u64,

    /// Symbol
    #[serde(rename(deserialize = "s"))]
    pub symbol: String,

    /// First update ID in this event
    #[serde(rename(deserialize = "U"))]
    pub first_update_id: u64,

    /// Final update ID in this event
    #[serde(rename(deserialize = "u"))]
    pub final_update_id: u64,

    /// Bid levels to update
    #[serde(rename(deserialize = "b"))]
    pub bid_depth: Vec<PriceLevel>,

    /// Ask levels to update
    #[serde(rename(deserialize = "a"))]
    pub ask_depth: Vec<PriceLevel>,
}

// =============================================================================
// Partial Depth Snapshot
// =============================================================================

/// Number of levels in a partial book snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "u8")]
pub enum PartialDepthLevel {
    /// Top 5 levels
    Five,
    /// Top 10 levels
    Ten,
    /// Top 20 levels
    Twenty,
}

impl PartialDepthLevel {
    /// Numeric level as used in the stream name.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Five => 5,
            Self::Ten => 10,
            Self::Twenty => 20,
        }
    }

    /// Parse a numeric level. Only 5, 10 and 20 are offered by the exchange.
    #[must_use]
    pub const fn from_u8(level: u8) -> Option<Self> {
        match level {
            5 => Some(Self::Five),
            10 => Some(Self::Ten),
            20 => Some(Self::Twenty),
            _ => None,
        }
    }
}

impl From<PartialDepthLevel> for u8 {
    fn from(level: PartialDepthLevel) -> Self {
        level.as_u8()
    }
}

impl fmt::Display for PartialDepthLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// Top-N order book snapshot.
///
/// The wire payload carries only `lastUpdateId`, `bids` and `asks`;
/// `symbol` and `level` are filled in from the feed the socket was
/// opened for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialDepth {
    /// Symbol the feed was opened for
    pub symbol: String,
    /// Requested number of levels
    pub level: PartialDepthLevel,
    /// Last update ID
    pub last_update_id: u64,
    /// Best bids, highest first
    pub bids: Vec<PriceLevel>,
    /// Best asks, lowest first
    pub asks: Vec<PriceLevel>,
}

impl PartialDepth {
    /// Best bid, if any.
    #[must_use]
    pub fn best_bid(&self) -> Option<&PriceLevel> {
        self.bids.first()
    }

    /// Best ask, if any.
    #[must_use]
    pub fn best_ask(&self) -> Option<&PriceLevel> {
        self.asks.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_depth_update() {
        let json = r#"{"e":"depthUpdate","E":123456789,"s":"BNBBTC","U":157,"u":160,"b":[["0.0024","10"]],"a":[["0.0026","100"],["0.0027","0"]]}"#;
        let update: DepthUpdate = serde_json::from_str(json).unwrap();

        assert_eq!(update.first_update_id, 157);
        assert_eq!(update.final_update_id, 160);
        assert_eq!(
            update.bid_depth,
            vec![PriceLevel {
                price: "0.0024".to_string(),
                quantity: "10".to_string()
            }]
        );
        assert_eq!(update.ask_depth.len(), 2);
        assert!(!update.ask_depth[0].is_removal());
        assert!(update.ask_depth[1].is_removal());
    }

    #[test]
    fn test_price_level_serializes_as_object() {
        let level = PriceLevel::from(("1.5".to_string(), "2".to_string()));
        let value = serde_json::to_value(&level).unwrap();
        assert_eq!(value["price"], "1.5");
        assert_eq!(value["quantity"], "2");
    }

    #[test]
    fn test_price_level_rejects_short_pair() {
        assert!(serde_json::from_str::<PriceLevel>(r#"["1.5"]"#).is_err());
    }

    #[test]
    fn test_partial_depth_level_values() {
        for level in [
            PartialDepthLevel::Five,
            PartialDepthLevel::Ten,
            PartialDepthLevel::Twenty,
        ] {
            assert_eq!(PartialDepthLevel::from_u8(level.as_u8()), Some(level));
        }
        assert_eq!(PartialDepthLevel::from_u8(15), None);
        assert_eq!(serde_json::to_value(PartialDepthLevel::Ten).unwrap(), 10);
    }
}
