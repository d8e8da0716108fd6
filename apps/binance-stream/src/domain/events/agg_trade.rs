//! Aggregated trade events (`<symbol>@aggTrade`).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::parse_decimal;

/// Trades that filled at the same price from the same taker order,
/// aggregated into one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct AggTrade {
    /// Event type (always "aggTrade")
    #[serde(rename(deserialize = "e"))]
    pub event_type: String,

    /// Event time (ms since epoch)
    #[serde(rename(deserialize = "E"))]
    pub event_time: u64,

    /// Trade time (ms since epoch)
    #[serde(rename(deserialize = "T"))]
    pub timestamp: u64,

    /// Symbol
    #[serde(rename(deserialize = "s"))]
    pub symbol: String,

    /// Price
    #[serde(rename(deserialize = "p"))]
    pub price: String,

    /// Quantity
    #[serde(rename(deserialize = "q"))]
    pub quantity: String,

    /// Whether the buyer was the maker
    #[serde(rename(deserialize = "m"))]
    pub is_buyer_maker: bool,

    /// Whether the trade was the best price match
    #[serde(rename(deserialize = "M"))]
    pub was_best_price: bool,

    /// Aggregate trade ID
    #[serde(rename(deserialize = "a"))]
    pub agg_id: u64,

    /// First trade ID in the aggregate
    #[serde(rename(deserialize = "f"))]
    pub first_id: u64,

    /// Last trade ID in the aggregate
    #[serde(rename(deserialize = "l"))]
    pub last_id: u64,
}

impl AggTrade {
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

    /// Number of raw trades folded into this aggregate.
    #[must_use]
    pub const fn trade_count(&self) -> u64 {
        self.last_id.saturating_sub(self.first_id) + 1
    }
}
