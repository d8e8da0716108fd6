//! Raw trade events (`<symbol>@trade`).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::parse_decimal;

/// A single executed trade.
///
/// # Wire Format (JSON)
/// ```json
/// {"e":"trade","E":123,"T":124,"s":"BTCUSDT","p":"1.0","q":"2.0",
///  "m":true,"M":false,"t":1,"a":2,"b":3}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct Trade {
    /// Event type (always "trade")
    #[serde(rename(deserialize = "e"))]
    pub event_type: String,

    /// Event time (ms since epoch)
    #[serde(rename(deserialize = "E"))]
    pub event_time: u64,

    /// Trade time (ms since epoch)
    #[serde(rename(deserialize = "T"))]
    pub trade_time: u64,

    /// Symbol, upper case as sent by the exchange
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

    /// Ignored by the exchange; carried through unchanged
    #[serde(rename(deserialize = "M"))]
    pub maker: bool,

    /// Trade ID
    #[serde(rename(deserialize = "t"))]
    pub trade_id: u64,

    /// Seller order ID
    #[serde(rename(deserialize = "a"))]
    pub seller_order_id: u64,

    /// Buyer order ID
    #[serde(rename(deserialize = "b"))]
    pub buyer_order_id: u64,
}

impl Trade {
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
}
