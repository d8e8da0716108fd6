//! Decoded Event Records
//!
//! Typed records produced from single wire messages, one module per feed
//! type. Wire field names are Binance's single-letter keys; the records
//! serialize back out in camelCase domain names.
//!
//! Prices and quantities are kept as the exact decimal strings the exchange
//! sent. Use the `*_decimal` accessors for arithmetic.

use std::str::FromStr;

use rust_decimal::Decimal;

mod agg_trade;
mod candle;
mod depth;
mod ticker;
mod trade;
mod user;

pub use agg_trade::AggTrade;
pub use candle::Candle;
pub use depth::{DepthUpdate, PartialDepth, PartialDepthLevel, PriceLevel};
pub use ticker::Ticker;
pub use trade::Trade;
pub use user::{
    AccountPosition, Balance, BalanceUpdate, ExecutionReport, ListenKeyExpired, UserEvent,
};
pub(crate) use user::{ACCOUNT_POSITION, BALANCE_UPDATE, EXECUTION_REPORT, LISTEN_KEY_EXPIRED};

/// Parse an exchange decimal string without going through `f64`.
///
/// # Errors
///
/// Returns an error if `value` is not a valid decimal number.
pub fn parse_decimal(value: &str) -> Result<Decimal, rust_decimal::Error> {
    Decimal::from_str(value)
}
