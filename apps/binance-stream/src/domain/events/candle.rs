//! Candlestick events (`<symbol>@kline_<interval>`).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::parse_decimal;
use crate::domain::interval::CandleInterval;

/// One candlestick update, flattened from the nested wire shape.
///
/// # Wire Format (JSON)
/// ```json
/// {"e":"kline","E":123456789,"s":"BNBBTC",
///  "k":{"t":123400000,"T":123460000,"s":"BNBBTC","i":"1m","f":100,"L":200,
///       "o":"0.0010","c":"0.0020","h":"0.0025","l":"0.0015","v":"1000",
///       "n":100,"x":false,"q":"1.0000","V":"500","Q":"0.500","B":"123456"}}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawCandle", rename_all = "camelCase")]
pub struct Candle {
    /// Event type (always "kline")
    pub event_type: String,
    /// Event time (ms since epoch)
    pub event_time: u64,
    /// Symbol
    pub symbol: String,
    /// Candle open time (ms since epoch)
    pub start_time: u64,
    /// Candle close time (ms since epoch)
    pub close_time: u64,
    /// Candle interval
    pub interval: CandleInterval,
    /// First trade ID (-1 when the candle has no trades)
    pub first_trade_id: i64,
    /// Last trade ID (-1 when the candle has no trades)
    pub last_trade_id: i64,
    /// Open price
    pub open: String,
    /// High price
    pub high: String,
    /// Low price
    pub low: String,
    /// Close price
    pub close: String,
    /// Base asset volume
    pub volume: String,
    /// Number of trades
    pub trades: u64,
    /// Whether this candle is closed
    pub is_final: bool,
    /// Quote asset volume
    pub quote_volume: String,
    /// Taker buy base asset volume
    pub buy_volume: String,
    /// Taker buy quote asset volume
    pub quote_buy_volume: String,
}

impl Candle {
    /// Close price as a decimal.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange sent a non-numeric price.
    pub fn close_decimal(&self) -> Result<Decimal, rust_decimal::Error> {
        parse_decimal(&self.close)
    }

    /// Base volume as a decimal.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange sent a non-numeric volume.
    pub fn volume_decimal(&self) -> Result<Decimal, rust_decimal::Error> {
        parse_decimal(&self.volume)
    }
}

#[derive(Deserialize)]
struct RawCandle {
    #[serde(rename = "e")]
    event_type: String,
    #[serde(rename = "E")]
    event_time: u64,
    #[serde(rename = "s")]
    symbol: String,
    #[serde(rename = "k")]
    kline: RawKline,
}

#[derive(Deserialize)]
struct RawKline {
    #[serde(rename = "t")]
    start_time: u64,
    #[serde(rename = "T")]
    close_time: u64,
    #[serde(rename = "i")]
    interval: CandleInterval,
    #[serde(rename = "f")]
    first_trade_id: i64,
    #[serde(rename = "L")]
    last_trade_id: i64,
    #[serde(rename = "o")]
    open: String,
    #[serde(rename = "h")]
    high: String,
    #[serde(rename = "l")]
    low: String,
    #[serde(rename = "c")]
    close: String,
    #[serde(rename = "v")]
    volume: String,
    #[serde(rename = "n")]
    trades: u64,
    #[serde(rename = "x")]
    is_final: bool,
    #[serde(rename = "q")]
    quote_volume: String,
    #[serde(rename = "V")]
    buy_volume: String,
    #[serde(rename = "Q")]
    quote_buy_volume: String,
}

impl From<RawCandle> for Candle {
    fn from(raw: RawCandle) -> Self {
        let k = raw.kline;
        Self {
            event_type: raw.event_type,
            event_time: raw.event_time,
            symbol: raw.symbol,
            start_time: k.start_time,
            close_time: k.close_time,
            interval: k.interval,
            first_trade_id: k.first_trade_id,
            last_trade_id: k.last_trade_id,
            open: k.open,
            high: k.high,
            low: k.low,
            close: k.close,
            volume: k.volume,
            trades: k.trades,
            is_final: k.is_final,
            quote_volume: k.quote_volume,
            buy_volume: k.buy_volume,
            quote_buy_volume: k.quote_buy_volume,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KLINE_JSON: &str = r#"{"e":"kline","E":123456789,"s":"BNBBTC","k":{"t":123400000,"T":123460000,"s":"BNBBTC","i":"1m","f":100,"L":200,"o":"0.0010","c":"0.0020","h":"0.0025","l":"0.0015","v":"1000","n":100,"x":false,"q":"1.0000","V":"500","Q":"0.500","B":"123456"}}"#;

    #[test]
    fn test_deserialize_kline_flattens() {
        let candle: Candle = serde_json::from_str(KLINE_JSON).unwrap();

        assert_eq!(candle.event_type, "kline");
        assert_eq!(candle.symbol, "BNBBTC");
        assert_eq!(candle.start_time, 123_400_000);
        assert_eq!(candle.close_time, 123_460_000);
        assert_eq!(candle.interval, CandleInterval::OneMinute);
        assert_eq!(candle.first_trade_id, 100);
        assert_eq!(candle.high, "0.0025");
        assert_eq!(candle.trades, 100);
        assert!(!candle.is_final);
        assert_eq!(candle.quote_buy_volume, "0.500");
        assert_eq!(candle.close_decimal().unwrap(), Decimal::new(20, 4));
    }

    #[test]
    fn test_serialize_is_flat_camel_case() {
        let candle: Candle = serde_json::from_str(KLINE_JSON).unwrap();
        let value = serde_json::to_value(&candle).unwrap();
        assert_eq!(value["interval"], "1m");
        assert_eq!(value["isFinal"], false);
        assert_eq!(value["quoteBuyVolume"], "0.500");
        assert!(value.get("k").is_none());
    }

    #[test]
    fn test_unknown_interval_is_rejected() {
        let json = KLINE_JSON.replace(r#""i":"1m""#, r#""i":"7m""#);
        assert!(serde_json::from_str::<Candle>(&json).is_err());
    }

    #[test]
    fn test_missing_kline_is_rejected() {
        let json = r#"{"e":"kline","E":123456789,"s":"BNBBTC"}"#;
        assert!(serde_json::from_str::<Candle>(json).is_err());
    }
}
