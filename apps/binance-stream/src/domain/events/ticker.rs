//! Rolling 24h ticker events (`<symbol>@ticker`, `!ticker@arr`).

use serde::{Deserialize, Serialize};

/// 24-hour rolling window statistics for one symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct Ticker {
    /// Event type (always "24hrTicker")
    #[serde(rename(deserialize = "e"))]
    pub event_type: String,

    /// Event time (ms since epoch)
    #[serde(rename(deserialize = "E"))]
    pub event_time: u64,

    /// Symbol
    #[serde(rename(deserialize = "s"))]
    pub symbol: String,

    /// Absolute price change
    #[serde(rename(deserialize = "p"))]
    pub price_change: String,

    /// Relative price change in percent
    #[serde(rename(deserialize = "P"))]
    pub price_change_percent: String,

    /// Weighted average price
    #[serde(rename(deserialize = "w"))]
    pub weighted_avg: String,

    /// First trade before the window (previous close)
    #[serde(rename(deserialize = "x"))]
    pub prev_day_close: String,

    /// Last price
    #[serde(rename(deserialize = "c"))]
    pub cur_day_close: String,

    /// Last quantity
    #[serde(rename(deserialize = "Q"))]
    pub close_trade_quantity: String,

    /// Best bid price
    #[serde(rename(deserialize = "b"))]
    pub best_bid: String,

    /// Best bid quantity
    #[serde(rename(serialize = "bestBidQnt", deserialize = "B"))]
    pub best_bid_quantity: String,

    /// Best ask price
    #[serde(rename(deserialize = "a"))]
    pub best_ask: String,

    /// Best ask quantity
    #[serde(rename(serialize = "bestAskQnt", deserialize = "A"))]
    pub best_ask_quantity: String,

    /// Open price
    #[serde(rename(deserialize = "o"))]
    pub open: String,

    /// High price
    #[serde(rename(deserialize = "h"))]
    pub high: String,

    /// Low price
    #[serde(rename(deserialize = "l"))]
    pub low: String,

    /// Base asset volume
    #[serde(rename(deserialize = "v"))]
    pub volume: String,

    /// Quote asset volume
    #[serde(rename(deserialize = "q"))]
    pub volume_quote: String,

    /// Window open time (ms since epoch)
    #[serde(rename(deserialize = "O"))]
    pub open_time: u64,

    /// Window close time (ms since epoch)
    #[serde(rename(deserialize = "C"))]
    pub close_time: u64,

    /// First trade ID
    #[serde(rename(deserialize = "F"))]
    pub first_trade_id: i64,

    /// Last trade ID
    #[serde(rename(deserialize = "L"))]
    pub last_trade_id: i64,

    /// Number of trades in the window
    #[serde(rename(deserialize = "n"))]
    pub total_trades: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICKER_JSON: &str = r#"{"e":"24hrTicker","E":123456789,"s":"BNBBTC","p":"0.0015","P":"250.00","w":"0.0018","x":"0.0009","c":"0.0025","Q":"10","b":"0.0024","B":"10","a":"0.0026","A":"100","o":"0.0010","h":"0.0025","l":"0.0010","v":"10000","q":"18","O":0,"C":86400000,"F":0,"L":18150,"n":18151}"#;

    #[test]
    fn test_deserialize_ticker() {
        let ticker: Ticker = serde_json::from_str(TICKER_JSON).unwrap();
        assert_eq!(ticker.event_type, "24hrTicker");
        assert_eq!(ticker.symbol, "BNBBTC");
        assert_eq!(ticker.price_change_percent, "250.00");
        assert_eq!(ticker.best_ask, "0.0026");
        assert_eq!(ticker.close_time, 86_400_000);
        assert_eq!(ticker.last_trade_id, 18150);
        assert_eq!(ticker.total_trades, 18151);
    }

    #[test]
    fn test_deserialize_ticker_array() {
        let json = format!("[{TICKER_JSON},{TICKER_JSON}]");
        let tickers: Vec<Ticker> = serde_json::from_str(&json).unwrap();
        assert_eq!(tickers.len(), 2);
    }

    #[test]
    fn test_serialize_ticker_field_names() {
        let ticker: Ticker = serde_json::from_str(TICKER_JSON).unwrap();
        let value = serde_json::to_value(&ticker).unwrap();
        let object = value.as_object().unwrap();

        for key in [
            "eventType",
            "eventTime",
            "symbol",
            "priceChange",
            "priceChangePercent",
            "weightedAvg",
            "prevDayClose",
            "curDayClose",
            "closeTradeQuantity",
            "bestBid",
            "bestBidQnt",
            "bestAsk",
            "bestAskQnt",
            "open",
            "high",
            "low",
            "volume",
            "volumeQuote",
            "openTime",
            "closeTime",
            "firstTradeId",
            "lastTradeId",
            "totalTrades",
        ] {
            assert!(object.contains_key(key), "missing {key}");
        }
        assert_eq!(object.len(), 23);
        assert_eq!(object["bestBidQnt"], "10");
        assert_eq!(object["bestAskQnt"], "100");
        assert_eq!(object["prevDayClose"], "0.0009");
    }
}
