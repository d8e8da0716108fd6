//! Stream Decoders
//!
//! One [`Decoder`] per Binance feed type. Feeds whose payload maps
//! one-to-one onto an event record share [`JsonDecoder`]; the partial depth
//! and user feeds need per-feed context or dispatch and get their own
//! types.
//!
//! All decoders expect a single JSON value per text frame (raw streams,
//! not the combined `{"stream":..,"data":..}` envelope).

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::application::ports::{DecodeError, Decoder};
use crate::domain::events::{
    ACCOUNT_POSITION, AggTrade, BALANCE_UPDATE, Candle, DepthUpdate, EXECUTION_REPORT,
    LISTEN_KEY_EXPIRED, PartialDepth, PartialDepthLevel, PriceLevel, Ticker, Trade, UserEvent,
};

/// Longest payload excerpt quoted in error messages.
const EXCERPT_CHARS: usize = 50;

fn excerpt(text: &str) -> String {
    text.trim().chars().take(EXCERPT_CHARS).collect()
}

// =============================================================================
// Plain JSON Decoders
// =============================================================================

/// Decoder for feeds whose payload deserializes straight into `T`.
pub struct JsonDecoder<T>(PhantomData<fn() -> T>);

impl<T> JsonDecoder<T> {
    /// Create a new JSON decoder.
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for JsonDecoder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonDecoder<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for JsonDecoder<T> {}

impl<T> fmt::Debug for JsonDecoder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JsonDecoder<{}>", std::any::type_name::<T>())
    }
}

impl<T> Decoder for JsonDecoder<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Event = T;

    fn decode(&self, text: &str) -> Result<T, DecodeError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Decoder for `<symbol>@trade`.
pub type TradeDecoder = JsonDecoder<Trade>;
/// Decoder for `<symbol>@aggTrade`.
pub type AggTradeDecoder = JsonDecoder<AggTrade>;
/// Decoder for `<symbol>@depth`.
pub type DepthDecoder = JsonDecoder<DepthUpdate>;
/// Decoder for `<symbol>@ticker`.
pub type TickerDecoder = JsonDecoder<Ticker>;
/// Decoder for `!ticker@arr`.
pub type AllTickersDecoder = JsonDecoder<Vec<Ticker>>;
/// Decoder for `<symbol>@kline_<interval>`.
pub type CandleDecoder = JsonDecoder<Candle>;

// =============================================================================
// Partial Depth
// =============================================================================

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPartialDepth {
    last_update_id: u64,
    bids: Vec<PriceLevel>,
    asks: Vec<PriceLevel>,
}

/// Decoder for `<symbol>@depth<level>`.
///
/// The snapshot payload omits the symbol and level, so both are taken from
/// the feed the decoder was created for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialDepthDecoder {
    symbol: String,
    level: PartialDepthLevel,
}

impl PartialDepthDecoder {
    /// Create a decoder for one symbol and level.
    pub fn new(symbol: impl Into<String>, level: PartialDepthLevel) -> Self {
        Self {
            symbol: symbol.into(),
            level,
        }
    }
}

impl Decoder for PartialDepthDecoder {
    type Event = PartialDepth;

    fn decode(&self, text: &str) -> Result<PartialDepth, DecodeError> {
        let raw: RawPartialDepth = serde_json::from_str(text)?;
        Ok(PartialDepth {
            symbol: self.symbol.clone(),
            level: self.level,
            last_update_id: raw.last_update_id,
            bids: raw.bids,
            asks: raw.asks,
        })
    }
}

// =============================================================================
// User Data Stream
// =============================================================================

/// Decoder for the user data stream, dispatching on the `e` field.
#[derive(Debug, Default, Clone, Copy)]
pub struct UserEventDecoder;

impl UserEventDecoder {
    /// Create a new user event decoder.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Decoder for UserEventDecoder {
    type Event = UserEvent;

    fn decode(&self, text: &str) -> Result<UserEvent, DecodeError> {
        let value: Value = serde_json::from_str(text)?;

        let Some(event_type) = value.get("e").and_then(Value::as_str) else {
            return Err(DecodeError::InvalidFormat(format!(
                "missing event type: {}...",
                excerpt(text)
            )));
        };

        let event = match event_type {
            ACCOUNT_POSITION => UserEvent::AccountPosition(serde_json::from_value(value)?),
            BALANCE_UPDATE => UserEvent::BalanceUpdate(serde_json::from_value(value)?),
            EXECUTION_REPORT => UserEvent::ExecutionReport(Box::new(serde_json::from_value(value)?)),
            LISTEN_KEY_EXPIRED => UserEvent::ListenKeyExpired(serde_json::from_value(value)?),
            other => {
                tracing::debug!(event_type = other, "Unmodelled user event");
                UserEvent::Other {
                    event_type: other.to_string(),
                    payload: value,
                }
            }
        };

        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TRADE_JSON: &str = r#"{"e":"trade","E":123,"T":124,"s":"BTCUSDT","p":"1.0","q":"2.0","m":true,"M":false,"t":1,"a":2,"b":3}"#;

    #[test]
    fn trade_decoder_maps_every_field() {
        let trade = TradeDecoder::new().decode(TRADE_JSON).unwrap();

        assert_eq!(trade.event_type, "trade");
        assert_eq!(trade.event_time, 123);
        assert_eq!(trade.trade_time, 124);
        assert_eq!(trade.symbol, "BTCUSDT");
        assert_eq!(trade.price, "1.0");
        assert_eq!(trade.quantity, "2.0");
        assert!(trade.is_buyer_maker);
        assert!(!trade.maker);
        assert_eq!(trade.trade_id, 1);
        assert_eq!(trade.seller_order_id, 2);
        assert_eq!(trade.buyer_order_id, 3);
    }

    #[test]
    fn malformed_input_is_a_decode_error() {
        let decoder = TradeDecoder::new();
        assert!(matches!(decoder.decode("not json"), Err(DecodeError::Json(_))));
        assert!(matches!(decoder.decode("[]"), Err(DecodeError::Json(_))));
        assert!(matches!(
            decoder.decode(r#"{"e":"trade","E":123}"#),
            Err(DecodeError::Json(_))
        ));
    }

    #[test]
    fn prices_stay_exact_strings() {
        let json = TRADE_JSON.replace(r#""p":"1.0""#, r#""p":"0.12345678901234567890""#);
        let trade = TradeDecoder::new().decode(&json).unwrap();
        assert_eq!(trade.price, "0.12345678901234567890");
    }

    #[test]
    fn partial_depth_takes_symbol_and_level_from_context() {
        let decoder = PartialDepthDecoder::new("BNBBTC", PartialDepthLevel::Five);
        let json = r#"{"lastUpdateId":160,"bids":[["0.0024","10"]],"asks":[["0.0026","100"]]}"#;

        let depth = decoder.decode(json).unwrap();

        assert_eq!(depth.symbol, "BNBBTC");
        assert_eq!(depth.level, PartialDepthLevel::Five);
        assert_eq!(depth.last_update_id, 160);
        assert_eq!(depth.best_bid().unwrap().price, "0.0024");
        assert_eq!(depth.best_ask().unwrap().quantity, "100");
    }

    #[test]
    fn all_tickers_decodes_array() {
        let decoder = AllTickersDecoder::new();
        assert!(decoder.decode("[]").unwrap().is_empty());
        assert!(decoder.decode("{}").is_err());
    }

    #[test]
    fn user_decoder_dispatches_account_position() {
        let json = r#"{"e":"outboundAccountPosition","E":1564034571105,"u":1564034571073,"B":[{"a":"ETH","f":"10000.000000","l":"0.000000"}]}"#;

        let event = UserEventDecoder::new().decode(json).unwrap();

        let UserEvent::AccountPosition(position) = &event else {
            panic!("expected account position, got {event:?}");
        };
        assert_eq!(position.last_update_time, 1_564_034_571_073);
        assert_eq!(position.balance("ETH").unwrap().free, "10000.000000");
        assert_eq!(event.event_type(), "outboundAccountPosition");
    }

    #[test]
    fn user_decoder_dispatches_balance_update() {
        let json = r#"{"e":"balanceUpdate","E":1573200697110,"a":"BTC","d":"100.00000000","T":1573200697068}"#;

        let event = UserEventDecoder::new().decode(json).unwrap();

        assert_eq!(
            event,
            UserEvent::BalanceUpdate(crate::domain::events::BalanceUpdate {
                event_time: 1_573_200_697_110,
                asset: "BTC".to_string(),
                delta: "100.00000000".to_string(),
                clear_time: 1_573_200_697_068,
            })
        );
    }

    #[test]
    fn user_decoder_dispatches_execution_report() {
        let json = r#"{"e":"executionReport","E":1499405658658,"s":"ETHBTC","c":"mUvoqJxFIILMdfAW5iGSOW","S":"BUY","o":"LIMIT","f":"GTC","q":"1.00000000","p":"0.10264410","P":"0.00000000","F":"0.00000000","g":-1,"C":"","x":"NEW","X":"NEW","r":"NONE","i":4293153,"l":"0.00000000","z":"0.00000000","L":"0.00000000","n":"0","N":null,"T":1499405658657,"t":-1,"I":8641984,"w":true,"m":false,"M":false,"O":1499405658657,"Z":"0.00000000","Y":"0.00000000","Q":"0.00000000"}"#;

        let event = UserEventDecoder::new().decode(json).unwrap();

        let UserEvent::ExecutionReport(report) = event else {
            panic!("expected execution report");
        };
        assert_eq!(report.symbol, "ETHBTC");
        assert_eq!(report.order_id, 4_293_153);
        assert_eq!(report.trade_id, -1);
        assert_eq!(report.commission_asset, None);
        assert!(!report.is_fill());
    }

    #[test]
    fn user_decoder_dispatches_listen_key_expired() {
        let json = r#"{"e":"listenKeyExpired","E":1576653824250,"listenKey":"OfYGbUzi3PraNagEkdKuFwUHn48brFsItTdsuiIXrucEvD0rhRXZ7I6URWfE8YE8"}"#;

        let event = UserEventDecoder::new().decode(json).unwrap();

        assert!(matches!(event, UserEvent::ListenKeyExpired(ref e) if e.event_time == 1_576_653_824_250));
    }

    #[test]
    fn user_decoder_passes_through_unknown_events() {
        let json = r#"{"e":"externalLockUpdate","E":1581557507324,"a":"NEO","d":"10.00000000","T":1581557507268}"#;

        let event = UserEventDecoder::new().decode(json).unwrap();

        let UserEvent::Other { event_type, payload } = event else {
            panic!("expected passthrough");
        };
        assert_eq!(event_type, "externalLockUpdate");
        assert_eq!(payload["a"], "NEO");
    }

    #[test]
    fn user_decoder_rejects_missing_event_type() {
        let result = UserEventDecoder::new().decode(r#"{"E":1,"a":"BTC"}"#);
        assert!(matches!(result, Err(DecodeError::InvalidFormat(_))));
    }

    #[test]
    fn user_decoder_rejects_known_type_with_wrong_shape() {
        let result = UserEventDecoder::new().decode(r#"{"e":"balanceUpdate","E":1}"#);
        assert!(matches!(result, Err(DecodeError::Json(_))));
    }

    fn trade_json(event_time: u64, price: &str, quantity: &str, maker: bool, id: u64) -> String {
        format!(
            r#"{{"e":"trade","E":{event_time},"T":{event_time},"s":"BTCUSDT","p":"{price}","q":"{quantity}","m":{maker},"M":true,"t":{id},"a":{id},"b":{id}}}"#
        )
    }

    proptest! {
        #[test]
        fn trade_decoding_is_deterministic(
            event_time in any::<u64>(),
            price in "[0-9]{1,8}\\.[0-9]{1,8}",
            quantity in "[0-9]{1,8}\\.[0-9]{1,8}",
            maker in any::<bool>(),
            id in any::<u64>(),
        ) {
            let json = trade_json(event_time, &price, &quantity, maker, id);
            let decoder = TradeDecoder::new();

            let first = decoder.decode(&json).unwrap();
            let second = decoder.decode(&json).unwrap();

            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.event_time, event_time);
            prop_assert_eq!(first.price, price);
            prop_assert_eq!(first.trade_id, id);
        }

        #[test]
        fn arbitrary_text_never_panics(text in "\\PC*") {
            let _ = TradeDecoder::new().decode(&text);
            let _ = UserEventDecoder::new().decode(&text);
            let _ = PartialDepthDecoder::new("X", PartialDepthLevel::Ten).decode(&text);
        }
    }
}
