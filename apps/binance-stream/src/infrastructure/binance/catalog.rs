//! Feed Catalog
//!
//! One [`FeedSpec`] per Binance stream type: the stream path below the base
//! URL and the decoder bound to it. [`StreamClient`] turns a spec into a
//! running [`StreamListener`]. Adding a feed type means adding a spec here;
//! the listener itself does not change.
//!
//! | Feed | Path | Event |
//! |------|------|-------|
//! | [`TradeFeed`] | `<symbol>@trade` | [`Trade`] |
//! | [`AggTradeFeed`] | `<symbol>@aggTrade` | [`AggTrade`] |
//! | [`DepthFeed`] | `<symbol>@depth` | [`DepthUpdate`] |
//! | [`PartialDepthFeed`] | `<symbol>@depth<5\|10\|20>` | [`PartialDepth`] |
//! | [`TickerFeed`] | `<symbol>@ticker` | [`Ticker`] |
//! | [`AllTickersFeed`] | `!ticker@arr` | `Vec<Ticker>` |
//! | [`CandleFeed`] | `<symbol>@kline_<interval>` | [`Candle`] |
//! | user | `<listenKey>` | [`UserEvent`] |

use std::sync::Arc;
use std::time::Duration;

use super::codec::{
    AggTradeDecoder, AllTickersDecoder, CandleDecoder, DepthDecoder, PartialDepthDecoder,
    TickerDecoder, TradeDecoder, UserEventDecoder,
};
use super::transport::TungsteniteTransport;
use crate::application::ports::{Decoder, Transport, UserDataStreamApi};
use crate::application::services::{
    FeedStream, ReconnectConfig, StreamListener, UserFeed, UserFeedError,
};
use crate::domain::endpoint::FeedEndpoint;
use crate::domain::events::{
    AggTrade, Candle, DepthUpdate, PartialDepth, PartialDepthLevel, Ticker, Trade, UserEvent,
};
use crate::domain::interval::CandleInterval;

/// Spot stream base URL.
pub const DEFAULT_STREAM_URL: &str = "wss://stream.binance.com:9443/ws";

/// USDⓈ-M futures stream base URL.
pub const FUTURES_STREAM_URL: &str = "wss://fstream.binance.com/ws";

// =============================================================================
// Feed Specs
// =============================================================================

/// Wiring for one feed type.
pub trait FeedSpec {
    /// Decoder bound to this feed.
    type Decoder: Decoder;

    /// Label used in logs and metrics.
    const KIND: &'static str;

    /// Connection target below `base`.
    fn endpoint(&self, base: &str) -> FeedEndpoint;

    /// Decoder for messages on this feed.
    fn decoder(&self) -> Self::Decoder;
}

/// Raw trades for one symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeFeed {
    /// Symbol, any case
    pub symbol: String,
}

impl FeedSpec for TradeFeed {
    type Decoder = TradeDecoder;
    const KIND: &'static str = "trade";

    fn endpoint(&self, base: &str) -> FeedEndpoint {
        FeedEndpoint::market(base, &self.symbol, "trade")
    }

    fn decoder(&self) -> TradeDecoder {
        TradeDecoder::new()
    }
}

/// Aggregated trades for one symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggTradeFeed {
    /// Symbol, any case
    pub symbol: String,
}

impl FeedSpec for AggTradeFeed {
    type Decoder = AggTradeDecoder;
    const KIND: &'static str = "agg_trade";

    fn endpoint(&self, base: &str) -> FeedEndpoint {
        FeedEndpoint::market(base, &self.symbol, "aggTrade")
    }

    fn decoder(&self) -> AggTradeDecoder {
        AggTradeDecoder::new()
    }
}

/// Incremental order book diffs for one symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthFeed {
    /// Symbol, any case
    pub symbol: String,
}

impl FeedSpec for DepthFeed {
    type Decoder = DepthDecoder;
    const KIND: &'static str = "depth";

    fn endpoint(&self, base: &str) -> FeedEndpoint {
        FeedEndpoint::market(base, &self.symbol, "depth")
    }

    fn decoder(&self) -> DepthDecoder {
        DepthDecoder::new()
    }
}

/// Top-N order book snapshots for one symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialDepthFeed {
    /// Symbol, any case
    pub symbol: String,
    /// Number of levels
    pub level: PartialDepthLevel,
}

impl FeedSpec for PartialDepthFeed {
    type Decoder = PartialDepthDecoder;
    const KIND: &'static str = "partial_depth";

    fn endpoint(&self, base: &str) -> FeedEndpoint {
        FeedEndpoint::market(base, &self.symbol, &format!("depth{}", self.level))
    }

    fn decoder(&self) -> PartialDepthDecoder {
        PartialDepthDecoder::new(self.symbol.clone(), self.level)
    }
}

/// 24h rolling ticker for one symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerFeed {
    /// Symbol, any case
    pub symbol: String,
}

impl FeedSpec for TickerFeed {
    type Decoder = TickerDecoder;
    const KIND: &'static str = "ticker";

    fn endpoint(&self, base: &str) -> FeedEndpoint {
        FeedEndpoint::market(base, &self.symbol, "ticker")
    }

    fn decoder(&self) -> TickerDecoder {
        TickerDecoder::new()
    }
}

/// 24h rolling tickers for every symbol that changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllTickersFeed;

impl FeedSpec for AllTickersFeed {
    type Decoder = AllTickersDecoder;
    const KIND: &'static str = "all_tickers";

    fn endpoint(&self, base: &str) -> FeedEndpoint {
        FeedEndpoint::new(base, "!ticker@arr")
    }

    fn decoder(&self) -> AllTickersDecoder {
        AllTickersDecoder::new()
    }
}

/// Candlesticks for one symbol and interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandleFeed {
    /// Symbol, any case
    pub symbol: String,
    /// Candle interval
    pub interval: CandleInterval,
}

impl FeedSpec for CandleFeed {
    type Decoder = CandleDecoder;
    const KIND: &'static str = "candle";

    fn endpoint(&self, base: &str) -> FeedEndpoint {
        FeedEndpoint::market(base, &self.symbol, &format!("kline_{}", self.interval))
    }

    fn decoder(&self) -> CandleDecoder {
        CandleDecoder::new()
    }
}

// =============================================================================
// Stream Client
// =============================================================================

/// Entry point for opening feeds against one stream base URL.
///
/// Every method that returns a [`FeedStream`] spawns tasks and must be
/// called from within a Tokio runtime.
#[derive(Debug, Clone)]
pub struct StreamClient<T: Transport = TungsteniteTransport> {
    base: String,
    transport: Arc<T>,
    reconnect: ReconnectConfig,
}

impl StreamClient<TungsteniteTransport> {
    /// Client over the WebSocket transport.
    pub fn new(base: impl Into<String>) -> Self {
        Self::with_transport(base, Arc::new(TungsteniteTransport::default()))
    }
}

impl Default for StreamClient<TungsteniteTransport> {
    fn default() -> Self {
        Self::new(DEFAULT_STREAM_URL)
    }
}

impl<T: Transport> StreamClient<T> {
    /// Client over a custom transport.
    pub fn with_transport(base: impl Into<String>, transport: Arc<T>) -> Self {
        Self {
            base: base.into(),
            transport,
            reconnect: ReconnectConfig::default(),
        }
    }

    /// Reconnect policy applied to every feed opened from now on.
    #[must_use]
    pub fn with_reconnect(mut self, reconnect: ReconnectConfig) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// Base URL.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Resolve the endpoint for a feed without opening it.
    #[must_use]
    pub fn endpoint<F: FeedSpec>(&self, spec: &F) -> FeedEndpoint {
        spec.endpoint(&self.base)
    }

    /// Open any catalogued feed.
    #[must_use]
    pub fn feed<F: FeedSpec>(&self, spec: &F) -> FeedStream<<F::Decoder as Decoder>::Event> {
        StreamListener::new(self.transport.clone(), self.endpoint(spec), spec.decoder())
            .with_reconnect(self.reconnect.clone())
            .with_feed_label(F::KIND)
            .spawn()
    }

    /// Raw trades.
    #[must_use]
    pub fn trades(&self, symbol: &str) -> FeedStream<Trade> {
        self.feed(&TradeFeed {
            symbol: symbol.to_string(),
        })
    }

    /// Aggregated trades.
    #[must_use]
    pub fn agg_trades(&self, symbol: &str) -> FeedStream<AggTrade> {
        self.feed(&AggTradeFeed {
            symbol: symbol.to_string(),
        })
    }

    /// Order book diffs.
    #[must_use]
    pub fn depth(&self, symbol: &str) -> FeedStream<DepthUpdate> {
        self.feed(&DepthFeed {
            symbol: symbol.to_string(),
        })
    }

    /// Top-N order book snapshots.
    #[must_use]
    pub fn partial_depth(&self, symbol: &str, level: PartialDepthLevel) -> FeedStream<PartialDepth> {
        self.feed(&PartialDepthFeed {
            symbol: symbol.to_string(),
            level,
        })
    }

    /// 24h ticker.
    #[must_use]
    pub fn ticker(&self, symbol: &str) -> FeedStream<Ticker> {
        self.feed(&TickerFeed {
            symbol: symbol.to_string(),
        })
    }

    /// 24h tickers for all symbols.
    #[must_use]
    pub fn all_tickers(&self) -> FeedStream<Vec<Ticker>> {
        self.feed(&AllTickersFeed)
    }

    /// Candlesticks.
    #[must_use]
    pub fn candles(&self, symbol: &str, interval: CandleInterval) -> FeedStream<Candle> {
        self.feed(&CandleFeed {
            symbol: symbol.to_string(),
            interval,
        })
    }

    /// Authenticated user data stream.
    ///
    /// # Errors
    ///
    /// Returns [`UserFeedError`] if the listen key cannot be acquired.
    pub async fn user<A>(
        &self,
        api: Arc<A>,
        keep_alive_interval: Duration,
    ) -> Result<FeedStream<UserEvent>, UserFeedError>
    where
        A: UserDataStreamApi + ?Sized,
    {
        UserFeed::new(
            api,
            self.transport.clone(),
            self.base.clone(),
            UserEventDecoder::new(),
        )
        .with_keep_alive_interval(keep_alive_interval)
        .with_reconnect(self.reconnect.clone())
        .start()
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const BASE: &str = "wss://stream.binance.com:9443/ws";

    fn client() -> StreamClient {
        StreamClient::new(BASE)
    }

    #[test]
    fn trade_feed_url() {
        let endpoint = client().endpoint(&TradeFeed {
            symbol: "BTCUSDT".to_string(),
        });
        assert_eq!(endpoint.url(), format!("{BASE}/btcusdt@trade"));
    }

    #[test]
    fn symbol_feed_paths_are_lowercase() {
        let symbol = "ethBTC".to_string();
        assert_eq!(
            AggTradeFeed {
                symbol: symbol.clone()
            }
            .endpoint(BASE)
            .path(),
            "ethbtc@aggTrade"
        );
        assert_eq!(
            DepthFeed {
                symbol: symbol.clone()
            }
            .endpoint(BASE)
            .path(),
            "ethbtc@depth"
        );
        assert_eq!(TickerFeed { symbol }.endpoint(BASE)
            .path(), "ethbtc@ticker");
    }

    #[test_case(PartialDepthLevel::Five, "btcusdt@depth5")]
    #[test_case(PartialDepthLevel::Ten, "btcusdt@depth10")]
    #[test_case(PartialDepthLevel::Twenty, "btcusdt@depth20")]
    fn partial_depth_paths(level: PartialDepthLevel, path: &str) {
        let spec = PartialDepthFeed {
            symbol: "BTCUSDT".to_string(),
            level,
        };
        assert_eq!(spec.endpoint(BASE)
            .path(), path);
    }

    #[test_case(CandleInterval::OneMinute, "btcusdt@kline_1m")]
    #[test_case(CandleInterval::OneHour, "btcusdt@kline_1h")]
    #[test_case(CandleInterval::OneMonth, "btcusdt@kline_1M")]
    fn candle_paths(interval: CandleInterval, path: &str) {
        let spec = CandleFeed {
            symbol: "BTCUSDT".to_string(),
            interval,
        };
        assert_eq!(spec.endpoint(BASE)
            .path(), path);
    }

    #[test]
    fn all_tickers_url() {
        assert_eq!(
            client().endpoint(&AllTickersFeed).url(),
            format!("{BASE}/!ticker@arr")
        );
    }

    #[test]
    fn feed_kinds_are_distinct() {
        let kinds = [
            TradeFeed::KIND,
            AggTradeFeed::KIND,
            DepthFeed::KIND,
            PartialDepthFeed::KIND,
            TickerFeed::KIND,
            AllTickersFeed::KIND,
            CandleFeed::KIND,
        ];
        let unique: std::collections::HashSet<_> = kinds.iter().collect();
        assert_eq!(unique.len(), kinds.len());
    }
}
