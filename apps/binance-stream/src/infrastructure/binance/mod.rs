//! Binance Stream Adapters
//!
//! - **Catalog**: Stream path and decoder per feed type, `StreamClient`
//! - **Codec**: JSON decoders for market and user events
//! - **Transport**: `tokio-tungstenite` WebSocket sessions

pub mod catalog;
pub mod codec;
pub mod transport;

pub use catalog::{
    AggTradeFeed, AllTickersFeed, CandleFeed, DEFAULT_STREAM_URL, DepthFeed, FUTURES_STREAM_URL,
    FeedSpec, PartialDepthFeed, StreamClient, TickerFeed, TradeFeed,
};
pub use codec::{
    AggTradeDecoder, AllTickersDecoder, CandleDecoder, DepthDecoder, JsonDecoder,
    PartialDepthDecoder, TickerDecoder, TradeDecoder, UserEventDecoder,
};
pub use transport::{DEFAULT_CONNECT_TIMEOUT, TungsteniteSession, TungsteniteTransport};
