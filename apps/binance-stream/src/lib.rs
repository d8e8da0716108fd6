#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Binance Stream - Exchange Feed Client
//!
//! A client library for Binance's streaming market-data and user-data
//! feeds. Every feed is a self-healing WebSocket consumer that decodes
//! wire messages into typed events and reconnects on any failure until
//! the caller stops consuming.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Decoded event records and static tables
//!   - `events`: Trades, depth, tickers, candles, user events
//!   - `interval`: Candle interval tokens and durations
//!   - `endpoint`: Feed endpoint descriptors and URL resolution
//!
//! - **Application**: Port definitions and the streaming engine
//!   - `ports`: Decoder, transport and user-data-stream contracts
//!   - `services`: Stream listener, reconnect policy, keep-alive task, user feed coordinator
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `binance`: Feed catalog, decoders, WebSocket transport
//!   - `rest`: Signed REST collaborator for listen-key management
//!   - `config`, `metrics`, `telemetry`: Ambient stack
//!
//! # Data Flow
//!
//! ```text
//!                    ┌──────────────┐    ┌──────────────┐
//! Binance WS ───────►│   Listener   │───►│  FeedStream  │───► caller
//!                    │ (decode/retry)│    └──────────────┘
//!                    └──────┬───────┘
//!                           │ cancel
//! Binance REST ◄── keep-alive task (user feed only)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Event records and static tables with no I/O.
pub mod domain;

/// Application layer - Ports and the streaming engine.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::endpoint::FeedEndpoint;
pub use domain::events::{
    AccountPosition, AggTrade, Balance, BalanceUpdate, Candle, DepthUpdate, ExecutionReport,
    ListenKeyExpired, PartialDepth, PartialDepthLevel, PriceLevel, Ticker, Trade, UserEvent,
};
pub use domain::interval::{CandleInterval, candle_interval_duration};
pub use domain::token::FeedToken;

// Ports
pub use application::ports::{
    DecodeError, Decoder, Frame, RemoteError, Transport, TransportError, TransportSession,
    UserDataStreamApi,
};

// Streaming engine
pub use application::services::{
    FeedDiagnostic, FeedStream, KeepAliveTask, ReconnectConfig, ReconnectPolicy, StreamListener,
    UserFeed, UserFeedError,
};

// Feed catalog
pub use infrastructure::binance::{
    AggTradeFeed, AllTickersFeed, CandleFeed, DEFAULT_STREAM_URL, DepthFeed, FUTURES_STREAM_URL,
    FeedSpec, PartialDepthFeed, StreamClient, TickerFeed, TradeFeed, TungsteniteTransport,
};

// REST collaborator
pub use infrastructure::rest::{AccountInfo, QueryString, RestClient, UserStreamScope};

// Infrastructure config
pub use infrastructure::config::{
    ConfigError, Credentials, FeedSettings, RestSettings, Settings, load_dotenv,
};

// Metrics
pub use infrastructure::metrics::{MetricsError, init_metrics};

// Telemetry
pub use infrastructure::telemetry::{
    TelemetryConfig, TelemetryError, TelemetryGuard, init as init_telemetry,
};
