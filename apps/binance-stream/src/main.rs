//! Binance Stream Binary
//!
//! Taps one Binance feed and prints every decoded event as a JSON line on
//! stdout. Logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! binance-stream trades BTCUSDT
//! binance-stream partial-depth ETHBTC 10
//! binance-stream candles BNBUSDT 15m
//! binance-stream all-tickers
//! binance-stream user
//! ```
//!
//! # Environment Variables
//!
//! ## Required for `user`
//! - `BINANCE_API_KEY`: Binance API key
//! - `BINANCE_API_SECRET`: Binance API secret
//!
//! ## Optional
//! - `BINANCE_STREAM_URL`: WebSocket base (default: <wss://stream.binance.com:9443/ws>)
//! - `BINANCE_REST_URL`: REST base (default: <https://api.binance.com>)
//! - `FEED_KEEPALIVE_INTERVAL_SECS`: Listen key refresh period (default: 1800)
//! - `FEED_RECONNECT_INITIAL_DELAY_MS`: First reconnect delay (default: 0)
//! - `METRICS_PORT`: Prometheus exporter port (default: 0, disabled)
//! - `OTEL_ENABLED`: Export spans over OTLP (default: false)
//! - `RUST_LOG`: Log filter (default: `binance_stream=info`)

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use binance_stream::{
    CandleInterval, FeedStream, PartialDepthLevel, ReconnectConfig, RestClient, Settings,
    StreamClient, init_metrics, init_telemetry, load_dotenv,
};
use futures::StreamExt;
use serde::Serialize;
use tokio::signal;
use tokio_util::sync::CancellationToken;

/// Upper bound on waiting for feed tasks after a shutdown signal.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

const USAGE: &str = "usage: binance-stream <feed> [args]

feeds:
  trades <SYMBOL>
  agg-trades <SYMBOL>
  depth <SYMBOL>
  partial-depth <SYMBOL> <5|10|20>
  ticker <SYMBOL>
  candles <SYMBOL> <INTERVAL>
  all-tickers
  user";

/// Feed selected on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Trades(String),
    AggTrades(String),
    Depth(String),
    PartialDepth(String, PartialDepthLevel),
    Ticker(String),
    Candles(String, CandleInterval),
    AllTickers,
    User,
}

impl Command {
    fn parse<I>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let feed = args.next().context("missing feed name")?;
        let mut next = |name: &str| args.next().with_context(|| format!("missing {name}"));

        let command = match feed.as_str() {
            "trades" => Self::Trades(next("SYMBOL")?),
            "agg-trades" => Self::AggTrades(next("SYMBOL")?),
            "depth" => Self::Depth(next("SYMBOL")?),
            "ticker" => Self::Ticker(next("SYMBOL")?),
            "partial-depth" => {
                let symbol = next("SYMBOL")?;
                let level = next("LEVEL")?
                    .parse::<u8>()
                    .ok()
                    .and_then(PartialDepthLevel::from_u8)
                    .context("LEVEL must be 5, 10 or 20")?;
                Self::PartialDepth(symbol, level)
            }
            "candles" => {
                let symbol = next("SYMBOL")?;
                let interval = next("INTERVAL")?.parse()?;
                Self::Candles(symbol, interval)
            }
            "all-tickers" => Self::AllTickers,
            "user" => Self::User,
            other => bail!("unknown feed: {other}"),
        };

        Ok(command)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls crypto provider"))?;

    load_dotenv();

    let _telemetry_guard = init_telemetry()?;

    let command = match Command::parse(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("error: {e:#}\n\n{USAGE}");
            std::process::exit(2);
        }
    };

    let settings = Settings::from_env()?;
    log_config(&settings);

    let _metrics_handle = init_metrics(settings.metrics_addr())?;

    let client = StreamClient::new(settings.stream_url.clone())
        .with_reconnect(ReconnectConfig::from_feed_settings(&settings.feed));

    let shutdown = CancellationToken::new();
    tokio::spawn(await_shutdown(shutdown.clone()));

    tracing::info!(?command, "Starting feed");

    match command {
        Command::Trades(symbol) => pump(client.trades(&symbol), &shutdown).await,
        Command::AggTrades(symbol) => pump(client.agg_trades(&symbol), &shutdown).await,
        Command::Depth(symbol) => pump(client.depth(&symbol), &shutdown).await,
        Command::PartialDepth(symbol, level) => {
            pump(client.partial_depth(&symbol, level), &shutdown).await
        }
        Command::Ticker(symbol) => pump(client.ticker(&symbol), &shutdown).await,
        Command::Candles(symbol, interval) => {
            pump(client.candles(&symbol, interval), &shutdown).await
        }
        Command::AllTickers => pump(client.all_tickers(), &shutdown).await,
        Command::User => {
            let credentials = settings
                .credentials
                .clone()
                .context("BINANCE_API_KEY and BINANCE_API_SECRET are required for the user feed")?;
            let api = Arc::new(RestClient::new(&settings.rest, Some(credentials))?);
            let stream = client.user(api, settings.feed.keep_alive_interval).await?;
            pump(stream, &shutdown).await
        }
    }
}

/// Print events as JSON lines until shutdown.
async fn pump<E: Serialize>(
    mut stream: FeedStream<E>,
    shutdown: &CancellationToken,
) -> anyhow::Result<()> {
    let mut diagnostics = stream.diagnostics();
    let mut stdout = std::io::stdout();

    let result = loop {
        tokio::select! {
            biased;
            () = shutdown.cancelled() => break Ok(()),
            event = stream.next() => {
                let Some(event) = event else {
                    break Ok(());
                };
                let written = serde_json::to_writer(&mut stdout, &event)
                    .map_err(anyhow::Error::from)
                    .and_then(|()| writeln!(stdout).context("failed to write to stdout"));
                if written.is_err() {
                    break written;
                }
            }
            Ok(diagnostic) = diagnostics.recv() => {
                tracing::debug!(?diagnostic, "Feed diagnostic");
            }
        }
    };

    if tokio::time::timeout(SHUTDOWN_TIMEOUT, stream.close())
        .await
        .is_err()
    {
        tracing::warn!(
            timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
            "Feed tasks did not stop in time"
        );
    }

    tracing::info!("Feed stopped");
    result
}

/// Log the parsed configuration.
fn log_config(settings: &Settings) {
    tracing::info!(
        stream_url = %settings.stream_url,
        rest_url = %settings.rest.base_url,
        credentials = settings.credentials.is_some(),
        metrics_port = settings.metrics_port,
        "Configuration loaded"
    );
    tracing::debug!(
        keep_alive_secs = settings.feed.keep_alive_interval.as_secs(),
        reconnect_initial_ms =
            u64::try_from(settings.feed.reconnect_delay_initial.as_millis()).unwrap_or(u64::MAX),
        reconnect_max_ms =
            u64::try_from(settings.feed.reconnect_delay_max.as_millis()).unwrap_or(u64::MAX),
        "Feed settings"
    );
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
#[allow(clippy::expect_used)]
async fn await_shutdown(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    shutdown_token.cancel();
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<Command> {
        Command::parse(args.iter().map(ToString::to_string))
    }

    #[test]
    fn parses_symbol_feeds() {
        assert_eq!(
            parse(&["trades", "BTCUSDT"]).unwrap(),
            Command::Trades("BTCUSDT".to_string())
        );
        assert_eq!(
            parse(&["agg-trades", "bnbbtc"]).unwrap(),
            Command::AggTrades("bnbbtc".to_string())
        );
        assert_eq!(
            parse(&["ticker", "ETHBTC"]).unwrap(),
            Command::Ticker("ETHBTC".to_string())
        );
    }

    #[test]
    fn parses_partial_depth_level() {
        assert_eq!(
            parse(&["partial-depth", "ETHBTC", "10"]).unwrap(),
            Command::PartialDepth("ETHBTC".to_string(), PartialDepthLevel::Ten)
        );
        assert!(parse(&["partial-depth", "ETHBTC", "15"]).is_err());
    }

    #[test]
    fn parses_candle_interval() {
        assert_eq!(
            parse(&["candles", "BNBUSDT", "1M"]).unwrap(),
            Command::Candles("BNBUSDT".to_string(), CandleInterval::OneMonth)
        );
        assert!(parse(&["candles", "BNBUSDT", "7m"]).is_err());
    }

    #[test]
    fn rejects_missing_arguments() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["depth"]).is_err());
        assert!(parse(&["orders"]).is_err());
    }

    #[test]
    fn parses_argless_feeds() {
        assert_eq!(parse(&["all-tickers"]).unwrap(), Command::AllTickers);
        assert_eq!(parse(&["user"]).unwrap(), Command::User);
    }
}
