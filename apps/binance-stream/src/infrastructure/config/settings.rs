//! Client Settings
//!
//! Configuration types for the streaming client, loaded from environment
//! variables.

use std::str::FromStr;
use std::time::Duration;

use crate::application::services::{DEFAULT_KEEPALIVE_INTERVAL, MAX_KEEPALIVE_INTERVAL};
use crate::infrastructure::binance::DEFAULT_STREAM_URL;
use crate::infrastructure::rest::{DEFAULT_REST_URL, DEFAULT_TIMEOUT, FUTURES_REST_URL};

/// Binance API credentials.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    api_secret: String,
}

impl Credentials {
    /// Create new credentials.
    #[must_use]
    pub const fn new(api_key: String, api_secret: String) -> Self {
        Self {
            api_key,
            api_secret,
        }
    }

    /// Get the API key.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Get the API secret.
    #[must_use]
    pub fn api_secret(&self) -> &str {
        &self.api_secret
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"[REDACTED]")
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}

/// REST collaborator settings.
#[derive(Debug, Clone)]
pub struct RestSettings {
    /// Spot/margin REST base URL.
    pub base_url: String,
    /// Futures REST base URL.
    pub futures_base_url: String,
    /// `recvWindow` sent with signed requests, if any.
    pub recv_window_ms: Option<u64>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for RestSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_REST_URL.to_string(),
            futures_base_url: FUTURES_REST_URL.to_string(),
            recv_window_ms: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Feed lifecycle settings.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSettings {
    /// Listen key refresh period.
    pub keep_alive_interval: Duration,
    /// Initial reconnection delay (zero reconnects immediately).
    pub reconnect_delay_initial: Duration,
    /// Maximum reconnection delay.
    pub reconnect_delay_max: Duration,
    /// Reconnection delay multiplier for exponential backoff.
    pub reconnect_delay_multiplier: f64,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            keep_alive_interval: DEFAULT_KEEPALIVE_INTERVAL,
            reconnect_delay_initial: Duration::ZERO,
            reconnect_delay_max: Duration::from_secs(30),
            reconnect_delay_multiplier: 2.0,
        }
    }
}

/// Complete client configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    /// API credentials, required only for the user feed and signed calls.
    pub credentials: Option<Credentials>,
    /// WebSocket base URL.
    pub stream_url: String,
    /// REST settings.
    pub rest: RestSettings,
    /// Feed lifecycle settings.
    pub feed: FeedSettings,
    /// Prometheus HTTP exporter port (0 = disabled).
    pub metrics_port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            credentials: None,
            stream_url: DEFAULT_STREAM_URL.to_string(),
            rest: RestSettings::default(),
            feed: FeedSettings::default(),
            metrics_port: 0,
        }
    }
}

impl Settings {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but cannot be parsed, or if
    /// only one half of the credential pair is set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// See [`Settings::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);
        let defaults = Self::default();

        let credentials = match (env.get("BINANCE_API_KEY"), env.get("BINANCE_API_SECRET")) {
            (Some(key), Some(secret)) => Some(Credentials::new(key, secret)),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::MissingEnvVar("BINANCE_API_SECRET".to_string())),
            (None, Some(_)) => return Err(ConfigError::MissingEnvVar("BINANCE_API_KEY".to_string())),
        };

        let rest = RestSettings {
            base_url: env.get("BINANCE_REST_URL").unwrap_or(defaults.rest.base_url),
            futures_base_url: env
                .get("BINANCE_FUTURES_REST_URL")
                .unwrap_or(defaults.rest.futures_base_url),
            recv_window_ms: env.parse_opt("BINANCE_RECV_WINDOW_MS")?,
            timeout: defaults.rest.timeout,
        };

        let feed = FeedSettings {
            keep_alive_interval: env
                .parse_opt("FEED_KEEPALIVE_INTERVAL_SECS")?
                .map_or(defaults.feed.keep_alive_interval, Duration::from_secs),
            reconnect_delay_initial: env
                .parse_opt("FEED_RECONNECT_INITIAL_DELAY_MS")?
                .map_or(defaults.feed.reconnect_delay_initial, Duration::from_millis),
            reconnect_delay_max: env
                .parse_opt("FEED_RECONNECT_MAX_DELAY_MS")?
                .map_or(defaults.feed.reconnect_delay_max, Duration::from_millis),
            reconnect_delay_multiplier: env
                .parse_opt("FEED_RECONNECT_MULTIPLIER")?
                .unwrap_or(defaults.feed.reconnect_delay_multiplier),
        };

        if feed.keep_alive_interval > MAX_KEEPALIVE_INTERVAL {
            return Err(ConfigError::InvalidValue {
                key: "FEED_KEEPALIVE_INTERVAL_SECS".to_string(),
                value: feed.keep_alive_interval.as_secs().to_string(),
            });
        }

        let multiplier = feed.reconnect_delay_multiplier;
        if !(multiplier.is_finite() && multiplier >= 1.0) {
            return Err(ConfigError::InvalidValue {
                key: "FEED_RECONNECT_MULTIPLIER".to_string(),
                value: multiplier.to_string(),
            });
        }

        Ok(Self {
            credentials,
            stream_url: env.get("BINANCE_STREAM_URL").unwrap_or(defaults.stream_url),
            rest,
            feed,
            metrics_port: env.parse_opt("METRICS_PORT")?.unwrap_or(defaults.metrics_port),
        })
    }

    /// Prometheus listen address, if the HTTP exporter is enabled.
    #[must_use]
    pub fn metrics_addr(&self) -> Option<std::net::SocketAddr> {
        (self.metrics_port != 0).then(|| ([0, 0, 0, 0], self.metrics_port).into())
    }
}

/// Load a `.env` file from the working directory or any ancestor.
///
/// Returns the path that was loaded, if one was found.
pub fn load_dotenv() -> Option<std::path::PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => Some(path),
        Err(e) if e.not_found() => None,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load .env file");
            None
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    /// Environment variable has an unparseable value.
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue {
        /// Variable name
        key: String,
        /// Offending value
        value: String,
    },
}

/// Lookup wrapper that treats empty values as unset.
struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_opt<T: FromStr>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        self.get(key)
            .map(|value| {
                value.parse().map_err(|_| ConfigError::InvalidValue {
                    key: key.to_string(),
                    value,
                })
            })
            .transpose()
    }
}
