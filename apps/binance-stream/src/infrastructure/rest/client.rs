//! REST Client
//!
//! Minimal Binance REST collaborator: connectivity checks, a signed account
//! query, and the listen key lifecycle that backs the user data stream.
//! Requests are sent once; there is no retry or rate limiting here.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::signing::QueryString;
use crate::application::ports::{RemoteError, UserDataStreamApi};
use crate::domain::token::FeedToken;
use crate::infrastructure::config::{Credentials, RestSettings};

/// Spot REST base URL.
pub const DEFAULT_REST_URL: &str = "https://api.binance.com";

/// USDⓈ-M futures REST base URL.
pub const FUTURES_REST_URL: &str = "https://fapi.binance.com";

const API_KEY_HEADER: &str = "X-MBX-APIKEY";

/// Account whose user data stream the listen key opens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum UserStreamScope {
    /// Spot account.
    #[default]
    Spot,
    /// Cross margin account.
    Margin,
    /// USDⓈ-M futures account (served from the futures base URL).
    Futures,
}

impl UserStreamScope {
    /// Listen key endpoint path.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Spot => "/api/v3/userDataStream",
            Self::Margin => "/sapi/v1/userDataStream",
            Self::Futures => "/fapi/v1/listenKey",
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListenKeyResponse {
    listen_key: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerTimeResponse {
    server_time: u64,
}

/// Balance entry of [`AccountInfo`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    /// Asset
    pub asset: String,
    /// Free amount
    pub free: String,
    /// Locked amount
    pub locked: String,
}

/// Spot account summary (`GET /api/v3/account`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    /// Whether the account may trade
    pub can_trade: bool,
    /// Whether the account may withdraw
    pub can_withdraw: bool,
    /// Whether the account may deposit
    pub can_deposit: bool,
    /// Last update time (ms since epoch)
    pub update_time: u64,
    /// Balances
    pub balances: Vec<AccountBalance>,
}

impl AccountInfo {
    /// Balances with a non-zero free or locked amount.
    pub fn non_zero_balances(&self) -> impl Iterator<Item = &AccountBalance> {
        let is_zero = |s: &str| s.trim_start_matches(['0', '.']).is_empty();
        self.balances
            .iter()
            .filter(move |b| !is_zero(&b.free) || !is_zero(&b.locked))
    }
}

/// Binance REST client.
#[derive(Debug, Clone)]
pub struct RestClient {
    client: Client,
    base_url: String,
    futures_base_url: String,
    credentials: Option<Credentials>,
    recv_window: Option<u64>,
    scope: UserStreamScope,
}

impl RestClient {
    /// Create a client from settings.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Network`] if the HTTP client cannot be built.
    pub fn new(settings: &RestSettings, credentials: Option<Credentials>) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            futures_base_url: settings.futures_base_url.trim_end_matches('/').to_string(),
            credentials,
            recv_window: settings.recv_window_ms,
            scope: UserStreamScope::default(),
        })
    }

    /// Create a client against explicit base URLs with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Network`] if the HTTP client cannot be built.
    pub fn with_base_urls(
        base_url: impl Into<String>,
        futures_base_url: impl Into<String>,
        credentials: Option<Credentials>,
    ) -> Result<Self, RemoteError> {
        let settings = RestSettings {
            base_url: base_url.into(),
            futures_base_url: futures_base_url.into(),
            ..RestSettings::default()
        };
        Self::new(&settings, credentials)
    }

    /// Select which account's user data stream listen keys belong to.
    #[must_use]
    pub const fn with_scope(mut self, scope: UserStreamScope) -> Self {
        self.scope = scope;
        self
    }

    /// Current user stream scope.
    #[must_use]
    pub const fn scope(&self) -> UserStreamScope {
        self.scope
    }

    // =========================================================================
    // Public endpoints
    // =========================================================================

    /// Test connectivity.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] on any non-success response.
    pub async fn ping(&self) -> Result<(), RemoteError> {
        let url = format!("{}/api/v3/ping", self.base_url);
        let _: Value = self.send(self.client.get(url)).await?;
        Ok(())
    }

    /// Exchange server time (ms since epoch).
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] on any non-success response.
    pub async fn server_time(&self) -> Result<u64, RemoteError> {
        let url = format!("{}/api/v3/time", self.base_url);
        let response: ServerTimeResponse = self.send(self.client.get(url)).await?;
        Ok(response.server_time)
    }

    /// Difference between the exchange clock and the local clock, in ms.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] on any non-success response.
    pub async fn clock_skew_ms(&self) -> Result<i64, RemoteError> {
        let server = i64::try_from(self.server_time().await?).unwrap_or(i64::MAX);
        Ok(server - chrono::Utc::now().timestamp_millis())
    }

    // =========================================================================
    // Signed endpoints
    // =========================================================================

    /// Current account information.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::MissingCredentials`] without credentials, or
    /// [`RemoteError`] on any non-success response.
    pub async fn account(&self) -> Result<AccountInfo, RemoteError> {
        let credentials = self.credentials()?;
        let query = QueryString::new()
            .param_opt("recvWindow", self.recv_window)
            .param("timestamp", chrono::Utc::now().timestamp_millis())
            .signed(credentials.api_secret());
        let url = format!("{}/api/v3/account?{query}", self.base_url);

        let request = self
            .client
            .get(url)
            .header(API_KEY_HEADER, credentials.api_key());
        self.send(request).await
    }

    // =========================================================================
    // User data stream
    // =========================================================================

    /// Create a listen key for the configured scope.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] on any non-success response.
    pub async fn create_user_data_stream(&self) -> Result<FeedToken, RemoteError> {
        let request = self.user_stream_request(Method::POST, None)?;
        let response: ListenKeyResponse = self.send(request).await?;
        tracing::info!(scope = ?self.scope, "Created listen key");
        Ok(FeedToken::new(response.listen_key))
    }

    /// Extend a listen key's validity by 60 minutes.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] on any non-success response.
    pub async fn keep_alive_user_data_stream(&self, token: &FeedToken) -> Result<(), RemoteError> {
        let request = self.user_stream_request(Method::PUT, Some(token))?;
        let _: Value = self.send(request).await?;
        tracing::debug!(scope = ?self.scope, "Listen key kept alive");
        Ok(())
    }

    /// Invalidate a listen key, ending its stream.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] on any non-success response.
    pub async fn close_user_data_stream(&self, token: &FeedToken) -> Result<(), RemoteError> {
        let request = self.user_stream_request(Method::DELETE, Some(token))?;
        let _: Value = self.send(request).await?;
        tracing::info!(scope = ?self.scope, "Closed listen key");
        Ok(())
    }

    fn user_stream_request(
        &self,
        method: Method,
        token: Option<&FeedToken>,
    ) -> Result<RequestBuilder, RemoteError> {
        let credentials = self.credentials()?;
        let base = match self.scope {
            UserStreamScope::Futures => &self.futures_base_url,
            UserStreamScope::Spot | UserStreamScope::Margin => &self.base_url,
        };
        let query = QueryString::new().param_opt("listenKey", token.map(FeedToken::as_str));
        let url = if query.is_empty() {
            format!("{base}{}", self.scope.path())
        } else {
            format!("{base}{}?{query}", self.scope.path())
        };

        Ok(self
            .client
            .request(method, url)
            .header(API_KEY_HEADER, credentials.api_key()))
    }

    fn credentials(&self) -> Result<&Credentials, RemoteError> {
        self.credentials
            .as_ref()
            .ok_or(RemoteError::MissingCredentials)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, RemoteError> {
        let response = request
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        if status.is_success() {
            let body = if body.trim().is_empty() { "null" } else { &body };
            return serde_json::from_str(body).map_err(|e| RemoteError::Decode(e.to_string()));
        }

        Err(classify_error(status.as_u16(), body))
    }
}

/// Map a non-success response to [`RemoteError`].
///
/// A JSON body comes from the exchange itself; anything else (typically an
/// HTML page) comes from a proxy or gateway in between.
fn classify_error(status: u16, body: String) -> RemoteError {
    match serde_json::from_str::<Value>(&body) {
        Ok(json) => {
            let code = json.get("code").and_then(Value::as_i64).unwrap_or_default();
            let message = json
                .get("msg")
                .and_then(Value::as_str)
                .map_or_else(|| body.clone(), ToString::to_string);
            tracing::warn!(status, code, message = %message, "Binance API error");
            RemoteError::Api {
                status,
                code,
                message,
            }
        }
        Err(_) => {
            tracing::warn!(status, len = body.len(), "Non-JSON error response");
            RemoteError::Proxy { status, body }
        }
    }
}

#[async_trait]
impl UserDataStreamApi for RestClient {
    async fn acquire_feed_token(&self) -> Result<FeedToken, RemoteError> {
        self.create_user_data_stream().await
    }

    async fn refresh_feed_token(&self, token: &FeedToken) -> Result<(), RemoteError> {
        self.keep_alive_user_data_stream(token).await
    }
}

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
