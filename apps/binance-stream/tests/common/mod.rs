//! Shared test doubles: a scripted transport and a counting listen key API.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use binance_stream::{
    FeedToken, Frame, RemoteError, Transport, TransportError, TransportSession, UserDataStreamApi,
};

/// One scripted step of a session.
#[derive(Debug, Clone)]
pub enum Step {
    /// Deliver a text frame.
    Text(String),
    /// Deliver a close frame.
    Close(u16, &'static str),
    /// Fail mid-stream.
    Fail(&'static str),
    /// End the inbound stream without a close frame.
    End,
}

#[derive(Default)]
struct State {
    scripts: VecDeque<Result<Vec<Step>, TransportError>>,
    urls: Vec<String>,
    closes: usize,
    delivered: usize,
}

/// Transport that replays one script per connection attempt.
///
/// Once the scripts are used up, every further connection succeeds and
/// then stays silent.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    state: Arc<Mutex<State>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a session that replays `steps`.
    pub fn session(self, steps: Vec<Step>) -> Self {
        self.state.lock().scripts.push_back(Ok(steps));
        self
    }

    /// Queue a failed handshake.
    pub fn refuse(self, reason: &str) -> Self {
        self.state
            .lock()
            .scripts
            .push_back(Err(TransportError::Connect(reason.to_string())));
        self
    }

    pub fn connect_count(&self) -> usize {
        self.state.lock().urls.len()
    }

    pub fn urls(&self) -> Vec<String> {
        self.state.lock().urls.clone()
    }

    pub fn close_count(&self) -> usize {
        self.state.lock().closes
    }

    /// Text frames handed to a listener so far.
    pub fn delivered_count(&self) -> usize {
        self.state.lock().delivered
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    type Session = ScriptedSession;

    async fn connect(&self, url: &str) -> Result<ScriptedSession, TransportError> {
        let mut state = self.state.lock();
        state.urls.push(url.to_string());
        let steps = state.scripts.pop_front().unwrap_or_else(|| Ok(Vec::new()))?;
        Ok(ScriptedSession {
            steps: steps.into(),
            state: Arc::clone(&self.state),
        })
    }
}

pub struct ScriptedSession {
    steps: VecDeque<Step>,
    state: Arc<Mutex<State>>,
}

#[async_trait]
impl TransportSession for ScriptedSession {
    async fn next_frame(&mut self) -> Option<Result<Frame, TransportError>> {
        match self.steps.pop_front() {
            Some(Step::Text(text)) => {
                self.state.lock().delivered += 1;
                Some(Ok(Frame::Text(text)))
            }
            Some(Step::Close(code, reason)) => Some(Ok(Frame::Close {
                code: Some(code),
                reason: reason.to_string(),
            })),
            Some(Step::Fail(reason)) => Some(Err(TransportError::Protocol(reason.to_string()))),
            Some(Step::End) => None,
            None => std::future::pending().await,
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.state.lock().closes += 1;
        Ok(())
    }
}

/// Listen key API that counts calls.
pub struct CountingApi {
    token: Result<String, RemoteError>,
    pub acquired: AtomicUsize,
    pub refreshed: AtomicUsize,
    refreshed_tokens: Mutex<Vec<String>>,
}

impl CountingApi {
    pub fn issuing(token: &str) -> Arc<Self> {
        Arc::new(Self {
            token: Ok(token.to_string()),
            acquired: AtomicUsize::new(0),
            refreshed: AtomicUsize::new(0),
            refreshed_tokens: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(error: RemoteError) -> Arc<Self> {
        Arc::new(Self {
            token: Err(error),
            acquired: AtomicUsize::new(0),
            refreshed: AtomicUsize::new(0),
            refreshed_tokens: Mutex::new(Vec::new()),
        })
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshed.load(Ordering::SeqCst)
    }

    pub fn refreshed_tokens(&self) -> Vec<String> {
        self.refreshed_tokens.lock().clone()
    }
}

#[async_trait]
impl UserDataStreamApi for CountingApi {
    async fn acquire_feed_token(&self) -> Result<FeedToken, RemoteError> {
        self.acquired.fetch_add(1, Ordering::SeqCst);
        self.token.clone().map(FeedToken::new)
    }

    async fn refresh_feed_token(&self, token: &FeedToken) -> Result<(), RemoteError> {
        self.refreshed.fetch_add(1, Ordering::SeqCst);
        self.refreshed_tokens.lock().push(token.as_str().to_string());
        Ok(())
    }
}

/// A raw trade payload with the given trade id.
pub fn trade_json(id: u64) -> String {
    format!(
        r#"{{"e":"trade","E":{},"s":"BNBBTC","t":{id},"p":"0.001","q":"100","b":88,"a":50,"T":123456785,"m":true,"M":true}}"#,
        123_456_789 + id
    )
}
