//! User Feed Integration Tests
//!
//! Listen key acquisition ordering, keep-alive cadence and teardown of the
//! user data stream over a scripted transport.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use futures::StreamExt;
use tokio::time::timeout;
use tokio_test::{assert_err, assert_ok};

use binance_stream::infrastructure::binance::UserEventDecoder;
use binance_stream::{RemoteError, StreamClient, UserEvent, UserFeed, UserFeedError};
use common::{CountingApi, ScriptedTransport, Step};

const BASE: &str = "ws://feed.test/ws";
const TOKEN: &str = "pqia91ma19a5s61cv6a81va65sdf19v8a65a1a5s61cv6a81va65sdf19v8a65a1";
const WAIT: Duration = Duration::from_secs(2);

const BALANCE_UPDATE: &str =
    r#"{"e":"balanceUpdate","E":1573200697110,"a":"BTC","d":"100.00000000","T":1573200697068}"#;

fn client(transport: &ScriptedTransport) -> StreamClient<ScriptedTransport> {
    StreamClient::with_transport(BASE, Arc::new(transport.clone()))
}

async fn wait_for_refreshes(api: &CountingApi, count: usize) {
    timeout(WAIT, async {
        while api.refresh_count() < count {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("keep-alive should refresh within timeout");
}

#[tokio::test]
async fn connects_to_the_acquired_listen_key() {
    let api = CountingApi::issuing(TOKEN);
    let transport =
        ScriptedTransport::new().session(vec![Step::Text(BALANCE_UPDATE.to_string())]);

    let mut stream = assert_ok!(
        client(&transport)
            .user(Arc::clone(&api), Duration::from_secs(60))
            .await
    );

    let event = timeout(WAIT, stream.next()).await.unwrap().unwrap();
    let UserEvent::BalanceUpdate(update) = event else {
        panic!("expected balance update, got {event:?}");
    };
    assert_eq!(update.asset, "BTC");
    assert_eq!(update.delta, "100.00000000");

    assert_eq!(api.acquired.load(Ordering::SeqCst), 1);
    assert_eq!(transport.urls(), vec![format!("{BASE}/{TOKEN}")]);
}

#[tokio::test]
async fn token_failure_is_surfaced_before_any_connection() {
    let api = CountingApi::failing(RemoteError::Api {
        status: 401,
        code: -2015,
        message: "Invalid API-key, IP, or permissions for action.".to_string(),
    });
    let transport = ScriptedTransport::new();

    let result = client(&transport)
        .user(Arc::clone(&api), Duration::from_secs(60))
        .await;

    let error = assert_err!(result);
    let UserFeedError::TokenAcquisition(RemoteError::Api { status, code, .. }) = error else {
        panic!("expected API error, got {error:?}");
    };
    assert_eq!((status, code), (401, -2015));
    assert_eq!(transport.connect_count(), 0);
    assert_eq!(api.refresh_count(), 0);
}

#[tokio::test]
async fn keep_alive_refreshes_the_same_token() {
    let api = CountingApi::issuing(TOKEN);
    let transport = ScriptedTransport::new();

    let _stream = client(&transport)
        .user(Arc::clone(&api), Duration::from_millis(20))
        .await
        .unwrap();

    wait_for_refreshes(&api, 3).await;
    assert!(api.refreshed_tokens().iter().all(|t| t == TOKEN));
    assert_eq!(api.acquired.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn no_refresh_after_the_stream_is_dropped() {
    let api = CountingApi::issuing(TOKEN);
    let transport = ScriptedTransport::new();

    let stream = client(&transport)
        .user(Arc::clone(&api), Duration::from_millis(20))
        .await
        .unwrap();
    wait_for_refreshes(&api, 1).await;

    drop(stream);
    let refreshes_at_drop = api.refresh_count();

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(api.refresh_count(), refreshes_at_drop);
    assert_eq!(transport.connect_count(), 1);
    assert_eq!(transport.close_count(), 1);
}

#[tokio::test]
async fn close_stops_listener_and_keep_alive_together() {
    let api = CountingApi::issuing(TOKEN);
    let transport = ScriptedTransport::new();

    let stream = client(&transport)
        .user(Arc::clone(&api), Duration::from_millis(10))
        .await
        .unwrap();

    timeout(WAIT, stream.close()).await.expect("close finishes");
    let refreshes_at_close = api.refresh_count();

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(api.refresh_count(), refreshes_at_close);
}

#[tokio::test]
async fn reconnects_reuse_the_listen_key() {
    let api = CountingApi::issuing(TOKEN);
    let transport = ScriptedTransport::new()
        .session(vec![Step::Close(1001, "going away")])
        .session(vec![Step::Text(BALANCE_UPDATE.to_string())]);

    let mut stream = client(&transport)
        .user(Arc::clone(&api), Duration::from_secs(60))
        .await
        .unwrap();

    let event = timeout(WAIT, stream.next()).await.unwrap().unwrap();
    assert_eq!(event.event_type(), "balanceUpdate");
    assert_eq!(
        transport.urls(),
        vec![format!("{BASE}/{TOKEN}"), format!("{BASE}/{TOKEN}")]
    );
    assert_eq!(api.acquired.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn expiry_and_unknown_events_pass_through() {
    let api = CountingApi::issuing(TOKEN);
    let expired = format!(r#"{{"e":"listenKeyExpired","E":1576653824250,"listenKey":"{TOKEN}"}}"#);
    let unknown = r#"{"e":"outboundAccountInfo","E":1,"m":0}"#.to_string();
    let transport = ScriptedTransport::new().session(vec![Step::Text(expired), Step::Text(unknown)]);

    let mut stream = UserFeed::new(
        Arc::clone(&api),
        Arc::new(transport.clone()),
        BASE,
        UserEventDecoder::new(),
    )
    .start()
    .await
    .unwrap();

    let first = timeout(WAIT, stream.next()).await.unwrap().unwrap();
    let UserEvent::ListenKeyExpired(expired) = first else {
        panic!("expected listen key expiry, got {first:?}");
    };
    assert_eq!(expired.listen_key, TOKEN);

    let second = timeout(WAIT, stream.next()).await.unwrap().unwrap();
    assert!(matches!(
        second,
        UserEvent::Other { ref event_type, .. } if event_type == "outboundAccountInfo"
    ));
}
