//! Prometheus Metrics Module
//!
//! Feed health metrics in Prometheus format.
//!
//! # Metrics Categories
//!
//! - **Messages**: Decoded events and discarded payloads per feed
//! - **Connections**: Active feed connections, connection failures, reconnects
//! - **Keep-alive**: Listen key refresh outcomes
//!
//! Every feed-scoped metric carries a `feed` label (`trade`, `depth`, `user`, ...).
//! Recording is a no-op until a recorder is installed with [`init_metrics`].

use std::net::SocketAddr;
use std::sync::OnceLock;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

// =============================================================================
// Global Metrics Handle
// =============================================================================

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics initialisation error.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// The exporter could not be built (e.g. the listen address is taken).
    #[error("failed to build Prometheus exporter: {0}")]
    Build(#[from] metrics_exporter_prometheus::BuildError),
    /// Another global recorder is already installed.
    #[error("a global metrics recorder is already installed")]
    RecorderInstalled,
}

/// Install the Prometheus recorder, optionally serving `/metrics` on `listen`.
///
/// Idempotent: later calls return the handle installed by the first one.
/// The HTTP listener is spawned on the current Tokio runtime.
///
/// # Errors
///
/// Returns an error if the exporter cannot be built or a different recorder
/// is already installed.
pub fn init_metrics(listen: Option<SocketAddr>) -> Result<PrometheusHandle, MetricsError> {
    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        return Ok(handle.clone());
    }

    let handle = if let Some(addr) = listen {
        let (recorder, exporter) = PrometheusBuilder::new().with_http_listener(addr).build()?;
        let handle = recorder.handle();
        metrics::set_global_recorder(recorder).map_err(|_| MetricsError::RecorderInstalled)?;
        tokio::spawn(async move {
            if let Err(e) = exporter.await {
                tracing::error!(error = ?e, "Prometheus exporter stopped");
            }
        });
        tracing::info!(%addr, "Prometheus exporter listening");
        handle
    } else {
        PrometheusBuilder::new()
            .install_recorder()
            .map_err(|_| MetricsError::RecorderInstalled)?
    };

    register_metrics();
    Ok(PROMETHEUS_HANDLE.get_or_init(|| handle).clone())
}

// =============================================================================
// Metric Registration
// =============================================================================

const MESSAGES_DECODED: &str = "binance_stream_messages_decoded_total";
const DECODE_FAILURES: &str = "binance_stream_decode_failures_total";
const CONNECTIONS: &str = "binance_stream_connections";
const CONNECTION_FAILURES: &str = "binance_stream_connection_failures_total";
const RECONNECTS: &str = "binance_stream_reconnects_total";
const KEEPALIVES: &str = "binance_stream_keepalive_total";

fn register_metrics() {
    describe_counter!(MESSAGES_DECODED, "Total messages decoded into events");
    describe_counter!(
        DECODE_FAILURES,
        "Total messages discarded because they failed to decode"
    );

    describe_gauge!(CONNECTIONS, "Number of open feed connections");
    describe_counter!(
        CONNECTION_FAILURES,
        "Total failed connects and errored sessions"
    );
    describe_counter!(RECONNECTS, "Total reconnection attempts");

    describe_counter!(KEEPALIVES, "Listen key refreshes by outcome");
}

// =============================================================================
// Metric Recording Functions
// =============================================================================

/// Record an event decoded and handed to the consumer.
pub fn record_message_decoded(feed: &'static str) {
    counter!(MESSAGES_DECODED, "feed" => feed).increment(1);
}

/// Record a payload discarded by the decoder.
pub fn record_decode_failure(feed: &'static str) {
    counter!(DECODE_FAILURES, "feed" => feed).increment(1);
}

/// Track a feed connection opening (`true`) or closing (`false`).
pub fn record_connection_state(feed: &'static str, connected: bool) {
    let gauge = gauge!(CONNECTIONS, "feed" => feed);
    if connected {
        gauge.increment(1.0);
    } else {
        gauge.decrement(1.0);
    }
}

/// Record a failed connect or a session that ended in a transport error.
pub fn record_connection_failure(feed: &'static str) {
    counter!(CONNECTION_FAILURES, "feed" => feed).increment(1);
}

/// Record a reconnection attempt.
pub fn record_reconnect(feed: &'static str) {
    counter!(RECONNECTS, "feed" => feed).increment(1);
}

/// Record a listen key refresh outcome.
pub fn record_keepalive(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!(KEEPALIVES, "feed" => "user", "outcome" => outcome).increment(1);
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use metrics_exporter_prometheus::PrometheusBuilder;

    use super::*;

    #[test]
    fn recording_without_recorder_is_noop() {
        record_message_decoded("trade");
        record_decode_failure("trade");
        record_connection_state("trade", true);
        record_connection_state("trade", false);
        record_keepalive(false);
    }

    #[test]
    fn recorded_metrics_render_with_feed_label() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            record_message_decoded("depth");
            record_message_decoded("depth");
            record_reconnect("depth");
            record_keepalive(true);
        });

        let rendered = handle.render();
        assert!(rendered.contains(r#"binance_stream_messages_decoded_total{feed="depth"} 2"#));
        assert!(rendered.contains(r#"binance_stream_reconnects_total{feed="depth"} 1"#));
        assert!(rendered.contains(r#"outcome="success""#));
    }
}
