//! Prometheus metrics for token client calls.
//!
//! All metrics are aggregated in the [`Metrics`] struct. Without an installed
//! recorder every call is a no-op.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use std::time::Duration;

/// Aggregated metrics for token client calls.
///
/// Metrics are registered with the global metrics registry on creation.
#[derive(Debug, Clone)]
pub struct Metrics {
    _private: (),
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Create a new metrics instance and register all metric descriptions.
    pub fn new() -> Self {
        Self::register_descriptions();
        Self { _private: () }
    }

    fn register_descriptions() {
        describe_counter!(
            "tokenctl_calls_total",
            "Total token contract calls by method and outcome"
        );
        describe_histogram!(
            "tokenctl_call_duration_seconds",
            "Duration of token contract calls in seconds"
        );
        describe_gauge!(
            "tokenctl_balance",
            "Last observed token balance by owner, in base units"
        );
    }

    /// Record a finished call.
    pub fn record_call(&self, method: &'static str, success: bool, duration: Duration) {
        let outcome = if success { "success" } else { "failure" };
        counter!("tokenctl_calls_total", "method" => method, "outcome" => outcome).increment(1);
        histogram!("tokenctl_call_duration_seconds", "method" => method)
            .record(duration.as_secs_f64());
    }

    /// Set the last observed balance of `owner`.
    pub fn set_balance(&self, owner: &str, balance: u128) {
        gauge!("tokenctl_balance", "owner" => owner.to_string()).set(balance as f64);
    }
}

/// Install the Prometheus metrics exporter and start the HTTP server.
///
/// Returns an error if the server fails to bind to the specified port.
pub fn install_prometheus_exporter(port: u16) -> eyre::Result<()> {
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::net::SocketAddr;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| eyre::eyre!("Failed to install Prometheus exporter: {}", e))?;

    Ok(())
}
