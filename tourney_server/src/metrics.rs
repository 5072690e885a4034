//! Prometheus metrics for monitoring the tournament server.
//!
//! When `METRICS_BIND` is set, metrics are exposed in Prometheus text format
//! for scraping. Without an installed recorder the calls below are no-ops.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use tourney_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::commands_executed_total("lock_tournament");
//! metrics::active_tournaments(3);
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
pub fn http_requests_total(method: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// Tournament Metrics
// ============================================================================

/// Increment the counter of commands that changed state.
pub fn commands_executed_total(command: &str) {
    metrics::counter!("tournament_commands_executed_total",
        "command" => command.to_string()
    )
    .increment(1);
}

/// Increment the counter of commands refused by authorization or the engine.
pub fn commands_rejected_total(command: &str, reason: &str) {
    metrics::counter!("tournament_commands_rejected_total",
        "command" => command.to_string(),
        "reason" => reason.to_string()
    )
    .increment(1);
}

/// Increment match results submitted.
pub fn results_submitted_total(double_loss: bool) {
    metrics::counter!("tournament_results_submitted_total",
        "double_loss" => double_loss.to_string()
    )
    .increment(1);
}

/// Set current count of tournaments that have not finished.
pub fn active_tournaments(count: usize) {
    metrics::gauge!("active_tournaments").set(count as f64);
}
