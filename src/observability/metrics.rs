//! Metrics collection and exposition.
//!
//! # Metrics
//! - `paragliding_requests_total` (counter): requests by method, route pattern, status
//! - `paragliding_request_duration_seconds` (histogram): latency distribution
//! - `paragliding_webhook_deliveries_total` (counter): deliveries by outcome
//!
//! # Design Decisions
//! - Unmatched requests are labelled `route="none"` to bound cardinality
//! - Without an installed recorder every call is a no-op

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exporter on `addr`. Must run inside a tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!("paragliding_requests_total", &labels).increment(1);
    metrics::histogram!("paragliding_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_webhook_delivery(outcome: &'static str) {
    metrics::counter!("paragliding_webhook_deliveries_total", "outcome" => outcome).increment(1);
}
