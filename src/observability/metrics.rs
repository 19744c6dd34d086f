//! Metrics collection and exposition.
//!
//! # Metrics
//! - `mvc_dispatch_requests_total` (counter): dispatches by controller, outcome
//! - `mvc_dispatch_duration_seconds` (histogram): time spent in `handle`
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; without an installed recorder the
//!   calls are no-ops, so library users and tests pay nothing
//! - The binary installs the Prometheus exporter when enabled in config

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Record one finished dispatch.
pub fn record_dispatch(controller: &str, outcome: &'static str, started: Instant) {
    let labels = [
        ("controller", controller.to_string()),
        ("outcome", outcome.to_string()),
    ];
    metrics::counter!("mvc_dispatch_requests_total", &labels).increment(1);
    metrics::histogram!("mvc_dispatch_duration_seconds", &labels)
        .record(started.elapsed().as_secs_f64());
}

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}
