//! Metrics collection and exposition.
//!
//! # Metrics
//! - `hub_requests_total` (counter): requests by method, status
//! - `hub_request_duration_seconds` (histogram): latency distribution
//! - `hub_registrations_total` (counter): registration attempts by outcome
//! - `hub_module_loads_total` (counter): module factory runs by outcome
//!
//! Recording is a no-op until `init_metrics` installs the Prometheus recorder.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "hub_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("hub_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_registration(outcome: &'static str) {
    metrics::counter!("hub_registrations_total", "outcome" => outcome).increment(1);
}

pub fn record_module_load(succeeded: bool) {
    let outcome = if succeeded { "loaded" } else { "failed" };
    metrics::counter!("hub_module_loads_total", "outcome" => outcome).increment(1);
}
