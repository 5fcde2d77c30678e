//! Metrics collection and exposition.
//!
//! # Metrics
//! - `contact_submissions_total` (counter): by `outcome` (sent, invalid, delivery_failed)
//! - `lazy_image_loads_total` (counter): by `outcome` (loaded, failed, abandoned)
//! - `lazy_image_retries_total` (counter)
//!
//! Recording is a no-op until a recorder is installed.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_submission(outcome: &'static str) {
    metrics::counter!("contact_submissions_total", "outcome" => outcome).increment(1);
}

pub fn record_image_load(outcome: &'static str) {
    metrics::counter!("lazy_image_loads_total", "outcome" => outcome).increment(1);
}

pub fn record_image_retry() {
    metrics::counter!("lazy_image_retries_total").increment(1);
}
