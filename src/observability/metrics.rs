//! Metrics collection and exposition.
//!
//! # Metrics
//! - `visits_fetch_total` (counter): upstream fetches by outcome
//! - `visits_fetch_duration_seconds` (histogram): per-location fetch latency
//! - `visits_runs_total` (counter): job runs by status
//! - `visits_run_duration_seconds` (histogram): end-to-end run latency
//! - `visits_inserted_records_total` (counter): rows written to the store
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_fetch(outcome: &'static str, start: Instant) {
    counter!("visits_fetch_total", "outcome" => outcome).increment(1);
    histogram!("visits_fetch_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_run(status: &'static str, start: Instant) {
    counter!("visits_runs_total", "status" => status).increment(1);
    histogram!("visits_run_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_inserted(records: usize) {
    counter!("visits_inserted_records_total").increment(records as u64);
}
