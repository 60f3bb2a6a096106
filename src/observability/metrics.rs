//! Metrics collection and exposition.
//!
//! # Metrics
//! - `zipstream_requests_total` (counter): archive requests by outcome
//! - `zipstream_entries_total` (counter): entries by result (written, skipped)
//! - `zipstream_source_bytes_total` (counter): source bytes copied into entries
//! - `zipstream_stream_duration_seconds` (histogram): time to produce an archive
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an exporter it is a no-op
//! - Exporter is the Prometheus HTTP listener, enabled from config

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics endpoint"),
    }
}

/// Count an inbound archive request. `outcome` is `streamed`, `invalid` or `malformed`.
pub fn record_request(outcome: &'static str) {
    ::metrics::counter!("zipstream_requests_total", "outcome" => outcome).increment(1);
}

pub fn record_entry_written(bytes: u64) {
    ::metrics::counter!("zipstream_entries_total", "result" => "written").increment(1);
    ::metrics::counter!("zipstream_source_bytes_total").increment(bytes);
}

pub fn record_entry_skipped() {
    ::metrics::counter!("zipstream_entries_total", "result" => "skipped").increment(1);
}

pub fn record_stream(started: Instant, ok: bool) {
    let result = if ok { "ok" } else { "error" };
    ::metrics::histogram!("zipstream_stream_duration_seconds", "result" => result)
        .record(started.elapsed().as_secs_f64());
}
