// Metrics module for Prometheus observability
// Author: kelexine (https://github.com/kelexine)

mod registry;

pub use registry::{
    gather_metrics, ERRORS_TOTAL, REQUESTS_TOTAL, STREAM_BYTES, STREAM_OUTCOMES, UPSTREAM_CALLS,
    UPSTREAM_DURATION,
};

/// Helper to record a finished translate request
pub fn record_request(model: &str, mode: &str, status_code: u16) {
    REQUESTS_TOTAL
        .with_label_values(&[model, mode, &status_code.to_string()])
        .inc();
}

pub fn record_error(kind: &str) {
    ERRORS_TOTAL.with_label_values(&[kind]).inc();
}

/// Helper to record upstream call metrics
pub fn record_upstream_call(provider: &str, streaming: bool, status_code: u16, duration_secs: f64) {
    let mode = mode_label(streaming);
    UPSTREAM_CALLS
        .with_label_values(&[provider, mode, &status_code.to_string()])
        .inc();

    UPSTREAM_DURATION
        .with_label_values(&[provider, mode])
        .observe(duration_secs);
}

pub fn record_stream_bytes(provider: &str, bytes: usize) {
    STREAM_BYTES
        .with_label_values(&[provider])
        .inc_by(bytes as f64);
}

pub fn record_stream_outcome(outcome: &str) {
    STREAM_OUTCOMES.with_label_values(&[outcome]).inc();
}

pub fn mode_label(streaming: bool) -> &'static str {
    if streaming {
        "stream"
    } else {
        "buffered"
    }
}
