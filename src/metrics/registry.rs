// Prometheus metrics registry and collectors
// Author: kelexine (https://github.com/kelexine)

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec_with_registry, register_histogram_vec_with_registry, CounterVec,
    Encoder, HistogramVec, Opts, Registry, TextEncoder,
};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // ============================================================================
    // REQUEST METRICS
    // ============================================================================

    /// Total number of translate requests
    pub static ref REQUESTS_TOTAL: CounterVec = register_counter_vec_with_registry!(
        Opts::new("translate_requests_total", "Total number of translate requests"),
        &["model", "mode", "status_code"],
        REGISTRY
    ).unwrap();

    /// Errors by kind (validation_error, upstream_error, timeout, ...)
    pub static ref ERRORS_TOTAL: CounterVec = register_counter_vec_with_registry!(
        Opts::new("translate_errors_total", "Total translate failures by kind"),
        &["kind"],
        REGISTRY
    ).unwrap();

    // ============================================================================
    // UPSTREAM METRICS
    // ============================================================================

    /// Total upstream chat-completion calls
    pub static ref UPSTREAM_CALLS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("upstream_calls_total", "Total upstream chat-completion calls"),
        &["provider", "mode", "status_code"],
        REGISTRY
    ).unwrap();

    /// Time until the upstream answered (headers for streams, full body otherwise)
    pub static ref UPSTREAM_DURATION: HistogramVec = register_histogram_vec_with_registry!(
        prometheus::HistogramOpts::new("upstream_duration_seconds", "Upstream call duration")
            .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
        &["provider", "mode"],
        REGISTRY
    ).unwrap();

    // ============================================================================
    // STREAMING METRICS
    // ============================================================================

    /// Bytes relayed from upstream streams
    pub static ref STREAM_BYTES: CounterVec = register_counter_vec_with_registry!(
        Opts::new("stream_bytes_total", "Total bytes relayed from upstream streams"),
        &["provider"],
        REGISTRY
    ).unwrap();

    /// How relayed streams ended
    pub static ref STREAM_OUTCOMES: CounterVec = register_counter_vec_with_registry!(
        Opts::new("stream_outcomes_total", "Relayed streams by outcome"),
        &["outcome"], // outcome: completed, aborted, error, timeout
        REGISTRY
    ).unwrap();
}

/// Gather all metrics and return as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
