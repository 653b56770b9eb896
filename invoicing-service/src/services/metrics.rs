//! Prometheus metrics for invoicing-service.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram, register_int_counter, CounterVec, Histogram,
    IntCounter, TextEncoder,
};

/// Store mutations by entity and operation.
pub static STORE_MUTATIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "invoicing_store_mutations_total",
        "Total number of committed store mutations",
        &["entity", "operation"]
    )
    .expect("Failed to register store_mutations_total")
});

/// Invoice documents by outcome.
pub static DOCUMENTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "invoicing_documents_total",
        "Total number of invoice documents by outcome",
        &["outcome"] // generated, rejected, busy, failed
    )
    .expect("Failed to register documents_total")
});

/// Document render duration histogram.
pub static DOCUMENT_RENDER_DURATION: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "invoicing_document_render_duration_seconds",
        "Invoice document render duration in seconds",
        vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]
    )
    .expect("Failed to register document_render_duration")
});

/// Startups that fell back to seed data.
pub static SNAPSHOT_LOAD_FALLBACKS: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "invoicing_snapshot_load_fallbacks_total",
        "Number of times the stored snapshot could not be used"
    )
    .expect("Failed to register snapshot_load_fallbacks")
});

/// Error counter for alerting.
pub static ERRORS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "invoicing_errors_total",
        "Total number of errors by type",
        &["error_type"]
    )
    .expect("Failed to register errors_total")
});

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&STORE_MUTATIONS_TOTAL);
    Lazy::force(&DOCUMENTS_TOTAL);
    Lazy::force(&DOCUMENT_RENDER_DURATION);
    Lazy::force(&SNAPSHOT_LOAD_FALLBACKS);
    Lazy::force(&ERRORS_TOTAL);
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_default()
}
