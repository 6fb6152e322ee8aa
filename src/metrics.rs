//! Reader-side Prometheus metrics (spec §6: "emit a latency observation
//! per lookup tagged with family and table; emit a counter increment for
//! full-table scans tagged identically"). Named per the operational
//! contract in `SPEC_FULL.md`.
//!
//! The teacher registers metrics declaratively through an internal
//! `metrics_group!` macro (`spacetimedb-metrics`, not a published crate);
//! here we register the same shape of gauges/counters/histograms directly
//! against the default `prometheus` registry, which is the idiomatic way
//! to do this without that internal tooling.

use once_cell::sync::Lazy;
use prometheus::{register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec};

pub struct Metrics {
    pub lookup_duration_seconds: HistogramVec,
    pub full_table_scans_total: IntCounterVec,
    pub pk_cache_invalidations_total: IntCounterVec,
}

pub static METRICS: Lazy<Metrics> = Lazy::new(|| Metrics {
    lookup_duration_seconds: register_histogram_vec!(
        "ctlstore_ldb_lookup_duration_seconds",
        "Latency of a single LDB Reader lookup",
        &["family", "table", "op"],
        vec![10e-6, 50e-6, 100e-6, 500e-6, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]
    )
    .expect("ctlstore_ldb_lookup_duration_seconds registers exactly once"),
    full_table_scans_total: register_int_counter_vec!(
        "ctlstore_ldb_full_table_scans_total",
        "Count of prefix scans issued with a zero-length prefix",
        &["family", "table"]
    )
    .expect("ctlstore_ldb_full_table_scans_total registers exactly once"),
    pk_cache_invalidations_total: register_int_counter_vec!(
        "ctlstore_ldb_pk_cache_invalidations_total",
        "Count of primary-key cache entries invalidated after a store execution error",
        &["table"]
    )
    .expect("ctlstore_ldb_pk_cache_invalidations_total registers exactly once"),
});

/// RAII timer that observes elapsed seconds into a labeled histogram on
/// drop, regardless of which return path is taken.
pub struct LatencyTimer {
    histogram: prometheus::Histogram,
    start: std::time::Instant,
}

impl LatencyTimer {
    pub fn start(family: &str, table: &str, op: &str) -> Self {
        Self {
            histogram: METRICS.lookup_duration_seconds.with_label_values(&[family, table, op]),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}
