//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use std::sync::Once;

use lazy_static::lazy_static;
use prometheus::{Encoder, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// Content type of [`render`] output
pub const CONTENT_TYPE: &str = prometheus::TEXT_FORMAT;

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // Upstream (data.gov.in) Metrics
    pub static ref UPSTREAM_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("mgnrega_upstream_requests_total", "Total number of data.gov.in requests"),
        &["status"]
    ).expect("metric can be created");
    pub static ref UPSTREAM_REQUEST_DURATION_SECONDS: prometheus::Histogram = prometheus::Histogram::with_opts(
        HistogramOpts::new(
            "mgnrega_upstream_request_duration_seconds",
            "data.gov.in request duration in seconds"
        ).buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0])
    ).expect("metric can be created");
    pub static ref UPSTREAM_YEARS_SKIPPED_TOTAL: IntCounter = IntCounter::new(
        "mgnrega_upstream_years_skipped_total",
        "Financial years skipped because the upstream request failed"
    ).expect("metric can be created");

    // Ingest Metrics
    pub static ref RECORDS_INGESTED_TOTAL: IntCounter = IntCounter::new(
        "mgnrega_records_ingested_total",
        "Total number of district records written to the store"
    ).expect("metric can be created");
    pub static ref MALFORMED_METRIC_VALUES_TOTAL: IntCounter = IntCounter::new(
        "mgnrega_malformed_metric_values_total",
        "Numeric fields that could not be parsed and were stored as 0"
    ).expect("metric can be created");

    // Cache Metrics
    pub static ref FETCH_CACHE_HITS_TOTAL: IntCounter = IntCounter::new(
        "mgnrega_fetch_cache_hits_total",
        "Fetch requests served from the staleness cache"
    ).expect("metric can be created");
    pub static ref FETCH_CACHE_MISSES_TOTAL: IntCounter = IntCounter::new(
        "mgnrega_fetch_cache_misses_total",
        "Fetch requests that ran the full pipeline"
    ).expect("metric can be created");
    pub static ref FETCH_CACHE_SIZE: IntGauge = IntGauge::new(
        "mgnrega_fetch_cache_size",
        "Number of records held by the fetch cache"
    ).expect("metric can be created");

    // Error Metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("mgnrega_errors_total", "Total number of error responses"),
        &["error_type"]
    ).expect("metric can be created");
}

static INIT: Once = Once::new();

/// Initialize metrics registry.
///
/// Safe to call more than once; only the first call registers.
pub fn init_metrics() {
    INIT.call_once(|| {
        REGISTRY
            .register(Box::new(UPSTREAM_REQUESTS_TOTAL.clone()))
            .expect("UPSTREAM_REQUESTS_TOTAL can be registered");
        REGISTRY
            .register(Box::new(UPSTREAM_REQUEST_DURATION_SECONDS.clone()))
            .expect("UPSTREAM_REQUEST_DURATION_SECONDS can be registered");
        REGISTRY
            .register(Box::new(UPSTREAM_YEARS_SKIPPED_TOTAL.clone()))
            .expect("UPSTREAM_YEARS_SKIPPED_TOTAL can be registered");
        REGISTRY
            .register(Box::new(RECORDS_INGESTED_TOTAL.clone()))
            .expect("RECORDS_INGESTED_TOTAL can be registered");
        REGISTRY
            .register(Box::new(MALFORMED_METRIC_VALUES_TOTAL.clone()))
            .expect("MALFORMED_METRIC_VALUES_TOTAL can be registered");
        REGISTRY
            .register(Box::new(FETCH_CACHE_HITS_TOTAL.clone()))
            .expect("FETCH_CACHE_HITS_TOTAL can be registered");
        REGISTRY
            .register(Box::new(FETCH_CACHE_MISSES_TOTAL.clone()))
            .expect("FETCH_CACHE_MISSES_TOTAL can be registered");
        REGISTRY
            .register(Box::new(FETCH_CACHE_SIZE.clone()))
            .expect("FETCH_CACHE_SIZE can be registered");
        REGISTRY
            .register(Box::new(ERRORS_TOTAL.clone()))
            .expect("ERRORS_TOTAL can be registered");

        tracing::info!("Metrics registry initialized");
    });
}

/// Encode every registered metric in Prometheus text format.
pub fn render() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&REGISTRY.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
