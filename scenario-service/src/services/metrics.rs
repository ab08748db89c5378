//! Prometheus metrics for scenario-service.
//!
//! Tracks provider calls and how much repair the normalizer had to do.

use crate::normalizer::{NormalizationReport, SchemaVariant};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

// Global registry
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub static SCENARIO_REQUESTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static PROVIDER_LATENCY_SECONDS: OnceLock<HistogramVec> = OnceLock::new();
pub static PROVIDER_ERRORS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static FIELDS_DEFAULTED_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static EFFECTS_CLAMPED_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Initialize all metrics. Must be called once at startup.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    let registry = Registry::new();

    let requests = IntCounterVec::new(
        Opts::new("scenario_requests_total", "Total scenario generation requests"),
        &["variant", "outcome"],
    )?;

    let provider_latency = HistogramVec::new(
        HistogramOpts::new(
            "scenario_provider_latency_seconds",
            "Generation provider latency in seconds",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]),
        &["model"],
    )?;

    let provider_errors = IntCounterVec::new(
        Opts::new(
            "scenario_provider_errors_total",
            "Total generation provider errors",
        ),
        &["error_type"],
    )?;

    let fields_defaulted = IntCounterVec::new(
        Opts::new(
            "scenario_fields_defaulted_total",
            "Fields replaced by their default during normalization",
        ),
        &["variant", "field"],
    )?;

    let effects_clamped = IntCounterVec::new(
        Opts::new(
            "scenario_effects_clamped_total",
            "Choice effects clamped into range during normalization",
        ),
        &["variant"],
    )?;

    registry.register(Box::new(requests.clone()))?;
    registry.register(Box::new(provider_latency.clone()))?;
    registry.register(Box::new(provider_errors.clone()))?;
    registry.register(Box::new(fields_defaulted.clone()))?;
    registry.register(Box::new(effects_clamped.clone()))?;

    let _ = REGISTRY.set(registry);
    let _ = SCENARIO_REQUESTS_TOTAL.set(requests);
    let _ = PROVIDER_LATENCY_SECONDS.set(provider_latency);
    let _ = PROVIDER_ERRORS_TOTAL.set(provider_errors);
    let _ = FIELDS_DEFAULTED_TOTAL.set(fields_defaulted);
    let _ = EFFECTS_CLAMPED_TOTAL.set(effects_clamped);

    tracing::info!("Prometheus metrics initialized");
    Ok(())
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();

    let registry = match REGISTRY.get() {
        Some(r) => r,
        None => return "# Metrics registry not initialized\n".to_string(),
    };

    if let Err(e) = encoder.encode(&registry.gather(), &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return format!("# Failed to encode metrics: {}\n", e);
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to convert metrics to UTF-8");
        format!("# Failed to convert metrics to UTF-8: {}\n", e)
    })
}

/// Record a finished scenario request.
pub fn record_request(variant: SchemaVariant, outcome: &str) {
    if let Some(counter) = SCENARIO_REQUESTS_TOTAL.get() {
        counter
            .with_label_values(&[variant.as_str(), outcome])
            .inc();
    }
}

/// Record provider latency.
pub fn record_provider_latency(model: &str, duration_secs: f64) {
    if let Some(histogram) = PROVIDER_LATENCY_SECONDS.get() {
        histogram.with_label_values(&[model]).observe(duration_secs);
    }
}

/// Record a provider error.
pub fn record_provider_error(error_type: &str) {
    if let Some(counter) = PROVIDER_ERRORS_TOTAL.get() {
        counter.with_label_values(&[error_type]).inc();
    }
}

/// Record the repairs made while normalizing one scenario.
pub fn record_normalization(variant: SchemaVariant, report: &NormalizationReport) {
    if let Some(counter) = FIELDS_DEFAULTED_TOTAL.get() {
        for field in &report.defaulted {
            counter
                .with_label_values(&[variant.as_str(), field.as_str()])
                .inc();
        }
    }
    if let Some(counter) = EFFECTS_CLAMPED_TOTAL.get() {
        counter
            .with_label_values(&[variant.as_str()])
            .inc_by(report.clamped_effects as u64);
    }
}
