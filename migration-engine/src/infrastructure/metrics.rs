// /////////////////////////////////////////////////////////////////////////////
// Migration Engine
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Prometheus-backed metrics (§12): batch throughput, phase durations, retry
//! and validation-issue counters, exposed on a small HTTP endpoint for
//! scraping.

use std::time::Duration;

use once_cell::sync::Lazy;
use prometheus::{Encoder, HistogramVec, IntCounterVec, Registry, TextEncoder};

static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

static OPERATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        prometheus::Opts::new("migration_operations_total", "Total operations processed, by name and outcome"),
        &["operation", "outcome"],
    )
    .expect("valid metric");
    REGISTRY.register(Box::new(counter.clone())).ok();
    counter
});

static OPERATION_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let histogram = HistogramVec::new(
        prometheus::HistogramOpts::new("migration_operation_duration_seconds", "Operation duration in seconds"),
        &["operation"],
    )
    .expect("valid metric");
    REGISTRY.register(Box::new(histogram.clone())).ok();
    histogram
});

static ENTITIES_MIGRATED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        prometheus::Opts::new("migration_entities_migrated_total", "Entities migrated, by entity type"),
        &["entity_type"],
    )
    .expect("valid metric");
    REGISTRY.register(Box::new(counter.clone())).ok();
    counter
});

static RETRIES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(prometheus::Opts::new("migration_retries_total", "Retry attempts, by operation"), &["operation"])
        .expect("valid metric");
    REGISTRY.register(Box::new(counter.clone())).ok();
    counter
});

static VALIDATION_ISSUES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        prometheus::Opts::new("migration_validation_issues_total", "Validation issues raised, by level"),
        &["level"],
    )
    .expect("valid metric");
    REGISTRY.register(Box::new(counter.clone())).ok();
    counter
});

/// Thin facade over the process-wide Prometheus registry. Cheap to clone
/// (holds only `Lazy` statics), constructed once per process and shared via
/// `Arc` with [`crate::infrastructure::logging::ObservabilityService`].
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsService;

impl MetricsService {
    pub fn new() -> Self {
        Self
    }

    pub fn observe_operation(&self, operation: &str, duration: Duration, success: bool) {
        let outcome = if success { "success" } else { "failure" };
        OPERATIONS_TOTAL.with_label_values(&[operation, outcome]).inc();
        OPERATION_DURATION_SECONDS.with_label_values(&[operation]).observe(duration.as_secs_f64());
    }

    pub fn record_entities_migrated(&self, entity_type: &str, count: u64) {
        ENTITIES_MIGRATED_TOTAL.with_label_values(&[entity_type]).inc_by(count);
    }

    pub fn record_retry(&self, operation: &str) {
        RETRIES_TOTAL.with_label_values(&[operation]).inc();
    }

    pub fn record_validation_issue(&self, level: &str) {
        VALIDATION_ISSUES_TOTAL.with_label_values(&[level]).inc();
    }

    /// Renders the current registry in Prometheus text exposition format,
    /// suitable for a `/metrics` scrape endpoint.
    pub fn render(&self) -> String {
        let metric_families = REGISTRY.gather();
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&metric_families, &mut buffer).expect("encoding never fails for well-formed metrics");
        String::from_utf8(buffer).expect("prometheus text format is always valid utf8")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_includes_recorded_operation() {
        let metrics = MetricsService::new();
        metrics.observe_operation("extract_batch", Duration::from_millis(5), true);
        let rendered = metrics.render();
        assert!(rendered.contains("migration_operations_total"));
    }
}
