// /////////////////////////////////////////////////////////////////////////////
// Migration Engine
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Tracing setup and the observability service (§12): structured logging via
//! `tracing`/`tracing-subscriber`, plus operation timing and health scoring
//! layered on top of the Prometheus metrics in [`crate::infrastructure::metrics`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, EnvFilter};

use migration_domain::control_plane::workflow_event::{EventEmitter, WorkflowEventKind};
use migration_domain::control_plane::WorkflowEvent;
use migration_domain::repositories::MigrationStore;
use migration_domain::MigrationResult;

use crate::infrastructure::metrics::MetricsService;

/// Initializes the global `tracing` subscriber. `log_level` is a standard
/// `tracing` filter directive (e.g. `"info"`, `"debug,sqlx=warn"`).
pub fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(true).init();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertSeverity {
    Warning,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub severity: AlertSeverity,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemHealth {
    pub status: HealthStatus,
    pub alerts: Vec<Alert>,
    pub error_rate: f64,
    pub average_duration_ms: f64,
}

/// Thresholds at which the system health score degrades, per §12.
#[derive(Debug, Clone, Copy)]
pub struct AlertThresholds {
    pub error_rate_warning: f64,
    pub error_rate_critical: f64,
    pub duration_warning_ms: f64,
    pub duration_critical_ms: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            error_rate_warning: 0.05,
            error_rate_critical: 0.2,
            duration_warning_ms: 2_000.0,
            duration_critical_ms: 10_000.0,
        }
    }
}

#[derive(Default)]
struct PerformanceTracker {
    durations_ms: HashMap<String, Vec<f64>>,
    failures: HashMap<String, u64>,
    total: HashMap<String, u64>,
}

impl PerformanceTracker {
    fn record(&mut self, operation: &str, duration: Duration, success: bool) {
        self.durations_ms.entry(operation.to_string()).or_default().push(duration.as_secs_f64() * 1000.0);
        *self.total.entry(operation.to_string()).or_insert(0) += 1;
        if !success {
            *self.failures.entry(operation.to_string()).or_insert(0) += 1;
        }
    }

    fn error_rate(&self) -> f64 {
        let total: u64 = self.total.values().sum();
        if total == 0 {
            return 0.0;
        }
        let failures: u64 = self.failures.values().sum();
        failures as f64 / total as f64
    }

    fn average_duration_ms(&self) -> f64 {
        let all: Vec<f64> = self.durations_ms.values().flatten().copied().collect();
        if all.is_empty() {
            return 0.0;
        }
        all.iter().sum::<f64>() / all.len() as f64
    }
}

/// Wraps operation timing, a Prometheus-backed [`MetricsService`], and
/// threshold-based health scoring for the orchestrator's phases and batches.
pub struct ObservabilityService {
    metrics: std::sync::Arc<MetricsService>,
    tracker: RwLock<PerformanceTracker>,
    thresholds: AlertThresholds,
}

/// RAII guard returned by [`ObservabilityService::start_operation`]; drop it
/// (or call [`OperationGuard::finish`]) to record the duration and outcome.
pub struct OperationGuard<'a> {
    service: &'a ObservabilityService,
    operation: String,
    started_at: Instant,
    finished: bool,
}

impl<'a> OperationGuard<'a> {
    pub fn finish(mut self, success: bool) {
        self.record(success);
        self.finished = true;
    }

    fn record(&mut self, success: bool) {
        let elapsed = self.started_at.elapsed();
        self.service.tracker.write().record(&self.operation, elapsed, success);
        self.service.metrics.observe_operation(&self.operation, elapsed, success);
    }
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.record(true);
        }
    }
}

impl ObservabilityService {
    pub fn new(metrics: std::sync::Arc<MetricsService>) -> Self {
        Self::new_with_thresholds(metrics, AlertThresholds::default())
    }

    pub fn new_with_thresholds(metrics: std::sync::Arc<MetricsService>, thresholds: AlertThresholds) -> Self {
        Self {
            metrics,
            tracker: RwLock::new(PerformanceTracker::default()),
            thresholds,
        }
    }

    pub fn start_operation(&self, operation: impl Into<String>) -> OperationGuard<'_> {
        OperationGuard {
            service: self,
            operation: operation.into(),
            started_at: Instant::now(),
            finished: false,
        }
    }

    /// §12: scores overall health from recent error rate and average
    /// operation duration against [`AlertThresholds`].
    pub fn get_system_health(&self) -> SystemHealth {
        let tracker = self.tracker.read();
        let error_rate = tracker.error_rate();
        let average_duration_ms = tracker.average_duration_ms();
        let mut alerts = Vec::new();
        let mut status = HealthStatus::Healthy;

        if error_rate >= self.thresholds.error_rate_critical {
            status = HealthStatus::Unhealthy;
            alerts.push(Alert {
                severity: AlertSeverity::Critical,
                message: format!("error rate {error_rate:.2} exceeds critical threshold"),
            });
        } else if error_rate >= self.thresholds.error_rate_warning {
            status = HealthStatus::Degraded;
            alerts.push(Alert {
                severity: AlertSeverity::Warning,
                message: format!("error rate {error_rate:.2} exceeds warning threshold"),
            });
        }

        if average_duration_ms >= self.thresholds.duration_critical_ms {
            status = HealthStatus::Unhealthy;
            alerts.push(Alert {
                severity: AlertSeverity::Critical,
                message: format!("average duration {average_duration_ms:.0}ms exceeds critical threshold"),
            });
        } else if average_duration_ms >= self.thresholds.duration_warning_ms && status == HealthStatus::Healthy {
            status = HealthStatus::Degraded;
            alerts.push(Alert {
                severity: AlertSeverity::Warning,
                message: format!("average duration {average_duration_ms:.0}ms exceeds warning threshold"),
            });
        }

        SystemHealth {
            status,
            alerts,
            error_rate,
            average_duration_ms,
        }
    }
}

/// [`EventEmitter`] that logs every [`WorkflowEvent`] at the level matching
/// its [`WorkflowEventKind`] and persists it via `MigrationStore` for later
/// audit (§4.4 emits an event per phase/batch transition).
pub struct StoreEventEmitter {
    store: Arc<dyn MigrationStore>,
}

impl StoreEventEmitter {
    pub fn new(store: Arc<dyn MigrationStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl EventEmitter for StoreEventEmitter {
    async fn emit(&self, event: WorkflowEvent) -> MigrationResult<()> {
        match event.kind {
            WorkflowEventKind::PhaseFailed | WorkflowEventKind::BatchFailed => {
                tracing::warn!(project_key = %event.project_key, phase = ?event.phase, "{}", event.message);
            }
            WorkflowEventKind::ValidationIssueRaised => {
                tracing::warn!(project_key = %event.project_key, "{}", event.message);
            }
            _ => {
                tracing::info!(project_key = %event.project_key, phase = ?event.phase, "{}", event.message);
            }
        }
        self.store.save_workflow_event(&event).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn healthy_with_no_operations() {
        let obs = ObservabilityService::new(std::sync::Arc::new(MetricsService::new()));
        let health = obs.get_system_health();
        assert_eq!(health.status, HealthStatus::Healthy);
        assert!(health.alerts.is_empty());
    }

    #[test]
    fn degrades_on_high_error_rate() {
        let obs = ObservabilityService::new(std::sync::Arc::new(MetricsService::new()));
        for i in 0..10 {
            obs.start_operation("load_batch").finish(i >= 3);
        }
        let health = obs.get_system_health();
        assert_ne!(health.status, HealthStatus::Healthy);
    }
}
