//! Workflow events (§9 design note: "accepts an `EventEmitter` interface,
//! does not touch process-wide singletons") and the port that emits them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::MigrationResult;
use crate::value_objects::Phase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowEventKind {
    PhaseStarted,
    PhaseCompleted,
    PhaseFailed,
    BatchStarted,
    BatchCompleted,
    BatchFailed,
    ValidationIssueRaised,
    WorkflowResumed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowEvent {
    pub project_key: String,
    pub phase: Option<Phase>,
    pub kind: WorkflowEventKind,
    pub message: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl WorkflowEvent {
    pub fn new(
        project_key: impl Into<String>,
        kind: WorkflowEventKind,
        message: impl Into<String>,
        timestamp: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        Self {
            project_key: project_key.into(),
            phase: None,
            kind,
            message: message.into(),
            timestamp,
        }
    }

    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = Some(phase);
        self
    }
}

/// Infrastructure port: sinks workflow events for observability/audit.
/// Kept separate from `tracing` so callers can fan events out to a
/// persistence store, a metrics counter, or both, without the domain
/// depending on either (§9).
#[async_trait]
pub trait EventEmitter: Send + Sync {
    async fn emit(&self, event: WorkflowEvent) -> MigrationResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_phase_sets_optional_field() {
        let now = chrono::Utc::now();
        let event = WorkflowEvent::new("PROJ", WorkflowEventKind::PhaseStarted, "starting", now)
            .with_phase(Phase::Extraction);
        assert_eq!(event.phase, Some(Phase::Extraction));
    }
}
