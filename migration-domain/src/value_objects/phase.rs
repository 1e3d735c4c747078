//! Migration phases and the per-phase status lattice (§3.2, §3.3).

use crate::error::{MigrationError, MigrationResult};
use serde::{Deserialize, Serialize};

/// One of the orchestrator's top-level state-machine transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Extraction,
    Transformation,
    Loading,
    Validation,
    Rollback,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Extraction => "extraction",
            Phase::Transformation => "transformation",
            Phase::Loading => "loading",
            Phase::Validation => "validation",
            Phase::Rollback => "rollback",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a phase (migration state) or a batch (entity batch), per §3.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    NotStarted,
    InProgress,
    Completed,
    Partial,
    Failed,
    RolledBack,
}

impl PhaseStatus {
    /// §3.3 invariant 1: a phase may transition to `in_progress` only from
    /// `{not_started, failed, partial}`.
    pub fn can_start(&self) -> bool {
        matches!(self, PhaseStatus::NotStarted | PhaseStatus::Failed | PhaseStatus::Partial)
    }

    pub fn is_terminal_success(&self) -> bool {
        matches!(self, PhaseStatus::Completed)
    }

    /// Validates the requested transition against §3.3's ordering invariant
    /// and the "completed status implies no error" rule (§8.1).
    pub fn validate_transition(&self, next: PhaseStatus, error: Option<&str>) -> MigrationResult<()> {
        if next == PhaseStatus::InProgress && !self.can_start() {
            return Err(MigrationError::state_violation(format!(
                "cannot move to in_progress from {:?}",
                self
            )));
        }
        if next == PhaseStatus::Completed && error.is_some() {
            return Err(MigrationError::state_violation(
                "cannot set status to completed with a non-null error",
            ));
        }
        Ok(())
    }
}

impl Default for PhaseStatus {
    fn default() -> Self {
        PhaseStatus::NotStarted
    }
}
