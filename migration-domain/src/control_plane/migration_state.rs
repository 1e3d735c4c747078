//! Migration State (C4, §4.4): per-project, per-phase status with ordering
//! guards.

use crate::error::MigrationResult;
use crate::value_objects::PhaseStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationState {
    pub project_key: String,
    pub extraction_status: PhaseStatus,
    pub transformation_status: PhaseStatus,
    pub loading_status: PhaseStatus,
    pub rollback_status: PhaseStatus,
    pub error_message: Option<String>,
    pub is_incremental: bool,
    /// Opaque JSON blob; use `metadata_dict` to parse leniently.
    pub meta_data: String,
    pub last_run_timestamp: Option<DateTime<Utc>>,
}

impl MigrationState {
    /// A fresh state for a project with no prior row (§4.4: "absent row =
    /// all not_started").
    pub fn new(project_key: impl Into<String>) -> Self {
        Self {
            project_key: project_key.into(),
            extraction_status: PhaseStatus::NotStarted,
            transformation_status: PhaseStatus::NotStarted,
            loading_status: PhaseStatus::NotStarted,
            rollback_status: PhaseStatus::NotStarted,
            error_message: None,
            is_incremental: false,
            meta_data: "{}".to_string(),
            last_run_timestamp: None,
        }
    }

    /// §3.3-2: Transform is attempted only when Extract is `completed`.
    pub fn can_extract(&self) -> bool {
        self.extraction_status.can_start()
    }

    pub fn can_transform(&self) -> bool {
        self.extraction_status == PhaseStatus::Completed && self.transformation_status.can_start()
    }

    pub fn can_load(&self) -> bool {
        self.transformation_status == PhaseStatus::Completed && self.loading_status.can_start()
    }

    /// §3.3: Validate may run after any completed phase.
    pub fn can_validate(&self) -> bool {
        matches!(
            PhaseStatus::Completed,
            s if s == self.extraction_status
                || s == self.transformation_status
                || s == self.loading_status
        )
    }

    /// §4.9: rollback is attempted for phases that reached `completed` or
    /// `partial`.
    pub fn can_rollback(&self) -> bool {
        [self.extraction_status, self.transformation_status, self.loading_status]
            .iter()
            .any(|s| matches!(s, PhaseStatus::Completed | PhaseStatus::Partial))
    }

    fn update_status(
        current: &mut PhaseStatus,
        error_slot: &mut Option<String>,
        next: PhaseStatus,
        error: Option<String>,
    ) -> MigrationResult<()> {
        current.validate_transition(next, error.as_deref())?;
        *current = next;
        if error.is_some() {
            *error_slot = error;
        } else if next.is_terminal_success() {
            *error_slot = None;
        }
        Ok(())
    }

    pub fn update_extraction_status(&mut self, next: PhaseStatus, error: Option<String>) -> MigrationResult<()> {
        Self::update_status(&mut self.extraction_status, &mut self.error_message, next, error)
    }

    pub fn update_transformation_status(&mut self, next: PhaseStatus, error: Option<String>) -> MigrationResult<()> {
        Self::update_status(&mut self.transformation_status, &mut self.error_message, next, error)
    }

    pub fn update_loading_status(&mut self, next: PhaseStatus, error: Option<String>) -> MigrationResult<()> {
        Self::update_status(&mut self.loading_status, &mut self.error_message, next, error)
    }

    pub fn update_rollback_status(&mut self, next: PhaseStatus, error: Option<String>) -> MigrationResult<()> {
        Self::update_status(&mut self.rollback_status, &mut self.error_message, next, error)
    }

    /// Parses `meta_data`, returning an empty map on any parse error - never
    /// raises (§4.4).
    pub fn metadata_dict(&self) -> serde_json::Map<String, serde_json::Value> {
        serde_json::from_str(&self.meta_data)
            .ok()
            .and_then(|v: serde_json::Value| v.as_object().cloned())
            .unwrap_or_default()
    }

    pub fn set_metadata_dict(&mut self, map: &serde_json::Map<String, serde_json::Value>) {
        self.meta_data = serde_json::Value::Object(map.clone()).to_string();
    }
}
