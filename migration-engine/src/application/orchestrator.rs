// /////////////////////////////////////////////////////////////////////////////
// Migration Engine
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! The top-level workflow state machine (§3.3, §4.4, §9): sequences
//! Extract -> Transform -> Load against `MigrationState`'s ordering guards,
//! emits audit events, and is resumable by construction - every phase
//! checks the persisted state before running, so calling it twice after a
//! crash just continues where it left off.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use tokio::sync::Mutex;

use migration_domain::control_plane::workflow_event::WorkflowEventKind;
use migration_domain::control_plane::{MigrationState, WorkflowEvent};
pub use migration_domain::control_plane::workflow_event::EventEmitter;
use migration_domain::repositories::{MigrationStore, TargetClient};
use migration_domain::validation::ValidationContext;
use migration_domain::value_objects::{ExecutionStatus, MappingType, Phase, PhaseStatus, ValidationPhase, ValidationScope};
use migration_domain::{MigrationError, MigrationResult};

use crate::application::etl_executor::{EtlExecutor, PhaseOutcome};
use crate::application::rollback::rollback_migration;
use crate::application::validation_hooks::{view, ValidationHooks};
use crate::infrastructure::logging::ObservabilityService;

/// The full Extract -> Transform -> Load sequence, for callers that want
/// every phase `run_workflow`/`resume_workflow`'s state guards allow.
pub const ALL_PHASES: [Phase; 3] = [Phase::Extraction, Phase::Transformation, Phase::Loading];

/// Combines several per-entity-type [`PhaseOutcome`]s (e.g. folders + test
/// cases + test cycles + test executions, all within Extraction) into the
/// single `PhaseStatus` `MigrationState` tracks for that phase.
fn combine(outcomes: &[PhaseOutcome]) -> PhaseStatus {
    if outcomes.iter().all(|o| o.status == PhaseStatus::Completed) {
        PhaseStatus::Completed
    } else if outcomes.iter().any(|o| o.processed > 0) {
        PhaseStatus::Partial
    } else {
        PhaseStatus::Failed
    }
}

fn outcomes_error_message(outcomes: &[PhaseOutcome]) -> Option<String> {
    let failed: u32 = outcomes.iter().map(|o| o.failed).sum();
    if failed == 0 {
        None
    } else {
        Some(format!("{failed} entities failed"))
    }
}

pub struct Orchestrator {
    store: Arc<dyn MigrationStore>,
    target: Arc<dyn TargetClient>,
    etl: EtlExecutor,
    events: Arc<dyn EventEmitter>,
    observability: Arc<ObservabilityService>,
    validation: Mutex<ValidationHooks>,
    target_project_id: String,
    /// §9: whether the validation hooks run at all (`WorkflowConfig::validation_enabled`).
    validation_enabled: bool,
    /// §4.9: whether `rollback` is permitted for this workflow.
    rollback_enabled: bool,
    /// §4.8: per-phase wall-clock budget. A phase exceeding this is failed
    /// rather than left to hang.
    phase_timeout: Duration,
}

impl Orchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<dyn MigrationStore>,
        target: Arc<dyn TargetClient>,
        etl: EtlExecutor,
        events: Arc<dyn EventEmitter>,
        observability: Arc<ObservabilityService>,
        validation: ValidationHooks,
        target_project_id: impl Into<String>,
        validation_enabled: bool,
        rollback_enabled: bool,
        phase_timeout: Duration,
    ) -> Self {
        Self {
            store,
            target,
            etl,
            events,
            observability,
            validation: Mutex::new(validation),
            target_project_id: target_project_id.into(),
            validation_enabled,
            rollback_enabled,
            phase_timeout,
        }
    }

    async fn emit(&self, project_key: &str, phase: Phase, kind: WorkflowEventKind, message: impl Into<String>) -> MigrationResult<()> {
        let event = WorkflowEvent::new(project_key, kind, message, Utc::now()).with_phase(phase);
        self.events.emit(event).await
    }

    async fn load_state(&self, project_key: &str) -> MigrationResult<MigrationState> {
        self.store.get_migration_state(project_key).await
    }

    async fn save_state(&self, state: &MigrationState) -> MigrationResult<()> {
        self.store.update_migration_state(state).await
    }

    /// Bounds one phase's work to `phase_timeout` (§4.8); an expired phase
    /// fails the same way a processing error would.
    async fn with_phase_timeout<T>(&self, phase: Phase, fut: impl std::future::Future<Output = MigrationResult<T>>) -> MigrationResult<T> {
        match tokio::time::timeout(self.phase_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(MigrationError::TimeoutError(format!("{phase:?} exceeded {:?}", self.phase_timeout))),
        }
    }

    async fn run_extraction(&self, project_key: &str, is_incremental: bool) -> MigrationResult<(PhaseStatus, Option<String>)> {
        self.etl.extract_project(project_key).await?;
        let folders = self.etl.extract_folders(project_key, is_incremental).await?;
        let cases = self.etl.extract_test_cases(project_key, is_incremental).await?;
        let cycles = self.etl.extract_test_cycles(project_key, is_incremental).await?;
        let executions = self.etl.extract_test_executions(project_key, is_incremental).await?;
        let outcomes = [folders, cases, cycles, executions];
        Ok((combine(&outcomes), outcomes_error_message(&outcomes)))
    }

    async fn run_transformation(&self, project_key: &str) -> MigrationResult<(PhaseStatus, Option<String>)> {
        self.etl.transform_project(project_key, &self.target_project_id).await?;
        let modules = self.etl.transform_folders_to_modules(project_key).await?;
        let cases = self.etl.transform_test_cases(project_key).await?;
        let cycles = self.etl.transform_test_cycles(project_key).await?;
        let executions = self.etl.transform_test_executions(project_key).await?;
        let outcomes = [modules, cases, cycles, executions];
        Ok((combine(&outcomes), outcomes_error_message(&outcomes)))
    }

    /// §4.6 `PreMigration` rules: required fields, key uniqueness, and
    /// folder-reference integrity over whatever Extraction just stored.
    /// `TestStepValidationRule` runs against each test case's own `steps`
    /// view, which matches `TestCaseStep` scope's shape.
    async fn run_pre_migration_validation(&self, project_key: &str) -> MigrationResult<()> {
        let now = Utc::now();
        let folders = self.store.get_folders(project_key).await?;
        let cases = self.store.get_test_cases(project_key).await?;
        let cycles = self.store.get_test_cycles(project_key).await?;

        let folder_ids: HashSet<String> = folders.iter().map(|f| f.source_id.clone()).collect();
        let case_keys: Vec<String> = cases.iter().map(|c| c.key.clone()).collect();
        let cycle_keys: Vec<String> = cycles.iter().map(|c| c.key.clone()).collect();

        let mut hooks = self.validation.lock().await;

        for folder in &folders {
            hooks
                .validate(self.store.as_ref(), project_key, &view(folder), ValidationScope::Folder, ValidationPhase::PreMigration, &ValidationContext::new(), now)
                .await?;
        }

        for (index, case) in cases.iter().enumerate() {
            let other_keys = case_keys.iter().enumerate().filter(|(i, _)| *i != index).map(|(_, k)| k.clone());
            let ctx = ValidationContext::new().with_known_ids(folder_ids.clone()).with_other_values(other_keys);
            let entity = view(case);
            hooks
                .validate(self.store.as_ref(), project_key, &entity, ValidationScope::TestCase, ValidationPhase::PreMigration, &ctx, now)
                .await?;
            hooks
                .validate(self.store.as_ref(), project_key, &entity, ValidationScope::TestCaseStep, ValidationPhase::PreMigration, &ValidationContext::new(), now)
                .await?;
        }

        for (index, cycle) in cycles.iter().enumerate() {
            let other_keys = cycle_keys.iter().enumerate().filter(|(i, _)| *i != index).map(|(_, k)| k.clone());
            let ctx = ValidationContext::new().with_known_ids(folder_ids.clone()).with_other_values(other_keys);
            hooks
                .validate(self.store.as_ref(), project_key, &view(cycle), ValidationScope::TestCycle, ValidationPhase::PreMigration, &ctx, now)
                .await?;
        }

        Ok(())
    }

    /// §4.6 `CustomFieldTransformationRule`: the Source custom fields carried
    /// on each test case/cycle against the Target-shaped `properties` the
    /// Transformation phase just produced.
    async fn run_transformation_validation(&self, project_key: &str) -> MigrationResult<()> {
        let now = Utc::now();
        let cases = self.store.get_test_cases(project_key).await?;
        let transformed_cases = self.store.get_transformed_test_cases(project_key).await?;
        let cycles = self.store.get_test_cycles(project_key).await?;
        let transformed_cycles = self.store.get_transformed_test_cycles(project_key).await?;

        let mut hooks = self.validation.lock().await;

        for case in &cases {
            let Some(target_case) = transformed_cases.iter().find(|t| t.source_id == case.source_id) else {
                continue;
            };
            let mut ctx = ValidationContext::new();
            ctx.transformed_custom_fields = target_case.properties.clone().into_iter().collect();
            hooks
                .validate(self.store.as_ref(), project_key, &view(case), ValidationScope::CustomField, ValidationPhase::Transformation, &ctx, now)
                .await?;
        }

        for cycle in &cycles {
            let Some(target_cycle) = transformed_cycles.iter().find(|t| t.source_id == cycle.source_id) else {
                continue;
            };
            let mut ctx = ValidationContext::new();
            ctx.transformed_custom_fields = target_cycle.properties.clone().into_iter().collect();
            hooks
                .validate(self.store.as_ref(), project_key, &view(cycle), ValidationScope::CustomField, ValidationPhase::Transformation, &ctx, now)
                .await?;
        }

        Ok(())
    }

    /// §4.6 Loading-phase rules: referential integrity of each execution's
    /// mapped test case/cycle, status-mapping consistency, and source/target
    /// data-integrity comparisons over test cases and cycles.
    async fn run_loading_validation(&self, project_key: &str) -> MigrationResult<()> {
        let now = Utc::now();
        let executions = self.store.get_test_executions(project_key).await?;
        let case_mappings = self.store.get_entity_mappings(project_key, MappingType::TestcaseToTestcase).await?;
        let cycle_mappings = self.store.get_entity_mappings(project_key, MappingType::CycleToCycle).await?;

        let mut known_ids: HashSet<String> = HashSet::new();
        known_ids.extend(case_mappings.into_iter().map(|m| m.source_id));
        known_ids.extend(cycle_mappings.into_iter().map(|m| m.source_id));

        let mut hooks = self.validation.lock().await;

        for execution in &executions {
            let target_status = ExecutionStatus::from_source_value(&execution.status);
            let target_status = serde_json::to_value(target_status).unwrap_or(serde_json::Value::Null);
            let target_status_str = target_status.as_str().unwrap_or_default().to_string();

            let mut ctx = ValidationContext::new()
                .with_known_ids(known_ids.clone())
                .with_source_target(json!({"status": execution.status}), json!({"status": target_status_str}));
            ctx.status_mappings.insert(execution.status.clone(), target_status_str);

            hooks
                .validate(self.store.as_ref(), project_key, &view(execution), ValidationScope::TestExecution, ValidationPhase::Loading, &ctx, now)
                .await?;
        }

        let cases = self.store.get_test_cases(project_key).await?;
        let transformed_cases = self.store.get_transformed_test_cases(project_key).await?;
        for case in &cases {
            let Some(target_case) = transformed_cases.iter().find(|t| t.source_id == case.source_id) else {
                continue;
            };
            let ctx = ValidationContext::new().with_source_target(view(case), view(target_case));
            hooks
                .validate(self.store.as_ref(), project_key, &serde_json::Value::Null, ValidationScope::Relationship, ValidationPhase::Loading, &ctx, now)
                .await?;
        }

        let cycles = self.store.get_test_cycles(project_key).await?;
        let transformed_cycles = self.store.get_transformed_test_cycles(project_key).await?;
        for cycle in &cycles {
            let Some(target_cycle) = transformed_cycles.iter().find(|t| t.source_id == cycle.source_id) else {
                continue;
            };
            let ctx = ValidationContext::new().with_source_target(view(cycle), view(target_cycle));
            hooks
                .validate(self.store.as_ref(), project_key, &serde_json::Value::Null, ValidationScope::Relationship, ValidationPhase::Loading, &ctx, now)
                .await?;
        }

        Ok(())
    }

    async fn run_loading(&self, project_key: &str) -> MigrationResult<(PhaseStatus, Option<String>)> {
        let modules = self.etl.load_modules(project_key).await?;
        let cases = self.etl.load_test_cases(project_key).await?;
        let cycles = self.etl.load_test_cycles(project_key).await?;
        let executions = self.etl.load_test_executions(project_key).await?;
        let outcomes = [modules, cases, cycles, executions];
        Ok((combine(&outcomes), outcomes_error_message(&outcomes)))
    }

    /// Runs every phase named in `phases` that the current `MigrationState`
    /// also allows, in order (§3.3-2: Transform only after Extract
    /// `completed`, Load only after Transform `completed`). Safe to call
    /// repeatedly - a phase already `completed`, or not requested, is
    /// simply skipped.
    pub async fn run_workflow(&self, project_key: &str, is_incremental: bool, phases: &[Phase]) -> MigrationResult<MigrationState> {
        let mut state = self.load_state(project_key).await?;
        state.is_incremental = is_incremental;

        if phases.contains(&Phase::Extraction) && state.can_extract() {
            let guard = self.observability.start_operation("phase_extraction");
            self.emit(project_key, Phase::Extraction, WorkflowEventKind::PhaseStarted, "extraction started").await?;
            state.update_extraction_status(PhaseStatus::InProgress, None)?;
            self.save_state(&state).await?;

            match self.with_phase_timeout(Phase::Extraction, self.run_extraction(project_key, is_incremental)).await {
                Ok((status, error)) => {
                    state.update_extraction_status(status, error)?;
                    guard.finish(status == PhaseStatus::Completed);
                }
                Err(err) => {
                    state.update_extraction_status(PhaseStatus::Failed, Some(err.to_string()))?;
                    guard.finish(false);
                    self.save_state(&state).await?;
                    self.emit(project_key, Phase::Extraction, WorkflowEventKind::PhaseFailed, err.to_string()).await?;
                    return Err(err);
                }
            }
            if self.validation_enabled {
                self.run_pre_migration_validation(project_key).await?;
            }
            self.save_state(&state).await?;
            self.emit(project_key, Phase::Extraction, WorkflowEventKind::PhaseCompleted, format!("extraction {:?}", state.extraction_status)).await?;
        }

        if phases.contains(&Phase::Transformation) && state.can_transform() {
            let guard = self.observability.start_operation("phase_transformation");
            self.emit(project_key, Phase::Transformation, WorkflowEventKind::PhaseStarted, "transformation started").await?;
            state.update_transformation_status(PhaseStatus::InProgress, None)?;
            self.save_state(&state).await?;

            match self.with_phase_timeout(Phase::Transformation, self.run_transformation(project_key)).await {
                Ok((status, error)) => {
                    state.update_transformation_status(status, error)?;
                    guard.finish(status == PhaseStatus::Completed);
                }
                Err(err) => {
                    state.update_transformation_status(PhaseStatus::Failed, Some(err.to_string()))?;
                    guard.finish(false);
                    self.save_state(&state).await?;
                    self.emit(project_key, Phase::Transformation, WorkflowEventKind::PhaseFailed, err.to_string()).await?;
                    return Err(err);
                }
            }
            if self.validation_enabled {
                self.run_transformation_validation(project_key).await?;
            }
            self.save_state(&state).await?;
            self.emit(project_key, Phase::Transformation, WorkflowEventKind::PhaseCompleted, format!("transformation {:?}", state.transformation_status)).await?;
        }

        if phases.contains(&Phase::Loading) && state.can_load() {
            let guard = self.observability.start_operation("phase_loading");
            self.emit(project_key, Phase::Loading, WorkflowEventKind::PhaseStarted, "loading started").await?;
            state.update_loading_status(PhaseStatus::InProgress, None)?;
            self.save_state(&state).await?;

            match self.with_phase_timeout(Phase::Loading, self.run_loading(project_key)).await {
                Ok((status, error)) => {
                    state.update_loading_status(status, error)?;
                    guard.finish(status == PhaseStatus::Completed);
                }
                Err(err) => {
                    state.update_loading_status(PhaseStatus::Failed, Some(err.to_string()))?;
                    guard.finish(false);
                    self.save_state(&state).await?;
                    self.emit(project_key, Phase::Loading, WorkflowEventKind::PhaseFailed, err.to_string()).await?;
                    return Err(err);
                }
            }
            if self.validation_enabled {
                self.run_loading_validation(project_key).await?;
            }
            self.save_state(&state).await?;
            self.emit(project_key, Phase::Loading, WorkflowEventKind::PhaseCompleted, format!("loading {:?}", state.loading_status)).await?;
        }

        state.last_run_timestamp = Some(Utc::now());
        self.save_state(&state).await?;

        let report = self.validation.lock().await.report();
        self.store.save_validation_report(project_key, &report).await?;

        Ok(state)
    }

    /// Resumes an interrupted migration: the persisted `is_incremental`
    /// flag from the last run is honored rather than re-asked.
    pub async fn resume_workflow(&self, project_key: &str, phases: &[Phase]) -> MigrationResult<MigrationState> {
        let state = self.load_state(project_key).await?;
        self.emit(project_key, Phase::Extraction, WorkflowEventKind::WorkflowResumed, "workflow resumed").await?;
        self.run_workflow(project_key, state.is_incremental, phases).await
    }

    pub async fn run_incremental_migration(&self, project_key: &str) -> MigrationResult<MigrationState> {
        self.run_workflow(project_key, true, &ALL_PHASES).await
    }

    /// §4.9: rolls back whatever reached `completed`/`partial`, then
    /// records the outcome as `MigrationState.rollback_status`. Refuses
    /// outright when `rollback_enabled` is false, regardless of what
    /// `MigrationState::can_rollback()` would otherwise allow.
    pub async fn rollback(&self, project_key: &str) -> MigrationResult<MigrationState> {
        if !self.rollback_enabled {
            return Err(MigrationError::invalid_config("rollback is disabled for this workflow"));
        }
        let mut state = self.load_state(project_key).await?;
        if !state.can_rollback() {
            return Err(MigrationError::state_violation("no completed or partial phase to roll back"));
        }

        self.emit(project_key, Phase::Rollback, WorkflowEventKind::PhaseStarted, "rollback started").await?;
        state.update_rollback_status(PhaseStatus::InProgress, None)?;
        self.save_state(&state).await?;

        match rollback_migration(&self.store, &self.target, project_key).await {
            Ok(0) => state.update_rollback_status(PhaseStatus::RolledBack, None)?,
            Ok(failures) => state.update_rollback_status(PhaseStatus::Partial, Some(format!("{failures} target deletes failed")))?,
            Err(err) => {
                state.update_rollback_status(PhaseStatus::Failed, Some(err.to_string()))?;
                self.save_state(&state).await?;
                self.emit(project_key, Phase::Rollback, WorkflowEventKind::PhaseFailed, err.to_string()).await?;
                return Err(err);
            }
        }

        self.save_state(&state).await?;
        self.emit(project_key, Phase::Rollback, WorkflowEventKind::PhaseCompleted, format!("rollback {:?}", state.rollback_status)).await?;
        Ok(state)
    }
}
