//! Shared integration-test fixtures (SPEC_FULL §16): an in-memory
//! `MigrationStore` plus fake Source/Target clients, modeled on
//! `SqliteMigrationStore`'s upsert semantics and `rollback.rs`'s `FakeTarget`
//! test style respectively. Not itself a test binary - included via `mod
//! support;` from each scenario test file.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use uuid::Uuid;

use migration_domain::control_plane::entity_batch::BatchStatus;
use migration_domain::control_plane::{EntityBatch, EntityMapping, MigrationState, ValidationIssue, ValidationReport, WorkflowEvent};
use migration_domain::entities::{
    Attachment, Folder, Module, Project, RelatedEntityType, TargetProject, TargetTestCase, TargetTestCycle, TestCase,
    TestCycle, TestExecution, TestRun, TestStep,
};
use migration_domain::repositories::{EntityPage, MigrationStore, SourceClient, TargetClient};
use migration_domain::value_objects::{EntityType, FolderKind, MappingType, Priority, ValidationLevel};
use migration_domain::{MigrationError, MigrationResult};

// ---------------------------------------------------------------------
// InMemoryStore
// ---------------------------------------------------------------------

#[derive(Default)]
struct Inner {
    projects: HashMap<String, Project>,
    folders: HashMap<(String, String), Folder>,
    test_cases: HashMap<(String, String), TestCase>,
    test_cycles: HashMap<(String, String), TestCycle>,
    test_executions: HashMap<(String, String), TestExecution>,
    attachments: Vec<Attachment>,

    transformed_projects: HashMap<String, TargetProject>,
    transformed_modules: HashMap<(String, String), Module>,
    transformed_test_cases: HashMap<(String, String), TargetTestCase>,
    transformed_test_cycles: HashMap<(String, String), TargetTestCycle>,
    transformed_executions: HashMap<(String, String), String>,

    entity_mappings: HashMap<(String, MappingType, String), EntityMapping>,

    migration_states: HashMap<String, MigrationState>,
    entity_batches: HashMap<(String, EntityType, u32), EntityBatch>,

    workflow_events: Vec<WorkflowEvent>,
    validation_issues: HashMap<String, Vec<ValidationIssue>>,
    validation_reports: HashMap<String, Vec<ValidationReport>>,
    validation_rules: HashMap<String, String>,
}

/// `MigrationStore` fake backed by plain `HashMap`s, mirroring
/// `SqliteMigrationStore`'s upsert-by-natural-key behavior without a
/// database. All methods are synchronous under the hood (no I/O), so the
/// lock is never held across an `.await`.
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MigrationStore for InMemoryStore {
    async fn save_project(&self, project: &Project) -> MigrationResult<()> {
        self.inner.lock().unwrap().projects.insert(project.key.clone(), project.clone());
        Ok(())
    }

    async fn save_folders(&self, project_key: &str, folders: &[Folder]) -> MigrationResult<()> {
        let mut inner = self.inner.lock().unwrap();
        for folder in folders {
            inner.folders.insert((project_key.to_string(), folder.source_id.clone()), folder.clone());
        }
        Ok(())
    }

    async fn save_test_cases(&self, project_key: &str, cases: &[TestCase]) -> MigrationResult<()> {
        let mut inner = self.inner.lock().unwrap();
        for case in cases {
            inner.test_cases.insert((project_key.to_string(), case.source_id.clone()), case.clone());
        }
        Ok(())
    }

    async fn save_test_cycles(&self, project_key: &str, cycles: &[TestCycle]) -> MigrationResult<()> {
        let mut inner = self.inner.lock().unwrap();
        for cycle in cycles {
            inner.test_cycles.insert((project_key.to_string(), cycle.source_id.clone()), cycle.clone());
        }
        Ok(())
    }

    async fn save_test_executions(&self, project_key: &str, executions: &[TestExecution]) -> MigrationResult<()> {
        let mut inner = self.inner.lock().unwrap();
        for execution in executions {
            inner.test_executions.insert((project_key.to_string(), execution.source_id.clone()), execution.clone());
        }
        Ok(())
    }

    async fn save_attachment(&self, related_type: RelatedEntityType, related_id: &str, name: &str, content: Option<&[u8]>, url: Option<&str>) -> MigrationResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.attachments.push(Attachment {
            id: Uuid::new_v4(),
            related_type,
            related_source_id: related_id.to_string(),
            filename: name.to_string(),
            size: content.map(|c| c.len() as u64).unwrap_or(0),
            content_blob: content.map(|c| c.to_vec()),
            url: url.map(str::to_string),
        });
        Ok(())
    }

    async fn get_project(&self, project_key: &str) -> MigrationResult<Option<Project>> {
        Ok(self.inner.lock().unwrap().projects.get(project_key).cloned())
    }

    async fn get_folders(&self, project_key: &str) -> MigrationResult<Vec<Folder>> {
        Ok(self.inner.lock().unwrap().folders.iter().filter(|((pk, _), _)| pk == project_key).map(|(_, v)| v.clone()).collect())
    }

    async fn get_test_cases(&self, project_key: &str) -> MigrationResult<Vec<TestCase>> {
        Ok(self.inner.lock().unwrap().test_cases.iter().filter(|((pk, _), _)| pk == project_key).map(|(_, v)| v.clone()).collect())
    }

    async fn get_test_cycles(&self, project_key: &str) -> MigrationResult<Vec<TestCycle>> {
        Ok(self.inner.lock().unwrap().test_cycles.iter().filter(|((pk, _), _)| pk == project_key).map(|(_, v)| v.clone()).collect())
    }

    async fn get_test_executions(&self, project_key: &str) -> MigrationResult<Vec<TestExecution>> {
        Ok(self.inner.lock().unwrap().test_executions.iter().filter(|((pk, _), _)| pk == project_key).map(|(_, v)| v.clone()).collect())
    }

    async fn count_entities(&self, project_key: &str, entity_type: EntityType) -> MigrationResult<u64> {
        let inner = self.inner.lock().unwrap();
        let n = match entity_type {
            EntityType::Folder => inner.folders.keys().filter(|(pk, _)| pk == project_key).count(),
            EntityType::TestCase => inner.test_cases.keys().filter(|(pk, _)| pk == project_key).count(),
            EntityType::TestCycle => inner.test_cycles.keys().filter(|(pk, _)| pk == project_key).count(),
            EntityType::TestExecution => inner.test_executions.keys().filter(|(pk, _)| pk == project_key).count(),
        };
        Ok(n as u64)
    }

    async fn delete_extracted_entities(&self, project_key: &str) -> MigrationResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.folders.retain(|(pk, _), _| pk != project_key);
        inner.test_cases.retain(|(pk, _), _| pk != project_key);
        inner.test_cycles.retain(|(pk, _), _| pk != project_key);
        inner.test_executions.retain(|(pk, _), _| pk != project_key);
        // Attachments carry no project_key in the save_attachment signature
        // (§6.3), same as SqliteMigrationStore - they are left untouched.
        Ok(())
    }

    async fn save_transformed_project(&self, project_key: &str, project: &TargetProject) -> MigrationResult<()> {
        self.inner.lock().unwrap().transformed_projects.insert(project_key.to_string(), project.clone());
        Ok(())
    }

    async fn save_transformed_module(&self, project_key: &str, module: &Module) -> MigrationResult<()> {
        self.inner.lock().unwrap().transformed_modules.insert((project_key.to_string(), module.source_folder_id.clone()), module.clone());
        Ok(())
    }

    async fn save_transformed_test_case(&self, project_key: &str, case: &TargetTestCase) -> MigrationResult<()> {
        self.inner.lock().unwrap().transformed_test_cases.insert((project_key.to_string(), case.source_id.clone()), case.clone());
        Ok(())
    }

    async fn save_transformed_test_cycle(&self, project_key: &str, cycle: &TargetTestCycle) -> MigrationResult<()> {
        self.inner.lock().unwrap().transformed_test_cycles.insert((project_key.to_string(), cycle.source_id.clone()), cycle.clone());
        Ok(())
    }

    async fn save_transformed_execution(&self, project_key: &str, source_id: &str, run_id: &str) -> MigrationResult<()> {
        self.inner.lock().unwrap().transformed_executions.insert((project_key.to_string(), source_id.to_string()), run_id.to_string());
        Ok(())
    }

    async fn get_transformed_modules_by_level(&self, project_key: &str) -> MigrationResult<Vec<Module>> {
        let inner = self.inner.lock().unwrap();
        let mut modules: Vec<Module> = inner.transformed_modules.iter().filter(|((pk, _), _)| pk == project_key).map(|(_, v)| v.clone()).collect();
        modules.sort_by_key(|m| m.level);
        Ok(modules)
    }

    async fn get_transformed_test_cases(&self, project_key: &str) -> MigrationResult<Vec<TargetTestCase>> {
        Ok(self.inner.lock().unwrap().transformed_test_cases.iter().filter(|((pk, _), _)| pk == project_key).map(|(_, v)| v.clone()).collect())
    }

    async fn get_transformed_test_cycles(&self, project_key: &str) -> MigrationResult<Vec<TargetTestCycle>> {
        Ok(self.inner.lock().unwrap().transformed_test_cycles.iter().filter(|((pk, _), _)| pk == project_key).map(|(_, v)| v.clone()).collect())
    }

    async fn delete_transformed_entities(&self, project_key: &str) -> MigrationResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.transformed_projects.remove(project_key);
        inner.transformed_modules.retain(|(pk, _), _| pk != project_key);
        inner.transformed_test_cases.retain(|(pk, _), _| pk != project_key);
        inner.transformed_test_cycles.retain(|(pk, _), _| pk != project_key);
        inner.transformed_executions.retain(|(pk, _), _| pk != project_key);
        Ok(())
    }

    async fn save_entity_mapping(&self, mapping: &EntityMapping) -> MigrationResult<()> {
        self.inner.lock().unwrap().entity_mappings.insert(mapping.key(), mapping.clone());
        Ok(())
    }

    async fn get_entity_mapping(&self, project_key: &str, mapping_type: MappingType, source_id: &str) -> MigrationResult<Option<EntityMapping>> {
        Ok(self.inner.lock().unwrap().entity_mappings.get(&(project_key.to_string(), mapping_type, source_id.to_string())).cloned())
    }

    async fn get_entity_mappings(&self, project_key: &str, mapping_type: MappingType) -> MigrationResult<Vec<EntityMapping>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .entity_mappings
            .values()
            .filter(|m| m.project_key == project_key && m.mapping_type == mapping_type)
            .cloned()
            .collect())
    }

    async fn get_entity_mappings_for_rollback(&self, project_key: &str) -> MigrationResult<Vec<EntityMapping>> {
        let mut mappings: Vec<EntityMapping> = self.inner.lock().unwrap().entity_mappings.values().filter(|m| m.project_key == project_key).cloned().collect();
        mappings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(mappings)
    }

    async fn get_mapped_entity_id(&self, project_key: &str, mapping_type: MappingType, source_id: &str) -> MigrationResult<Option<String>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .entity_mappings
            .get(&(project_key.to_string(), mapping_type, source_id.to_string()))
            .map(|m| m.target_id.clone()))
    }

    async fn count_entity_mappings(&self, project_key: &str, mapping_type: MappingType) -> MigrationResult<u64> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .entity_mappings
            .values()
            .filter(|m| m.project_key == project_key && m.mapping_type == mapping_type)
            .count() as u64)
    }

    async fn delete_entity_mappings(&self, project_key: &str) -> MigrationResult<()> {
        self.inner.lock().unwrap().entity_mappings.retain(|(pk, _, _), _| pk != project_key);
        Ok(())
    }

    async fn get_migration_state(&self, project_key: &str) -> MigrationResult<MigrationState> {
        Ok(self.inner.lock().unwrap().migration_states.get(project_key).cloned().unwrap_or_else(|| MigrationState::new(project_key)))
    }

    async fn update_migration_state(&self, state: &MigrationState) -> MigrationResult<()> {
        self.inner.lock().unwrap().migration_states.insert(state.project_key.clone(), state.clone());
        Ok(())
    }

    async fn delete_migration_state(&self, project_key: &str) -> MigrationResult<()> {
        self.inner.lock().unwrap().migration_states.remove(project_key);
        Ok(())
    }

    async fn create_entity_batch(&self, batch: &EntityBatch) -> MigrationResult<()> {
        self.update_entity_batch(batch).await
    }

    async fn update_entity_batch(&self, batch: &EntityBatch) -> MigrationResult<()> {
        self.inner
            .lock()
            .unwrap()
            .entity_batches
            .insert((batch.project_key.clone(), batch.entity_type, batch.batch_number), batch.clone());
        Ok(())
    }

    async fn get_pending_entity_batches(&self, project_key: &str, entity_type: EntityType) -> MigrationResult<Vec<EntityBatch>> {
        self.get_entity_batches_by_status(project_key, entity_type, BatchStatus::Pending, None).await
    }

    async fn get_entity_batches_by_status(&self, project_key: &str, entity_type: EntityType, status: BatchStatus, is_incremental: Option<bool>) -> MigrationResult<Vec<EntityBatch>> {
        let mut batches: Vec<EntityBatch> = self
            .inner
            .lock()
            .unwrap()
            .entity_batches
            .values()
            .filter(|b| {
                b.project_key == project_key
                    && b.entity_type == entity_type
                    && b.status == status
                    && is_incremental.map(|inc| inc == b.is_incremental).unwrap_or(true)
            })
            .cloned()
            .collect();
        batches.sort_by_key(|b| b.batch_number);
        Ok(batches)
    }

    async fn get_incomplete_batches(&self, project_key: &str) -> MigrationResult<Vec<EntityBatch>> {
        let mut batches: Vec<EntityBatch> = self
            .inner
            .lock()
            .unwrap()
            .entity_batches
            .values()
            .filter(|b| b.project_key == project_key && b.status != BatchStatus::Completed)
            .cloned()
            .collect();
        batches.sort_by_key(|b| (b.entity_type.as_str().to_string(), b.batch_number));
        Ok(batches)
    }

    async fn delete_entity_batches(&self, project_key: &str) -> MigrationResult<()> {
        self.inner.lock().unwrap().entity_batches.retain(|(pk, _, _), _| pk != project_key);
        Ok(())
    }

    async fn save_workflow_event(&self, event: &WorkflowEvent) -> MigrationResult<()> {
        self.inner.lock().unwrap().workflow_events.push(event.clone());
        Ok(())
    }

    async fn delete_workflow_events(&self, project_key: &str) -> MigrationResult<()> {
        self.inner.lock().unwrap().workflow_events.retain(|e| e.project_key != project_key);
        Ok(())
    }

    async fn save_validation_issue(&self, project_key: &str, issue: &ValidationIssue) -> MigrationResult<()> {
        self.inner.lock().unwrap().validation_issues.entry(project_key.to_string()).or_default().push(issue.clone());
        Ok(())
    }

    async fn get_validation_issues(&self, project_key: &str, resolved: Option<bool>, level: Option<ValidationLevel>) -> MigrationResult<Vec<ValidationIssue>> {
        let _ = resolved;
        let inner = self.inner.lock().unwrap();
        let issues = inner.validation_issues.get(project_key).cloned().unwrap_or_default();
        Ok(match level {
            Some(level) => issues.into_iter().filter(|i| i.level == level).collect(),
            None => issues,
        })
    }

    async fn save_validation_report(&self, project_key: &str, report: &ValidationReport) -> MigrationResult<()> {
        self.inner.lock().unwrap().validation_reports.entry(project_key.to_string()).or_default().push(report.clone());
        Ok(())
    }

    async fn get_validation_reports(&self, project_key: &str) -> MigrationResult<Vec<ValidationReport>> {
        Ok(self.inner.lock().unwrap().validation_reports.get(project_key).cloned().unwrap_or_default())
    }

    async fn delete_validation_issues(&self, project_key: &str) -> MigrationResult<()> {
        self.inner.lock().unwrap().validation_issues.remove(project_key);
        Ok(())
    }

    async fn delete_validation_reports(&self, project_key: &str) -> MigrationResult<()> {
        self.inner.lock().unwrap().validation_reports.remove(project_key);
        Ok(())
    }

    async fn save_validation_rule(&self, rule_id: &str, definition: &str) -> MigrationResult<()> {
        self.inner.lock().unwrap().validation_rules.insert(rule_id.to_string(), definition.to_string());
        Ok(())
    }

    async fn entity_exists(&self, entity_type: EntityType, id: &str) -> MigrationResult<bool> {
        let inner = self.inner.lock().unwrap();
        Ok(match entity_type {
            EntityType::Folder => inner.folders.keys().any(|(_, sid)| sid == id),
            EntityType::TestCase => inner.test_cases.keys().any(|(_, sid)| sid == id),
            EntityType::TestCycle => inner.test_cycles.keys().any(|(_, sid)| sid == id),
            EntityType::TestExecution => inner.test_executions.keys().any(|(_, sid)| sid == id),
        })
    }

    async fn find_duplicates(&self, entity_type: EntityType, field: &str, value: &str, exclude_id: Option<&str>) -> MigrationResult<Vec<String>> {
        let inner = self.inner.lock().unwrap();
        let matches = |json: serde_json::Value, sid: &str| -> bool {
            if exclude_id == Some(sid) {
                return false;
            }
            json.get(field).and_then(serde_json::Value::as_str) == Some(value)
        };
        let ids = match entity_type {
            EntityType::Folder => inner.folders.iter().filter(|((_, sid), f)| matches(serde_json::to_value(f).unwrap_or_default(), sid)).map(|((_, sid), _)| sid.clone()).collect(),
            EntityType::TestCase => inner.test_cases.iter().filter(|((_, sid), c)| matches(serde_json::to_value(c).unwrap_or_default(), sid)).map(|((_, sid), _)| sid.clone()).collect(),
            EntityType::TestCycle => inner.test_cycles.iter().filter(|((_, sid), c)| matches(serde_json::to_value(c).unwrap_or_default(), sid)).map(|((_, sid), _)| sid.clone()).collect(),
            EntityType::TestExecution => inner.test_executions.iter().filter(|((_, sid), e)| matches(serde_json::to_value(e).unwrap_or_default(), sid)).map(|((_, sid), _)| sid.clone()).collect(),
        };
        Ok(ids)
    }

    async fn find_invalid_references(&self, _project_key: &str, _table: &str, _fk: &str, _ref_table: &str, _ref_pk: &str) -> MigrationResult<Vec<String>> {
        // Diagnostic-only surface (never called by the orchestrator/ETL
        // executor); this fixture has no generic table/fk model to walk, so
        // it reports no invalid references rather than faking a schema.
        Ok(Vec::new())
    }

    async fn get_source_entity_counts(&self, project_key: &str) -> MigrationResult<Vec<(EntityType, u64)>> {
        let mut counts = Vec::new();
        for entity_type in [EntityType::Folder, EntityType::TestCase, EntityType::TestCycle, EntityType::TestExecution] {
            counts.push((entity_type, self.count_entities(project_key, entity_type).await?));
        }
        Ok(counts)
    }

    async fn get_target_entity_counts(&self, project_key: &str) -> MigrationResult<Vec<(EntityType, u64)>> {
        let inner = self.inner.lock().unwrap();
        Ok(vec![
            (EntityType::Folder, inner.transformed_modules.keys().filter(|(pk, _)| pk == project_key).count() as u64),
            (EntityType::TestCase, inner.transformed_test_cases.keys().filter(|(pk, _)| pk == project_key).count() as u64),
            (EntityType::TestCycle, inner.transformed_test_cycles.keys().filter(|(pk, _)| pk == project_key).count() as u64),
            (EntityType::TestExecution, inner.transformed_executions.keys().filter(|(pk, _)| pk == project_key).count() as u64),
        ])
    }

    async fn get_entity_mapping_counts(&self, project_key: &str) -> MigrationResult<Vec<(MappingType, u64)>> {
        let mut counts = Vec::new();
        for mapping_type in [MappingType::FolderToModule, MappingType::TestcaseToTestcase, MappingType::CycleToCycle, MappingType::ExecutionToRun] {
            counts.push((mapping_type, self.count_entity_mappings(project_key, mapping_type).await?));
        }
        Ok(counts)
    }

    async fn count_attachments(&self, project_key: &str) -> MigrationResult<u64> {
        // `save_attachment` carries no project_key (§6.3), so - like
        // SqliteMigrationStore's `WHERE project_key = ? OR project_key = ''`
        // - this counts every cached attachment regardless of `project_key`.
        let _ = project_key;
        Ok(self.inner.lock().unwrap().attachments.len() as u64)
    }

    async fn get_attachments_for_entity(&self, project_key: &str, related_type: RelatedEntityType, related_source_id: &str) -> MigrationResult<Vec<Attachment>> {
        let _ = project_key;
        Ok(self
            .inner
            .lock()
            .unwrap()
            .attachments
            .iter()
            .filter(|a| a.related_type == related_type && a.related_source_id == related_source_id)
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------
// FakeSourceClient
// ---------------------------------------------------------------------

pub struct FakeSourceClient {
    pub project: Project,
    pub folders: Vec<Folder>,
    pub test_cases: Vec<TestCase>,
    pub test_steps: HashMap<String, Vec<TestStep>>,
    pub test_cycles: Vec<TestCycle>,
    pub test_executions: Vec<TestExecution>,
    pub attachment_bytes: HashMap<String, Vec<u8>>,
}

#[async_trait]
impl SourceClient for FakeSourceClient {
    async fn get_project(&self, key: &str) -> MigrationResult<Project> {
        if key == self.project.key {
            Ok(self.project.clone())
        } else {
            Err(MigrationError::not_found(format!("no such project '{key}'")))
        }
    }

    fn get_folders(&self) -> EntityPage<'_, Folder> {
        stream::iter(self.folders.clone().into_iter().map(Ok)).boxed()
    }

    fn get_test_cases(&self) -> EntityPage<'_, TestCase> {
        stream::iter(self.test_cases.clone().into_iter().map(Ok)).boxed()
    }

    async fn get_test_steps(&self, case_id: &str) -> MigrationResult<Vec<TestStep>> {
        Ok(self.test_steps.get(case_id).cloned().unwrap_or_default())
    }

    fn get_test_cycles(&self) -> EntityPage<'_, TestCycle> {
        stream::iter(self.test_cycles.clone().into_iter().map(Ok)).boxed()
    }

    fn get_test_executions(&self) -> EntityPage<'_, TestExecution> {
        stream::iter(self.test_executions.clone().into_iter().map(Ok)).boxed()
    }

    async fn download_attachment(&self, id: &str) -> MigrationResult<Vec<u8>> {
        self.attachment_bytes.get(id).cloned().ok_or_else(|| MigrationError::not_found(format!("no attachment '{id}'")))
    }

    async fn check_connection(&self) -> MigrationResult<bool> {
        Ok(true)
    }
}

// ---------------------------------------------------------------------
// FakeTargetClient
// ---------------------------------------------------------------------

/// `TargetClient` fake modeled on `rollback.rs`'s `FakeTarget`: creates are
/// derived deterministically from the source id so assertions don't need a
/// counter, and `fail_test_cases` lets a test simulate a crash partway
/// through Load by failing specific cases' `create_test_case` calls.
#[derive(Default)]
pub struct FakeTargetClient {
    fail_test_cases: Mutex<HashSet<String>>,
    module_creates: Mutex<Vec<String>>,
    case_creates: Mutex<Vec<String>>,
    cycle_creates: Mutex<Vec<String>>,
    run_creates: Mutex<Vec<String>>,
    deletes: Mutex<Vec<String>>,
    attachment_uploads: Mutex<Vec<(String, String)>>,
}

impl FakeTargetClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `source_ids` so their next `create_test_case` call fails with a
    /// non-retryable error (no status code/kind `RetryPolicy` recognizes).
    pub fn fail_test_cases(&self, source_ids: impl IntoIterator<Item = String>) {
        self.fail_test_cases.lock().unwrap().extend(source_ids);
    }

    pub fn clear_failures(&self) {
        self.fail_test_cases.lock().unwrap().clear();
    }

    pub fn case_create_calls(&self) -> Vec<String> {
        self.case_creates.lock().unwrap().clone()
    }

    pub fn run_create_calls(&self) -> Vec<String> {
        self.run_creates.lock().unwrap().clone()
    }

    pub fn delete_calls(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }

    pub fn attachment_upload_calls(&self) -> Vec<(String, String)> {
        self.attachment_uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl TargetClient for FakeTargetClient {
    async fn create_module(&self, module: &Module) -> MigrationResult<String> {
        self.module_creates.lock().unwrap().push(module.source_folder_id.clone());
        Ok(format!("MOD-{}", module.source_folder_id))
    }

    async fn create_test_case(&self, case: &TargetTestCase) -> MigrationResult<String> {
        if self.fail_test_cases.lock().unwrap().contains(&case.source_id) {
            return Err(MigrationError::processing_failed(format!("simulated crash creating '{}'", case.source_id)));
        }
        self.case_creates.lock().unwrap().push(case.source_id.clone());
        Ok(format!("TC-{}", case.source_id))
    }

    async fn create_test_cycle(&self, cycle: &TargetTestCycle) -> MigrationResult<String> {
        self.cycle_creates.lock().unwrap().push(cycle.source_id.clone());
        Ok(format!("CY-{}", cycle.source_id))
    }

    async fn create_test_run(&self, run: &TestRun) -> MigrationResult<String> {
        self.run_creates.lock().unwrap().push(run.source_execution_id.clone());
        Ok(format!("RUN-{}", run.source_execution_id))
    }

    async fn submit_test_log(&self, _run_id: &str, _log: &migration_domain::entities::TestLog) -> MigrationResult<()> {
        Ok(())
    }

    async fn upload_attachment(&self, object_type: &str, object_id: &str, _file_path: &std::path::Path) -> MigrationResult<()> {
        self.attachment_uploads.lock().unwrap().push((object_type.to_string(), object_id.to_string()));
        Ok(())
    }

    async fn delete_test_run(&self, id: &str) -> MigrationResult<()> {
        self.deletes.lock().unwrap().push(id.to_string());
        Ok(())
    }

    async fn delete_test_cycle(&self, id: &str) -> MigrationResult<()> {
        self.deletes.lock().unwrap().push(id.to_string());
        Ok(())
    }

    async fn delete_test_case(&self, id: &str) -> MigrationResult<()> {
        self.deletes.lock().unwrap().push(id.to_string());
        Ok(())
    }

    async fn check_connection(&self) -> MigrationResult<bool> {
        Ok(true)
    }

    async fn get_project(&self, id: &str) -> MigrationResult<TargetProject> {
        Ok(TargetProject { id: id.to_string(), name: "Demo Target".to_string(), description: None })
    }
}

// ---------------------------------------------------------------------
// Test-data builders
// ---------------------------------------------------------------------

pub fn folder(source_id: &str, parent: Option<&str>, name: &str) -> Folder {
    Folder {
        id: Uuid::new_v4(),
        source_id: source_id.to_string(),
        project_key: "DEMO".to_string(),
        parent_source_id: parent.map(str::to_string),
        name: name.to_string(),
        kind: FolderKind::TestCase,
    }
}

pub fn test_case(source_id: &str, key: &str, folder_source_id: &str, name: &str, steps: Vec<TestStep>) -> TestCase {
    TestCase {
        id: Uuid::new_v4(),
        source_id: source_id.to_string(),
        key: key.to_string(),
        project_key: "DEMO".to_string(),
        folder_source_id: Some(folder_source_id.to_string()),
        name: name.to_string(),
        objective: Some("Verify behavior".to_string()),
        precondition: None,
        priority: Priority::Medium,
        status: Some("Active".to_string()),
        steps,
        custom_fields: Default::default(),
        attachments: Vec::new(),
    }
}

pub fn test_step(order: u32, description: &str, expected_result: &str) -> TestStep {
    TestStep {
        id: Uuid::new_v4(),
        test_case_id: Uuid::new_v4(),
        order,
        description: description.to_string(),
        expected_result: expected_result.to_string(),
        test_data: None,
    }
}

pub fn test_cycle(source_id: &str, key: &str, folder_source_id: &str, name: &str) -> TestCycle {
    TestCycle {
        id: Uuid::new_v4(),
        source_id: source_id.to_string(),
        key: key.to_string(),
        project_key: "DEMO".to_string(),
        folder_source_id: Some(folder_source_id.to_string()),
        name: name.to_string(),
        description: None,
        planned_start: None,
        planned_end: None,
        status: Some("Active".to_string()),
        custom_fields: Default::default(),
    }
}

pub fn test_execution(source_id: &str, case_source_id: &str, cycle_source_id: &str, status: &str) -> TestExecution {
    TestExecution {
        id: Uuid::new_v4(),
        source_id: source_id.to_string(),
        project_key: "DEMO".to_string(),
        test_cycle_source_id: cycle_source_id.to_string(),
        test_case_source_id: case_source_id.to_string(),
        status: status.to_string(),
        executed_by: Some("qa-bot".to_string()),
        environment: Some("staging".to_string()),
        comment: None,
        step_results: Vec::new(),
        custom_fields: Default::default(),
        attachments: Vec::new(),
    }
}
