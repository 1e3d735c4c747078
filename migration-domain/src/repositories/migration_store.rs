//! Persistent store port (§6.3): the minimum operations a relational-store
//! adapter must provide. The default adapter (§13) implements this over
//! `sqlx::SqlitePool`; tests use an in-memory fake (§16).

use async_trait::async_trait;

use crate::control_plane::{EntityBatch, EntityMapping, MigrationState, ValidationIssue, ValidationReport, WorkflowEvent};
use crate::control_plane::entity_batch::BatchStatus;
use crate::entities::{
    Attachment, Folder, Module, Project, RelatedEntityType, TargetProject, TargetTestCase, TargetTestCycle, TestCase,
    TestCycle, TestExecution,
};
use crate::error::MigrationResult;
use crate::value_objects::{EntityType, MappingType, ValidationLevel};

#[async_trait]
pub trait MigrationStore: Send + Sync {
    // -- Extracted (Source-shaped) entities ---------------------------------
    async fn save_project(&self, project: &Project) -> MigrationResult<()>;
    async fn save_folders(&self, project_key: &str, folders: &[Folder]) -> MigrationResult<()>;
    async fn save_test_cases(&self, project_key: &str, cases: &[TestCase]) -> MigrationResult<()>;
    async fn save_test_cycles(&self, project_key: &str, cycles: &[TestCycle]) -> MigrationResult<()>;
    async fn save_test_executions(&self, project_key: &str, executions: &[TestExecution]) -> MigrationResult<()>;
    async fn save_attachment(
        &self,
        related_type: RelatedEntityType,
        related_id: &str,
        name: &str,
        content: Option<&[u8]>,
        url: Option<&str>,
    ) -> MigrationResult<()>;

    async fn get_project(&self, project_key: &str) -> MigrationResult<Option<Project>>;
    async fn get_folders(&self, project_key: &str) -> MigrationResult<Vec<Folder>>;
    async fn get_test_cases(&self, project_key: &str) -> MigrationResult<Vec<TestCase>>;
    async fn get_test_cycles(&self, project_key: &str) -> MigrationResult<Vec<TestCycle>>;
    async fn get_test_executions(&self, project_key: &str) -> MigrationResult<Vec<TestExecution>>;
    async fn count_entities(&self, project_key: &str, entity_type: EntityType) -> MigrationResult<u64>;

    async fn delete_extracted_entities(&self, project_key: &str) -> MigrationResult<()>;

    // -- Transformed (Target-shaped) entities --------------------------------
    async fn save_transformed_project(&self, project_key: &str, project: &TargetProject) -> MigrationResult<()>;
    async fn save_transformed_module(&self, project_key: &str, module: &Module) -> MigrationResult<()>;
    async fn save_transformed_test_case(&self, project_key: &str, case: &TargetTestCase) -> MigrationResult<()>;
    async fn save_transformed_test_cycle(&self, project_key: &str, cycle: &TargetTestCycle) -> MigrationResult<()>;
    async fn save_transformed_execution(&self, project_key: &str, source_id: &str, run_id: &str) -> MigrationResult<()>;

    async fn get_transformed_modules_by_level(&self, project_key: &str) -> MigrationResult<Vec<Module>>;
    async fn get_transformed_test_cases(&self, project_key: &str) -> MigrationResult<Vec<TargetTestCase>>;
    async fn get_transformed_test_cycles(&self, project_key: &str) -> MigrationResult<Vec<TargetTestCycle>>;

    async fn delete_transformed_entities(&self, project_key: &str) -> MigrationResult<()>;

    // -- Entity mappings ------------------------------------------------------
    async fn save_entity_mapping(&self, mapping: &EntityMapping) -> MigrationResult<()>;
    async fn get_entity_mapping(
        &self,
        project_key: &str,
        mapping_type: MappingType,
        source_id: &str,
    ) -> MigrationResult<Option<EntityMapping>>;
    async fn get_entity_mappings(
        &self,
        project_key: &str,
        mapping_type: MappingType,
    ) -> MigrationResult<Vec<EntityMapping>>;
    async fn get_entity_mappings_for_rollback(&self, project_key: &str) -> MigrationResult<Vec<EntityMapping>>;
    async fn get_mapped_entity_id(
        &self,
        project_key: &str,
        mapping_type: MappingType,
        source_id: &str,
    ) -> MigrationResult<Option<String>>;
    async fn count_entity_mappings(&self, project_key: &str, mapping_type: MappingType) -> MigrationResult<u64>;
    async fn delete_entity_mappings(&self, project_key: &str) -> MigrationResult<()>;

    // -- Control plane --------------------------------------------------------
    async fn get_migration_state(&self, project_key: &str) -> MigrationResult<MigrationState>;
    async fn update_migration_state(&self, state: &MigrationState) -> MigrationResult<()>;
    async fn delete_migration_state(&self, project_key: &str) -> MigrationResult<()>;

    async fn create_entity_batch(&self, batch: &EntityBatch) -> MigrationResult<()>;
    async fn update_entity_batch(&self, batch: &EntityBatch) -> MigrationResult<()>;
    async fn get_pending_entity_batches(
        &self,
        project_key: &str,
        entity_type: EntityType,
    ) -> MigrationResult<Vec<EntityBatch>>;
    async fn get_entity_batches_by_status(
        &self,
        project_key: &str,
        entity_type: EntityType,
        status: BatchStatus,
        is_incremental: Option<bool>,
    ) -> MigrationResult<Vec<EntityBatch>>;
    async fn get_incomplete_batches(&self, project_key: &str) -> MigrationResult<Vec<EntityBatch>>;
    async fn delete_entity_batches(&self, project_key: &str) -> MigrationResult<()>;

    // -- Events / validation ----------------------------------------------------
    async fn save_workflow_event(&self, event: &WorkflowEvent) -> MigrationResult<()>;
    async fn delete_workflow_events(&self, project_key: &str) -> MigrationResult<()>;

    async fn save_validation_issue(&self, project_key: &str, issue: &ValidationIssue) -> MigrationResult<()>;
    async fn get_validation_issues(
        &self,
        project_key: &str,
        resolved: Option<bool>,
        level: Option<ValidationLevel>,
    ) -> MigrationResult<Vec<ValidationIssue>>;
    async fn save_validation_report(&self, project_key: &str, report: &ValidationReport) -> MigrationResult<()>;
    async fn get_validation_reports(&self, project_key: &str) -> MigrationResult<Vec<ValidationReport>>;
    async fn delete_validation_issues(&self, project_key: &str) -> MigrationResult<()>;
    async fn delete_validation_reports(&self, project_key: &str) -> MigrationResult<()>;
    async fn save_validation_rule(&self, rule_id: &str, definition: &str) -> MigrationResult<()>;

    // -- Introspection ------------------------------------------------------
    async fn entity_exists(&self, entity_type: EntityType, id: &str) -> MigrationResult<bool>;
    async fn find_duplicates(
        &self,
        entity_type: EntityType,
        field: &str,
        value: &str,
        exclude_id: Option<&str>,
    ) -> MigrationResult<Vec<String>>;
    async fn find_invalid_references(
        &self,
        project_key: &str,
        table: &str,
        fk: &str,
        ref_table: &str,
        ref_pk: &str,
    ) -> MigrationResult<Vec<String>>;
    async fn get_source_entity_counts(&self, project_key: &str) -> MigrationResult<Vec<(EntityType, u64)>>;
    async fn get_target_entity_counts(&self, project_key: &str) -> MigrationResult<Vec<(EntityType, u64)>>;
    async fn get_entity_mapping_counts(&self, project_key: &str) -> MigrationResult<Vec<(MappingType, u64)>>;

    async fn count_attachments(&self, project_key: &str) -> MigrationResult<u64> {
        let _ = project_key;
        Ok(0)
    }

    /// Attachments previously recorded against one entity (§6.1/§6.5), used
    /// by Load to find what Extraction already pulled down for it.
    async fn get_attachments_for_entity(
        &self,
        project_key: &str,
        related_type: RelatedEntityType,
        related_source_id: &str,
    ) -> MigrationResult<Vec<Attachment>> {
        let _ = (project_key, related_type, related_source_id);
        Ok(Vec::new())
    }
}
