// /////////////////////////////////////////////////////////////////////////////
// Migration Engine
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! `withValidation(scope, phase)` composition (§9) and the default rule set
//! (§4.6) registered against it. Rules are pure and synchronous; this module
//! is the async seam that resolves what each rule needs (`ValidationContext`)
//! and persists what it finds.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use migration_domain::control_plane::{ValidationIssue, ValidationReport};
use migration_domain::repositories::MigrationStore;
use migration_domain::validation::{
    AttachmentRule, CustomFieldTransformationRule, DataIntegrityRule, ReferentialIntegrityRule, RelationshipRule,
    RequiredFieldRule, StringLengthBounds, StringLengthRule, TestStatusMappingRule, TestStepValidationRule,
    UniqueValueRule, ValidationContext, ValidationManager, ValidationRegistry, ValidationSummary,
};
use migration_domain::value_objects::{MappingType, ValidationLevel, ValidationPhase, ValidationScope};
use migration_domain::MigrationResult;

use crate::infrastructure::metrics::MetricsService;

/// Serializes any migrated entity into the `serde_json::Value` shape rules
/// evaluate against (§4.5: `EntityView = serde_json::Value`).
pub fn view<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

fn level_str(level: ValidationLevel) -> &'static str {
    match level {
        ValidationLevel::Info => "info",
        ValidationLevel::Warning => "warning",
        ValidationLevel::Error => "error",
        ValidationLevel::Critical => "critical",
    }
}

/// Builds the default rule set (§4.6): one instance of each of the 13
/// concrete rule kinds, wired at the `(scope, phase)` pairs the spec's
/// entity model implies. Callers needing project-specific constraints
/// (custom-field allow-lists, attachment limits, a JSON schema) register
/// additional rules on top via [`ValidationRegistry::register`].
pub fn default_registry() -> ValidationRegistry {
    let mut registry = ValidationRegistry::new();

    registry.register(Box::new(RequiredFieldRule::new(
        "required_field_folder",
        ValidationScope::Folder,
        ValidationPhase::PreMigration,
        vec!["name".into()],
    )));
    registry.register(Box::new(RequiredFieldRule::new(
        "required_field_test_case",
        ValidationScope::TestCase,
        ValidationPhase::PreMigration,
        vec!["name".into(), "key".into()],
    )));
    registry.register(Box::new(RequiredFieldRule::new(
        "required_field_test_cycle",
        ValidationScope::TestCycle,
        ValidationPhase::PreMigration,
        vec!["name".into(), "key".into()],
    )));

    let mut case_name_bounds = std::collections::HashMap::new();
    case_name_bounds.insert("name".to_string(), StringLengthBounds { min: Some(1), max: Some(255) });
    registry.register(Box::new(StringLengthRule::new(
        "string_length_test_case_name",
        ValidationScope::TestCase,
        ValidationPhase::PreMigration,
        case_name_bounds,
    )));

    registry.register(Box::new(TestStepValidationRule::new("test_step_validation_pre", ValidationPhase::PreMigration)));
    registry.register(Box::new(TestStepValidationRule::new("test_step_validation_post", ValidationPhase::PostMigration)));

    registry.register(Box::new(AttachmentRule::new(
        "attachment_size_and_type",
        ValidationPhase::Loading,
        Some(25 * 1024 * 1024),
        Some(vec![
            "png".into(), "jpg".into(), "jpeg".into(), "gif".into(), "pdf".into(), "txt".into(), "log".into(), "zip".into(),
        ]),
    )));

    registry.register(Box::new(RelationshipRule::new(
        "relationship_test_case_folder",
        ValidationScope::TestCase,
        ValidationPhase::PreMigration,
        "folder_source_id",
        "folder",
    )));
    registry.register(Box::new(RelationshipRule::new(
        "relationship_test_cycle_folder",
        ValidationScope::TestCycle,
        ValidationPhase::PreMigration,
        "folder_source_id",
        "folder",
    )));

    registry.register(Box::new(UniqueValueRule::new(
        "unique_value_test_case_key",
        ValidationScope::TestCase,
        ValidationPhase::PreMigration,
        vec!["key".into()],
    )));
    registry.register(Box::new(UniqueValueRule::new(
        "unique_value_test_cycle_key",
        ValidationScope::TestCycle,
        ValidationPhase::PreMigration,
        vec!["key".into()],
    )));

    registry.register(Box::new(ReferentialIntegrityRule::new(
        "referential_integrity_execution_test_case",
        ValidationScope::TestExecution,
        ValidationPhase::Loading,
        "test_case_source_id",
        MappingType::TestcaseToTestcase,
    )));
    registry.register(Box::new(ReferentialIntegrityRule::new(
        "referential_integrity_execution_test_cycle",
        ValidationScope::TestExecution,
        ValidationPhase::Loading,
        "test_cycle_source_id",
        MappingType::CycleToCycle,
    )));

    registry.register(Box::new(DataIntegrityRule::new(
        "data_integrity_test_case",
        ValidationPhase::Loading,
        vec![("name".into(), "name".into()), ("objective".into(), "objective".into())],
    )));
    registry.register(Box::new(DataIntegrityRule::new(
        "data_integrity_test_cycle",
        ValidationPhase::Loading,
        vec![("name".into(), "name".into())],
    )));

    registry.register(Box::new(TestStatusMappingRule::new("test_status_mapping", ValidationPhase::Loading)));
    registry.register(Box::new(CustomFieldTransformationRule::new(
        "custom_field_transformation",
        ValidationPhase::Transformation,
    )));

    registry
}

/// Drives [`ValidationManager`] against the default registry, persisting
/// every raised issue and keeping the Prometheus counters in
/// [`MetricsService`] in sync (§12).
pub struct ValidationHooks {
    manager: ValidationManager,
    metrics: Option<Arc<MetricsService>>,
}

impl ValidationHooks {
    pub fn new(metrics: Option<Arc<MetricsService>>) -> Self {
        Self {
            manager: ValidationManager::new(default_registry()),
            metrics,
        }
    }

    pub fn with_registry(registry: ValidationRegistry, metrics: Option<Arc<MetricsService>>) -> Self {
        Self {
            manager: ValidationManager::new(registry),
            metrics,
        }
    }

    pub fn registry(&self) -> &ValidationRegistry {
        self.manager.registry()
    }

    /// Runs every rule matching `(scope, phase)` against `entity`, persists
    /// each raised issue, and returns them.
    pub async fn validate(
        &mut self,
        store: &dyn MigrationStore,
        project_key: &str,
        entity: &Value,
        scope: ValidationScope,
        phase: ValidationPhase,
        ctx: &ValidationContext,
        now: DateTime<Utc>,
    ) -> MigrationResult<Vec<ValidationIssue>> {
        let issues = self.manager.execute_validation(entity, scope, phase, ctx, now);
        for issue in &issues {
            store.save_validation_issue(project_key, issue).await?;
            if let Some(metrics) = &self.metrics {
                metrics.record_validation_issue(level_str(issue.level));
            }
        }
        Ok(issues)
    }

    pub fn has_blocking_issues(&self) -> bool {
        self.manager.has_critical_issues() || self.manager.has_error_issues()
    }

    pub fn report(&self) -> ValidationReport {
        let mut report = ValidationReport::new();
        report.extend(self.manager.issues().iter().cloned());
        report
    }

    pub fn summary(&self, project_key: &str, now: DateTime<Utc>) -> ValidationSummary {
        self.manager.build_summary(project_key, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration_domain::entities::TestCase;
    use migration_domain::value_objects::Priority;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z").unwrap().with_timezone(&Utc)
    }

    #[test]
    fn default_registry_covers_every_rule_kind() {
        let registry = default_registry();
        assert!(registry.len() >= 13);
    }

    #[test]
    fn view_serializes_domain_entity_to_json() {
        let case = TestCase {
            id: uuid::Uuid::new_v4(),
            source_id: "TC-1".into(),
            key: "PROJ-TC-1".into(),
            project_key: "PROJ".into(),
            folder_source_id: None,
            name: "Login works".into(),
            objective: None,
            precondition: None,
            priority: Priority::Medium,
            status: None,
            steps: Vec::new(),
            custom_fields: Default::default(),
            attachments: Vec::new(),
        };
        let json = view(&case);
        assert_eq!(json.get("key").and_then(Value::as_str), Some("PROJ-TC-1"));
    }

    #[test]
    fn required_field_rule_flags_missing_name_pre_migration() {
        let mut registry = ValidationRegistry::new();
        registry.register(Box::new(RequiredFieldRule::new(
            "required_field_test_case",
            ValidationScope::TestCase,
            ValidationPhase::PreMigration,
            vec!["name".into()],
        )));
        let mut manager = ValidationManager::new(registry);
        let entity = serde_json::json!({"key": "PROJ-TC-1"});
        let issues = manager.execute_validation(&entity, ValidationScope::TestCase, ValidationPhase::PreMigration, &ValidationContext::new(), now());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].level, ValidationLevel::Error);
    }
}
