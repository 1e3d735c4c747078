use serde_json::Value;

use crate::control_plane::ValidationIssue;
use crate::error::MigrationResult;
use crate::value_objects::{ValidationLevel, ValidationPhase, ValidationScope};

use super::context::ValidationContext;
use super::rule::{EntityView, ValidationRule};

/// §4.6 normalization: `none -> ""`, `bool -> lowercase str`, `number ->
/// str`, else trim + lowercase.
fn normalize(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_lowercase(),
        other => other.to_string().trim().to_lowercase(),
    }
}

/// `normalized(src) == normalized(tgt)` for each configured field pair.
pub struct DataIntegrityRule {
    id: String,
    phase: ValidationPhase,
    fields_to_compare: Vec<(String, String)>,
}

impl DataIntegrityRule {
    pub fn new(id: impl Into<String>, phase: ValidationPhase, fields_to_compare: Vec<(String, String)>) -> Self {
        Self {
            id: id.into(),
            phase,
            fields_to_compare,
        }
    }
}

impl ValidationRule for DataIntegrityRule {
    fn id(&self) -> &str {
        &self.id
    }
    fn scope(&self) -> ValidationScope {
        ValidationScope::Relationship
    }
    fn phase(&self) -> ValidationPhase {
        self.phase
    }

    fn evaluate(&self, _entity: &EntityView, ctx: &ValidationContext) -> MigrationResult<Vec<ValidationIssue>> {
        let (Some(source), Some(target)) = (&ctx.source_entity, &ctx.target_entity) else {
            return Ok(Vec::new());
        };

        let mut issues = Vec::new();
        for (src_field, tgt_field) in &self.fields_to_compare {
            let src_value = source.get(src_field).unwrap_or(&Value::Null);
            let tgt_value = target.get(tgt_field).unwrap_or(&Value::Null);
            if normalize(src_value) != normalize(tgt_value) {
                issues.push(
                    ValidationIssue::new(
                        self.id.clone(),
                        ValidationScope::Relationship,
                        self.phase,
                        ValidationLevel::Error,
                        format!("source field '{src_field}' does not match target field '{tgt_field}' after migration"),
                    )
                    .with_field(src_field.clone()),
                );
            }
        }
        Ok(issues)
    }
}

/// `target.status == mappings[source.status]` when a mapping is configured
/// for the source status.
pub struct TestStatusMappingRule {
    id: String,
    phase: ValidationPhase,
}

impl TestStatusMappingRule {
    pub fn new(id: impl Into<String>, phase: ValidationPhase) -> Self {
        Self { id: id.into(), phase }
    }
}

impl ValidationRule for TestStatusMappingRule {
    fn id(&self) -> &str {
        &self.id
    }
    fn scope(&self) -> ValidationScope {
        ValidationScope::TestExecution
    }
    fn phase(&self) -> ValidationPhase {
        self.phase
    }

    fn evaluate(&self, _entity: &EntityView, ctx: &ValidationContext) -> MigrationResult<Vec<ValidationIssue>> {
        let (Some(source), Some(target)) = (&ctx.source_entity, &ctx.target_entity) else {
            return Ok(Vec::new());
        };
        let Some(source_status) = source.get("status").and_then(Value::as_str) else {
            return Ok(Vec::new());
        };
        let Some(expected) = ctx.status_mappings.get(source_status) else {
            return Ok(Vec::new());
        };
        let actual = target.get("status").and_then(Value::as_str).unwrap_or_default();
        if actual != expected {
            Ok(vec![ValidationIssue::new(
                self.id.clone(),
                ValidationScope::TestExecution,
                self.phase,
                ValidationLevel::Error,
                format!("expected target status '{expected}' for source status '{source_status}', found '{actual}'"),
            )])
        } else {
            Ok(Vec::new())
        }
    }
}

/// Transforming each custom field via the configured field mapper must not
/// yield empty when the source value was non-empty, and must preserve the
/// original type for `NUMERIC` fields. The application layer pre-runs the
/// mapper and supplies both sides via `ctx.transformed_custom_fields`.
pub struct CustomFieldTransformationRule {
    id: String,
    phase: ValidationPhase,
}

impl CustomFieldTransformationRule {
    pub fn new(id: impl Into<String>, phase: ValidationPhase) -> Self {
        Self { id: id.into(), phase }
    }
}

impl ValidationRule for CustomFieldTransformationRule {
    fn id(&self) -> &str {
        &self.id
    }
    fn scope(&self) -> ValidationScope {
        ValidationScope::CustomField
    }
    fn phase(&self) -> ValidationPhase {
        self.phase
    }

    fn evaluate(&self, entity: &EntityView, ctx: &ValidationContext) -> MigrationResult<Vec<ValidationIssue>> {
        let Some(custom_fields) = entity.get("custom_fields").and_then(Value::as_object) else {
            return Ok(Vec::new());
        };

        let mut issues = Vec::new();
        for (field, source_value) in custom_fields {
            let Some(transformed) = ctx.transformed_custom_fields.get(field) else {
                continue;
            };
            let source_empty = source_value.as_str().map(str::is_empty).unwrap_or(false);
            if !source_empty && transformed.is_empty() {
                issues.push(
                    ValidationIssue::new(
                        self.id.clone(),
                        ValidationScope::CustomField,
                        self.phase,
                        ValidationLevel::Error,
                        format!("custom field '{field}' became empty after transformation"),
                    )
                    .with_field(field.clone()),
                );
                continue;
            }
            if source_value.is_number() && !matches!(transformed.type_name(), "number") {
                issues.push(
                    ValidationIssue::new(
                        self.id.clone(),
                        ValidationScope::CustomField,
                        self.phase,
                        ValidationLevel::Error,
                        format!("custom field '{field}' lost its numeric type during transformation"),
                    )
                    .with_field(field.clone()),
                );
            }
        }
        Ok(issues)
    }
}
