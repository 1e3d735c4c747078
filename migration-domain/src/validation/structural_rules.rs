use serde_json::Value;

use crate::control_plane::ValidationIssue;
use crate::error::MigrationResult;
use crate::value_objects::{ValidationLevel, ValidationPhase, ValidationScope};

use super::context::ValidationContext;
use super::rule::{EntityView, ValidationRule};

/// `size <= max_size` and the filename's extension is in `allowed_extensions`.
pub struct AttachmentRule {
    id: String,
    phase: ValidationPhase,
    max_size: Option<u64>,
    allowed_extensions: Option<Vec<String>>,
}

impl AttachmentRule {
    pub fn new(id: impl Into<String>, phase: ValidationPhase, max_size: Option<u64>, allowed_extensions: Option<Vec<String>>) -> Self {
        Self {
            id: id.into(),
            phase,
            max_size,
            allowed_extensions: allowed_extensions.map(|exts| exts.into_iter().map(|e| e.to_lowercase()).collect()),
        }
    }
}

impl ValidationRule for AttachmentRule {
    fn id(&self) -> &str {
        &self.id
    }
    fn scope(&self) -> ValidationScope {
        ValidationScope::Attachment
    }
    fn phase(&self) -> ValidationPhase {
        self.phase
    }

    fn evaluate(&self, entity: &EntityView, _ctx: &ValidationContext) -> MigrationResult<Vec<ValidationIssue>> {
        let mut issues = Vec::new();
        if let (Some(max_size), Some(size)) = (self.max_size, entity.get("size").and_then(Value::as_u64)) {
            if size > max_size {
                issues.push(ValidationIssue::new(
                    self.id.clone(),
                    ValidationScope::Attachment,
                    self.phase,
                    ValidationLevel::Error,
                    format!("attachment size {size} exceeds max {max_size}"),
                ));
            }
        }
        if let Some(allowed) = &self.allowed_extensions {
            if let Some(filename) = entity.get("filename").and_then(Value::as_str) {
                let ext = filename.rsplit('.').next().unwrap_or("").to_lowercase();
                if !allowed.contains(&ext) {
                    issues.push(ValidationIssue::new(
                        self.id.clone(),
                        ValidationScope::Attachment,
                        self.phase,
                        ValidationLevel::Error,
                        format!("attachment extension '{ext}' is not allowed"),
                    ));
                }
            }
        }
        Ok(issues)
    }
}

/// A test case must have at least one step; each step needs a non-empty
/// description (error) and a non-empty expected result (warning only, and
/// not enforced pre-migration, per §4.6).
pub struct TestStepValidationRule {
    id: String,
    phase: ValidationPhase,
}

impl TestStepValidationRule {
    pub fn new(id: impl Into<String>, phase: ValidationPhase) -> Self {
        Self { id: id.into(), phase }
    }
}

impl ValidationRule for TestStepValidationRule {
    fn id(&self) -> &str {
        &self.id
    }
    fn scope(&self) -> ValidationScope {
        ValidationScope::TestCaseStep
    }
    fn phase(&self) -> ValidationPhase {
        self.phase
    }

    fn evaluate(&self, entity: &EntityView, _ctx: &ValidationContext) -> MigrationResult<Vec<ValidationIssue>> {
        let steps = entity.get("steps").and_then(Value::as_array).cloned().unwrap_or_default();
        if steps.is_empty() {
            return Ok(vec![ValidationIssue::new(
                self.id.clone(),
                ValidationScope::TestCaseStep,
                self.phase,
                ValidationLevel::Error,
                "test case has no steps",
            )]);
        }

        let mut issues = Vec::new();
        for (index, step) in steps.iter().enumerate() {
            let description_empty = step
                .get("description")
                .and_then(Value::as_str)
                .map(str::is_empty)
                .unwrap_or(true);
            if description_empty {
                issues.push(ValidationIssue::new(
                    self.id.clone(),
                    ValidationScope::TestCaseStep,
                    self.phase,
                    ValidationLevel::Error,
                    format!("step {index} has an empty description"),
                ));
            }

            if self.phase != ValidationPhase::PreMigration {
                let expected_empty = step
                    .get("expected_result")
                    .and_then(Value::as_str)
                    .map(str::is_empty)
                    .unwrap_or(true);
                if expected_empty {
                    issues.push(ValidationIssue::new(
                        self.id.clone(),
                        ValidationScope::TestCaseStep,
                        self.phase,
                        ValidationLevel::Warning,
                        format!("step {index} has an empty expected result"),
                    ));
                }
            }
        }
        Ok(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn attachment_flags_oversize_and_bad_extension() {
        let rule = AttachmentRule::new("attachment", ValidationPhase::Loading, Some(100), Some(vec!["png".into()]));
        let entity = json!({"size": 500, "filename": "evidence.exe"});
        let issues = rule.evaluate(&entity, &ValidationContext::new()).unwrap();
        assert_eq!(issues.len(), 2);
    }

    #[test]
    fn test_step_requires_at_least_one_step() {
        let rule = TestStepValidationRule::new("test_step_validation", ValidationPhase::PreMigration);
        let entity = json!({"steps": []});
        let issues = rule.evaluate(&entity, &ValidationContext::new()).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].level, ValidationLevel::Error);
    }

    #[test]
    fn test_step_expected_result_is_warning_not_blocking_pre_migration() {
        let rule = TestStepValidationRule::new("test_step_validation", ValidationPhase::PreMigration);
        let entity = json!({"steps": [{"description": "do a thing", "expected_result": ""}]});
        let issues = rule.evaluate(&entity, &ValidationContext::new()).unwrap();
        assert!(issues.is_empty());
    }

    #[test]
    fn test_step_expected_result_warns_post_migration() {
        let rule = TestStepValidationRule::new("test_step_validation", ValidationPhase::PostMigration);
        let entity = json!({"steps": [{"description": "do a thing", "expected_result": ""}]});
        let issues = rule.evaluate(&entity, &ValidationContext::new()).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].level, ValidationLevel::Warning);
    }
}
