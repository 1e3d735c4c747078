//! Validation findings (§4.5/§4.6): the output of running validation rules
//! against extracted, transformed, or loaded data.

use serde::{Deserialize, Serialize};

use crate::value_objects::{ValidationLevel, ValidationPhase, ValidationScope};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub rule_name: String,
    pub scope: ValidationScope,
    pub phase: ValidationPhase,
    pub level: ValidationLevel,
    pub entity_id: Option<String>,
    pub field: Option<String>,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(
        rule_name: impl Into<String>,
        scope: ValidationScope,
        phase: ValidationPhase,
        level: ValidationLevel,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule_name: rule_name.into(),
            scope,
            phase,
            level,
            entity_id: None,
            field: None,
            message: message.into(),
        }
    }

    pub fn with_entity(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn is_blocking(&self) -> bool {
        matches!(self.level, ValidationLevel::Error | ValidationLevel::Critical)
    }
}

/// The aggregate report for one validation run (§4.5): a project's issues
/// grouped for the `status` / `validate` CLI surfaces.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    pub fn extend(&mut self, issues: impl IntoIterator<Item = ValidationIssue>) {
        self.issues.extend(issues);
    }

    /// §4.5: a report with any `error`/`critical` issue fails validation.
    pub fn has_blocking_issues(&self) -> bool {
        self.issues.iter().any(ValidationIssue::is_blocking)
    }

    pub fn count_by_level(&self, level: ValidationLevel) -> usize {
        self.issues.iter().filter(|i| i.level == level).count()
    }

    pub fn for_scope(&self, scope: ValidationScope) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |i| i.scope == scope)
    }
}
