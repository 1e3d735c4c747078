//! Validation Manager (§4.5): runs rules against an entity, aggregates
//! issues, and builds the summary report.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::control_plane::ValidationIssue;
use crate::value_objects::{ValidationLevel, ValidationPhase, ValidationScope};

use super::context::ValidationContext;
use super::registry::ValidationRegistry;
use super::rule::EntityView;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueGroup {
    pub count: usize,
    pub truncated: bool,
    pub issues: Vec<ValidationIssue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub project_key: String,
    pub total_issues: usize,
    pub counts_by_level: HashMap<String, usize>,
    pub counts_by_scope: HashMap<String, usize>,
    pub counts_by_phase: HashMap<String, usize>,
    pub critical_issue_count: usize,
    pub error_issue_count: usize,
    pub warning_issue_count: usize,
    pub info_issue_count: usize,
    pub has_critical_issues: bool,
    pub has_error_issues: bool,
    pub generated_at: DateTime<Utc>,
}

pub struct ValidationManager {
    registry: ValidationRegistry,
    issues: Vec<ValidationIssue>,
}

impl ValidationManager {
    pub fn new(registry: ValidationRegistry) -> Self {
        Self {
            registry,
            issues: Vec::new(),
        }
    }

    pub fn registry(&self) -> &ValidationRegistry {
        &self.registry
    }

    /// §4.5: runs every enabled rule matching `(scope, phase)`. A rule whose
    /// `evaluate` returns `Err` is not fatal - it becomes a synthetic
    /// `system/error` issue instead.
    pub fn execute_validation(
        &mut self,
        entity: &EntityView,
        scope: ValidationScope,
        phase: ValidationPhase,
        ctx: &ValidationContext,
        now: DateTime<Utc>,
    ) -> Vec<ValidationIssue> {
        let mut raised = Vec::new();
        for rule in self.registry.for_scope_and_phase(scope, phase) {
            match rule.evaluate(entity, ctx) {
                Ok(issues) => raised.extend(issues),
                Err(err) => raised.push(ValidationIssue::new(
                    format!("rule_execution_error_{}", now.timestamp()),
                    ValidationScope::System,
                    phase,
                    ValidationLevel::Error,
                    format!("rule '{}' raised: {err}", rule.id()),
                )),
            }
        }
        self.issues.extend(raised.clone());
        raised
    }

    pub fn has_critical_issues(&self) -> bool {
        self.issues.iter().any(|i| i.level == ValidationLevel::Critical)
    }

    pub fn has_error_issues(&self) -> bool {
        self.issues.iter().any(|i| i.level == ValidationLevel::Error)
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// §4.5: builds the aggregate report; `max_issues_per_category` bounds
    /// the detail payload per level without affecting the counters.
    pub fn build_summary(&self, project_key: impl Into<String>, now: DateTime<Utc>) -> ValidationSummary {
        let mut counts_by_level = HashMap::new();
        let mut counts_by_scope = HashMap::new();
        let mut counts_by_phase = HashMap::new();

        for issue in &self.issues {
            *counts_by_level.entry(level_key(issue.level).to_string()).or_insert(0) += 1;
            *counts_by_scope.entry(scope_key(issue.scope).to_string()).or_insert(0) += 1;
            *counts_by_phase.entry(phase_key(issue.phase).to_string()).or_insert(0) += 1;
        }

        ValidationSummary {
            project_key: project_key.into(),
            total_issues: self.issues.len(),
            critical_issue_count: *counts_by_level.get("critical").unwrap_or(&0),
            error_issue_count: *counts_by_level.get("error").unwrap_or(&0),
            warning_issue_count: *counts_by_level.get("warning").unwrap_or(&0),
            info_issue_count: *counts_by_level.get("info").unwrap_or(&0),
            has_critical_issues: self.has_critical_issues(),
            has_error_issues: self.has_error_issues(),
            counts_by_level,
            counts_by_scope,
            counts_by_phase,
            generated_at: now,
        }
    }

    pub fn issues_by_level(&self, max_issues_per_category: usize) -> HashMap<String, IssueGroup> {
        let mut grouped: HashMap<String, Vec<ValidationIssue>> = HashMap::new();
        for issue in &self.issues {
            grouped.entry(level_key(issue.level).to_string()).or_default().push(issue.clone());
        }
        grouped
            .into_iter()
            .map(|(level, issues)| {
                let count = issues.len();
                let truncated = count > max_issues_per_category;
                let issues = issues.into_iter().take(max_issues_per_category).collect();
                (level, IssueGroup { count, truncated, issues })
            })
            .collect()
    }
}

fn level_key(level: ValidationLevel) -> &'static str {
    match level {
        ValidationLevel::Info => "info",
        ValidationLevel::Warning => "warning",
        ValidationLevel::Error => "error",
        ValidationLevel::Critical => "critical",
    }
}

fn scope_key(scope: ValidationScope) -> &'static str {
    match scope {
        ValidationScope::Project => "project",
        ValidationScope::Folder => "folder",
        ValidationScope::TestCase => "test_case",
        ValidationScope::TestCaseStep => "test_case_step",
        ValidationScope::TestCycle => "test_cycle",
        ValidationScope::TestExecution => "test_execution",
        ValidationScope::Attachment => "attachment",
        ValidationScope::CustomField => "custom_field",
        ValidationScope::Relationship => "relationship",
        ValidationScope::System => "system",
        ValidationScope::Database => "database",
    }
}

fn phase_key(phase: ValidationPhase) -> &'static str {
    match phase {
        ValidationPhase::PreMigration => "pre_migration",
        ValidationPhase::Extraction => "extraction",
        ValidationPhase::Transformation => "transformation",
        ValidationPhase::Loading => "loading",
        ValidationPhase::PostMigration => "post_migration",
    }
}
