use std::collections::HashMap;

use regex::Regex;
use serde_json::Value;

use crate::control_plane::ValidationIssue;
use crate::error::MigrationResult;
use crate::value_objects::{ValidationLevel, ValidationPhase, ValidationScope};

use super::context::ValidationContext;
use super::rule::{field_present_and_non_empty, EntityView, ValidationRule};

/// Every field in `fields` must be present and non-empty (§4.6: empty string
/// and null both fail).
pub struct RequiredFieldRule {
    id: String,
    scope: ValidationScope,
    phase: ValidationPhase,
    fields: Vec<String>,
}

impl RequiredFieldRule {
    pub fn new(id: impl Into<String>, scope: ValidationScope, phase: ValidationPhase, fields: Vec<String>) -> Self {
        Self {
            id: id.into(),
            scope,
            phase,
            fields,
        }
    }
}

impl ValidationRule for RequiredFieldRule {
    fn id(&self) -> &str {
        &self.id
    }
    fn scope(&self) -> ValidationScope {
        self.scope
    }
    fn phase(&self) -> ValidationPhase {
        self.phase
    }

    fn evaluate(&self, entity: &EntityView, _ctx: &ValidationContext) -> MigrationResult<Vec<ValidationIssue>> {
        Ok(self
            .fields
            .iter()
            .filter(|field| !field_present_and_non_empty(entity, field))
            .map(|field| {
                ValidationIssue::new(
                    self.id.clone(),
                    self.scope,
                    self.phase,
                    ValidationLevel::Error,
                    format!("required field '{field}' is missing or empty"),
                )
                .with_field(field.clone())
            })
            .collect())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StringLengthBounds {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

/// `min <= len(value) <= max` for each present string field; absent fields
/// are not this rule's concern (pair with `RequiredFieldRule`).
pub struct StringLengthRule {
    id: String,
    scope: ValidationScope,
    phase: ValidationPhase,
    bounds: HashMap<String, StringLengthBounds>,
}

impl StringLengthRule {
    pub fn new(
        id: impl Into<String>,
        scope: ValidationScope,
        phase: ValidationPhase,
        bounds: HashMap<String, StringLengthBounds>,
    ) -> Self {
        Self {
            id: id.into(),
            scope,
            phase,
            bounds,
        }
    }
}

impl ValidationRule for StringLengthRule {
    fn id(&self) -> &str {
        &self.id
    }
    fn scope(&self) -> ValidationScope {
        self.scope
    }
    fn phase(&self) -> ValidationPhase {
        self.phase
    }

    fn evaluate(&self, entity: &EntityView, _ctx: &ValidationContext) -> MigrationResult<Vec<ValidationIssue>> {
        let mut issues = Vec::new();
        for (field, bounds) in &self.bounds {
            let Some(Value::String(value)) = entity.get(field) else {
                continue;
            };
            let len = value.chars().count();
            let too_short = bounds.min.is_some_and(|min| len < min);
            let too_long = bounds.max.is_some_and(|max| len > max);
            if too_short || too_long {
                issues.push(
                    ValidationIssue::new(
                        self.id.clone(),
                        self.scope,
                        self.phase,
                        ValidationLevel::Error,
                        format!("field '{field}' length {len} outside bounds {bounds:?}"),
                    )
                    .with_field(field.clone()),
                );
            }
        }
        Ok(issues)
    }
}

/// `regex.match(value)` must succeed for every configured field present.
pub struct PatternMatchRule {
    id: String,
    scope: ValidationScope,
    phase: ValidationPhase,
    patterns: HashMap<String, Regex>,
}

impl PatternMatchRule {
    pub fn new(
        id: impl Into<String>,
        scope: ValidationScope,
        phase: ValidationPhase,
        patterns: HashMap<String, String>,
    ) -> Result<Self, regex::Error> {
        let patterns = patterns
            .into_iter()
            .map(|(field, pattern)| Regex::new(&pattern).map(|re| (field, re)))
            .collect::<Result<HashMap<_, _>, _>>()?;
        Ok(Self {
            id: id.into(),
            scope,
            phase,
            patterns,
        })
    }
}

impl ValidationRule for PatternMatchRule {
    fn id(&self) -> &str {
        &self.id
    }
    fn scope(&self) -> ValidationScope {
        self.scope
    }
    fn phase(&self) -> ValidationPhase {
        self.phase
    }

    fn evaluate(&self, entity: &EntityView, _ctx: &ValidationContext) -> MigrationResult<Vec<ValidationIssue>> {
        let mut issues = Vec::new();
        for (field, regex) in &self.patterns {
            let Some(Value::String(value)) = entity.get(field) else {
                continue;
            };
            if !regex.is_match(value) {
                issues.push(
                    ValidationIssue::new(
                        self.id.clone(),
                        self.scope,
                        self.phase,
                        ValidationLevel::Error,
                        format!("field '{field}' does not match required pattern"),
                    )
                    .with_field(field.clone()),
                );
            }
        }
        Ok(issues)
    }
}

#[derive(Debug, Clone)]
pub struct CustomFieldConstraint {
    pub type_name: String,
    pub allowed_values: Option<Vec<String>>,
}

/// Every present custom field must satisfy its configured type and, if
/// given, allowed-values membership.
pub struct CustomFieldRule {
    id: String,
    scope: ValidationScope,
    phase: ValidationPhase,
    constraints: HashMap<String, CustomFieldConstraint>,
}

impl CustomFieldRule {
    pub fn new(
        id: impl Into<String>,
        scope: ValidationScope,
        phase: ValidationPhase,
        constraints: HashMap<String, CustomFieldConstraint>,
    ) -> Self {
        Self {
            id: id.into(),
            scope,
            phase,
            constraints,
        }
    }

    fn type_matches(value: &Value, type_name: &str) -> bool {
        match type_name {
            "string" => value.is_string(),
            "number" => value.is_number(),
            "boolean" => value.is_boolean(),
            "date" => value.is_string(),
            _ => true,
        }
    }
}

impl ValidationRule for CustomFieldRule {
    fn id(&self) -> &str {
        &self.id
    }
    fn scope(&self) -> ValidationScope {
        self.scope
    }
    fn phase(&self) -> ValidationPhase {
        self.phase
    }

    fn evaluate(&self, entity: &EntityView, _ctx: &ValidationContext) -> MigrationResult<Vec<ValidationIssue>> {
        let Some(custom_fields) = entity.get("custom_fields").and_then(Value::as_object) else {
            return Ok(Vec::new());
        };
        let mut issues = Vec::new();
        for (field, constraint) in &self.constraints {
            let Some(value) = custom_fields.get(field) else {
                continue;
            };
            if !Self::type_matches(value, &constraint.type_name) {
                issues.push(
                    ValidationIssue::new(
                        self.id.clone(),
                        self.scope,
                        self.phase,
                        ValidationLevel::Error,
                        format!("custom field '{field}' does not match type '{}'", constraint.type_name),
                    )
                    .with_field(field.clone()),
                );
                continue;
            }
            if let Some(allowed) = &constraint.allowed_values {
                let as_str = value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string());
                if !allowed.contains(&as_str) {
                    issues.push(
                        ValidationIssue::new(
                            self.id.clone(),
                            self.scope,
                            self.phase,
                            ValidationLevel::Error,
                            format!("custom field '{field}' value '{as_str}' is not in the allowed set"),
                        )
                        .with_field(field.clone()),
                    );
                }
            }
        }
        Ok(issues)
    }
}

/// Validates an entity under a JSON Schema Draft 2020-12 document.
pub struct JsonSchemaRule {
    id: String,
    scope: ValidationScope,
    phase: ValidationPhase,
    schema: Value,
}

impl JsonSchemaRule {
    pub fn new(id: impl Into<String>, scope: ValidationScope, phase: ValidationPhase, schema: Value) -> Self {
        Self {
            id: id.into(),
            scope,
            phase,
            schema,
        }
    }
}

impl ValidationRule for JsonSchemaRule {
    fn id(&self) -> &str {
        &self.id
    }
    fn scope(&self) -> ValidationScope {
        self.scope
    }
    fn phase(&self) -> ValidationPhase {
        self.phase
    }

    fn evaluate(&self, entity: &EntityView, _ctx: &ValidationContext) -> MigrationResult<Vec<ValidationIssue>> {
        let compiled = jsonschema::JSONSchema::options()
            .with_draft(jsonschema::Draft::Draft202012)
            .compile(&self.schema)
            .map_err(|e| crate::error::MigrationError::validation_failed(format!("invalid schema: {e}")))?;
        let issues = match compiled.validate(entity) {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .map(|err| {
                    ValidationIssue::new(
                        self.id.clone(),
                        self.scope,
                        self.phase,
                        ValidationLevel::Error,
                        format!("schema violation at {}: {}", err.instance_path, err),
                    )
                })
                .collect(),
        };
        Ok(issues)
    }
}
