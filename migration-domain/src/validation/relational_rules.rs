use crate::control_plane::ValidationIssue;
use crate::error::MigrationResult;
use crate::value_objects::{MappingType, ValidationLevel, ValidationPhase, ValidationScope};

use super::context::ValidationContext;
use super::rule::{field_str, EntityView, ValidationRule};

/// The related entity referenced by `relation_field` must exist in the
/// store; the application layer pre-fetches existence into `ctx.known_ids`.
pub struct RelationshipRule {
    id: String,
    scope: ValidationScope,
    phase: ValidationPhase,
    relation_field: String,
    related_entity_type: String,
}

impl RelationshipRule {
    pub fn new(
        id: impl Into<String>,
        scope: ValidationScope,
        phase: ValidationPhase,
        relation_field: impl Into<String>,
        related_entity_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            scope,
            phase,
            relation_field: relation_field.into(),
            related_entity_type: related_entity_type.into(),
        }
    }
}

impl ValidationRule for RelationshipRule {
    fn id(&self) -> &str {
        &self.id
    }
    fn scope(&self) -> ValidationScope {
        self.scope
    }
    fn phase(&self) -> ValidationPhase {
        self.phase
    }

    fn evaluate(&self, entity: &EntityView, ctx: &ValidationContext) -> MigrationResult<Vec<ValidationIssue>> {
        let Some(reference) = field_str(entity, &self.relation_field) else {
            return Ok(Vec::new());
        };
        if ctx.known_ids.contains(reference) {
            Ok(Vec::new())
        } else {
            Ok(vec![ValidationIssue::new(
                self.id.clone(),
                self.scope,
                self.phase,
                ValidationLevel::Error,
                format!(
                    "related {} '{reference}' referenced by '{}' does not exist",
                    self.related_entity_type, self.relation_field
                ),
            )
            .with_field(self.relation_field.clone())])
        }
    }
}

/// No other entity of the same type may share the same value for each
/// configured field; the application layer pre-fetches the other values.
pub struct UniqueValueRule {
    id: String,
    scope: ValidationScope,
    phase: ValidationPhase,
    unique_fields: Vec<String>,
}

impl UniqueValueRule {
    pub fn new(id: impl Into<String>, scope: ValidationScope, phase: ValidationPhase, unique_fields: Vec<String>) -> Self {
        Self {
            id: id.into(),
            scope,
            phase,
            unique_fields,
        }
    }
}

impl ValidationRule for UniqueValueRule {
    fn id(&self) -> &str {
        &self.id
    }
    fn scope(&self) -> ValidationScope {
        self.scope
    }
    fn phase(&self) -> ValidationPhase {
        self.phase
    }

    fn evaluate(&self, entity: &EntityView, ctx: &ValidationContext) -> MigrationResult<Vec<ValidationIssue>> {
        let mut issues = Vec::new();
        for field in &self.unique_fields {
            let Some(value) = field_str(entity, field) else {
                continue;
            };
            if ctx.other_values.iter().any(|other| other == value) {
                issues.push(
                    ValidationIssue::new(
                        self.id.clone(),
                        self.scope,
                        self.phase,
                        ValidationLevel::Error,
                        format!("field '{field}' value '{value}' is not unique"),
                    )
                    .with_field(field.clone()),
                );
            }
        }
        Ok(issues)
    }
}

/// The store must have an `EntityMapping` for the source id in
/// `reference_field`; the application layer pre-fetches mapped ids into
/// `ctx.known_ids`.
pub struct ReferentialIntegrityRule {
    id: String,
    scope: ValidationScope,
    phase: ValidationPhase,
    reference_field: String,
    mapping_type: MappingType,
}

impl ReferentialIntegrityRule {
    pub fn new(
        id: impl Into<String>,
        scope: ValidationScope,
        phase: ValidationPhase,
        reference_field: impl Into<String>,
        mapping_type: MappingType,
    ) -> Self {
        Self {
            id: id.into(),
            scope,
            phase,
            reference_field: reference_field.into(),
            mapping_type,
        }
    }
}

impl ValidationRule for ReferentialIntegrityRule {
    fn id(&self) -> &str {
        &self.id
    }
    fn scope(&self) -> ValidationScope {
        self.scope
    }
    fn phase(&self) -> ValidationPhase {
        self.phase
    }

    fn evaluate(&self, entity: &EntityView, ctx: &ValidationContext) -> MigrationResult<Vec<ValidationIssue>> {
        let Some(reference) = field_str(entity, &self.reference_field) else {
            return Ok(Vec::new());
        };
        if ctx.known_ids.contains(reference) {
            Ok(Vec::new())
        } else {
            Ok(vec![ValidationIssue::new(
                self.id.clone(),
                self.scope,
                self.phase,
                ValidationLevel::Critical,
                format!(
                    "no {} mapping exists for source id '{reference}'",
                    self.mapping_type
                ),
            )
            .with_field(self.reference_field.clone())])
        }
    }
}
