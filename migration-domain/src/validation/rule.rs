//! The rule trait every concrete validator in §4.6 implements.

use serde_json::Value;

use crate::control_plane::ValidationIssue;
use crate::value_objects::{ValidationPhase, ValidationScope};

use super::context::ValidationContext;

/// A field/value view over an entity. Entities in this crate are typed
/// structs; rules operate on their `serde_json::Value` projection so the
/// same rule implementation works across entity kinds, matching how the
/// original rule set is entity-agnostic.
pub type EntityView = Value;

pub trait ValidationRule: Send + Sync {
    fn id(&self) -> &str;
    fn scope(&self) -> ValidationScope;
    fn phase(&self) -> ValidationPhase;

    /// Evaluates the rule against one entity. Implementations return `Err`
    /// only for genuinely unexpected failures (e.g. a malformed regex
    /// supplied at construction) - the registry converts any `Err` into a
    /// synthetic `system/error` issue rather than propagating it (§4.5).
    fn evaluate(&self, entity: &EntityView, ctx: &ValidationContext) -> crate::error::MigrationResult<Vec<ValidationIssue>>;
}

pub(super) fn field_str<'a>(entity: &'a EntityView, field: &str) -> Option<&'a str> {
    entity.get(field).and_then(Value::as_str)
}

pub(super) fn field_present_and_non_empty(entity: &EntityView, field: &str) -> bool {
    match entity.get(field) {
        None => false,
        Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}
