//! Validation Core (C5, §4.5) and the required rule set (C6, §4.6).

mod comparison_rules;
mod context;
mod field_rules;
mod manager;
mod registry;
mod relational_rules;
mod rule;
mod structural_rules;

pub use comparison_rules::{CustomFieldTransformationRule, DataIntegrityRule, TestStatusMappingRule};
pub use context::ValidationContext;
pub use field_rules::{CustomFieldConstraint, CustomFieldRule, JsonSchemaRule, PatternMatchRule, RequiredFieldRule, StringLengthBounds, StringLengthRule};
pub use manager::{IssueGroup, ValidationManager, ValidationSummary};
pub use registry::ValidationRegistry;
pub use relational_rules::{ReferentialIntegrityRule, RelationshipRule, UniqueValueRule};
pub use rule::{EntityView, ValidationRule};
pub use structural_rules::{AttachmentRule, TestStepValidationRule};
