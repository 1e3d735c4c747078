//! Validation Core closed sets (§4.5): scopes, phases, and severity levels.

use serde::{Deserialize, Serialize};

/// Closed set of scopes a validation rule may be registered against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationScope {
    Project,
    Folder,
    TestCase,
    TestCaseStep,
    TestCycle,
    TestExecution,
    Attachment,
    CustomField,
    Relationship,
    System,
    Database,
}

/// Closed set of phases a validation rule may run at. `Pre`/`Post` variants
/// wrap a migration phase for rule lookup (pre-phase/post-phase hooks, §4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPhase {
    PreMigration,
    Extraction,
    Transformation,
    Loading,
    PostMigration,
}

/// Ordered severity: `info < warning < error < critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationLevel {
    Info,
    Warning,
    Error,
    Critical,
}
