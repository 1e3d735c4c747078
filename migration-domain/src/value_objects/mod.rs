//! Small, immutable value types shared across entities and control-plane
//! records.

pub mod custom_field;
pub mod mapping_type;
pub mod phase;
pub mod priority;
pub mod status;
pub mod validation;

pub use custom_field::{CustomFieldValue, CustomFields};
pub use mapping_type::MappingType;
pub use phase::{Phase, PhaseStatus};
pub use priority::Priority;
pub use status::{ExecutionStatus, FolderKind};
pub use validation::{ValidationLevel, ValidationPhase, ValidationScope};

/// The kind of test-management entity a batch, mapping, or event concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Folder,
    TestCase,
    TestCycle,
    TestExecution,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Folder => "folder",
            EntityType::TestCase => "test_case",
            EntityType::TestCycle => "test_cycle",
            EntityType::TestExecution => "test_execution",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
