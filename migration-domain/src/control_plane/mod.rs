//! Control-plane entities (§3.2): the engine's own bookkeeping, as opposed to
//! the migrated domain data in `entities`.

pub mod entity_batch;
pub mod entity_mapping;
pub mod migration_state;
pub mod validation_issue;
pub mod workflow_event;

pub use entity_batch::{BatchTrackerMath, EntityBatch};
pub use entity_mapping::EntityMapping;
pub use migration_state::MigrationState;
pub use validation_issue::{ValidationIssue, ValidationReport};
pub use workflow_event::WorkflowEvent;
