//! Domain entities (§3.1): the test-management artifacts extracted from
//! Source, plus their target-shaped counterparts produced by Transform.

pub mod attachment;
pub mod folder;
pub mod project;
pub mod target;
pub mod test_case;
pub mod test_cycle;
pub mod test_execution;

pub use attachment::{Attachment, AttachmentRef, RelatedEntityType};
pub use folder::Folder;
pub use project::Project;
pub use target::{Module, TargetProject, TestLog, TestRun, TestStepLog};
pub use test_case::{TargetTestCase, TestCase, TestStep, TargetTestStep};
pub use test_cycle::{TargetTestCycle, TestCycle};
pub use test_execution::{StepResult, TestExecution};

/// Implemented by any entity the batch strategies (§4.1) can size. Default
/// weight is 1 (count-based batching); entities with a meaningful byte size
/// (attachments) override it.
pub trait HasSize {
    fn size(&self) -> f64 {
        1.0
    }
}
