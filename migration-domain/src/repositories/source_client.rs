//! Source client port (§6.1): the service this engine extracts from.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::entities::{Folder, Project, TestCase, TestCycle, TestExecution, TestStep};
use crate::error::MigrationResult;

/// Each paginated method returns a lazy, finite, non-restartable stream -
/// the implementation handles pagination transparently, the caller consumes
/// it once front to back.
pub type EntityPage<'a, T> = BoxStream<'a, MigrationResult<T>>;

#[async_trait]
pub trait SourceClient: Send + Sync {
    async fn get_project(&self, key: &str) -> MigrationResult<Project>;

    fn get_folders(&self) -> EntityPage<'_, Folder>;
    fn get_test_cases(&self) -> EntityPage<'_, TestCase>;
    async fn get_test_steps(&self, case_id: &str) -> MigrationResult<Vec<TestStep>>;
    fn get_test_cycles(&self) -> EntityPage<'_, TestCycle>;
    fn get_test_executions(&self) -> EntityPage<'_, TestExecution>;

    async fn download_attachment(&self, id: &str) -> MigrationResult<Vec<u8>>;

    async fn check_connection(&self) -> MigrationResult<bool>;
}
