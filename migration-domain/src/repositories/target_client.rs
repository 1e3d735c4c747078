//! Target client port (§6.2): the service this engine loads into.

use async_trait::async_trait;

use crate::entities::{Module, TargetProject, TargetTestCase, TargetTestCycle, TestLog, TestRun};
use crate::error::MigrationResult;

#[async_trait]
pub trait TargetClient: Send + Sync {
    async fn create_module(&self, module: &Module) -> MigrationResult<String>;
    async fn create_test_case(&self, case: &TargetTestCase) -> MigrationResult<String>;
    async fn create_test_cycle(&self, cycle: &TargetTestCycle) -> MigrationResult<String>;
    async fn create_test_run(&self, run: &TestRun) -> MigrationResult<String>;
    async fn submit_test_log(&self, run_id: &str, log: &TestLog) -> MigrationResult<()>;
    async fn upload_attachment(
        &self,
        object_type: &str,
        object_id: &str,
        file_path: &std::path::Path,
    ) -> MigrationResult<()>;

    async fn delete_test_run(&self, id: &str) -> MigrationResult<()>;
    async fn delete_test_cycle(&self, id: &str) -> MigrationResult<()>;
    async fn delete_test_case(&self, id: &str) -> MigrationResult<()>;

    async fn check_connection(&self) -> MigrationResult<bool>;
    async fn get_project(&self, id: &str) -> MigrationResult<TargetProject>;
}
