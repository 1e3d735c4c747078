// /////////////////////////////////////////////////////////////////////////////
// Migration Engine
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Rollback (§4.9): undoes Target-side writes in strict reverse order of
//! creation - executions, then cycles, then cases - and clears the
//! Transform/Extract store rows. Two things rollback deliberately does
//! *not* do: delete Target modules (the port has no `delete_module`) or
//! delete `EntityMapping` rows (§4.9 Scenario E: "mappings remain" so a
//! subsequent re-run can still recognize what was already created).

use std::sync::Arc;

use migration_domain::repositories::{MigrationStore, TargetClient};
use migration_domain::value_objects::MappingType;
use migration_domain::{MigrationError, MigrationResult};

/// Deletes `id` on Target via `delete`, treating "already gone"
/// (`MigrationError::NotFound`) as success rather than a rollback failure.
async fn delete_ignoring_not_found<F, Fut>(delete: F) -> MigrationResult<()>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = MigrationResult<()>>,
{
    match delete().await {
        Ok(()) => Ok(()),
        Err(MigrationError::NotFound(_)) => Ok(()),
        Err(err) => Err(err),
    }
}

/// Rolls back everything Load/Transform/Extract wrote for `project_key`.
/// Returns the number of Target-side deletes that failed (for a non-fatal
/// error, e.g. a transient `TargetClient` failure unrelated to "already
/// deleted") so the orchestrator can decide whether rollback itself is
/// `completed` or only `partial`.
pub async fn rollback_migration(store: &Arc<dyn MigrationStore>, target: &Arc<dyn TargetClient>, project_key: &str) -> MigrationResult<u32> {
    let mut failures = 0u32;

    for mapping in store.get_entity_mappings(project_key, MappingType::ExecutionToRun).await? {
        if delete_ignoring_not_found(|| target.delete_test_run(&mapping.target_id)).await.is_err() {
            failures += 1;
        }
    }
    for mapping in store.get_entity_mappings(project_key, MappingType::CycleToCycle).await? {
        if delete_ignoring_not_found(|| target.delete_test_cycle(&mapping.target_id)).await.is_err() {
            failures += 1;
        }
    }
    for mapping in store.get_entity_mappings(project_key, MappingType::TestcaseToTestcase).await? {
        if delete_ignoring_not_found(|| target.delete_test_case(&mapping.target_id)).await.is_err() {
            failures += 1;
        }
    }

    // Modules have no Target-side delete in this port (§6.2): Rollback
    // leaves them in place, a documented limitation rather than a gap.

    store.delete_transformed_entities(project_key).await?;
    store.delete_extracted_entities(project_key).await?;
    store.delete_entity_batches(project_key).await?;
    // EntityMapping rows are intentionally preserved (§4.9 Scenario E).

    Ok(failures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FakeTarget {
        delete_calls: Mutex<Vec<String>>,
        fail_id: Option<String>,
    }

    #[async_trait]
    impl TargetClient for FakeTarget {
        async fn create_module(&self, _: &migration_domain::entities::Module) -> MigrationResult<String> {
            unimplemented!()
        }
        async fn create_test_case(&self, _: &migration_domain::entities::TargetTestCase) -> MigrationResult<String> {
            unimplemented!()
        }
        async fn create_test_cycle(&self, _: &migration_domain::entities::TargetTestCycle) -> MigrationResult<String> {
            unimplemented!()
        }
        async fn create_test_run(&self, _: &migration_domain::entities::TestRun) -> MigrationResult<String> {
            unimplemented!()
        }
        async fn submit_test_log(&self, _: &str, _: &migration_domain::entities::TestLog) -> MigrationResult<()> {
            unimplemented!()
        }
        async fn upload_attachment(&self, _: &str, _: &str, _: &std::path::Path) -> MigrationResult<()> {
            unimplemented!()
        }
        async fn delete_test_run(&self, id: &str) -> MigrationResult<()> {
            self.delete_calls.lock().unwrap().push(id.to_string());
            if self.fail_id.as_deref() == Some(id) {
                return Err(MigrationError::processing_failed("boom"));
            }
            Ok(())
        }
        async fn delete_test_cycle(&self, id: &str) -> MigrationResult<()> {
            self.delete_calls.lock().unwrap().push(id.to_string());
            Ok(())
        }
        async fn delete_test_case(&self, id: &str) -> MigrationResult<()> {
            if id == "missing" {
                return Err(MigrationError::not_found("gone already"));
            }
            self.delete_calls.lock().unwrap().push(id.to_string());
            Ok(())
        }
        async fn check_connection(&self) -> MigrationResult<bool> {
            Ok(true)
        }
        async fn get_project(&self, _: &str) -> MigrationResult<migration_domain::entities::TargetProject> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn not_found_is_not_a_failure() {
        let target: Arc<dyn TargetClient> = Arc::new(FakeTarget { delete_calls: Mutex::new(Vec::new()), fail_id: None });
        let result = delete_ignoring_not_found(|| async { target.delete_test_case("missing").await }).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn real_error_is_still_a_failure() {
        let target = FakeTarget { delete_calls: Mutex::new(Vec::new()), fail_id: Some("RUN-1".into()) };
        let result = delete_ignoring_not_found(|| target.delete_test_run("RUN-1")).await;
        assert!(result.is_err());
    }
}
