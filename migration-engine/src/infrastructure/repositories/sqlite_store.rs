// /////////////////////////////////////////////////////////////////////////////
// Migration Engine
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! `SqlitePool`-backed implementation of [`MigrationStore`] (§13). Each
//! entity is stored as a JSON payload alongside the handful of columns the
//! store needs to filter and join on - the same shape the schema in
//! `../../../../migrations` declares.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use sqlx::{Row, SqlitePool};

use migration_domain::control_plane::entity_batch::BatchStatus;
use migration_domain::control_plane::{EntityBatch, EntityMapping, MigrationState, ValidationIssue, ValidationReport, WorkflowEvent};
use migration_domain::entities::{
    Folder, Module, Project, RelatedEntityType, TargetProject, TargetTestCase, TargetTestCycle, TestCase, TestCycle,
    TestExecution,
};
use migration_domain::repositories::MigrationStore;
use migration_domain::value_objects::{EntityType, MappingType, ValidationLevel};
use migration_domain::{MigrationError, MigrationResult};

/// Serializes a closed-set enum (`#[serde(rename_all = "snake_case")]`) to
/// its bare string form, e.g. `EntityType::TestCase` -> `"test_case"`.
fn enum_str<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => s,
        _ => String::new(),
    }
}

fn enum_from_str<T: DeserializeOwned>(s: &str) -> MigrationResult<T> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|e| MigrationError::DatabaseError(format!("invalid enum value '{s}': {e}")))
}

fn db_err(err: sqlx::Error) -> MigrationError {
    MigrationError::DatabaseError(err.to_string())
}

fn ser<T: Serialize>(value: &T) -> MigrationResult<String> {
    serde_json::to_string(value).map_err(MigrationError::from)
}

fn de<T: DeserializeOwned>(payload: &str) -> MigrationResult<T> {
    serde_json::from_str(payload).map_err(MigrationError::from)
}

pub struct SqliteMigrationStore {
    pool: SqlitePool,
}

impl SqliteMigrationStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MigrationStore for SqliteMigrationStore {
    // -- Extracted (Source-shaped) entities ---------------------------------

    async fn save_project(&self, project: &Project) -> MigrationResult<()> {
        sqlx::query("INSERT OR REPLACE INTO projects (project_key, name, payload) VALUES (?, ?, ?)")
            .bind(&project.key)
            .bind(&project.name)
            .bind(ser(project)?)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn save_folders(&self, project_key: &str, folders: &[Folder]) -> MigrationResult<()> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        for folder in folders {
            sqlx::query(
                "INSERT OR REPLACE INTO folders (project_key, source_id, parent_source_id, name, payload) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(project_key)
            .bind(&folder.source_id)
            .bind(&folder.parent_source_id)
            .bind(&folder.name)
            .bind(ser(folder)?)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }
        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn save_test_cases(&self, project_key: &str, cases: &[TestCase]) -> MigrationResult<()> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        for case in cases {
            sqlx::query(
                "INSERT OR REPLACE INTO test_cases (project_key, source_id, folder_source_id, name, payload) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(project_key)
            .bind(&case.source_id)
            .bind(&case.folder_source_id)
            .bind(&case.name)
            .bind(ser(case)?)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }
        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn save_test_cycles(&self, project_key: &str, cycles: &[TestCycle]) -> MigrationResult<()> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        for cycle in cycles {
            sqlx::query("INSERT OR REPLACE INTO test_cycles (project_key, source_id, name, payload) VALUES (?, ?, ?, ?)")
                .bind(project_key)
                .bind(&cycle.source_id)
                .bind(&cycle.name)
                .bind(ser(cycle)?)
                .execute(&mut *tx)
                .await
                .map_err(db_err)?;
        }
        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn save_test_executions(&self, project_key: &str, executions: &[TestExecution]) -> MigrationResult<()> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        for execution in executions {
            sqlx::query(
                "INSERT OR REPLACE INTO test_executions (project_key, source_id, test_cycle_source_id, test_case_source_id, payload) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(project_key)
            .bind(&execution.source_id)
            .bind(&execution.test_cycle_source_id)
            .bind(&execution.test_case_source_id)
            .bind(ser(execution)?)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }
        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn save_attachment(
        &self,
        related_type: RelatedEntityType,
        related_id: &str,
        name: &str,
        content: Option<&[u8]>,
        url: Option<&str>,
    ) -> MigrationResult<()> {
        #[derive(Serialize)]
        struct AttachmentRow<'a> {
            related_type: RelatedEntityType,
            has_content: bool,
            url: Option<&'a str>,
        }
        let payload = ser(&AttachmentRow {
            related_type,
            has_content: content.is_some(),
            url,
        })?;
        sqlx::query(
            "INSERT OR REPLACE INTO attachments (project_key, related_source_id, name, content_type, size_bytes, payload) VALUES ('', ?, ?, NULL, ?, ?)",
        )
        .bind(related_id)
        .bind(name)
        .bind(content.map(|c| c.len() as i64).unwrap_or(0))
        .bind(payload)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn get_project(&self, project_key: &str) -> MigrationResult<Option<Project>> {
        let row = sqlx::query("SELECT payload FROM projects WHERE project_key = ?")
            .bind(project_key)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.map(|r| de(r.get::<String, _>("payload").as_str())).transpose()
    }

    async fn get_folders(&self, project_key: &str) -> MigrationResult<Vec<Folder>> {
        let rows = sqlx::query("SELECT payload FROM folders WHERE project_key = ?")
            .bind(project_key)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.into_iter().map(|r| de(r.get::<String, _>("payload").as_str())).collect()
    }

    async fn get_test_cases(&self, project_key: &str) -> MigrationResult<Vec<TestCase>> {
        let rows = sqlx::query("SELECT payload FROM test_cases WHERE project_key = ?")
            .bind(project_key)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.into_iter().map(|r| de(r.get::<String, _>("payload").as_str())).collect()
    }

    async fn get_test_cycles(&self, project_key: &str) -> MigrationResult<Vec<TestCycle>> {
        let rows = sqlx::query("SELECT payload FROM test_cycles WHERE project_key = ?")
            .bind(project_key)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.into_iter().map(|r| de(r.get::<String, _>("payload").as_str())).collect()
    }

    async fn get_test_executions(&self, project_key: &str) -> MigrationResult<Vec<TestExecution>> {
        let rows = sqlx::query("SELECT payload FROM test_executions WHERE project_key = ?")
            .bind(project_key)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.into_iter().map(|r| de(r.get::<String, _>("payload").as_str())).collect()
    }

    async fn count_entities(&self, project_key: &str, entity_type: EntityType) -> MigrationResult<u64> {
        let table = match entity_type {
            EntityType::Folder => "folders",
            EntityType::TestCase => "test_cases",
            EntityType::TestCycle => "test_cycles",
            EntityType::TestExecution => "test_executions",
        };
        let sql = format!("SELECT COUNT(*) as n FROM {table} WHERE project_key = ?");
        let row = sqlx::query(&sql).bind(project_key).fetch_one(&self.pool).await.map_err(db_err)?;
        Ok(row.get::<i64, _>("n") as u64)
    }

    async fn delete_extracted_entities(&self, project_key: &str) -> MigrationResult<()> {
        for table in ["folders", "test_cases", "test_steps", "test_cycles", "test_executions", "attachments"] {
            let sql = format!("DELETE FROM {table} WHERE project_key = ?");
            sqlx::query(&sql).bind(project_key).execute(&self.pool).await.map_err(db_err)?;
        }
        Ok(())
    }

    // -- Transformed (Target-shaped) entities --------------------------------

    async fn save_transformed_project(&self, project_key: &str, project: &TargetProject) -> MigrationResult<()> {
        sqlx::query("INSERT OR REPLACE INTO transformed_project (project_key, payload) VALUES (?, ?)")
            .bind(project_key)
            .bind(ser(project)?)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn save_transformed_module(&self, project_key: &str, module: &Module) -> MigrationResult<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO transformed_modules (project_key, source_folder_id, level, payload) VALUES (?, ?, ?, ?)",
        )
        .bind(project_key)
        .bind(&module.source_folder_id)
        .bind(module.level as i64)
        .bind(ser(module)?)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn save_transformed_test_case(&self, project_key: &str, case: &TargetTestCase) -> MigrationResult<()> {
        sqlx::query("INSERT OR REPLACE INTO transformed_test_cases (project_key, source_id, payload) VALUES (?, ?, ?)")
            .bind(project_key)
            .bind(&case.source_id)
            .bind(ser(case)?)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn save_transformed_test_cycle(&self, project_key: &str, cycle: &TargetTestCycle) -> MigrationResult<()> {
        sqlx::query("INSERT OR REPLACE INTO transformed_test_cycles (project_key, source_id, payload) VALUES (?, ?, ?)")
            .bind(project_key)
            .bind(&cycle.source_id)
            .bind(ser(cycle)?)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn save_transformed_execution(&self, project_key: &str, source_id: &str, run_id: &str) -> MigrationResult<()> {
        sqlx::query("INSERT OR REPLACE INTO transformed_executions (project_key, source_id, run_id) VALUES (?, ?, ?)")
            .bind(project_key)
            .bind(source_id)
            .bind(run_id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn get_transformed_modules_by_level(&self, project_key: &str) -> MigrationResult<Vec<Module>> {
        let rows = sqlx::query("SELECT payload FROM transformed_modules WHERE project_key = ? ORDER BY level ASC")
            .bind(project_key)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.into_iter().map(|r| de(r.get::<String, _>("payload").as_str())).collect()
    }

    async fn get_transformed_test_cases(&self, project_key: &str) -> MigrationResult<Vec<TargetTestCase>> {
        let rows = sqlx::query("SELECT payload FROM transformed_test_cases WHERE project_key = ?")
            .bind(project_key)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.into_iter().map(|r| de(r.get::<String, _>("payload").as_str())).collect()
    }

    async fn get_transformed_test_cycles(&self, project_key: &str) -> MigrationResult<Vec<TargetTestCycle>> {
        let rows = sqlx::query("SELECT payload FROM transformed_test_cycles WHERE project_key = ?")
            .bind(project_key)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.into_iter().map(|r| de(r.get::<String, _>("payload").as_str())).collect()
    }

    async fn delete_transformed_entities(&self, project_key: &str) -> MigrationResult<()> {
        for table in ["transformed_project", "transformed_modules", "transformed_test_cases", "transformed_test_cycles", "transformed_executions"] {
            let sql = format!("DELETE FROM {table} WHERE project_key = ?");
            sqlx::query(&sql).bind(project_key).execute(&self.pool).await.map_err(db_err)?;
        }
        Ok(())
    }

    // -- Entity mappings ------------------------------------------------------

    async fn save_entity_mapping(&self, mapping: &EntityMapping) -> MigrationResult<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO entity_mappings (project_key, mapping_type, source_id, target_id, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&mapping.project_key)
        .bind(enum_str(&mapping.mapping_type))
        .bind(&mapping.source_id)
        .bind(&mapping.target_id)
        .bind(mapping.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn get_entity_mapping(
        &self,
        project_key: &str,
        mapping_type: MappingType,
        source_id: &str,
    ) -> MigrationResult<Option<EntityMapping>> {
        let row = sqlx::query(
            "SELECT target_id, created_at FROM entity_mappings WHERE project_key = ? AND mapping_type = ? AND source_id = ?",
        )
        .bind(project_key)
        .bind(enum_str(&mapping_type))
        .bind(source_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(|r| {
            let created_at = chrono::DateTime::parse_from_rfc3339(r.get::<String, _>("created_at").as_str())
                .map(|dt| dt.with_timezone(&chrono::Utc))
                .map_err(|e| MigrationError::DatabaseError(e.to_string()))?;
            Ok(EntityMapping::new(project_key, mapping_type, source_id, r.get::<String, _>("target_id"), created_at))
        })
        .transpose()
    }

    async fn get_entity_mappings(&self, project_key: &str, mapping_type: MappingType) -> MigrationResult<Vec<EntityMapping>> {
        let rows = sqlx::query("SELECT source_id, target_id, created_at FROM entity_mappings WHERE project_key = ? AND mapping_type = ?")
            .bind(project_key)
            .bind(enum_str(&mapping_type))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.into_iter()
            .map(|r| {
                let created_at = chrono::DateTime::parse_from_rfc3339(r.get::<String, _>("created_at").as_str())
                    .map(|dt| dt.with_timezone(&chrono::Utc))
                    .map_err(|e| MigrationError::DatabaseError(e.to_string()))?;
                Ok(EntityMapping::new(project_key, mapping_type, r.get::<String, _>("source_id"), r.get::<String, _>("target_id"), created_at))
            })
            .collect()
    }

    async fn get_entity_mappings_for_rollback(&self, project_key: &str) -> MigrationResult<Vec<EntityMapping>> {
        let rows = sqlx::query("SELECT mapping_type, source_id, target_id, created_at FROM entity_mappings WHERE project_key = ? ORDER BY created_at DESC")
            .bind(project_key)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.into_iter()
            .map(|r| {
                let mapping_type: MappingType = enum_from_str(r.get::<String, _>("mapping_type").as_str())?;
                let created_at = chrono::DateTime::parse_from_rfc3339(r.get::<String, _>("created_at").as_str())
                    .map(|dt| dt.with_timezone(&chrono::Utc))
                    .map_err(|e| MigrationError::DatabaseError(e.to_string()))?;
                Ok(EntityMapping::new(project_key, mapping_type, r.get::<String, _>("source_id"), r.get::<String, _>("target_id"), created_at))
            })
            .collect()
    }

    async fn get_mapped_entity_id(&self, project_key: &str, mapping_type: MappingType, source_id: &str) -> MigrationResult<Option<String>> {
        let row = sqlx::query("SELECT target_id FROM entity_mappings WHERE project_key = ? AND mapping_type = ? AND source_id = ?")
            .bind(project_key)
            .bind(enum_str(&mapping_type))
            .bind(source_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.map(|r| r.get::<String, _>("target_id")))
    }

    async fn count_entity_mappings(&self, project_key: &str, mapping_type: MappingType) -> MigrationResult<u64> {
        let row = sqlx::query("SELECT COUNT(*) as n FROM entity_mappings WHERE project_key = ? AND mapping_type = ?")
            .bind(project_key)
            .bind(enum_str(&mapping_type))
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.get::<i64, _>("n") as u64)
    }

    async fn delete_entity_mappings(&self, project_key: &str) -> MigrationResult<()> {
        sqlx::query("DELETE FROM entity_mappings WHERE project_key = ?")
            .bind(project_key)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    // -- Control plane --------------------------------------------------------

    async fn get_migration_state(&self, project_key: &str) -> MigrationResult<MigrationState> {
        let row = sqlx::query("SELECT extraction_status, transformation_status, loading_status, rollback_status, error_message, is_incremental, meta_data, last_run_timestamp FROM migration_state WHERE project_key = ?")
            .bind(project_key)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        let Some(row) = row else {
            return Ok(MigrationState::new(project_key));
        };

        let last_run_timestamp: Option<String> = row.get("last_run_timestamp");
        Ok(MigrationState {
            project_key: project_key.to_string(),
            extraction_status: enum_from_str(row.get::<String, _>("extraction_status").as_str())?,
            transformation_status: enum_from_str(row.get::<String, _>("transformation_status").as_str())?,
            loading_status: enum_from_str(row.get::<String, _>("loading_status").as_str())?,
            rollback_status: enum_from_str(row.get::<String, _>("rollback_status").as_str())?,
            error_message: row.get("error_message"),
            is_incremental: row.get::<i64, _>("is_incremental") != 0,
            meta_data: row.get("meta_data"),
            last_run_timestamp: last_run_timestamp
                .map(|s| {
                    chrono::DateTime::parse_from_rfc3339(&s)
                        .map(|dt| dt.with_timezone(&chrono::Utc))
                        .map_err(|e| MigrationError::DatabaseError(e.to_string()))
                })
                .transpose()?,
        })
    }

    async fn update_migration_state(&self, state: &MigrationState) -> MigrationResult<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO migration_state (project_key, extraction_status, transformation_status, loading_status, rollback_status, error_message, is_incremental, meta_data, last_run_timestamp) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&state.project_key)
        .bind(enum_str(&state.extraction_status))
        .bind(enum_str(&state.transformation_status))
        .bind(enum_str(&state.loading_status))
        .bind(enum_str(&state.rollback_status))
        .bind(&state.error_message)
        .bind(state.is_incremental as i64)
        .bind(&state.meta_data)
        .bind(state.last_run_timestamp.map(|ts| ts.to_rfc3339()))
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn delete_migration_state(&self, project_key: &str) -> MigrationResult<()> {
        sqlx::query("DELETE FROM migration_state WHERE project_key = ?")
            .bind(project_key)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn create_entity_batch(&self, batch: &EntityBatch) -> MigrationResult<()> {
        self.update_entity_batch(batch).await
    }

    async fn update_entity_batch(&self, batch: &EntityBatch) -> MigrationResult<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO entity_batches (project_key, entity_type, batch_number, total_batches, items_count, processed_count, status, error_message, is_incremental) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&batch.project_key)
        .bind(enum_str(&batch.entity_type))
        .bind(batch.batch_number as i64)
        .bind(batch.total_batches as i64)
        .bind(batch.items_count as i64)
        .bind(batch.processed_count as i64)
        .bind(enum_str(&batch.status))
        .bind(&batch.error_message)
        .bind(batch.is_incremental as i64)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn get_pending_entity_batches(&self, project_key: &str, entity_type: EntityType) -> MigrationResult<Vec<EntityBatch>> {
        self.get_entity_batches_by_status(project_key, entity_type, BatchStatus::Pending, None).await
    }

    async fn get_entity_batches_by_status(
        &self,
        project_key: &str,
        entity_type: EntityType,
        status: BatchStatus,
        is_incremental: Option<bool>,
    ) -> MigrationResult<Vec<EntityBatch>> {
        let rows = if let Some(is_incremental) = is_incremental {
            sqlx::query(
                "SELECT batch_number, total_batches, items_count, processed_count, error_message, is_incremental FROM entity_batches WHERE project_key = ? AND entity_type = ? AND status = ? AND is_incremental = ? ORDER BY batch_number ASC",
            )
            .bind(project_key)
            .bind(enum_str(&entity_type))
            .bind(enum_str(&status))
            .bind(is_incremental as i64)
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query(
                "SELECT batch_number, total_batches, items_count, processed_count, error_message, is_incremental FROM entity_batches WHERE project_key = ? AND entity_type = ? AND status = ? ORDER BY batch_number ASC",
            )
            .bind(project_key)
            .bind(enum_str(&entity_type))
            .bind(enum_str(&status))
            .fetch_all(&self.pool)
            .await
        }
        .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|r| EntityBatch {
                project_key: project_key.to_string(),
                entity_type,
                batch_number: r.get::<i64, _>("batch_number") as u32,
                total_batches: r.get::<i64, _>("total_batches") as u32,
                items_count: r.get::<i64, _>("items_count") as u32,
                processed_count: r.get::<i64, _>("processed_count") as u32,
                status,
                error_message: r.get("error_message"),
                is_incremental: r.get::<i64, _>("is_incremental") != 0,
            })
            .collect())
    }

    async fn get_incomplete_batches(&self, project_key: &str) -> MigrationResult<Vec<EntityBatch>> {
        let rows = sqlx::query(
            "SELECT entity_type, batch_number, total_batches, items_count, processed_count, status, error_message, is_incremental FROM entity_batches WHERE project_key = ? AND status != 'completed' ORDER BY entity_type ASC, batch_number ASC",
        )
        .bind(project_key)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter()
            .map(|r| {
                Ok(EntityBatch {
                    project_key: project_key.to_string(),
                    entity_type: enum_from_str(r.get::<String, _>("entity_type").as_str())?,
                    batch_number: r.get::<i64, _>("batch_number") as u32,
                    total_batches: r.get::<i64, _>("total_batches") as u32,
                    items_count: r.get::<i64, _>("items_count") as u32,
                    processed_count: r.get::<i64, _>("processed_count") as u32,
                    status: enum_from_str(r.get::<String, _>("status").as_str())?,
                    error_message: r.get("error_message"),
                    is_incremental: r.get::<i64, _>("is_incremental") != 0,
                })
            })
            .collect()
    }

    async fn delete_entity_batches(&self, project_key: &str) -> MigrationResult<()> {
        sqlx::query("DELETE FROM entity_batches WHERE project_key = ?")
            .bind(project_key)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    // -- Events / validation ----------------------------------------------------

    async fn save_workflow_event(&self, event: &WorkflowEvent) -> MigrationResult<()> {
        sqlx::query("INSERT INTO workflow_events (project_key, phase, kind, message, timestamp) VALUES (?, ?, ?, ?, ?)")
            .bind(&event.project_key)
            .bind(event.phase.map(|p| enum_str(&p)))
            .bind(enum_str(&event.kind))
            .bind(&event.message)
            .bind(event.timestamp.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn delete_workflow_events(&self, project_key: &str) -> MigrationResult<()> {
        sqlx::query("DELETE FROM workflow_events WHERE project_key = ?")
            .bind(project_key)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn save_validation_issue(&self, project_key: &str, issue: &ValidationIssue) -> MigrationResult<()> {
        sqlx::query(
            "INSERT INTO validation_issues (project_key, rule_name, scope, phase, level, entity_id, field, message, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(project_key)
        .bind(&issue.rule_name)
        .bind(enum_str(&issue.scope))
        .bind(enum_str(&issue.phase))
        .bind(enum_str(&issue.level))
        .bind(&issue.entity_id)
        .bind(&issue.field)
        .bind(&issue.message)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn get_validation_issues(
        &self,
        project_key: &str,
        resolved: Option<bool>,
        level: Option<ValidationLevel>,
    ) -> MigrationResult<Vec<ValidationIssue>> {
        // Resolution tracking is not part of this store's schema (§13: issues are
        // append-only per run); `resolved` is accepted for interface parity and
        // ignored rather than silently misinterpreted.
        let _ = resolved;
        let rows = if let Some(level) = level {
            sqlx::query("SELECT rule_name, scope, phase, level, entity_id, field, message FROM validation_issues WHERE project_key = ? AND level = ?")
                .bind(project_key)
                .bind(enum_str(&level))
                .fetch_all(&self.pool)
                .await
        } else {
            sqlx::query("SELECT rule_name, scope, phase, level, entity_id, field, message FROM validation_issues WHERE project_key = ?")
                .bind(project_key)
                .fetch_all(&self.pool)
                .await
        }
        .map_err(db_err)?;

        rows.into_iter()
            .map(|r| {
                Ok(ValidationIssue {
                    rule_name: r.get("rule_name"),
                    scope: enum_from_str(r.get::<String, _>("scope").as_str())?,
                    phase: enum_from_str(r.get::<String, _>("phase").as_str())?,
                    level: enum_from_str(r.get::<String, _>("level").as_str())?,
                    entity_id: r.get("entity_id"),
                    field: r.get("field"),
                    message: r.get("message"),
                })
            })
            .collect()
    }

    async fn save_validation_report(&self, project_key: &str, report: &ValidationReport) -> MigrationResult<()> {
        sqlx::query("INSERT INTO validation_reports (project_key, payload, generated_at) VALUES (?, ?, ?)")
            .bind(project_key)
            .bind(ser(report)?)
            .bind(chrono::Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn get_validation_reports(&self, project_key: &str) -> MigrationResult<Vec<ValidationReport>> {
        let rows = sqlx::query("SELECT payload FROM validation_reports WHERE project_key = ? ORDER BY id ASC")
            .bind(project_key)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.into_iter().map(|r| de(r.get::<String, _>("payload").as_str())).collect()
    }

    async fn delete_validation_issues(&self, project_key: &str) -> MigrationResult<()> {
        sqlx::query("DELETE FROM validation_issues WHERE project_key = ?")
            .bind(project_key)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn delete_validation_reports(&self, project_key: &str) -> MigrationResult<()> {
        sqlx::query("DELETE FROM validation_reports WHERE project_key = ?")
            .bind(project_key)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn save_validation_rule(&self, rule_id: &str, definition: &str) -> MigrationResult<()> {
        sqlx::query("INSERT OR REPLACE INTO validation_rules (rule_id, definition) VALUES (?, ?)")
            .bind(rule_id)
            .bind(definition)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    // -- Introspection ------------------------------------------------------

    async fn entity_exists(&self, entity_type: EntityType, id: &str) -> MigrationResult<bool> {
        let table = match entity_type {
            EntityType::Folder => "folders",
            EntityType::TestCase => "test_cases",
            EntityType::TestCycle => "test_cycles",
            EntityType::TestExecution => "test_executions",
        };
        let sql = format!("SELECT COUNT(*) as n FROM {table} WHERE source_id = ?");
        let row = sqlx::query(&sql).bind(id).fetch_one(&self.pool).await.map_err(db_err)?;
        Ok(row.get::<i64, _>("n") > 0)
    }

    async fn find_duplicates(&self, entity_type: EntityType, field: &str, value: &str, exclude_id: Option<&str>) -> MigrationResult<Vec<String>> {
        let table = match entity_type {
            EntityType::Folder => "folders",
            EntityType::TestCase => "test_cases",
            EntityType::TestCycle => "test_cycles",
            EntityType::TestExecution => "test_executions",
        };
        // `field` and `table` are closed-set identifiers chosen by the caller
        // (never untrusted input), so interpolating them into the statement
        // is safe; only `value`/`exclude_id` are user-derived and bound.
        let rows = if let Some(exclude_id) = exclude_id {
            let sql = format!("SELECT source_id FROM {table} WHERE json_extract(payload, '$.{field}') = ? AND source_id != ?");
            sqlx::query(&sql).bind(value).bind(exclude_id).fetch_all(&self.pool).await
        } else {
            let sql = format!("SELECT source_id FROM {table} WHERE json_extract(payload, '$.{field}') = ?");
            sqlx::query(&sql).bind(value).fetch_all(&self.pool).await
        }
        .map_err(db_err)?;
        Ok(rows.into_iter().map(|r| r.get::<String, _>("source_id")).collect())
    }

    async fn find_invalid_references(&self, project_key: &str, table: &str, fk: &str, ref_table: &str, ref_pk: &str) -> MigrationResult<Vec<String>> {
        let sql = format!(
            "SELECT t.source_id as id FROM {table} t WHERE t.project_key = ? AND t.{fk} IS NOT NULL AND NOT EXISTS (SELECT 1 FROM {ref_table} r WHERE r.{ref_pk} = t.{fk})",
        );
        let rows = sqlx::query(&sql).bind(project_key).fetch_all(&self.pool).await.map_err(db_err)?;
        Ok(rows.into_iter().map(|r| r.get::<String, _>("id")).collect())
    }

    async fn get_source_entity_counts(&self, project_key: &str) -> MigrationResult<Vec<(EntityType, u64)>> {
        let mut counts = Vec::new();
        for entity_type in [EntityType::Folder, EntityType::TestCase, EntityType::TestCycle, EntityType::TestExecution] {
            counts.push((entity_type, self.count_entities(project_key, entity_type).await?));
        }
        Ok(counts)
    }

    async fn get_target_entity_counts(&self, project_key: &str) -> MigrationResult<Vec<(EntityType, u64)>> {
        let table_for = |entity_type: EntityType| match entity_type {
            EntityType::Folder => "transformed_modules",
            EntityType::TestCase => "transformed_test_cases",
            EntityType::TestCycle => "transformed_test_cycles",
            EntityType::TestExecution => "transformed_executions",
        };
        let mut counts = Vec::new();
        for entity_type in [EntityType::Folder, EntityType::TestCase, EntityType::TestCycle, EntityType::TestExecution] {
            let sql = format!("SELECT COUNT(*) as n FROM {} WHERE project_key = ?", table_for(entity_type));
            let row = sqlx::query(&sql).bind(project_key).fetch_one(&self.pool).await.map_err(db_err)?;
            counts.push((entity_type, row.get::<i64, _>("n") as u64));
        }
        Ok(counts)
    }

    async fn get_entity_mapping_counts(&self, project_key: &str) -> MigrationResult<Vec<(MappingType, u64)>> {
        let mut counts = Vec::new();
        for mapping_type in [
            MappingType::FolderToModule,
            MappingType::TestcaseToTestcase,
            MappingType::CycleToCycle,
            MappingType::ExecutionToRun,
        ] {
            counts.push((mapping_type, self.count_entity_mappings(project_key, mapping_type).await?));
        }
        Ok(counts)
    }

    async fn count_attachments(&self, project_key: &str) -> MigrationResult<u64> {
        let row = sqlx::query("SELECT COUNT(*) as n FROM attachments WHERE project_key = ? OR project_key = ''")
            .bind(project_key)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.get::<i64, _>("n") as u64)
    }

    async fn get_attachments_for_entity(
        &self,
        project_key: &str,
        related_type: RelatedEntityType,
        related_source_id: &str,
    ) -> MigrationResult<Vec<migration_domain::entities::Attachment>> {
        #[derive(serde::Deserialize)]
        struct AttachmentRow {
            related_type: RelatedEntityType,
            #[allow(dead_code)]
            has_content: bool,
            url: Option<String>,
        }
        let rows = sqlx::query(
            "SELECT name, size_bytes, payload FROM attachments \
             WHERE related_source_id = ? AND (project_key = ? OR project_key = '')",
        )
        .bind(related_source_id)
        .bind(project_key)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let mut attachments = Vec::new();
        for row in rows {
            let payload: AttachmentRow = de(row.get::<String, _>("payload").as_str())?;
            if payload.related_type != related_type {
                continue;
            }
            attachments.push(migration_domain::entities::Attachment {
                id: uuid::Uuid::new_v4(),
                related_type,
                related_source_id: related_source_id.to_string(),
                filename: row.get::<String, _>("name"),
                size: row.get::<i64, _>("size_bytes") as u64,
                content_blob: None,
                url: payload.url,
            });
        }
        Ok(attachments)
    }
}
