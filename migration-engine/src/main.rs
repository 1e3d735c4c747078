// /////////////////////////////////////////////////////////////////////////////
// Migration Engine
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! CLI entry point: wires the bootstrap layer's validated CLI, a layered
//! `WorkflowConfig`, the SQLite store, the HTTP Source/Target adapters, and
//! the `Orchestrator` together, then dispatches on the chosen subcommand.

use std::sync::Arc;
use std::time::Duration;

use migration_bootstrap::{result_to_exit_code, ValidatedCommand};
use migration_domain::repositories::{SourceClient, TargetClient};
use migration_domain::retry::RetryPolicy;
use migration_domain::MigrationError;
use migration_domain::validation::ValidationRegistry;
use migration_engine::infrastructure::http::{HttpSourceClient, HttpTargetClient};
use migration_engine::infrastructure::repositories::{schema, SqliteMigrationStore};
use migration_engine::{init_tracing, EtlExecutor, MetricsService, ObservabilityService, Orchestrator, StoreEventEmitter, ValidationHooks, WorkflowConfig};

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let result = run().await;
    result_to_exit_code(result)
}

async fn run() -> Result<(), MigrationError> {
    let cli = migration_bootstrap::parse_and_validate().map_err(|e| MigrationError::invalid_config(e.to_string()))?;

    let mut config = WorkflowConfig::load(cli.config.as_deref())?;
    if let Some(batch_size) = cli.batch_size {
        config.batch.default_batch_size = batch_size;
    }
    if let Some(max_workers) = cli.max_workers {
        config.batch.max_concurrency = max_workers;
    }
    if cli.verbose {
        config.observability.log_level = "debug".to_string();
    }

    init_tracing(&config.observability.log_level);

    schema::create_database_if_missing(&config.database.url).await.map_err(|e| MigrationError::DatabaseError(e.to_string()))?;
    let pool = sqlx::SqlitePool::connect(&config.database.url).await.map_err(|e| MigrationError::DatabaseError(e.to_string()))?;
    schema::ensure_schema(&pool).await.map_err(|e| MigrationError::DatabaseError(e.to_string()))?;

    let store: Arc<dyn migration_domain::repositories::MigrationStore> = Arc::new(SqliteMigrationStore::new(pool));
    let source: Arc<dyn SourceClient> = Arc::new(HttpSourceClient::new(
        config.source.base_url.clone(),
        config.source.api_token.clone(),
        Duration::from_secs(config.source.timeout_seconds),
        config.source.page_size,
    )?);
    let target: Arc<dyn TargetClient> = Arc::new(HttpTargetClient::new(
        config.target.base_url.clone(),
        config.target.api_token.clone(),
        Duration::from_secs(config.target.timeout_seconds),
    )?);

    let metrics = Arc::new(MetricsService::new());
    let observability = Arc::new(ObservabilityService::new(metrics.clone()));
    let events: Arc<dyn migration_domain::control_plane::workflow_event::EventEmitter> = Arc::new(StoreEventEmitter::new(store.clone()));

    let etl = EtlExecutor::new(
        source.clone(),
        target.clone(),
        store.clone(),
        metrics.clone(),
        RetryPolicy::default(),
        config.batch.default_batch_size,
        config.batch.max_concurrency,
        config.attachments_dir.clone(),
    )
    .with_batch_transformer(config.use_batch_transformer);

    let skip_validation = matches!(cli.command, ValidatedCommand::Migrate { skip_validation: true, .. });
    let validation = if skip_validation {
        ValidationHooks::with_registry(ValidationRegistry::new(), Some(metrics.clone()))
    } else {
        ValidationHooks::new(Some(metrics.clone()))
    };
    let orchestrator = Orchestrator::new(
        store.clone(),
        target.clone(),
        etl,
        events,
        observability.clone(),
        validation,
        config.target.project_id.clone(),
        config.validation_enabled,
        config.rollback_enabled,
        Duration::from_secs(config.timeout_seconds),
    );

    match cli.command {
        ValidatedCommand::Migrate { project_key, incremental, skip_validation } => {
            let state = orchestrator.run_workflow(&project_key, incremental, &migration_engine::ALL_PHASES).await?;
            println!("migration {project_key}: extraction={:?} transformation={:?} loading={:?}", state.extraction_status, state.transformation_status, state.loading_status);
            if !skip_validation {
                print_validation_summary(store.as_ref(), &project_key, &config.output_dir).await?;
            }
            Ok(())
        }
        ValidatedCommand::Resume { project_key } => {
            let state = orchestrator.resume_workflow(&project_key, &migration_engine::ALL_PHASES).await?;
            println!("resumed {project_key}: extraction={:?} transformation={:?} loading={:?}", state.extraction_status, state.transformation_status, state.loading_status);
            Ok(())
        }
        ValidatedCommand::Rollback { project_key } => {
            let state = orchestrator.rollback(&project_key).await?;
            println!("rollback {project_key}: {:?}", state.rollback_status);
            Ok(())
        }
        ValidatedCommand::Status { project_key } => {
            let state = store.get_migration_state(&project_key).await?;
            println!("{project_key}: extraction={:?} transformation={:?} loading={:?} rollback={:?} incremental={}", state.extraction_status, state.transformation_status, state.loading_status, state.rollback_status, state.is_incremental);
            Ok(())
        }
        ValidatedCommand::Validate { project_key } => print_validation_summary(store.as_ref(), &project_key, &config.output_dir).await,
    }
}

async fn print_validation_summary(store: &dyn migration_domain::repositories::MigrationStore, project_key: &str, output_dir: &std::path::Path) -> Result<(), MigrationError> {
    let issues = store.get_validation_issues(project_key, None, None).await?;
    println!("{project_key}: {} validation issue(s) recorded", issues.len());
    for issue in issues.iter().take(20) {
        println!("  [{:?}] {}: {}", issue.level, issue.field.as_deref().unwrap_or("-"), issue.message);
    }

    tokio::fs::create_dir_all(output_dir).await?;
    let report_path = output_dir.join(format!("{project_key}-validation.json"));
    let json = serde_json::to_string_pretty(&issues).map_err(MigrationError::from)?;
    tokio::fs::write(&report_path, json).await?;
    println!("validation report written to {}", report_path.display());
    Ok(())
}
