// /////////////////////////////////////////////////////////////////////////////
// Migration Engine
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Layered runtime configuration (defaults -> file -> `MIGRATION_` env -> CLI
//! overrides), built on the `config` crate the way the rest of the ambient
//! stack leans on its existing ecosystem crates rather than hand-rolled
//! parsing.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use migration_domain::MigrationResult;

/// Source test-management service connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub base_url: String,
    pub api_token: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

/// Target test-management service connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    pub base_url: String,
    pub api_token: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// The Target-side project identifier entities are created under.
    /// `TargetClient::get_project` looks a project up by id, not by key
    /// (the Target port has no project-by-key search), so this has to be
    /// supplied by the operator rather than resolved at runtime.
    pub project_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    #[serde(default = "default_batch_size")]
    pub default_batch_size: u32,
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
}

/// Top-level configuration, assembled per §11: built-in defaults, overlaid
/// by an optional config file, overlaid by `MIGRATION_*` environment
/// variables, overlaid last by explicit CLI flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    pub project_key: String,
    pub source: SourceConfig,
    pub target: TargetConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
    /// §9: whether `Orchestrator` runs the validation hooks at all.
    #[serde(default = "default_true")]
    pub validation_enabled: bool,
    /// §4.9: whether `rollback` is permitted for this workflow, or refused
    /// outright regardless of `MigrationState::can_rollback()`.
    #[serde(default = "default_true")]
    pub rollback_enabled: bool,
    /// §6.5: on-disk cache directory for attachment bytes between Extract
    /// and Load. `None` disables attachment transfer.
    #[serde(default)]
    pub attachments_dir: Option<PathBuf>,
    /// Directory migration reports/exports are written under.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Per-phase wall-clock budget (§4.8); a phase exceeding this is marked
    /// failed rather than left to hang.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Batches Transform through `BatchTrackerMath` instead of the
    /// row-at-a-time path, trading latency for throughput on large
    /// projects.
    #[serde(default)]
    pub use_batch_transformer: bool,
}

fn default_timeout_seconds() -> u64 {
    30
}
fn default_page_size() -> u32 {
    100
}
fn default_database_url() -> String {
    "sqlite://migration.db".to_string()
}
fn default_max_connections() -> u32 {
    5
}
fn default_batch_size() -> u32 {
    50
}
fn default_max_concurrency() -> usize {
    8
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_metrics_port() -> u16 {
    9898
}
fn default_true() -> bool {
    true
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./migration-output")
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            default_batch_size: default_batch_size(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            metrics_enabled: default_true(),
            metrics_port: default_metrics_port(),
        }
    }
}

impl WorkflowConfig {
    /// Loads the layered configuration described in §11. `config_file` is
    /// optional; when present and missing on disk this is not an error -
    /// defaults and environment variables still apply.
    pub fn load(config_file: Option<&Path>) -> MigrationResult<Self> {
        let mut builder = Config::builder();
        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path).required(false));
        }
        builder = builder.add_source(
            Environment::with_prefix("MIGRATION")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| migration_domain::MigrationError::invalid_config(e.to_string()))?;
        config
            .try_deserialize()
            .map_err(|e| migration_domain::MigrationError::invalid_config(e.to_string()))
    }
}
