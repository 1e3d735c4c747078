// /////////////////////////////////////////////////////////////////////////////
// Migration Engine
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Bootstrap Configuration
//!
//! Holds the CLI-derived settings that exist before a `WorkflowConfig` can
//! be built: which config file to load, which project to migrate, and the
//! handful of overrides (batch size, concurrency) a caller may pass on the
//! command line instead of in the config file.
//!
//! `BootstrapConfig` is immutable after construction - it is built once from
//! validated CLI arguments and handed to `main` to drive `WorkflowConfig::load`
//! and the rest of wiring.

use std::path::PathBuf;

/// Log level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl LogLevel {
    /// Convert to tracing Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }

    /// Parse from the `--log-level`/`MIGRATION__OBSERVABILITY__LOG_LEVEL`
    /// string, matching `infrastructure::config::ObservabilityConfig`'s
    /// conventions (lower-case level names).
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Bootstrap-phase configuration, built from validated CLI arguments.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    app_name: String,
    log_level: LogLevel,
    config_path: Option<PathBuf>,
    project_key: String,
    batch_size: Option<u32>,
    max_workers: Option<usize>,
    verbose: bool,
}

impl BootstrapConfig {
    pub fn builder() -> BootstrapConfigBuilder {
        BootstrapConfigBuilder::default()
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    pub fn config_path(&self) -> Option<&PathBuf> {
        self.config_path.as_ref()
    }

    pub fn project_key(&self) -> &str {
        &self.project_key
    }

    pub fn batch_size(&self) -> Option<u32> {
        self.batch_size
    }

    pub fn max_workers(&self) -> Option<usize> {
        self.max_workers
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Builder for [`BootstrapConfig`]
#[derive(Debug, Default)]
pub struct BootstrapConfigBuilder {
    app_name: Option<String>,
    log_level: Option<LogLevel>,
    config_path: Option<PathBuf>,
    project_key: Option<String>,
    batch_size: Option<u32>,
    max_workers: Option<usize>,
    verbose: bool,
}

impl BootstrapConfigBuilder {
    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = Some(level);
        self
    }

    pub fn config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    pub fn project_key(mut self, key: impl Into<String>) -> Self {
        self.project_key = Some(key.into());
        self
    }

    pub fn batch_size(mut self, size: u32) -> Self {
        self.batch_size = Some(size);
        self
    }

    pub fn max_workers(mut self, workers: usize) -> Self {
        self.max_workers = Some(workers);
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn build(self) -> BootstrapConfig {
        BootstrapConfig {
            app_name: self.app_name.unwrap_or_else(|| "migration-engine".to_string()),
            log_level: self.log_level.unwrap_or_default(),
            config_path: self.config_path,
            project_key: self.project_key.unwrap_or_default(),
            batch_size: self.batch_size,
            max_workers: self.max_workers,
            verbose: self.verbose,
        }
    }
}
