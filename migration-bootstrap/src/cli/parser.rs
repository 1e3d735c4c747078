// /////////////////////////////////////////////////////////////////////////////
// Migration Engine
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # CLI Structure
//!
//! `clap`-derived CLI surface for the migration engine: one subcommand per
//! workflow operation (§3.3, §4.9), plus global flags that apply to all of
//! them.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Test-management migration engine.
///
/// Migrates folders, test cases, test cycles, and test executions from a
/// Source test-management service to a Target service.
#[derive(Parser, Debug)]
#[command(name = "migration-engine", version, about, long_about = None)]
pub struct Cli {
    /// Path to the workflow config file (TOML/YAML); falls back to
    /// `MIGRATION__*` environment variables and built-in defaults.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose (debug-level) logging, overriding the configured
    /// log level.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Override the configured batch size for this run.
    #[arg(long, global = true)]
    pub batch_size: Option<u32>,

    /// Override the configured maximum concurrency for this run.
    #[arg(long, global = true)]
    pub max_workers: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a full migration (Extract -> Transform -> Load -> Validate) for
    /// a project. Safe to re-run: already-completed phases are skipped.
    Migrate {
        /// Source/Target project key to migrate.
        project_key: String,

        /// Only extract/load entities created or updated since the last
        /// successful run (§4.2, §9).
        #[arg(long)]
        incremental: bool,

        /// Skip the Validation phase after Loading.
        #[arg(long)]
        skip_validation: bool,
    },

    /// Resume an interrupted migration, honoring the incremental flag from
    /// the last run (§9).
    Resume {
        /// Project key whose in-progress migration should be resumed.
        project_key: String,
    },

    /// Roll back a project's migration on the Target service (§4.9).
    Rollback {
        /// Project key to roll back.
        project_key: String,
    },

    /// Print the persisted `MigrationState` for a project.
    Status {
        /// Project key to report on.
        project_key: String,
    },

    /// Run the Validation phase in isolation, without Extract/Transform/Load.
    Validate {
        /// Project key to validate.
        project_key: String,
    },
}

/// Parse CLI arguments with clap, handling `--help`/`--version` the usual way.
pub fn parse_cli() -> Cli {
    Cli::parse()
}
