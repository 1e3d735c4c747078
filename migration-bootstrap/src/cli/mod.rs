// /////////////////////////////////////////////////////////////////////////////
// Migration Engine
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Command-Line Interface Module
//!
//! Bootstrap-layer CLI handling with security-first design.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │  1. parser::parse_cli()             │  Parse CLI with clap
//! └─────────────────┬───────────────────┘
//!                   ↓
//! ┌─────────────────────────────────────┐
//! │  2. validate_cli()                  │  Security validation
//! └─────────────────┬───────────────────┘
//!                   ↓
//! ┌─────────────────────────────────────┐
//! │  3. ValidatedCli                    │  Safe, validated config
//! └─────────────────────────────────────┘
//! ```

pub mod parser;
pub mod validator;

pub use parser::{parse_cli, Cli, Commands};
pub use validator::{ParseError, SecureArgParser};

use std::path::PathBuf;

/// Validated CLI configuration: all paths canonicalized, all values
/// range-checked.
#[derive(Debug, Clone)]
pub struct ValidatedCli {
    pub command: ValidatedCommand,
    pub verbose: bool,
    pub config: Option<PathBuf>,
    pub batch_size: Option<u32>,
    pub max_workers: Option<usize>,
}

/// Validated command variants, one per workflow operation.
#[derive(Debug, Clone)]
pub enum ValidatedCommand {
    Migrate { project_key: String, incremental: bool, skip_validation: bool },
    Resume { project_key: String },
    Rollback { project_key: String },
    Status { project_key: String },
    Validate { project_key: String },
}

/// Parse and validate CLI arguments:
/// 1. Parse CLI with clap
/// 2. Validate the config path and project key with `SecureArgParser`
/// 3. Validate numeric overrides
/// 4. Return `ValidatedCli` on success
///
/// # Errors
///
/// Returns `ParseError` if any validation fails.
pub fn parse_and_validate() -> Result<ValidatedCli, ParseError> {
    let cli = parse_cli();
    validate_cli(cli)
}

fn validate_cli(cli: Cli) -> Result<ValidatedCli, ParseError> {
    let config = if let Some(ref path) = cli.config {
        Some(SecureArgParser::validate_path(&path.to_string_lossy())?)
    } else {
        None
    };

    if let Some(size) = cli.batch_size {
        SecureArgParser::validate_number("batch-size", size, Some(1), Some(10_000))?;
    }

    if let Some(workers) = cli.max_workers {
        SecureArgParser::validate_number("max-workers", workers, Some(1), Some(256))?;
    }

    let command = match cli.command {
        Commands::Migrate { project_key, incremental, skip_validation } => {
            SecureArgParser::validate_argument(&project_key)?;
            ValidatedCommand::Migrate { project_key, incremental, skip_validation }
        }
        Commands::Resume { project_key } => {
            SecureArgParser::validate_argument(&project_key)?;
            ValidatedCommand::Resume { project_key }
        }
        Commands::Rollback { project_key } => {
            SecureArgParser::validate_argument(&project_key)?;
            ValidatedCommand::Rollback { project_key }
        }
        Commands::Status { project_key } => {
            SecureArgParser::validate_argument(&project_key)?;
            ValidatedCommand::Status { project_key }
        }
        Commands::Validate { project_key } => {
            SecureArgParser::validate_argument(&project_key)?;
            ValidatedCommand::Validate { project_key }
        }
    };

    Ok(ValidatedCli {
        command,
        verbose: cli.verbose,
        config,
        batch_size: cli.batch_size,
        max_workers: cli.max_workers,
    })
}
