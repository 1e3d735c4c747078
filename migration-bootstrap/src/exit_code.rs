// /////////////////////////////////////////////////////////////////////////////
// Migration Engine
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Exit Code Management
//!
//! Standardized Unix exit codes following BSD `sysexits.h` conventions.
//!
//! ## Exit Code Conventions
//!
//! - **0**: Success
//! - **1**: General error
//! - **64-78**: Specific error conditions (BSD sysexits.h)
//! - **128+N**: Fatal signal N (e.g., 130 = SIGINT)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use migration_bootstrap::exit_code::ExitCode;
//!
//! fn run_migration() -> Result<(), Box<dyn std::error::Error>> {
//!     Ok(())
//! }
//!
//! fn main() {
//!     let result = run_migration();
//!     let exit_code = match result {
//!         Ok(_) => ExitCode::Success,
//!         Err(e) => ExitCode::from_error(e.as_ref()),
//!     };
//!     std::process::exit(exit_code.as_i32());
//! }
//! ```

use std::fmt;

use migration_domain::MigrationError;

/// Exit codes following Unix conventions (BSD sysexits.h)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum ExitCode {
    /// Successful termination (0)
    #[default]
    Success = 0,

    /// General error (1)
    Error = 1,

    /// Command line usage error (64)
    UsageError = 64,

    /// Data format error (65)
    DataError = 65,

    /// Cannot open input (66)
    NoInput = 66,

    /// Service unavailable (69)
    /// - Source/Target unreachable
    Unavailable = 69,

    /// Internal software error (70)
    Software = 70,

    /// I/O error (74)
    IoError = 74,

    /// Temporary failure, retry (75)
    /// - A recoverable `MigrationError` exhausted its retries
    TempFail = 75,

    /// Remote error in protocol (76)
    Protocol = 76,

    /// Permission denied (77)
    NoPerm = 77,

    /// Configuration error (78)
    Config = 78,

    /// Interrupted by signal (SIGINT - Ctrl+C) (130)
    Interrupted = 130,

    /// Terminated by signal (SIGTERM) (143)
    Terminated = 143,
}

impl ExitCode {
    /// Convert to i32 for use with std::process::exit
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Maps a [`MigrationError`] to an exit code via its
    /// [`MigrationError::category`], so the mapping stays in lockstep with
    /// the domain's own error taxonomy instead of re-deriving one from
    /// string matching.
    pub fn from_migration_error(error: &MigrationError) -> Self {
        match error.category() {
            "configuration" => ExitCode::Config,
            "state" => ExitCode::Software,
            "validation" => ExitCode::DataError,
            "processing" => ExitCode::Error,
            "resource" => ExitCode::TempFail,
            "io" => ExitCode::IoError,
            "database" => ExitCode::Unavailable,
            "serialization" => ExitCode::DataError,
            "timeout" => ExitCode::TempFail,
            "cancellation" => ExitCode::Interrupted,
            "not_found" => ExitCode::NoInput,
            _ => ExitCode::Software,
        }
    }

    /// Create an ExitCode from a generic error by inspecting its display
    /// text. Used for errors (CLI parsing, I/O at the bootstrap layer) that
    /// never go through [`MigrationError`].
    pub fn from_error(error: &dyn std::error::Error) -> Self {
        let error_string = error.to_string().to_lowercase();

        if error_string.contains("permission") || error_string.contains("access denied") {
            ExitCode::NoPerm
        } else if error_string.contains("not found") || error_string.contains("no such") {
            ExitCode::NoInput
        } else if error_string.contains("invalid") || error_string.contains("argument") {
            ExitCode::UsageError
        } else if error_string.contains("parse") || error_string.contains("format") {
            ExitCode::DataError
        } else if error_string.contains("io") || error_string.contains("read") || error_string.contains("write") {
            ExitCode::IoError
        } else if error_string.contains("config") {
            ExitCode::Config
        } else if error_string.contains("unavailable") || error_string.contains("not available") {
            ExitCode::Unavailable
        } else {
            ExitCode::Error
        }
    }

    /// Human-readable description of the exit code
    pub fn description(self) -> &'static str {
        match self {
            ExitCode::Success => "Success",
            ExitCode::Error => "General error",
            ExitCode::UsageError => "Command line usage error",
            ExitCode::DataError => "Data format error",
            ExitCode::NoInput => "Cannot open input",
            ExitCode::Unavailable => "Service unavailable",
            ExitCode::Software => "Internal software error",
            ExitCode::IoError => "I/O error",
            ExitCode::TempFail => "Temporary failure, retry",
            ExitCode::Protocol => "Remote error in protocol",
            ExitCode::NoPerm => "Permission denied",
            ExitCode::Config => "Configuration error",
            ExitCode::Interrupted => "Interrupted by signal (SIGINT)",
            ExitCode::Terminated => "Terminated by signal (SIGTERM)",
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Success)
    }

    pub fn is_error(self) -> bool {
        !self.is_success()
    }

    pub fn is_signal(self) -> bool {
        matches!(self, ExitCode::Interrupted | ExitCode::Terminated)
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_i32())
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code.as_i32()
    }
}

/// Maps a top-level `MigrationError` to an [`ExitCode`].
pub fn map_error_to_exit_code(error: &MigrationError) -> ExitCode {
    ExitCode::from_migration_error(error)
}

/// Converts a top-level migration result into a process exit code,
/// printing the error to stderr when present.
pub fn result_to_exit_code<T>(result: Result<T, MigrationError>) -> std::process::ExitCode {
    match result {
        Ok(_) => std::process::ExitCode::from(ExitCode::Success.as_i32() as u8),
        Err(err) => {
            eprintln!("Error: {err}");
            let code = map_error_to_exit_code(&err);
            std::process::ExitCode::from(code.as_i32() as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::Error.as_i32(), 1);
        assert_eq!(ExitCode::UsageError.as_i32(), 64);
        assert_eq!(ExitCode::Config.as_i32(), 78);
        assert_eq!(ExitCode::Interrupted.as_i32(), 130);
        assert_eq!(ExitCode::Terminated.as_i32(), 143);
    }

    #[test]
    fn test_is_success() {
        assert!(ExitCode::Success.is_success());
        assert!(!ExitCode::Error.is_success());
    }

    #[test]
    fn test_is_signal() {
        assert!(ExitCode::Interrupted.is_signal());
        assert!(!ExitCode::Success.is_signal());
    }

    #[test]
    fn test_from_migration_error_category_mapping() {
        assert_eq!(ExitCode::from_migration_error(&MigrationError::invalid_config("bad")), ExitCode::Config);
        assert_eq!(ExitCode::from_migration_error(&MigrationError::not_found("x")), ExitCode::NoInput);
        assert_eq!(ExitCode::from_migration_error(&MigrationError::validation_failed("x")), ExitCode::DataError);
    }

    #[test]
    fn test_display() {
        let display = format!("{}", ExitCode::UsageError);
        assert!(display.contains("Command line usage error"));
        assert!(display.contains("64"));
    }
}
