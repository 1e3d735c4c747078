// /////////////////////////////////////////////////////////////////////////////
// Migration Engine
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Error System
//!
//! A hierarchical error type for the migration domain. Categorizes failures
//! so that retry policy, orchestrator fault handling, and CLI exit-code
//! mapping can all dispatch on `category()`/`is_recoverable()` rather than on
//! ad hoc string inspection.

use thiserror::Error;

/// Domain-specific errors for the migration engine.
#[derive(Error, Debug, Clone)]
pub enum MigrationError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A phase transition was attempted whose preconditions (§3.3) are not met.
    #[error("State violation: {0}")]
    StateViolation(String),

    /// A validation rule reported an issue whose level halts the phase.
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Processing failed: {0}")]
    ProcessingFailed(String),

    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Timeout error: {0}")]
    TimeoutError(String),

    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl MigrationError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    pub fn state_violation(msg: impl Into<String>) -> Self {
        Self::StateViolation(msg.into())
    }

    pub fn validation_failed(msg: impl Into<String>) -> Self {
        Self::ValidationFailed(msg.into())
    }

    pub fn processing_failed(msg: impl Into<String>) -> Self {
        Self::ProcessingFailed(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal_error(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }

    /// True for transient failures the Retry Policy (§4.7) should retry.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            MigrationError::TimeoutError(_) | MigrationError::ResourceExhausted(_) | MigrationError::IoError(_)
        )
    }

    /// Coarse-grained category used for logging, metrics, and exit-code mapping.
    pub fn category(&self) -> &'static str {
        match self {
            MigrationError::InvalidConfiguration(_) => "configuration",
            MigrationError::StateViolation(_) => "state",
            MigrationError::ValidationFailed(_) => "validation",
            MigrationError::ProcessingFailed(_) => "processing",
            MigrationError::ResourceExhausted(_) => "resource",
            MigrationError::IoError(_) => "io",
            MigrationError::DatabaseError(_) => "database",
            MigrationError::SerializationError(_) => "serialization",
            MigrationError::TimeoutError(_) => "timeout",
            MigrationError::Cancelled(_) => "cancellation",
            MigrationError::NotFound(_) => "not_found",
            MigrationError::InternalError(_) => "internal",
        }
    }
}

impl From<std::io::Error> for MigrationError {
    fn from(err: std::io::Error) -> Self {
        MigrationError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for MigrationError {
    fn from(err: serde_json::Error) -> Self {
        MigrationError::SerializationError(err.to_string())
    }
}

// sqlx::Error and reqwest::Error conversions live in the infrastructure crate,
// which maps them to MigrationError::DatabaseError / IoError at the boundary -
// the domain crate must not depend on either.

pub type MigrationResult<T> = Result<T, MigrationError>;
