// /////////////////////////////////////////////////////////////////////////////
// Migration Engine
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

// Production code safety enforced via CI and `make lint-strict`
// (lib/bins checked separately from tests - tests may use unwrap/expect)

//! # Migration Engine
//!
//! Application and infrastructure layers for migrating test-management data
//! (folders, test cases, test cycles, test executions) from a Source
//! service to a Target service, built on top of the pure domain types in
//! `migration-domain`.
//!
//! ## Architecture Overview
//!
//! This crate follows Clean Architecture / DDD, with the domain layer split
//! out into its own crate so it carries no infrastructure dependencies:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 migration-bootstrap                          │
//! │  (CLI, signals, platform abstraction, exit codes)            │
//! └─────────────────────────────────────────────────────────────┘
//!                                │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Application Layer (this crate)               │
//! │  (EtlExecutor, Orchestrator, rollback, validation hooks,      │
//! │   work-queue runtime, retry middleware)                       │
//! └─────────────────────────────────────────────────────────────┘
//!                                │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                migration-domain                               │
//! │  (entities, value objects, control plane, validation rules,   │
//! │   repository/client ports)                                    │
//! └─────────────────────────────────────────────────────────────┘
//!                                ▲
//!                                │
//! ┌─────────────────────────────────────────────────────────────┐
//! │              Infrastructure Layer (this crate)                │
//! │  (SQLite MigrationStore, HTTP Source/Target clients, config,  │
//! │   logging, metrics)                                            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Workflow
//!
//! A migration run walks four phases in order - Extraction, Transformation,
//! Loading, and (optionally) Validation - tracked by `MigrationState` so a
//! crashed or interrupted run can simply be re-invoked. `Orchestrator`
//! sequences the phases; `EtlExecutor` implements each one; `rollback`
//! undoes Target-side writes when a migration needs to be reverted.

pub mod application;
pub mod infrastructure;

pub use application::{rollback_migration, EtlExecutor, Orchestrator, PhaseOutcome, ValidationHooks, ALL_PHASES};
pub use infrastructure::config::WorkflowConfig;
pub use infrastructure::logging::{init_tracing, ObservabilityService, StoreEventEmitter};
pub use infrastructure::metrics::MetricsService;
