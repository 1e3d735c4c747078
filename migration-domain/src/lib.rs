// /////////////////////////////////////////////////////////////////////////////
// Migration Engine
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Migration Domain
//!
//! Pure, reusable business logic for the test-management migration engine:
//! entities, value objects, control-plane records, batch strategies,
//! validation rules, retry policy, and the work-queue state machine -
//! plus the infrastructure ports (`repositories`) the application crate
//! implements. Nothing here depends on a runtime, an HTTP client, or a
//! database driver.

pub mod batch_strategies;
pub mod control_plane;
pub mod entities;
pub mod error;
pub mod repositories;
pub mod retry;
pub mod validation;
pub mod value_objects;
pub mod work_queue;

pub use error::{MigrationError, MigrationResult};
