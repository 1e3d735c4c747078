// /////////////////////////////////////////////////////////////////////////////
// Migration Engine
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! The default `MigrationStore` adapter (§13): SQLite via `sqlx`.

pub mod schema;
pub mod sqlite_store;

pub use sqlite_store::SqliteMigrationStore;
