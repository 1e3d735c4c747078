// /////////////////////////////////////////////////////////////////////////////
// Migration Engine
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Default `reqwest`-based Source/Target adapters (§14). Thin by design: no
//! auth refresh, no schema validation - the wire contract is out of scope,
//! they exist so the crate is runnable end-to-end against a real or
//! `wiremock`-faked HTTP server.

pub mod source_client;
pub mod target_client;

pub use source_client::HttpSourceClient;
pub use target_client::HttpTargetClient;

#[derive(serde::Deserialize)]
pub(crate) struct Page<T> {
    pub items: Vec<T>,
    pub has_more: bool,
}
