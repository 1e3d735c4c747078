// /////////////////////////////////////////////////////////////////////////////
// Migration Engine
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Infrastructure layer: the concrete adapters for the ports the domain
//! crate defines, plus the ambient config/logging/metrics stack (§11-§14).

pub mod config;
pub mod http;
pub mod logging;
pub mod metrics;
pub mod repositories;
