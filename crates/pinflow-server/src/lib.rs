// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP server for pins, pinboards and live workflow data.
//!
//! Every request runs through the same chain: [`auth_middleware`] resolves
//! the caller, [`access::AccessGuard`] checks ownership and visibility, and
//! the repositories in `pinflow-server-db` do the reads and writes.

pub mod access;
pub mod api;
pub mod auth_middleware;
pub mod error;
pub mod routes;

pub use access::AccessGuard;
pub use api::{create_app_state, create_router, AppState};
pub use error::ServerError;
pub use pinflow_server_config::ServerConfig;
