// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP route handlers.

pub mod api_keys;
pub mod blocks;
pub mod datasets;
pub mod health;
pub mod pinboards;
pub mod pins;
pub mod public;
pub mod users;
pub mod workflow_data;
