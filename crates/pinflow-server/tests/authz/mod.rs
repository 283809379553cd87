// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

pub mod support;

mod api_keys;
mod children;
mod dev_mode;
mod pinboards;
mod pins;
mod public;
mod users;
mod workflow_data;
