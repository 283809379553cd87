// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Attribute-based access control for pins, pinboards and their children.
//!
//! [`engine::is_allowed`] holds the ownership and visibility rules as a pure
//! function. [`AccessPolicy`] wraps it with the deployment-level development
//! bypass and turns a denial into a typed [`AccessDenied`].

pub mod engine;
pub mod types;

pub use engine::{is_allowed, AccessDenied, AccessPolicy};
pub use types::{Action, ResourceAttrs, ResourceKind};
