// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Access policy evaluation.
//!
//! Rules, uniform across resource kinds:
//!
//! 1. The owner may perform any action.
//! 2. Anyone, including anonymous callers, may read a public resource.
//! 3. Everything else is denied.
//!
//! A denial on a resource the caller cannot see is reported as
//! [`AccessDenied::NotVisible`] so routes can answer "not found" without
//! leaking existence.

use tracing::instrument;

use super::types::{Action, ResourceAttrs, ResourceKind};
use crate::middleware::AuthConfig;
use crate::types::Principal;

/// Evaluates ownership and visibility rules.
#[instrument(
	level = "debug",
	skip(principal, resource),
	fields(
		user_id = principal.map(|p| p.user_id.as_str()).unwrap_or("anonymous"),
		action = ?action,
		kind = ?resource.kind,
	)
)]
pub fn is_allowed(principal: Option<&Principal>, action: Action, resource: &ResourceAttrs) -> bool {
	let is_owner = principal
		.map(|p| p.user_id == resource.owner)
		.unwrap_or(false);

	if is_owner {
		return true;
	}

	matches!(action, Action::Read) && resource.is_public
}

/// Why access was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AccessDenied {
	/// The caller cannot see the resource at all.
	#[error("resource not found")]
	NotVisible,

	/// The caller can read the resource but not perform this action.
	#[error("permission denied")]
	Forbidden,
}

/// Deployment-wide access policy.
///
/// Built once from [`AuthConfig`]. The development bypass lives here and
/// nowhere else: when active, the development principal passes ownership
/// checks on pins and their blocks and datasets. Pinboards and workflow data
/// always get the plain rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessPolicy {
	development_bypass: bool,
}

impl AccessPolicy {
	pub fn new(development_bypass: bool) -> Self {
		Self { development_bypass }
	}

	pub fn from_config(config: &AuthConfig) -> Self {
		Self::new(config.dev_mode_enabled())
	}

	fn bypasses(&self, principal: Option<&Principal>, kind: ResourceKind) -> bool {
		self.development_bypass
			&& principal.map(Principal::is_development).unwrap_or(false)
			&& matches!(
				kind,
				ResourceKind::Pin | ResourceKind::Block | ResourceKind::Dataset
			)
	}

	pub fn authorize(
		&self,
		principal: Option<&Principal>,
		action: Action,
		resource: &ResourceAttrs,
	) -> Result<(), AccessDenied> {
		if self.bypasses(principal, resource.kind) || is_allowed(principal, action, resource) {
			return Ok(());
		}

		tracing::debug!(kind = ?resource.kind, action = ?action, "access denied");
		if resource.is_public {
			Err(AccessDenied::Forbidden)
		} else {
			Err(AccessDenied::NotVisible)
		}
	}
}
