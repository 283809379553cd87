// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Access guard.
//!
//! Loads the resource (or the parent pin of a block, dataset or workflow
//! payload) and runs it through the deployment's [`AccessPolicy`]. Absent
//! resources and resources the caller cannot see both come back as
//! `RESOURCE_NOT_FOUND`.

use pinflow_server_auth::{AccessPolicy, Action, Principal, ResourceKind};
use pinflow_server_db::{Pin, PinRepository, Pinboard, PinboardRepository};
use tracing::{instrument, warn};

use crate::error::ServerError;

#[derive(Clone)]
pub struct AccessGuard {
	policy: AccessPolicy,
	pins: PinRepository,
	pinboards: PinboardRepository,
}

impl AccessGuard {
	pub fn new(policy: AccessPolicy, pins: PinRepository, pinboards: PinboardRepository) -> Self {
		Self {
			policy,
			pins,
			pinboards,
		}
	}

	pub fn policy(&self) -> &AccessPolicy {
		&self.policy
	}

	/// Load a pin and authorize `action` on it.
	#[instrument(skip(self, principal), fields(user_id = principal.map(|p| p.user_id.as_str())))]
	pub async fn pin(
		&self,
		principal: Option<&Principal>,
		pin_id: &str,
		action: Action,
	) -> Result<Pin, ServerError> {
		self.pin_scoped(principal, pin_id, ResourceKind::Pin, action).await
	}

	/// Load the parent pin of a `kind` child and authorize `action` on the child.
	#[instrument(skip(self, principal), fields(user_id = principal.map(|p| p.user_id.as_str())))]
	pub async fn pin_child(
		&self,
		principal: Option<&Principal>,
		pin_id: &str,
		kind: ResourceKind,
		action: Action,
	) -> Result<Pin, ServerError> {
		self.pin_scoped(principal, pin_id, kind, action).await
	}

	async fn pin_scoped(
		&self,
		principal: Option<&Principal>,
		pin_id: &str,
		kind: ResourceKind,
		action: Action,
	) -> Result<Pin, ServerError> {
		let pin = self
			.pins
			.get_pin(pin_id)
			.await?
			.ok_or_else(|| ServerError::NotFound(format!("pin {pin_id}")))?;

		self
			.policy
			.authorize(principal, action, &pin.resource_attrs().as_child(kind))
			.map_err(|denied| {
				warn!(pin_id = %pin_id, kind = ?kind, action = ?action, reason = %denied, "pin access denied");
				ServerError::from(denied)
			})?;
		Ok(pin)
	}

	/// Load a pinboard and authorize `action` on it.
	#[instrument(skip(self, principal), fields(user_id = principal.map(|p| p.user_id.as_str())))]
	pub async fn pinboard(
		&self,
		principal: Option<&Principal>,
		pinboard_id: &str,
		action: Action,
	) -> Result<Pinboard, ServerError> {
		let board = self
			.pinboards
			.get_pinboard(pinboard_id)
			.await?
			.ok_or_else(|| ServerError::NotFound(format!("pinboard {pinboard_id}")))?;

		self
			.policy
			.authorize(principal, action, &board.resource_attrs())
			.map_err(|denied| {
				warn!(pinboard_id = %pinboard_id, action = ?action, reason = %denied, "pinboard access denied");
				ServerError::from(denied)
			})?;
		Ok(board)
	}

	/// Whether `principal` may read an already loaded pin.
	pub fn can_read_pin(&self, principal: Option<&Principal>, pin: &Pin) -> bool {
		self
			.policy
			.authorize(principal, Action::Read, &pin.resource_attrs())
			.is_ok()
	}
}
