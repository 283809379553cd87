// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Type definitions for access policy evaluation.
//!
//! All attributes are loaded before evaluation. Policy functions never touch
//! storage: for blocks, datasets and workflow data the caller loads the parent
//! pin and passes its owner and visibility here.

use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// The operation being attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
	Read,
	Write,
	Delete,
}

/// Kind of resource being accessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
	Pin,
	Pinboard,
	Block,
	Dataset,
	WorkflowData,
}

/// Attributes describing the resource being accessed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceAttrs {
	pub kind: ResourceKind,
	pub owner: UserId,
	pub is_public: bool,
}

impl ResourceAttrs {
	pub fn new(kind: ResourceKind, owner: UserId, is_public: bool) -> Self {
		Self {
			kind,
			owner,
			is_public,
		}
	}

	/// Re-label these attributes for a child of the same pin.
	pub fn as_child(&self, kind: ResourceKind) -> Self {
		Self {
			kind,
			owner: self.owner.clone(),
			is_public: self.is_public,
		}
	}
}
