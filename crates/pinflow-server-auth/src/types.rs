// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core type definitions for authentication and authorization.
//!
//! - [`UserId`]: the opaque user identifier issued by the identity provider
//! - [`Permission`]: grants carried by a principal (`pins:read`, `*`, ...)
//! - [`AuthMethod`]: how the principal was established
//! - [`Principal`]: the resolved identity for one request

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a user.
///
/// User ids come from the identity provider and are opaque strings. They are
/// also used as path segments in the document store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn into_inner(self) -> String {
		self.0
	}
}

impl fmt::Display for UserId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for UserId {
	fn from(id: &str) -> Self {
		Self(id.to_string())
	}
}

impl From<String> for UserId {
	fn from(id: String) -> Self {
		Self(id)
	}
}

impl AsRef<str> for UserId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

// =============================================================================
// Permissions
// =============================================================================

/// A single grant held by a principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
	#[serde(rename = "pins:read")]
	PinsRead,
	#[serde(rename = "pins:write")]
	PinsWrite,
	#[serde(rename = "pins:delete")]
	PinsDelete,
	#[serde(rename = "workflow_data:read")]
	WorkflowDataRead,
	#[serde(rename = "workflow_data:write")]
	WorkflowDataWrite,
	/// Wildcard. Implies every other permission.
	#[serde(rename = "*")]
	All,
}

impl Permission {
	/// The fixed grant set for bearer-token principals.
	pub const TOKEN_DEFAULTS: [Permission; 5] = [
		Permission::PinsRead,
		Permission::PinsWrite,
		Permission::PinsDelete,
		Permission::WorkflowDataRead,
		Permission::WorkflowDataWrite,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			Permission::PinsRead => "pins:read",
			Permission::PinsWrite => "pins:write",
			Permission::PinsDelete => "pins:delete",
			Permission::WorkflowDataRead => "workflow_data:read",
			Permission::WorkflowDataWrite => "workflow_data:write",
			Permission::All => "*",
		}
	}
}

impl fmt::Display for Permission {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Error returned when a permission string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown permission: {0}")]
pub struct UnknownPermission(pub String);

impl FromStr for Permission {
	type Err = UnknownPermission;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"pins:read" => Ok(Permission::PinsRead),
			"pins:write" => Ok(Permission::PinsWrite),
			"pins:delete" => Ok(Permission::PinsDelete),
			"workflow_data:read" => Ok(Permission::WorkflowDataRead),
			"workflow_data:write" => Ok(Permission::WorkflowDataWrite),
			"*" => Ok(Permission::All),
			other => Err(UnknownPermission(other.to_string())),
		}
	}
}

// =============================================================================
// Principal
// =============================================================================

/// How a principal was authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
	Token,
	ApiKey,
	Development,
}

/// The user id handed out by the development bypass.
pub const DEVELOPMENT_USER_ID: &str = "dev-user";

/// The resolved identity for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
	pub user_id: UserId,
	pub auth_method: AuthMethod,
	pub permissions: Vec<Permission>,
	/// Email claim, only present for token principals.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	/// Id of the API key that authenticated the request.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub api_key_id: Option<String>,
}

impl Principal {
	/// Principal returned by the development bypass. Holds the wildcard grant.
	pub fn development() -> Self {
		Self {
			user_id: UserId::new(DEVELOPMENT_USER_ID),
			auth_method: AuthMethod::Development,
			permissions: vec![Permission::All],
			email: None,
			api_key_id: None,
		}
	}

	pub fn from_token(user_id: UserId, email: Option<String>) -> Self {
		Self {
			user_id,
			auth_method: AuthMethod::Token,
			permissions: Permission::TOKEN_DEFAULTS.to_vec(),
			email,
			api_key_id: None,
		}
	}

	pub fn from_api_key(user_id: UserId, api_key_id: String, permissions: Vec<Permission>) -> Self {
		Self {
			user_id,
			auth_method: AuthMethod::ApiKey,
			permissions,
			email: None,
			api_key_id: Some(api_key_id),
		}
	}

	pub fn is_development(&self) -> bool {
		self.auth_method == AuthMethod::Development
	}

	/// Returns true if the principal holds `permission` directly or via `*`.
	pub fn has_permission(&self, permission: Permission) -> bool {
		self
			.permissions
			.iter()
			.any(|p| *p == Permission::All || *p == permission)
	}

	/// Require a permission, naming it in the error when absent.
	pub fn require(&self, permission: Permission) -> Result<(), MissingPermission> {
		if self.has_permission(permission) {
			Ok(())
		} else {
			Err(MissingPermission(permission))
		}
	}

	/// Whether this principal may hand every permission in `requested` to a new API key.
	pub fn can_grant(&self, requested: &[Permission]) -> bool {
		requested.iter().all(|p| match p {
			Permission::All => self.permissions.contains(&Permission::All),
			other => self.has_permission(*other),
		})
	}
}

/// The principal lacks a permission the operation needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("missing permission: {0}")]
pub struct MissingPermission(pub Permission);
