// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

/// Authentication failure raised by the identity resolver.
///
/// The variants never say which credential almost worked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
	#[error("authentication required")]
	AuthRequired,

	#[error("authentication failed")]
	AuthInvalid,
}

impl AuthError {
	/// Stable error code returned to clients.
	pub fn code(&self) -> &'static str {
		match self {
			AuthError::AuthRequired => "AUTH_REQUIRED",
			AuthError::AuthInvalid => "AUTH_INVALID",
		}
	}
}
