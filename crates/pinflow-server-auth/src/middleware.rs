// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Credential extraction and authentication configuration.
//!
//! # Credential sources
//!
//! ```text
//! Authorization: Bearer <token>   → identity verifier
//! Authorization: ApiKey <key>     → salted hash lookup
//! { "api_key": "<key>", ... }     → salted hash lookup (selected routes only)
//! ```
//!
//! Credential values are never logged.

use http::header::AUTHORIZATION;
use http::HeaderMap;
use std::fmt;
use tracing::instrument;

/// Environment value that disables the development bypass.
pub const PRODUCTION_ENV: &str = "production";

/// Configuration for authentication behavior.
#[derive(Debug, Clone)]
pub struct AuthConfig {
	/// Enable the development bypass (every request resolves to the development principal).
	pub dev_mode: bool,
	/// Deployment environment name (`development`, `staging`, `production`, ...).
	pub environment: String,
}

impl Default for AuthConfig {
	fn default() -> Self {
		Self {
			dev_mode: false,
			environment: "development".to_string(),
		}
	}
}

impl AuthConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_dev_mode(mut self, enabled: bool) -> Self {
		self.dev_mode = enabled;
		self
	}

	pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
		self.environment = environment.into();
		self
	}

	pub fn is_production(&self) -> bool {
		self.environment.eq_ignore_ascii_case(PRODUCTION_ENV)
	}

	/// Whether the development bypass is active.
	///
	/// Always false in production, even if `dev_mode` was set. Configuration
	/// loading rejects that combination outright; this is the second gate.
	pub fn dev_mode_enabled(&self) -> bool {
		self.dev_mode && !self.is_production()
	}
}

/// Raw credentials presented with a request.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
	pub bearer_token: Option<String>,
	pub api_key: Option<String>,
}

impl fmt::Debug for Credentials {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Credentials")
			.field("bearer_token", &self.bearer_token.as_ref().map(|_| "[REDACTED]"))
			.field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
			.finish()
	}
}

impl Credentials {
	/// Collect credentials from the `Authorization` header.
	pub fn from_headers(headers: &HeaderMap) -> Self {
		Self {
			bearer_token: extract_bearer_token(headers),
			api_key: extract_api_key(headers),
		}
	}

	/// Fill in an API key taken from the request body.
	///
	/// A key in the `Authorization` header wins over one in the body.
	pub fn with_body_api_key(mut self, api_key: Option<String>) -> Self {
		if self.api_key.is_none() {
			self.api_key = api_key.filter(|k| !k.is_empty());
		}
		self
	}

	pub fn is_empty(&self) -> bool {
		self.bearer_token.is_none() && self.api_key.is_none()
	}
}

fn authorization_value(headers: &HeaderMap) -> Option<&str> {
	headers.get(AUTHORIZATION)?.to_str().ok()
}

/// Extract bearer token from the Authorization header.
///
/// Expects the format: `Authorization: Bearer <token>`
#[instrument(level = "trace", skip_all)]
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
	authorization_value(headers)?
		.strip_prefix("Bearer ")
		.map(str::trim)
		.filter(|t| !t.is_empty())
		.map(|t| t.to_string())
}

/// Extract an API key from the Authorization header.
///
/// Expects the format: `Authorization: ApiKey <key>`
#[instrument(level = "trace", skip_all)]
pub fn extract_api_key(headers: &HeaderMap) -> Option<String> {
	authorization_value(headers)?
		.strip_prefix("ApiKey ")
		.map(str::trim)
		.filter(|k| !k.is_empty())
		.map(|k| k.to_string())
}
