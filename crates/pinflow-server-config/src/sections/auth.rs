// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication configuration.

use serde::Deserialize;

use crate::secret::SecretString;

/// Environment name that forbids the development bypass.
pub const PRODUCTION_ENV: &str = "production";

/// Authentication configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct AuthConfig {
	pub dev_mode: bool,
	pub environment: String,
	/// Salt appended to API keys before hashing.
	pub api_key_salt: SecretString,
	/// HMAC secret for bearer tokens.
	pub token_secret: SecretString,
}

impl AuthConfig {
	pub fn is_production(&self) -> bool {
		self.environment == PRODUCTION_ENV
	}
}

impl Default for AuthConfig {
	fn default() -> Self {
		AuthConfigLayer::default().finalize()
	}
}

/// Authentication configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfigLayer {
	#[serde(default)]
	pub dev_mode: Option<bool>,
	#[serde(default)]
	pub environment: Option<String>,
	#[serde(default)]
	pub api_key_salt: Option<SecretString>,
	#[serde(default)]
	pub token_secret: Option<SecretString>,
}

impl AuthConfigLayer {
	pub fn merge(&mut self, other: AuthConfigLayer) {
		if other.dev_mode.is_some() {
			self.dev_mode = other.dev_mode;
		}
		if other.environment.is_some() {
			self.environment = other.environment;
		}
		if other.api_key_salt.is_some() {
			self.api_key_salt = other.api_key_salt;
		}
		if other.token_secret.is_some() {
			self.token_secret = other.token_secret;
		}
	}

	pub fn finalize(self) -> AuthConfig {
		AuthConfig {
			dev_mode: self.dev_mode.unwrap_or(false),
			environment: self
				.environment
				.unwrap_or_else(|| "development".to_string()),
			api_key_salt: self.api_key_salt.unwrap_or_default(),
			token_secret: self.token_secret.unwrap_or_default(),
		}
	}
}
