// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity resolution.
//!
//! ```text
//! Credentials ─┬─ dev bypass enabled?  → development principal
//!              ├─ bearer token valid?  → token principal
//!              │     (invalid: log, fall through)
//!              ├─ API key hash match?  → api-key principal
//!              └─ otherwise            → AUTH_REQUIRED
//! ```
//!
//! First match wins. Lookup failures become `AUTH_INVALID`; store errors are
//! never surfaced to the caller.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::api_key::hash_api_key;
use crate::error::AuthError;
use crate::middleware::{AuthConfig, Credentials};
use crate::types::{Permission, Principal, UserId};
use crate::verifier::IdentityVerifier;

/// An active API key matched by hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKeyGrant {
	pub key_id: String,
	pub user_id: UserId,
	/// Permission strings exactly as stored.
	pub permissions: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
#[error("api key lookup failed: {0}")]
pub struct LookupError(pub String);

/// Finds active API keys by salted hash across all users.
#[async_trait]
pub trait ApiKeyLookup: Send + Sync {
	async fn find_active_by_hash(&self, key_hash: &str) -> Result<Option<ApiKeyGrant>, LookupError>;
}

/// Resolves request credentials into a [`Principal`].
pub struct IdentityResolver {
	config: AuthConfig,
	verifier: Arc<dyn IdentityVerifier>,
	api_keys: Arc<dyn ApiKeyLookup>,
	api_key_salt: String,
}

impl fmt::Debug for IdentityResolver {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("IdentityResolver")
			.field("config", &self.config)
			.field("api_key_salt", &"[REDACTED]")
			.finish_non_exhaustive()
	}
}

impl IdentityResolver {
	pub fn new(
		config: AuthConfig,
		verifier: Arc<dyn IdentityVerifier>,
		api_keys: Arc<dyn ApiKeyLookup>,
		api_key_salt: impl Into<String>,
	) -> Self {
		Self {
			config,
			verifier,
			api_keys,
			api_key_salt: api_key_salt.into(),
		}
	}

	pub fn config(&self) -> &AuthConfig {
		&self.config
	}

	/// Hash a plaintext key with this server's salt.
	pub fn hash_api_key(&self, key: &str) -> String {
		hash_api_key(key, &self.api_key_salt)
	}

	#[instrument(
		skip(self, credentials),
		fields(has_bearer = credentials.bearer_token.is_some(), has_api_key = credentials.api_key.is_some())
	)]
	pub async fn resolve(&self, credentials: &Credentials) -> Result<Principal, AuthError> {
		if self.config.dev_mode_enabled() {
			debug!("development bypass active");
			return Ok(Principal::development());
		}

		if let Some(token) = &credentials.bearer_token {
			match self.verifier.verify(token).await {
				Ok(identity) => {
					debug!(user_id = %identity.user_id, "resolved principal from bearer token");
					return Ok(Principal::from_token(identity.user_id, identity.email));
				}
				Err(e) => {
					warn!(error = %e, "bearer token verification failed");
				}
			}
		}

		if let Some(key) = &credentials.api_key {
			let key_hash = self.hash_api_key(key);
			match self.api_keys.find_active_by_hash(&key_hash).await {
				Ok(Some(grant)) => {
					debug!(user_id = %grant.user_id, api_key_id = %grant.key_id, "resolved principal from api key");
					let permissions = parse_grants(&grant.permissions);
					return Ok(Principal::from_api_key(grant.user_id, grant.key_id, permissions));
				}
				Ok(None) => {
					warn!("api key did not match an active key");
				}
				Err(e) => {
					warn!(error = %e, "api key lookup failed");
					return Err(AuthError::AuthInvalid);
				}
			}
		}

		Err(AuthError::AuthRequired)
	}
}

fn parse_grants(stored: &[String]) -> Vec<Permission> {
	stored
		.iter()
		.filter_map(|s| match s.parse::<Permission>() {
			Ok(p) => Some(p),
			Err(e) => {
				warn!(error = %e, "ignoring unknown stored permission");
				None
			}
		})
		.collect()
}
