// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! API key repository.
//!
//! Keys are stored under `api_keys/{userId}/{keyId}` as salted hashes only.
//! The plaintext is generated and shown once by the caller; it never reaches
//! this module.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pinflow_server_auth::{ApiKeyGrant, ApiKeyLookup, LookupError, Permission, UserId};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::document_store::{
	from_document, retry_on_conflict, server_timestamp, DocumentStore, Precondition, WriteBatch,
	DEFAULT_CAS_ATTEMPTS,
};
use crate::error::{DbError, Result};
use crate::paths::{self, key_of, parent_of, validate_key};

/// Stored API key document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ApiKeyRecord {
	name: String,
	#[serde(default)]
	permissions: Vec<String>,
	key_hash: String,
	#[serde(default)]
	is_active: bool,
	created_at: String,
	#[serde(default)]
	usage_count: u64,
}

/// API key as shown to its owner. Never carries the hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiKeyInfo {
	pub id: String,
	pub name: String,
	pub permissions: Vec<String>,
	pub is_active: bool,
	pub created_at: DateTime<Utc>,
	pub usage_count: u64,
}

impl ApiKeyInfo {
	fn from_record(id: String, record: ApiKeyRecord) -> Result<Self> {
		let created_at = DateTime::parse_from_rfc3339(&record.created_at)
			.map_err(|e| DbError::Internal(format!("api key {id} has a bad created_at: {e}")))?
			.with_timezone(&Utc);
		Ok(Self {
			id,
			name: record.name,
			permissions: record.permissions,
			is_active: record.is_active,
			created_at,
			usage_count: record.usage_count,
		})
	}
}

#[derive(Clone)]
pub struct ApiKeyRepository {
	store: Arc<dyn DocumentStore>,
}

impl ApiKeyRepository {
	pub fn new(store: Arc<dyn DocumentStore>) -> Self {
		Self { store }
	}

	/// Store a new active key for `owner`.
	///
	/// # Arguments
	/// * `key_hash` - salted SHA-256 of the plaintext key
	///
	/// # Returns
	/// The new key id.
	#[instrument(skip(self, key_hash), fields(owner = %owner))]
	pub async fn create_api_key(
		&self,
		owner: &UserId,
		name: &str,
		permissions: &[Permission],
		key_hash: &str,
	) -> Result<String> {
		validate_key("user id", owner.as_str())?;
		if name.trim().is_empty() {
			return Err(DbError::Validation("api key name must not be empty".to_string()));
		}

		let key_id = self.store.generate_key();
		let grants: Vec<&str> = permissions.iter().map(Permission::as_str).collect();
		let record = json!({
			"name": name,
			"permissions": grants,
			"key_hash": key_hash,
			"is_active": true,
			"created_at": server_timestamp(),
			"usage_count": 0,
		});

		self
			.store
			.update(WriteBatch::new().set_if(
				paths::api_key(owner.as_str(), &key_id),
				record,
				Precondition::Absent,
			))
			.await?;

		info!(owner = %owner, key_id = %key_id, "api key created");
		Ok(key_id)
	}

	/// Keys owned by `owner`, oldest first.
	#[instrument(skip(self), fields(owner = %owner))]
	pub async fn list_api_keys(&self, owner: &UserId) -> Result<Vec<ApiKeyInfo>> {
		validate_key("user id", owner.as_str())?;
		self
			.store
			.children(&paths::user_api_keys(owner.as_str()))
			.await?
			.into_iter()
			.map(|(key_id, value)| {
				let record = from_document(&paths::api_key(owner.as_str(), &key_id), value)?;
				ApiKeyInfo::from_record(key_id, record)
			})
			.collect()
	}

	#[instrument(skip(self), fields(owner = %owner))]
	pub async fn get_api_key(&self, owner: &UserId, key_id: &str) -> Result<Option<ApiKeyInfo>> {
		validate_key("user id", owner.as_str())?;
		validate_key("key id", key_id)?;
		let path = paths::api_key(owner.as_str(), key_id);
		match self.store.get(&path).await? {
			Some(value) => Ok(Some(ApiKeyInfo::from_record(
				key_id.to_string(),
				from_document(&path, value)?,
			)?)),
			None => Ok(None),
		}
	}

	/// Deactivate a key. The record is kept; it simply stops matching.
	#[instrument(skip(self), fields(owner = %owner))]
	pub async fn revoke_api_key(&self, owner: &UserId, key_id: &str) -> Result<()> {
		validate_key("user id", owner.as_str())?;
		validate_key("key id", key_id)?;
		let path = paths::api_key(owner.as_str(), key_id);
		let path = &path;

		retry_on_conflict(DEFAULT_CAS_ATTEMPTS, || async move {
			let current = self
				.store
				.get_versioned(path)
				.await?
				.ok_or_else(|| DbError::NotFound(format!("api key {key_id}")))?;
			let mut record: ApiKeyRecord = from_document(path, current.value)?;
			record.is_active = false;

			self
				.store
				.update(WriteBatch::new().set_if(
					path.clone(),
					serde_json::to_value(&record)?,
					Precondition::Version(current.version),
				))
				.await
		})
		.await?;

		info!(owner = %owner, key_id = %key_id, "api key revoked");
		Ok(())
	}

	/// Scan every user's keys for an active key with this hash.
	#[instrument(skip(self, key_hash))]
	pub async fn find_active_by_hash(&self, key_hash: &str) -> Result<Option<ApiKeyGrant>> {
		let all = self.store.descendants(paths::API_KEYS).await?;
		debug!(scanned = all.len(), "scanning api keys");

		for (path, value) in all {
			let record: ApiKeyRecord = match from_document(&path, value) {
				Ok(record) => record,
				Err(e) => {
					warn!(path = %path, error = %e, "skipping unreadable api key");
					continue;
				}
			};
			if record.is_active && record.key_hash == key_hash {
				let owner = key_of(parent_of(&path));
				return Ok(Some(ApiKeyGrant {
					key_id: key_of(&path).to_string(),
					user_id: UserId::new(owner),
					permissions: record.permissions,
				}));
			}
		}
		Ok(None)
	}
}

#[async_trait]
impl ApiKeyLookup for ApiKeyRepository {
	async fn find_active_by_hash(&self, key_hash: &str) -> std::result::Result<Option<ApiKeyGrant>, LookupError> {
		ApiKeyRepository::find_active_by_hash(self, key_hash)
			.await
			.map_err(|e| LookupError(e.to_string()))
	}
}
