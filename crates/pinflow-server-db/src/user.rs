// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User records at `users/{uid}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::document_store::{
	from_document, retry_on_conflict, server_timestamp, DocumentStore, Precondition, WriteBatch,
	DEFAULT_CAS_ATTEMPTS,
};
use crate::error::{DbError, Result};
use crate::paths::{self, validate_key};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
	pub uid: String,
	pub email: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub display_name: Option<String>,
	#[serde(rename = "photoURL", default, skip_serializing_if = "Option::is_none")]
	pub photo_url: Option<String>,
	#[serde(default)]
	pub email_verified: bool,
	pub created_at: String,
	pub updated_at: String,
	pub last_login_at: String,
}

/// Profile fields supplied on registration or login.
#[derive(Debug, Clone, Default)]
pub struct UserProfile {
	pub uid: String,
	pub email: String,
	pub display_name: Option<String>,
	pub photo_url: Option<String>,
	pub email_verified: bool,
}

#[derive(Clone)]
pub struct UserRepository {
	store: Arc<dyn DocumentStore>,
}

impl UserRepository {
	pub fn new(store: Arc<dyn DocumentStore>) -> Self {
		Self { store }
	}

	/// Create or refresh a user record.
	///
	/// `createdAt` is set on first write and kept afterwards; `updatedAt` and
	/// `lastLoginAt` are refreshed every time.
	#[instrument(skip(self, profile), fields(uid = %profile.uid))]
	pub async fn upsert_user(&self, profile: UserProfile) -> Result<UserRecord> {
		validate_key("user id", &profile.uid)?;
		if profile.email.trim().is_empty() {
			return Err(DbError::Validation("email must not be empty".to_string()));
		}

		let path = paths::user(&profile.uid);
		let path = &path;
		let profile = &profile;

		retry_on_conflict(DEFAULT_CAS_ATTEMPTS, || async move {
			let current = self.store.get_versioned(path).await?;
			let created_at = current
				.as_ref()
				.and_then(|c| c.value.get("createdAt").cloned())
				.unwrap_or_else(server_timestamp);

			let mut record = serde_json::json!({
				"uid": profile.uid,
				"email": profile.email,
				"emailVerified": profile.email_verified,
				"createdAt": created_at,
				"updatedAt": server_timestamp(),
				"lastLoginAt": server_timestamp(),
			});
			if let Some(name) = &profile.display_name {
				record["displayName"] = Value::String(name.clone());
			}
			if let Some(photo) = &profile.photo_url {
				record["photoURL"] = Value::String(photo.clone());
			}

			let precondition = Precondition::from_version(current.map(|c| c.version));
			self
				.store
				.update(WriteBatch::new().set_if(path.clone(), record, precondition))
				.await
		})
		.await?;

		info!(uid = %profile.uid, "user upserted");
		self
			.get_user(&profile.uid)
			.await?
			.ok_or_else(|| DbError::NotFound(format!("user {}", profile.uid)))
	}

	#[instrument(skip(self))]
	pub async fn get_user(&self, uid: &str) -> Result<Option<UserRecord>> {
		validate_key("user id", uid)?;
		let path = paths::user(uid);
		self
			.store
			.get(&path)
			.await?
			.map(|v| from_document(&path, v))
			.transpose()
	}
}
