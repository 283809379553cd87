// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Pin repository.
//!
//! A pin lives at `pins/{id}` and is mirrored by an owner index entry at
//! `user_pins/{userId}/{id}`. Both are always written or removed in the same
//! atomic batch. Deleting a pin also removes its blocks, datasets and
//! workflow data.

use futures::future::try_join_all;
use pinflow_server_auth::{ResourceAttrs, ResourceKind, UserId};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::document_store::{
	from_document, retry_on_conflict, server_timestamp, DocumentStore, Precondition, WriteBatch,
	DEFAULT_CAS_ATTEMPTS,
};
use crate::error::{DbError, Result};
use crate::id::{new_id, IdKind};
use crate::paths::{self, validate_key};

/// Version of `pins/{pin_id}` as read now. Writes under the pin carry it as
/// a [`WriteBatch::check`] so they cannot land after the pin is deleted.
pub(crate) async fn live_pin_version(store: &dyn DocumentStore, pin_id: &str) -> Result<u64> {
	validate_key("pin id", pin_id)?;
	store
		.get_versioned(&paths::pin(pin_id))
		.await?
		.map(|pin| pin.version)
		.ok_or_else(|| DbError::NotFound(format!("pin {pin_id}")))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinDataType {
	Json,
	Markdown,
	Text,
}

impl PinDataType {
	pub fn as_str(&self) -> &'static str {
		match self {
			PinDataType::Json => "json",
			PinDataType::Markdown => "markdown",
			PinDataType::Text => "text",
		}
	}
}

/// Pin body, tagged by data type.
#[derive(Debug, Clone, PartialEq)]
pub enum PinContent {
	Json(Value),
	Markdown(String),
	Text(String),
}

impl PinContent {
	/// Build content from the stored `(data_type, content)` pair.
	///
	/// Markdown and text content must be a JSON string.
	pub fn from_parts(data_type: PinDataType, content: Value) -> Result<Self> {
		match (data_type, content) {
			(PinDataType::Json, value) => Ok(PinContent::Json(value)),
			(PinDataType::Markdown, Value::String(s)) => Ok(PinContent::Markdown(s)),
			(PinDataType::Text, Value::String(s)) => Ok(PinContent::Text(s)),
			(PinDataType::Markdown, Value::Null) => Ok(PinContent::Markdown(String::new())),
			(PinDataType::Text, Value::Null) => Ok(PinContent::Text(String::new())),
			(other, _) => Err(DbError::Validation(format!(
				"{} content must be a string",
				other.as_str()
			))),
		}
	}

	pub fn data_type(&self) -> PinDataType {
		match self {
			PinContent::Json(_) => PinDataType::Json,
			PinContent::Markdown(_) => PinDataType::Markdown,
			PinContent::Text(_) => PinDataType::Text,
		}
	}

	pub fn into_parts(self) -> (PinDataType, Value) {
		match self {
			PinContent::Json(v) => (PinDataType::Json, v),
			PinContent::Markdown(s) => (PinDataType::Markdown, Value::String(s)),
			PinContent::Text(s) => (PinDataType::Text, Value::String(s)),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinMetadata {
	pub title: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	#[serde(default)]
	pub tags: Vec<String>,
	#[serde(default)]
	pub workflow_sources: Vec<String>,
	pub created_at: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub updated_at: Option<String>,
	/// Mirror of `permissions.is_public`. Never read for access decisions.
	#[serde(default)]
	pub is_public: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinPermissions {
	/// Canonical visibility flag.
	#[serde(default)]
	pub is_public: bool,
	pub created_by: UserId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
	pub id: String,
	pub user_id: UserId,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub wid: Option<String>,
	pub data_type: PinDataType,
	#[serde(default)]
	pub content: Value,
	pub metadata: PinMetadata,
	pub permissions: PinPermissions,
}

impl Pin {
	pub fn is_public(&self) -> bool {
		self.permissions.is_public
	}

	pub fn content(&self) -> Result<PinContent> {
		PinContent::from_parts(self.data_type, self.content.clone())
	}

	/// Access attributes for this pin (and, via [`ResourceAttrs::as_child`], its children).
	pub fn resource_attrs(&self) -> ResourceAttrs {
		ResourceAttrs::new(ResourceKind::Pin, self.user_id.clone(), self.is_public())
	}
}

/// Entry in `user_pins/{userId}/{pinId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinIndexEntry {
	pub title: String,
	#[serde(default)]
	pub workflow_sources: Vec<String>,
	pub created_at: String,
	#[serde(default)]
	pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct NewPin {
	pub user_id: UserId,
	pub wid: Option<String>,
	pub content: PinContent,
	pub title: String,
	pub description: Option<String>,
	pub tags: Vec<String>,
	pub workflow_sources: Vec<String>,
	pub is_public: bool,
}

impl NewPin {
	pub fn new(user_id: UserId, title: impl Into<String>, content: PinContent) -> Self {
		Self {
			user_id,
			wid: None,
			content,
			title: title.into(),
			description: None,
			tags: Vec::new(),
			workflow_sources: Vec::new(),
			is_public: false,
		}
	}
}

/// Partial pin update. `None` fields are left as they are.
#[derive(Debug, Clone, Default)]
pub struct PinUpdate {
	pub title: Option<String>,
	pub description: Option<String>,
	pub tags: Option<Vec<String>>,
	pub workflow_sources: Option<Vec<String>>,
	pub content: Option<PinContent>,
}

fn index_entry(pin: &Pin) -> Value {
	json!({
		"title": pin.metadata.title,
		"workflow_sources": pin.metadata.workflow_sources,
		"created_at": pin.metadata.created_at,
		"is_active": true,
	})
}

/// Repository for pins and their owner index.
#[derive(Clone)]
pub struct PinRepository {
	store: Arc<dyn DocumentStore>,
}

impl PinRepository {
	pub fn new(store: Arc<dyn DocumentStore>) -> Self {
		Self { store }
	}

	/// Create a pin and its owner index entry in one atomic write.
	///
	/// # Returns
	/// The new pin id (`p` + store key).
	#[instrument(skip(self, new), fields(user_id = %new.user_id))]
	pub async fn create_pin(&self, new: NewPin) -> Result<String> {
		validate_key("user id", new.user_id.as_str())?;

		let id = new_id(self.store.as_ref(), IdKind::Pin);
		let (data_type, content) = new.content.into_parts();

		let record = json!({
			"id": id,
			"user_id": new.user_id,
			"wid": new.wid,
			"data_type": data_type,
			"content": content,
			"metadata": {
				"title": new.title,
				"description": new.description,
				"tags": new.tags,
				"workflow_sources": new.workflow_sources,
				"created_at": server_timestamp(),
				"updated_at": server_timestamp(),
				"is_public": new.is_public,
			},
			"permissions": {
				"is_public": new.is_public,
				"created_by": new.user_id,
			},
		});
		let index = json!({
			"title": new.title,
			"workflow_sources": new.workflow_sources,
			"created_at": server_timestamp(),
			"is_active": true,
		});

		self
			.store
			.update(
				WriteBatch::new()
					.set_if(paths::pin(&id), record, Precondition::Absent)
					.set(paths::user_pin(new.user_id.as_str(), &id), index),
			)
			.await?;

		info!(pin_id = %id, user_id = %new.user_id, "pin created");
		Ok(id)
	}

	/// Point read. `None` when the pin does not exist.
	#[instrument(skip(self))]
	pub async fn get_pin(&self, pin_id: &str) -> Result<Option<Pin>> {
		validate_key("pin id", pin_id)?;
		let path = paths::pin(pin_id);
		self
			.store
			.get(&path)
			.await?
			.map(|v| from_document(&path, v))
			.transpose()
	}

	/// All pins owned by `user_id`, newest first.
	///
	/// Reads the owner index, then fetches each pin directly in parallel.
	/// Index entries whose pin is gone or owned by someone else are skipped.
	#[instrument(skip(self), fields(user_id = %user_id))]
	pub async fn get_user_pins(&self, user_id: &UserId) -> Result<Vec<Pin>> {
		validate_key("user id", user_id.as_str())?;
		let entries = self.store.children(&paths::user_pins(user_id.as_str())).await?;

		let reads = entries.iter().map(|(pin_id, _)| self.get_pin(pin_id));
		let fetched = try_join_all(reads).await?;

		let mut pins = Vec::with_capacity(fetched.len());
		for ((pin_id, _), pin) in entries.iter().zip(fetched) {
			match pin {
				Some(pin) if &pin.user_id == user_id => pins.push(pin),
				Some(_) => warn!(pin_id = %pin_id, "index entry points at a pin owned by another user"),
				None => warn!(pin_id = %pin_id, "index entry points at a missing pin"),
			}
		}

		pins.sort_by(|a, b| {
			b.metadata
				.created_at
				.cmp(&a.metadata.created_at)
				.then_with(|| b.id.cmp(&a.id))
		});
		debug!(count = pins.len(), "loaded user pins");
		Ok(pins)
	}

	/// Apply a partial update, refreshing `updated_at` and the index entry.
	#[instrument(skip(self, update))]
	pub async fn update_pin(&self, pin_id: &str, update: PinUpdate) -> Result<Pin> {
		let update = &update;
		self
			.modify(pin_id, |pin| {
				if let Some(title) = &update.title {
					pin.metadata.title = title.clone();
				}
				if let Some(description) = &update.description {
					pin.metadata.description = Some(description.clone());
				}
				if let Some(tags) = &update.tags {
					pin.metadata.tags = tags.clone();
				}
				if let Some(sources) = &update.workflow_sources {
					pin.metadata.workflow_sources = sources.clone();
				}
				if let Some(content) = &update.content {
					let (data_type, value) = content.clone().into_parts();
					pin.data_type = data_type;
					pin.content = value;
				}
			})
			.await
	}

	/// Publish or unpublish a pin.
	///
	/// Writes the canonical `permissions.is_public` and mirrors it into
	/// `metadata.is_public` in the same write.
	#[instrument(skip(self))]
	pub async fn set_visibility(&self, pin_id: &str, is_public: bool) -> Result<Pin> {
		let pin = self
			.modify(pin_id, |pin| {
				pin.permissions.is_public = is_public;
				pin.metadata.is_public = is_public;
			})
			.await?;
		info!(pin_id = %pin_id, is_public, "pin visibility changed");
		Ok(pin)
	}

	async fn modify<F>(&self, pin_id: &str, apply: F) -> Result<Pin>
	where
		F: Fn(&mut Pin),
	{
		validate_key("pin id", pin_id)?;
		let path = paths::pin(pin_id);
		let apply = &apply;
		let path = &path;

		retry_on_conflict(DEFAULT_CAS_ATTEMPTS, || async move {
			let current = self
				.store
				.get_versioned(path)
				.await?
				.ok_or_else(|| DbError::NotFound(format!("pin {pin_id}")))?;

			let mut pin: Pin = from_document(path, current.value)?;
			apply(&mut pin);

			let mut record = serde_json::to_value(&pin)?;
			record["metadata"]["updated_at"] = server_timestamp();

			self
				.store
				.update(
					WriteBatch::new()
						.set_if(path.clone(), record, Precondition::Version(current.version))
						.set(paths::user_pin(pin.user_id.as_str(), pin_id), index_entry(&pin)),
				)
				.await
		})
		.await?;

		self
			.get_pin(pin_id)
			.await?
			.ok_or_else(|| DbError::NotFound(format!("pin {pin_id}")))
	}

	/// Delete a pin, its owner index entry, blocks, datasets and workflow data.
	#[instrument(skip(self))]
	pub async fn delete_pin(&self, pin_id: &str) -> Result<()> {
		let pin = self
			.get_pin(pin_id)
			.await?
			.ok_or_else(|| DbError::NotFound(format!("pin {pin_id}")))?;

		self
			.store
			.update(
				WriteBatch::new()
					.delete(paths::pin(pin_id))
					.delete(paths::user_pin(pin.user_id.as_str(), pin_id))
					.delete(paths::pin_blocks(pin_id))
					.delete(paths::pin_datasets(pin_id))
					.delete(paths::workflow_data(pin_id)),
			)
			.await?;

		info!(pin_id = %pin_id, user_id = %pin.user_id, "pin deleted");
		Ok(())
	}
}
