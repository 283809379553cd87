// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Pinboard repository.
//!
//! A pinboard lives at `pin_boards/{id}` with an owner index entry at
//! `user_pinboards/{userId}/{id} = true`. Membership changes are
//! read-modify-write on the `pins` array, conditioned on the version that
//! was read and retried on conflict, so concurrent adds never lose an id.

use pinflow_server_auth::{ResourceAttrs, ResourceKind, UserId};
use serde::{Deserialize, Deserializer, Serialize};
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

/// Treat a stored `null` as an empty list.
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pinboard {
	pub id: String,
	pub user_id: UserId,
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	/// Ordered, duplicate-free pin ids.
	#[serde(default, deserialize_with = "null_as_empty")]
	pub pins: Vec<String>,
	#[serde(default, deserialize_with = "null_as_empty")]
	pub tags: Vec<String>,
	#[serde(default)]
	pub is_public: bool,
	pub created_at: String,
	pub updated_at: String,
}

impl Pinboard {
	pub fn resource_attrs(&self) -> ResourceAttrs {
		ResourceAttrs::new(ResourceKind::Pinboard, self.user_id.clone(), self.is_public)
	}
}

#[derive(Debug, Clone)]
pub struct NewPinboard {
	pub user_id: UserId,
	pub name: String,
	pub description: Option<String>,
	pub pins: Vec<String>,
	pub tags: Vec<String>,
	pub is_public: bool,
}

impl NewPinboard {
	pub fn new(user_id: UserId, name: impl Into<String>) -> Self {
		Self {
			user_id,
			name: name.into(),
			description: None,
			pins: Vec::new(),
			tags: Vec::new(),
			is_public: false,
		}
	}
}

#[derive(Debug, Clone, Default)]
pub struct PinboardUpdate {
	pub name: Option<String>,
	pub description: Option<String>,
	pub pins: Option<Vec<String>>,
	pub tags: Option<Vec<String>>,
	pub is_public: Option<bool>,
}

/// Drop repeated ids, keeping the first occurrence.
pub fn dedupe_pins(pins: Vec<String>) -> Vec<String> {
	let mut out: Vec<String> = Vec::with_capacity(pins.len());
	for id in pins {
		if !out.contains(&id) {
			out.push(id);
		}
	}
	out
}

#[derive(Clone)]
pub struct PinboardRepository {
	store: Arc<dyn DocumentStore>,
}

impl PinboardRepository {
	pub fn new(store: Arc<dyn DocumentStore>) -> Self {
		Self { store }
	}

	/// Create a pinboard and its owner index entry in one atomic write.
	#[instrument(skip(self, new), fields(user_id = %new.user_id))]
	pub async fn create_pinboard(&self, new: NewPinboard) -> Result<String> {
		validate_key("user id", new.user_id.as_str())?;
		for pin_id in &new.pins {
			validate_key("pin id", pin_id)?;
		}

		let id = new_id(self.store.as_ref(), IdKind::Pinboard);
		let record = json!({
			"id": id,
			"user_id": new.user_id,
			"name": new.name,
			"description": new.description,
			"pins": dedupe_pins(new.pins),
			"tags": new.tags,
			"is_public": new.is_public,
			"created_at": server_timestamp(),
			"updated_at": server_timestamp(),
		});

		self
			.store
			.update(
				WriteBatch::new()
					.set_if(paths::pinboard(&id), record, Precondition::Absent)
					.set(paths::user_pinboard(new.user_id.as_str(), &id), Value::Bool(true)),
			)
			.await?;

		info!(pinboard_id = %id, user_id = %new.user_id, "pinboard created");
		Ok(id)
	}

	/// Point read with `pins` and `tags` normalised to arrays.
	#[instrument(skip(self))]
	pub async fn get_pinboard(&self, pinboard_id: &str) -> Result<Option<Pinboard>> {
		validate_key("pinboard id", pinboard_id)?;
		let path = paths::pinboard(pinboard_id);
		self
			.store
			.get(&path)
			.await?
			.map(|v| from_document(&path, v))
			.transpose()
	}

	/// All pinboards owned by `user_id`, newest first.
	#[instrument(skip(self), fields(user_id = %user_id))]
	pub async fn get_user_pinboards(&self, user_id: &UserId) -> Result<Vec<Pinboard>> {
		validate_key("user id", user_id.as_str())?;
		let entries = self
			.store
			.children(&paths::user_pinboards(user_id.as_str()))
			.await?;

		let mut boards = Vec::with_capacity(entries.len());
		for (pinboard_id, _) in entries {
			match self.get_pinboard(&pinboard_id).await? {
				Some(board) if &board.user_id == user_id => boards.push(board),
				Some(_) => warn!(pinboard_id = %pinboard_id, "index entry points at a pinboard owned by another user"),
				None => warn!(pinboard_id = %pinboard_id, "index entry points at a missing pinboard"),
			}
		}

		boards.sort_by(|a, b| {
			b.created_at
				.cmp(&a.created_at)
				.then_with(|| b.id.cmp(&a.id))
		});
		debug!(count = boards.len(), "loaded user pinboards");
		Ok(boards)
	}

	#[instrument(skip(self, update))]
	pub async fn update_pinboard(&self, pinboard_id: &str, update: PinboardUpdate) -> Result<Pinboard> {
		if let Some(pins) = &update.pins {
			for pin_id in pins {
				validate_key("pin id", pin_id)?;
			}
		}
		let update = &update;
		let board = self
			.modify(pinboard_id, |board| {
				if let Some(name) = &update.name {
					board.name = name.clone();
				}
				if let Some(description) = &update.description {
					board.description = Some(description.clone());
				}
				if let Some(pins) = &update.pins {
					board.pins = dedupe_pins(pins.clone());
				}
				if let Some(tags) = &update.tags {
					board.tags = tags.clone();
				}
				if let Some(is_public) = update.is_public {
					board.is_public = is_public;
				}
				true
			})
			.await?;
		info!(pinboard_id = %pinboard_id, "pinboard updated");
		Ok(board)
	}

	/// Append a pin id. Adding an id that is already present changes nothing.
	#[instrument(skip(self))]
	pub async fn add_pin_to_pinboard(&self, pinboard_id: &str, pin_id: &str) -> Result<Pinboard> {
		validate_key("pin id", pin_id)?;
		self
			.modify(pinboard_id, |board| {
				if board.pins.iter().any(|p| p == pin_id) {
					return false;
				}
				board.pins.push(pin_id.to_string());
				true
			})
			.await
	}

	/// Remove a pin id. Removing an absent id changes nothing.
	#[instrument(skip(self))]
	pub async fn remove_pin_from_pinboard(&self, pinboard_id: &str, pin_id: &str) -> Result<Pinboard> {
		validate_key("pin id", pin_id)?;
		self
			.modify(pinboard_id, |board| {
				let before = board.pins.len();
				board.pins.retain(|p| p != pin_id);
				board.pins.len() != before
			})
			.await
	}

	/// Read, apply `change`, write back conditioned on the read version.
	///
	/// `change` returns `false` when it left the pinboard untouched, in which
	/// case nothing is written.
	async fn modify<F>(&self, pinboard_id: &str, change: F) -> Result<Pinboard>
	where
		F: Fn(&mut Pinboard) -> bool,
	{
		validate_key("pinboard id", pinboard_id)?;
		let path = paths::pinboard(pinboard_id);
		let change = &change;
		let path = &path;

		retry_on_conflict(DEFAULT_CAS_ATTEMPTS, || async move {
			let current = self
				.store
				.get_versioned(path)
				.await?
				.ok_or_else(|| DbError::NotFound(format!("pinboard {pinboard_id}")))?;

			let mut board: Pinboard = from_document(path, current.value)?;
			if !change(&mut board) {
				return Ok(board);
			}

			let mut record = serde_json::to_value(&board)?;
			record["updated_at"] = server_timestamp();
			self
				.store
				.update(WriteBatch::new().set_if(
					path.clone(),
					record,
					Precondition::Version(current.version),
				))
				.await?;

			self
				.get_pinboard(pinboard_id)
				.await?
				.ok_or_else(|| DbError::NotFound(format!("pinboard {pinboard_id}")))
		})
		.await
	}

	/// Delete the pinboard record and its owner index entry atomically.
	#[instrument(skip(self))]
	pub async fn delete_pinboard(&self, pinboard_id: &str) -> Result<()> {
		let board = self
			.get_pinboard(pinboard_id)
			.await?
			.ok_or_else(|| DbError::NotFound(format!("pinboard {pinboard_id}")))?;

		self
			.store
			.update(
				WriteBatch::new()
					.delete(paths::pinboard(pinboard_id))
					.delete(paths::user_pinboard(board.user_id.as_str(), pinboard_id)),
			)
			.await?;

		info!(pinboard_id = %pinboard_id, user_id = %board.user_id, "pinboard deleted");
		Ok(())
	}
}
