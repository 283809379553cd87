// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Dataset repository.
//!
//! Datasets live under `pin_datasets/{pinId}/{datasetId}`. The stored `data`
//! is the parsed payload: a JSON value for `json` datasets, `{content}` for
//! `markdown` ones. Input is parsed before anything is written, so a bad
//! payload never reaches the store.

use pinflow_server_auth::UserId;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::document_store::{
	from_document, retry_on_conflict, server_timestamp, DocumentStore, Precondition, WriteBatch,
	DEFAULT_CAS_ATTEMPTS,
};
use crate::error::{DbError, Result};
use crate::id::{new_id, IdKind};
use crate::paths::{self, validate_key};
use crate::pin::live_pin_version;

/// Format of a dataset's `data` (`metadata.type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetFormat {
	Json,
	Markdown,
}

/// Where the dataset came from (`metadata.datasetType`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
	#[default]
	Workflow,
	User,
	Integration,
	Document,
	Research,
}

/// Parsed dataset body. Serializes to the stored `data` shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DatasetPayload {
	Markdown { content: String },
	Json(Value),
}

impl DatasetPayload {
	/// Parse caller input according to `format`.
	///
	/// For `json`, a string is parsed as JSON text and any other value is
	/// taken as already parsed. For `markdown`, the input must be a string
	/// (or absent, meaning empty).
	///
	/// # Errors
	/// `DbError::Validation` if the input does not match the format.
	pub fn from_input(format: DatasetFormat, input: Value) -> Result<Self> {
		match (format, input) {
			(DatasetFormat::Json, Value::String(text)) => serde_json::from_str(&text)
				.map(DatasetPayload::Json)
				.map_err(|e| DbError::Validation(format!("dataset data is not valid JSON: {e}"))),
			(DatasetFormat::Json, value) => Ok(DatasetPayload::Json(value)),
			(DatasetFormat::Markdown, Value::String(content)) => Ok(DatasetPayload::Markdown { content }),
			(DatasetFormat::Markdown, Value::Null) => Ok(DatasetPayload::Markdown {
				content: String::new(),
			}),
			(DatasetFormat::Markdown, _) => Err(DbError::Validation(
				"markdown dataset data must be a string".to_string(),
			)),
		}
	}

	pub fn format(&self) -> DatasetFormat {
		match self {
			DatasetPayload::Json(_) => DatasetFormat::Json,
			DatasetPayload::Markdown { .. } => DatasetFormat::Markdown,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetMetadata {
	pub name: String,
	#[serde(rename = "type")]
	pub format: DatasetFormat,
	#[serde(default)]
	pub dataset_type: DatasetKind,
	#[serde(default)]
	pub description: String,
	pub created_by: UserId,
	pub created_at: String,
	pub updated_at: String,
	#[serde(default = "default_status")]
	pub status: String,
}

fn default_status() -> String {
	"active".to_string()
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DatasetPermissions {
	#[serde(default)]
	pub viewers: Vec<UserId>,
	#[serde(default)]
	pub editors: Vec<UserId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
	pub id: String,
	pub metadata: DatasetMetadata,
	pub data: Value,
	#[serde(default)]
	pub permissions: DatasetPermissions,
}

impl Dataset {
	/// Typed view of `data`.
	pub fn payload(&self) -> DatasetPayload {
		match self.metadata.format {
			DatasetFormat::Json => DatasetPayload::Json(self.data.clone()),
			DatasetFormat::Markdown => {
				let content = self
					.data
					.get("content")
					.and_then(Value::as_str)
					.unwrap_or_default()
					.to_string();
				DatasetPayload::Markdown { content }
			}
		}
	}
}

#[derive(Debug, Clone)]
pub struct NewDataset {
	pub name: String,
	pub dataset_type: DatasetKind,
	pub description: String,
	pub payload: DatasetPayload,
	pub created_by: UserId,
}

#[derive(Debug, Clone, Default)]
pub struct DatasetUpdate {
	pub name: Option<String>,
	pub description: Option<String>,
	pub dataset_type: Option<DatasetKind>,
	pub payload: Option<DatasetPayload>,
	pub status: Option<String>,
}

impl DatasetUpdate {
	fn apply(&self, dataset: &mut Dataset) -> Result<()> {
		if let Some(name) = &self.name {
			dataset.metadata.name = name.clone();
		}
		if let Some(description) = &self.description {
			dataset.metadata.description = description.clone();
		}
		if let Some(kind) = self.dataset_type {
			dataset.metadata.dataset_type = kind;
		}
		if let Some(status) = &self.status {
			dataset.metadata.status = status.clone();
		}
		if let Some(payload) = &self.payload {
			dataset.metadata.format = payload.format();
			dataset.data = serde_json::to_value(payload)?;
		}
		Ok(())
	}
}

#[derive(Clone)]
pub struct DatasetRepository {
	store: Arc<dyn DocumentStore>,
}

impl DatasetRepository {
	pub fn new(store: Arc<dyn DocumentStore>) -> Self {
		Self { store }
	}

	/// Attach a dataset to an existing pin.
	///
	/// Viewers and editors start as just the creator.
	#[instrument(skip(self, new), fields(created_by = %new.created_by))]
	pub async fn create_dataset(&self, pin_id: &str, new: NewDataset) -> Result<String> {
		validate_key("pin id", pin_id)?;
		let id = new_id(self.store.as_ref(), IdKind::Dataset);
		let format = new.payload.format();
		let record = json!({
			"id": id,
			"metadata": {
				"name": new.name,
				"type": format,
				"datasetType": new.dataset_type,
				"description": new.description,
				"createdBy": new.created_by,
				"createdAt": server_timestamp(),
				"updatedAt": server_timestamp(),
				"status": default_status(),
			},
			"data": new.payload,
			"permissions": {
				"viewers": [new.created_by],
				"editors": [new.created_by],
			},
		});

		let path = paths::pin_dataset(pin_id, &id);
		let (path, record) = (&path, &record);

		retry_on_conflict(DEFAULT_CAS_ATTEMPTS, || async move {
			let pin_version = live_pin_version(self.store.as_ref(), pin_id).await?;
			self
				.store
				.update(
					WriteBatch::new()
						.set_if(path.clone(), record.clone(), Precondition::Absent)
						.check(paths::pin(pin_id), Precondition::Version(pin_version)),
				)
				.await
		})
		.await?;

		info!(pin_id = %pin_id, dataset_id = %id, "dataset created");
		Ok(id)
	}

	#[instrument(skip(self))]
	pub async fn get_dataset(&self, pin_id: &str, dataset_id: &str) -> Result<Option<Dataset>> {
		validate_key("pin id", pin_id)?;
		validate_key("dataset id", dataset_id)?;
		let path = paths::pin_dataset(pin_id, dataset_id);
		self
			.store
			.get(&path)
			.await?
			.map(|v| from_document(&path, v))
			.transpose()
	}

	/// All datasets of a pin, in creation order.
	#[instrument(skip(self))]
	pub async fn get_pin_datasets(&self, pin_id: &str) -> Result<Vec<Dataset>> {
		validate_key("pin id", pin_id)?;
		self
			.store
			.children(&paths::pin_datasets(pin_id))
			.await?
			.into_iter()
			.map(|(id, value)| from_document(&paths::pin_dataset(pin_id, &id), value))
			.collect()
	}

	/// Partial update. A new payload replaces `data` and `metadata.type`.
	#[instrument(skip(self, update))]
	pub async fn update_dataset(
		&self,
		pin_id: &str,
		dataset_id: &str,
		update: DatasetUpdate,
	) -> Result<Dataset> {
		validate_key("pin id", pin_id)?;
		validate_key("dataset id", dataset_id)?;
		let path = paths::pin_dataset(pin_id, dataset_id);
		let (path, update) = (&path, &update);

		retry_on_conflict(DEFAULT_CAS_ATTEMPTS, || async move {
			let pin_version = live_pin_version(self.store.as_ref(), pin_id).await?;
			let current = self
				.store
				.get_versioned(path)
				.await?
				.ok_or_else(|| DbError::NotFound(format!("dataset {dataset_id}")))?;

			let mut dataset: Dataset = from_document(path, current.value)?;
			update.apply(&mut dataset)?;

			let mut record = serde_json::to_value(&dataset)?;
			record["metadata"]["updatedAt"] = server_timestamp();
			self
				.store
				.update(
					WriteBatch::new()
						.set_if(path.clone(), record, Precondition::Version(current.version))
						.check(paths::pin(pin_id), Precondition::Version(pin_version)),
				)
				.await
		})
		.await?;

		info!(pin_id = %pin_id, dataset_id = %dataset_id, "dataset updated");
		self
			.get_dataset(pin_id, dataset_id)
			.await?
			.ok_or_else(|| DbError::NotFound(format!("dataset {dataset_id}")))
	}

	#[instrument(skip(self))]
	pub async fn delete_dataset(&self, pin_id: &str, dataset_id: &str) -> Result<()> {
		if self.get_dataset(pin_id, dataset_id).await?.is_none() {
			return Err(DbError::NotFound(format!("dataset {dataset_id}")));
		}
		self
			.store
			.delete(&paths::pin_dataset(pin_id, dataset_id))
			.await?;
		info!(pin_id = %pin_id, dataset_id = %dataset_id, "dataset deleted");
		Ok(())
	}
}
