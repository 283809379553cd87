// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Live workflow payloads at `workflow_data/{pinId}/{workflowId}`.
//!
//! Last writer wins: `put` replaces the whole payload and stamps
//! `last_update` with the store clock. A payload is only written while its
//! pin exists.

use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::document_store::{
	retry_on_conflict, server_timestamp, DocumentStore, Precondition, WriteBatch,
	DEFAULT_CAS_ATTEMPTS,
};
use crate::error::{DbError, Result};
use crate::paths::{self, validate_key};
use crate::pin::live_pin_version;

/// Field stamped on every stored payload.
pub const LAST_UPDATE_FIELD: &str = "last_update";

#[derive(Clone)]
pub struct WorkflowDataRepository {
	store: Arc<dyn DocumentStore>,
}

impl WorkflowDataRepository {
	pub fn new(store: Arc<dyn DocumentStore>) -> Self {
		Self { store }
	}

	/// Overwrite the payload for `(pin_id, workflow_id)`.
	///
	/// # Errors
	/// `DbError::Validation` if `payload` is not a JSON object.
	/// `DbError::NotFound` if the pin does not exist.
	#[instrument(skip(self, payload))]
	pub async fn put(&self, pin_id: &str, workflow_id: &str, payload: Value) -> Result<()> {
		validate_key("pin id", pin_id)?;
		validate_key("workflow id", workflow_id)?;
		let Value::Object(mut fields) = payload else {
			return Err(DbError::Validation(
				"workflow data must be a JSON object".to_string(),
			));
		};
		fields.insert(LAST_UPDATE_FIELD.to_string(), server_timestamp());

		let path = paths::workflow_entry(pin_id, workflow_id);
		let record = Value::Object(fields);
		let (path, record) = (&path, &record);

		retry_on_conflict(DEFAULT_CAS_ATTEMPTS, || async move {
			let pin_version = live_pin_version(self.store.as_ref(), pin_id).await?;
			self
				.store
				.update(
					WriteBatch::new()
						.set(path.clone(), record.clone())
						.check(paths::pin(pin_id), Precondition::Version(pin_version)),
				)
				.await
		})
		.await?;
		info!(pin_id = %pin_id, workflow_id = %workflow_id, "workflow data stored");
		Ok(())
	}

	#[instrument(skip(self))]
	pub async fn get(&self, pin_id: &str, workflow_id: &str) -> Result<Option<Value>> {
		validate_key("pin id", pin_id)?;
		validate_key("workflow id", workflow_id)?;
		self.store.get(&paths::workflow_entry(pin_id, workflow_id)).await
	}

	/// Every workflow payload of a pin, keyed by workflow id.
	#[instrument(skip(self))]
	pub async fn get_all(&self, pin_id: &str) -> Result<Map<String, Value>> {
		validate_key("pin id", pin_id)?;
		let entries = self.store.children(&paths::workflow_data(pin_id)).await?;
		debug!(count = entries.len(), "loaded workflow data");
		Ok(entries.into_iter().collect())
	}
}
