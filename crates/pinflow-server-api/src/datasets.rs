// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use pinflow_server_auth::UserId;
use pinflow_server_db::{
	Dataset, DatasetFormat, DatasetKind, DatasetPayload, DatasetUpdate, DbError, NewDataset,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /api/pins/{pid}/datasets`.
///
/// For `type = json`, `data` may be a JSON string (parsed on create) or an
/// already structured value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDatasetRequest {
	pub name: String,
	#[serde(rename = "type")]
	pub format: DatasetFormat,
	#[serde(default)]
	pub dataset_type: Option<DatasetKind>,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub data: Value,
}

impl CreateDatasetRequest {
	pub fn into_new_dataset(self, created_by: UserId) -> Result<NewDataset, DbError> {
		let payload = DatasetPayload::from_input(self.format, self.data)?;
		Ok(NewDataset {
			name: self.name,
			dataset_type: self.dataset_type.unwrap_or_default(),
			description: self.description.unwrap_or_default(),
			payload,
			created_by,
		})
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDatasetRequest {
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub dataset_type: Option<DatasetKind>,
	#[serde(default)]
	pub status: Option<String>,
	/// Required together with `data`.
	#[serde(rename = "type", default)]
	pub format: Option<DatasetFormat>,
	#[serde(default)]
	pub data: Option<Value>,
}

impl UpdateDatasetRequest {
	/// `current` is the stored format, used when only `data` is supplied.
	pub fn into_update(self, current: DatasetFormat) -> Result<DatasetUpdate, DbError> {
		let payload = match (self.format, self.data) {
			(None, None) => None,
			(format, data) => Some(DatasetPayload::from_input(
				format.unwrap_or(current),
				data.unwrap_or(Value::Null),
			)?),
		};
		Ok(DatasetUpdate {
			name: self.name,
			description: self.description,
			dataset_type: self.dataset_type,
			payload,
			status: self.status,
		})
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListDatasetsResponse {
	pub datasets: Vec<Dataset>,
}
