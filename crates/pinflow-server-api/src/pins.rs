// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use pinflow_server_auth::UserId;
use pinflow_server_db::{Block, Dataset, DbError, NewPin, Pin, PinContent, PinDataType, PinUpdate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_PAGE_LIMIT: usize = 20;
pub const MAX_PAGE_LIMIT: usize = 100;

/// Body of `POST /api/pins/send`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SendPinRequest {
	/// Defaults to `markdown`.
	#[serde(default)]
	pub data_type: Option<PinDataType>,
	#[serde(default)]
	pub content: Value,
	#[serde(default)]
	pub title: Option<String>,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub tags: Vec<String>,
	#[serde(default)]
	pub workflow_sources: Vec<String>,
	/// Workflow id of the sender.
	#[serde(default)]
	pub wid: Option<String>,
	#[serde(default)]
	pub is_public: bool,
	/// Alternative to the `Authorization: ApiKey` header.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub api_key: Option<String>,
}

impl SendPinRequest {
	/// Build the repository input for `owner`.
	///
	/// # Errors
	/// `DbError::Validation` if the content does not fit the data type.
	pub fn into_new_pin(self, owner: UserId) -> Result<NewPin, DbError> {
		let data_type = self.data_type.unwrap_or(PinDataType::Markdown);
		let content = PinContent::from_parts(data_type, self.content)?;
		let title = self
			.title
			.filter(|t| !t.trim().is_empty())
			.unwrap_or_else(|| "Untitled".to_string());

		Ok(NewPin {
			user_id: owner,
			wid: self.wid,
			content,
			title,
			description: self.description,
			tags: self.tags,
			workflow_sources: self.workflow_sources,
			is_public: self.is_public,
		})
	}
}

/// Body of `PUT /api/pins/{pid}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePinRequest {
	#[serde(default)]
	pub title: Option<String>,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub tags: Option<Vec<String>>,
	#[serde(default)]
	pub workflow_sources: Option<Vec<String>>,
	#[serde(default)]
	pub data_type: Option<PinDataType>,
	#[serde(default)]
	pub content: Option<Value>,
}

impl UpdatePinRequest {
	/// `current` is the data type used when only `content` is supplied.
	pub fn into_update(self, current: PinDataType) -> Result<PinUpdate, DbError> {
		let content = match (self.data_type, self.content) {
			(None, None) => None,
			(data_type, content) => Some(PinContent::from_parts(
				data_type.unwrap_or(current),
				content.unwrap_or(Value::Null),
			)?),
		};

		Ok(PinUpdate {
			title: self.title,
			description: self.description,
			tags: self.tags,
			workflow_sources: self.workflow_sources,
			content,
		})
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListPinsQuery {
	#[serde(default)]
	pub limit: Option<usize>,
	#[serde(default)]
	pub offset: Option<usize>,
}

impl ListPinsQuery {
	/// Effective `(limit, offset)`: limit defaults to 20 and is clamped to 1..=100.
	pub fn resolve(&self) -> (usize, usize) {
		let limit = self
			.limit
			.unwrap_or(DEFAULT_PAGE_LIMIT)
			.clamp(1, MAX_PAGE_LIMIT);
		(limit, self.offset.unwrap_or(0))
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListPinsResponse {
	pub pins: Vec<Pin>,
	pub total: usize,
	pub limit: usize,
	pub offset: usize,
}

impl ListPinsResponse {
	/// Slice one page out of the caller's full, already sorted pin list.
	pub fn page(all: Vec<Pin>, query: &ListPinsQuery) -> Self {
		let (limit, offset) = query.resolve();
		let total = all.len();
		let pins = all.into_iter().skip(offset).take(limit).collect();
		Self {
			pins,
			total,
			limit,
			offset,
		}
	}
}

/// A pin with its blocks (in display order) and datasets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinDetailResponse {
	pub pin: Pin,
	pub blocks: Vec<Block>,
	pub datasets: Vec<Dataset>,
}
