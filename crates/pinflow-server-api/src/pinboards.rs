// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use pinflow_server_auth::UserId;
use pinflow_server_db::{NewPinboard, Pin, Pinboard, PinboardUpdate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePinboardRequest {
	pub name: String,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub pins: Vec<String>,
	#[serde(default)]
	pub tags: Vec<String>,
	#[serde(default)]
	pub is_public: bool,
}

impl CreatePinboardRequest {
	pub fn into_new_pinboard(self, owner: UserId) -> NewPinboard {
		NewPinboard {
			user_id: owner,
			name: self.name,
			description: self.description,
			pins: self.pins,
			tags: self.tags,
			is_public: self.is_public,
		}
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePinboardRequest {
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub pins: Option<Vec<String>>,
	#[serde(default)]
	pub tags: Option<Vec<String>>,
	#[serde(default)]
	pub is_public: Option<bool>,
}

impl From<UpdatePinboardRequest> for PinboardUpdate {
	fn from(request: UpdatePinboardRequest) -> Self {
		PinboardUpdate {
			name: request.name,
			description: request.description,
			pins: request.pins,
			tags: request.tags,
			is_public: request.is_public,
		}
	}
}

/// Body of `POST /api/pinboards/{id}/pins`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddPinRequest {
	#[serde(alias = "pinId")]
	pub pin_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListPinboardsResponse {
	pub pinboards: Vec<Pinboard>,
}

/// A pinboard with its pins expanded.
///
/// Only pins the caller may read are included; ids of deleted pins are skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicPinboardResponse {
	pub pinboard: Pinboard,
	pub pins: Vec<Pin>,
}
