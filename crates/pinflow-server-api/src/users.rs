// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use pinflow_server_db::UserProfile;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/users`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertUserRequest {
	pub uid: String,
	pub email: String,
	#[serde(default)]
	pub display_name: Option<String>,
	#[serde(rename = "photoURL", default)]
	pub photo_url: Option<String>,
	#[serde(default)]
	pub email_verified: bool,
}

impl From<UpsertUserRequest> for UserProfile {
	fn from(request: UpsertUserRequest) -> Self {
		UserProfile {
			uid: request.uid,
			email: request.email,
			display_name: request.display_name,
			photo_url: request.photo_url,
			email_verified: request.email_verified,
		}
	}
}
