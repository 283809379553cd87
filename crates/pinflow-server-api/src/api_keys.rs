// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use pinflow_server_db::ApiKeyInfo;
use serde::{Deserialize, Serialize};

/// Request to create a new API key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateApiKeyRequest {
	/// Human-readable name for the key.
	pub name: String,
	/// Permission strings, e.g. `pins:read`. Unknown strings are rejected.
	pub permissions: Vec<String>,
}

/// Response containing the created API key.
///
/// The plaintext `key` is only returned here; it cannot be retrieved later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateApiKeyResponse {
	pub id: String,
	pub key: String,
	pub name: String,
	pub permissions: Vec<String>,
}

/// The caller's keys, without hashes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListApiKeysResponse {
	pub api_keys: Vec<ApiKeyInfo>,
}
