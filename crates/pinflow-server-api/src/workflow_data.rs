// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One workflow payload, including the server-stamped `last_update`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDataResponse {
	pub pin_id: String,
	pub workflow_id: String,
	pub data: Value,
}

/// Every workflow payload of a pin, keyed by workflow id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDataListResponse {
	pub pin_id: String,
	pub workflows: Map<String, Value>,
}
