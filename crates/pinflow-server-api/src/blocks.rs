// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use pinflow_server_db::{Block, BlockType, BlockUpdate, NewBlock};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBlockRequest {
	pub name: String,
	#[serde(rename = "type")]
	pub block_type: BlockType,
	#[serde(default)]
	pub template: Option<String>,
	/// Defaults to 0.
	#[serde(default)]
	pub order: Option<i64>,
}

impl From<CreateBlockRequest> for NewBlock {
	fn from(request: CreateBlockRequest) -> Self {
		NewBlock {
			name: request.name,
			block_type: request.block_type,
			template: request.template.unwrap_or_default(),
			order: request.order,
		}
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBlockRequest {
	#[serde(default)]
	pub name: Option<String>,
	#[serde(rename = "type", default)]
	pub block_type: Option<BlockType>,
	#[serde(default)]
	pub template: Option<String>,
	#[serde(default)]
	pub order: Option<i64>,
}

impl From<UpdateBlockRequest> for BlockUpdate {
	fn from(request: UpdateBlockRequest) -> Self {
		BlockUpdate {
			name: request.name,
			block_type: request.block_type,
			template: request.template,
			order: request.order,
		}
	}
}

/// Blocks of a pin, ascending by `order`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListBlocksResponse {
	pub blocks: Vec<Block>,
}
