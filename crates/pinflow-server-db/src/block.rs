// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Block repository.
//!
//! Blocks live under `pin_blocks/{pinId}/{blockId}` and have no owner of
//! their own: access follows the parent pin.

use serde::{Deserialize, Serialize};
use serde_json::json;
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockType {
	Markdown,
	Mermaid,
	Conditional,
	Image,
	ImageSteps,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
	pub id: String,
	pub name: String,
	#[serde(rename = "type")]
	pub block_type: BlockType,
	#[serde(default)]
	pub template: String,
	/// Display position. Missing values sort as 0.
	#[serde(default)]
	pub order: i64,
	pub created_at: String,
	pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct NewBlock {
	pub name: String,
	pub block_type: BlockType,
	pub template: String,
	pub order: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct BlockUpdate {
	pub name: Option<String>,
	pub block_type: Option<BlockType>,
	pub template: Option<String>,
	pub order: Option<i64>,
}

impl BlockUpdate {
	fn apply(&self, block: &mut Block) {
		if let Some(name) = &self.name {
			block.name = name.clone();
		}
		if let Some(block_type) = self.block_type {
			block.block_type = block_type;
		}
		if let Some(template) = &self.template {
			block.template = template.clone();
		}
		if let Some(order) = self.order {
			block.order = order;
		}
	}
}

/// Sort blocks by `order`, keeping store order (block id) for ties.
pub fn sort_blocks(blocks: &mut [Block]) {
	blocks.sort_by_key(|b| b.order);
}

#[derive(Clone)]
pub struct BlockRepository {
	store: Arc<dyn DocumentStore>,
}

impl BlockRepository {
	pub fn new(store: Arc<dyn DocumentStore>) -> Self {
		Self { store }
	}

	/// Create a block under an existing pin.
	///
	/// # Errors
	/// `DbError::NotFound` if the parent pin does not exist or is deleted
	/// before the block is written.
	#[instrument(skip(self, new))]
	pub async fn create_block(&self, pin_id: &str, new: NewBlock) -> Result<String> {
		validate_key("pin id", pin_id)?;
		let id = new_id(self.store.as_ref(), IdKind::Block);
		let record = json!({
			"id": id,
			"name": new.name,
			"type": new.block_type,
			"template": new.template,
			"order": new.order.unwrap_or(0),
			"created_at": server_timestamp(),
			"updated_at": server_timestamp(),
		});
		let path = paths::pin_block(pin_id, &id);
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

		info!(pin_id = %pin_id, block_id = %id, "block created");
		Ok(id)
	}

	#[instrument(skip(self))]
	pub async fn get_block(&self, pin_id: &str, block_id: &str) -> Result<Option<Block>> {
		validate_key("pin id", pin_id)?;
		validate_key("block id", block_id)?;
		let path = paths::pin_block(pin_id, block_id);
		self
			.store
			.get(&path)
			.await?
			.map(|v| from_document(&path, v))
			.transpose()
	}

	/// All blocks of a pin, ascending by `order`.
	#[instrument(skip(self))]
	pub async fn get_pin_blocks(&self, pin_id: &str) -> Result<Vec<Block>> {
		validate_key("pin id", pin_id)?;
		let mut blocks = self
			.store
			.children(&paths::pin_blocks(pin_id))
			.await?
			.into_iter()
			.map(|(block_id, value)| from_document(&paths::pin_block(pin_id, &block_id), value))
			.collect::<Result<Vec<Block>>>()?;

		sort_blocks(&mut blocks);
		Ok(blocks)
	}

	/// Partial update, retried until neither the block nor its pin changed
	/// between read and write.
	#[instrument(skip(self, update))]
	pub async fn update_block(
		&self,
		pin_id: &str,
		block_id: &str,
		update: BlockUpdate,
	) -> Result<Block> {
		validate_key("pin id", pin_id)?;
		validate_key("block id", block_id)?;
		let path = paths::pin_block(pin_id, block_id);
		let (path, update) = (&path, &update);

		retry_on_conflict(DEFAULT_CAS_ATTEMPTS, || async move {
			let pin_version = live_pin_version(self.store.as_ref(), pin_id).await?;
			let current = self
				.store
				.get_versioned(path)
				.await?
				.ok_or_else(|| DbError::NotFound(format!("block {block_id}")))?;

			let mut block: Block = from_document(path, current.value)?;
			update.apply(&mut block);

			let mut record = serde_json::to_value(&block)?;
			record["updated_at"] = server_timestamp();
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

		info!(pin_id = %pin_id, block_id = %block_id, "block updated");
		self
			.get_block(pin_id, block_id)
			.await?
			.ok_or_else(|| DbError::NotFound(format!("block {block_id}")))
	}

	#[instrument(skip(self))]
	pub async fn delete_block(&self, pin_id: &str, block_id: &str) -> Result<()> {
		if self.get_block(pin_id, block_id).await?.is_none() {
			return Err(DbError::NotFound(format!("block {block_id}")));
		}
		self.store.delete(&paths::pin_block(pin_id, block_id)).await?;
		info!(pin_id = %pin_id, block_id = %block_id, "block deleted");
		Ok(())
	}
}
