// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory stores for tests.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::document_store::{DocumentStore, Versioned, WriteBatch};
use crate::error::Result;
use crate::pin::PinRepository;
use crate::pool::run_migrations;
use crate::sqlite_store::SqliteDocumentStore;

/// A migrated in-memory pool.
///
/// Pinned to a single connection that never expires, since every SQLite
/// connection to `:memory:` opens its own database.
pub async fn create_test_pool() -> Result<SqlitePool> {
	let pool = SqlitePoolOptions::new()
		.max_connections(1)
		.idle_timeout(None)
		.max_lifetime(None)
		.connect("sqlite::memory:")
		.await?;
	run_migrations(&pool).await?;
	Ok(pool)
}

pub async fn create_test_store() -> Result<Arc<SqliteDocumentStore>> {
	Ok(Arc::new(SqliteDocumentStore::new(create_test_pool().await?)))
}

/// Store wrapper that deletes a pin right before the next batch lands.
///
/// Reads pass straight through, so a repository sees the pin alive when it
/// reads and gone when it writes.
pub struct DeletePinBeforeNextWrite {
	inner: Arc<dyn DocumentStore>,
	pin_id: String,
	armed: AtomicBool,
}

impl DeletePinBeforeNextWrite {
	pub fn new(inner: Arc<dyn DocumentStore>, pin_id: impl Into<String>) -> Self {
		Self {
			inner,
			pin_id: pin_id.into(),
			armed: AtomicBool::new(true),
		}
	}
}

#[async_trait]
impl DocumentStore for DeletePinBeforeNextWrite {
	async fn get_versioned(&self, path: &str) -> Result<Option<Versioned<Value>>> {
		self.inner.get_versioned(path).await
	}

	async fn children(&self, path: &str) -> Result<Vec<(String, Value)>> {
		self.inner.children(path).await
	}

	async fn descendants(&self, path: &str) -> Result<Vec<(String, Value)>> {
		self.inner.descendants(path).await
	}

	async fn update(&self, batch: WriteBatch) -> Result<()> {
		if self.armed.swap(false, Ordering::SeqCst) {
			PinRepository::new(self.inner.clone())
				.delete_pin(&self.pin_id)
				.await?;
		}
		self.inner.update(batch).await
	}

	fn generate_key(&self) -> String {
		self.inner.generate_key()
	}
}
