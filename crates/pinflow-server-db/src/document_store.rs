// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Path-addressed document store abstraction.
//!
//! A document is a JSON value stored at a slash-separated path. The store has
//! no joins and no cross-path transactions except [`DocumentStore::update`],
//! which applies a [`WriteBatch`] atomically: every operation commits or
//! none does, including when the calling future is dropped mid-flight.
//!
//! Every document carries a version that increases on each write. Writes can
//! be conditioned on that version ([`Precondition`]), which is how
//! read-modify-write sequences avoid lost updates.
//!
//! Values may contain the server timestamp placeholder returned by
//! [`server_timestamp`]. The store replaces it with its own clock (RFC 3339,
//! UTC) when the write is applied, so writers never disagree about time.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::future::Future;

use crate::error::{DbError, Result};

/// Attempts made by [`retry_on_conflict`] callers that don't pick their own bound.
pub const DEFAULT_CAS_ATTEMPTS: u32 = 8;

/// Placeholder resolved to the store's clock at write time.
pub fn server_timestamp() -> Value {
	json!({ ".sv": "timestamp" })
}

fn is_server_timestamp(value: &Value) -> bool {
	value
		.as_object()
		.map(|m| m.len() == 1 && m.get(".sv").and_then(Value::as_str) == Some("timestamp"))
		.unwrap_or(false)
}

/// Replace every server timestamp placeholder in `value` with `now`.
pub fn resolve_server_values(value: &mut Value, now: &str) {
	if is_server_timestamp(value) {
		*value = Value::String(now.to_string());
		return;
	}
	match value {
		Value::Object(map) => {
			for v in map.values_mut() {
				resolve_server_values(v, now);
			}
		}
		Value::Array(items) => {
			for v in items.iter_mut() {
				resolve_server_values(v, now);
			}
		}
		_ => {}
	}
}

/// A value together with the version it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
	pub value: T,
	pub version: u64,
}

/// Condition a write must satisfy to be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
	/// Unconditional write.
	Any,
	/// The document must not exist yet.
	Absent,
	/// The document must still be at this version.
	Version(u64),
}

impl Precondition {
	/// `None` means the document was absent when read.
	pub fn from_version(version: Option<u64>) -> Self {
		match version {
			Some(v) => Precondition::Version(v),
			None => Precondition::Absent,
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
	Set {
		path: String,
		value: Value,
		precondition: Precondition,
	},
	/// Remove the document at `path` and everything below it.
	Delete { path: String },
	/// Write nothing, but abort the batch unless `path` satisfies `precondition`.
	Check {
		path: String,
		precondition: Precondition,
	},
}

impl WriteOp {
	pub fn path(&self) -> &str {
		match self {
			WriteOp::Set { path, .. } | WriteOp::Delete { path } | WriteOp::Check { path, .. } => path,
		}
	}
}

/// An ordered set of writes applied atomically by [`DocumentStore::update`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
	ops: Vec<WriteOp>,
}

impl WriteBatch {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(mut self, op: WriteOp) -> Self {
		self.ops.push(op);
		self
	}

	pub fn set(self, path: impl Into<String>, value: Value) -> Self {
		self.push(WriteOp::Set {
			path: path.into(),
			value,
			precondition: Precondition::Any,
		})
	}

	pub fn set_if(self, path: impl Into<String>, value: Value, precondition: Precondition) -> Self {
		self.push(WriteOp::Set {
			path: path.into(),
			value,
			precondition,
		})
	}

	pub fn delete(self, path: impl Into<String>) -> Self {
		self.push(WriteOp::Delete { path: path.into() })
	}

	/// Guard the batch on a document it does not write.
	pub fn check(self, path: impl Into<String>, precondition: Precondition) -> Self {
		self.push(WriteOp::Check {
			path: path.into(),
			precondition,
		})
	}

	pub fn is_empty(&self) -> bool {
		self.ops.is_empty()
	}

	pub fn len(&self) -> usize {
		self.ops.len()
	}

	pub fn ops(&self) -> &[WriteOp] {
		&self.ops
	}

	pub fn into_ops(self) -> Vec<WriteOp> {
		self.ops
	}
}

/// Hierarchical document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
	/// Read a document with its version. `None` if absent.
	async fn get_versioned(&self, path: &str) -> Result<Option<Versioned<Value>>>;

	/// Direct children of `path` as `(key, value)`, ordered by key.
	async fn children(&self, path: &str) -> Result<Vec<(String, Value)>>;

	/// Every document below `path` as `(full path, value)`, ordered by path.
	async fn descendants(&self, path: &str) -> Result<Vec<(String, Value)>>;

	/// Apply all writes in `batch` atomically.
	///
	/// A failed precondition aborts the whole batch with [`DbError::Conflict`].
	async fn update(&self, batch: WriteBatch) -> Result<()>;

	/// A new unique, time-ordered key.
	fn generate_key(&self) -> String;

	async fn get(&self, path: &str) -> Result<Option<Value>> {
		Ok(self.get_versioned(path).await?.map(|v| v.value))
	}

	async fn set(&self, path: &str, value: Value) -> Result<()> {
		self.update(WriteBatch::new().set(path, value)).await
	}

	async fn delete(&self, path: &str) -> Result<()> {
		self.update(WriteBatch::new().delete(path)).await
	}

	/// Write `value` only if the document is still at `expected_version`
	/// (`None`: only if it does not exist).
	async fn compare_and_set(
		&self,
		path: &str,
		expected_version: Option<u64>,
		value: Value,
	) -> Result<()> {
		self
			.update(WriteBatch::new().set_if(path, value, Precondition::from_version(expected_version)))
			.await
	}
}

/// Deserialize a stored document, treating shape mismatches as corruption.
pub fn from_document<T: DeserializeOwned>(path: &str, value: Value) -> Result<T> {
	serde_json::from_value(value)
		.map_err(|e| DbError::Internal(format!("corrupt document at {path}: {e}")))
}

/// Run `op` until it succeeds, fails with something other than a conflict,
/// or `attempts` runs out.
pub async fn retry_on_conflict<T, F, Fut>(attempts: u32, mut op: F) -> Result<T>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<T>>,
{
	let mut attempt = 0;
	loop {
		attempt += 1;
		match op().await {
			Err(e) if e.is_conflict() && attempt < attempts => {
				tracing::debug!(attempt, error = %e, "write conflict, retrying");
				tokio::task::yield_now().await;
			}
			other => return other,
		}
	}
}
