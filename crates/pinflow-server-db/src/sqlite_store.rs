// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQLite-backed [`DocumentStore`].
//!
//! One row per document in the `documents` table. Subtrees are addressed by
//! key range: everything strictly below `a/b` sorts in `["a/b/", "a/b0")`
//! because `'0'` is the byte after `'/'`.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use sqlx::sqlite::SqlitePool;

use crate::document_store::{
	resolve_server_values, DocumentStore, Precondition, Versioned, WriteBatch, WriteOp,
};
use crate::error::{DbError, Result};
use crate::id::PushIdGenerator;
use crate::paths::{key_of, parent_of, validate_path};

/// Document store persisted in a single SQLite table.
#[derive(Debug)]
pub struct SqliteDocumentStore {
	pool: SqlitePool,
	keys: PushIdGenerator,
}

impl SqliteDocumentStore {
	/// Create a store over an already-migrated pool.
	///
	/// # Arguments
	/// * `pool` - SQLite connection pool (see [`crate::run_migrations`])
	pub fn new(pool: SqlitePool) -> Self {
		Self {
			pool,
			keys: PushIdGenerator::new(),
		}
	}

	pub fn pool(&self) -> &SqlitePool {
		&self.pool
	}
}

fn subtree_bounds(path: &str) -> (String, String) {
	(format!("{path}/"), format!("{path}0"))
}

fn parse_value(path: &str, text: &str) -> Result<Value> {
	serde_json::from_str(text)
		.map_err(|e| DbError::Internal(format!("stored value at {path} is not JSON: {e}")))
}

fn now_rfc3339() -> String {
	Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
	#[tracing::instrument(skip(self))]
	async fn get_versioned(&self, path: &str) -> Result<Option<Versioned<Value>>> {
		validate_path(path)?;

		let row: Option<(String, i64)> =
			sqlx::query_as("SELECT value, version FROM documents WHERE path = ?")
				.bind(path)
				.fetch_optional(&self.pool)
				.await?;

		match row {
			Some((text, version)) => Ok(Some(Versioned {
				value: parse_value(path, &text)?,
				version: version as u64,
			})),
			None => Ok(None),
		}
	}

	#[tracing::instrument(skip(self))]
	async fn children(&self, path: &str) -> Result<Vec<(String, Value)>> {
		validate_path(path)?;

		let rows: Vec<(String, String)> =
			sqlx::query_as("SELECT path, value FROM documents WHERE parent = ? ORDER BY path")
				.bind(path)
				.fetch_all(&self.pool)
				.await?;

		rows
			.into_iter()
			.map(|(child, text)| Ok((key_of(&child).to_string(), parse_value(&child, &text)?)))
			.collect()
	}

	#[tracing::instrument(skip(self))]
	async fn descendants(&self, path: &str) -> Result<Vec<(String, Value)>> {
		validate_path(path)?;
		let (lower, upper) = subtree_bounds(path);

		let rows: Vec<(String, String)> = sqlx::query_as(
			"SELECT path, value FROM documents WHERE path >= ? AND path < ? ORDER BY path",
		)
		.bind(&lower)
		.bind(&upper)
		.fetch_all(&self.pool)
		.await?;

		rows
			.into_iter()
			.map(|(child, text)| {
				let value = parse_value(&child, &text)?;
				Ok((child, value))
			})
			.collect()
	}

	#[tracing::instrument(skip(self, batch), fields(ops = batch.len()))]
	async fn update(&self, batch: WriteBatch) -> Result<()> {
		if batch.is_empty() {
			return Ok(());
		}
		for op in batch.ops() {
			validate_path(op.path())?;
		}

		let now = now_rfc3339();
		// Dropping `tx` before commit rolls every statement back.
		let mut tx = self.pool.begin().await?;

		for op in batch.into_ops() {
			match op {
				WriteOp::Set {
					path,
					mut value,
					precondition,
				} => {
					resolve_server_values(&mut value, &now);
					let text = serde_json::to_string(&value)?;
					let parent = parent_of(&path);

					match precondition {
						Precondition::Any => {
							sqlx::query(
								r#"
								INSERT INTO documents (path, parent, value, version, updated_at)
								VALUES (?, ?, ?, 1, ?)
								ON CONFLICT(path) DO UPDATE SET
									value = excluded.value,
									version = documents.version + 1,
									updated_at = excluded.updated_at
								"#,
							)
							.bind(&path)
							.bind(parent)
							.bind(&text)
							.bind(&now)
							.execute(&mut *tx)
							.await?;
						}
						Precondition::Absent => {
							let result = sqlx::query(
								r#"
								INSERT INTO documents (path, parent, value, version, updated_at)
								VALUES (?, ?, ?, 1, ?)
								ON CONFLICT(path) DO NOTHING
								"#,
							)
							.bind(&path)
							.bind(parent)
							.bind(&text)
							.bind(&now)
							.execute(&mut *tx)
							.await?;

							if result.rows_affected() == 0 {
								return Err(DbError::Conflict(format!("{path} already exists")));
							}
						}
						Precondition::Version(expected) => {
							let result = sqlx::query(
								r#"
								UPDATE documents
								SET value = ?, version = version + 1, updated_at = ?
								WHERE path = ? AND version = ?
								"#,
							)
							.bind(&text)
							.bind(&now)
							.bind(&path)
							.bind(expected as i64)
							.execute(&mut *tx)
							.await?;

							if result.rows_affected() == 0 {
								return Err(DbError::Conflict(format!(
									"{path} changed since version {expected}"
								)));
							}
						}
					}
				}
				WriteOp::Delete { path } => {
					let (lower, upper) = subtree_bounds(&path);
					sqlx::query("DELETE FROM documents WHERE path = ? OR (path >= ? AND path < ?)")
						.bind(&path)
						.bind(&lower)
						.bind(&upper)
						.execute(&mut *tx)
						.await?;
				}
				WriteOp::Check { path, precondition } => {
					let version: Option<i64> =
						sqlx::query_scalar("SELECT version FROM documents WHERE path = ?")
							.bind(&path)
							.fetch_optional(&mut *tx)
							.await?;

					match (precondition, version) {
						(Precondition::Any, Some(_)) | (Precondition::Absent, None) => {}
						(Precondition::Version(expected), Some(found)) if found as u64 == expected => {}
						(Precondition::Any, None) | (Precondition::Version(_), None) => {
							return Err(DbError::Conflict(format!("{path} no longer exists")));
						}
						(_, Some(found)) => {
							return Err(DbError::Conflict(format!(
								"{path} is at version {found}, expected {precondition:?}"
							)));
						}
					}
				}
			}
		}

		tx.commit().await?;
		Ok(())
	}

	fn generate_key(&self) -> String {
		self.keys.next_key()
	}
}
