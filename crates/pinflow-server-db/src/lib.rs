// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Storage layer for the pinflow server.
//!
//! Everything lives in a hierarchical, path-addressed document tree behind
//! the [`DocumentStore`] trait. The repositories in this crate are the only
//! writers of that tree and own the consistency of its secondary indices:
//!
//! ```text
//! pins/{pinId}                          user_pins/{userId}/{pinId}
//! pin_blocks/{pinId}/{blockId}          pin_datasets/{pinId}/{datasetId}
//! pin_boards/{pinboardId}               user_pinboards/{userId}/{pinboardId}
//! workflow_data/{pinId}/{workflowId}    api_keys/{userId}/{keyId}
//! users/{uid}
//! ```

pub mod api_key;
pub mod block;
pub mod dataset;
pub mod document_store;
pub mod error;
pub mod id;
pub mod paths;
pub mod pin;
pub mod pinboard;
pub mod pool;
pub mod sqlite_store;
pub mod testing;
pub mod user;
pub mod workflow_data;

pub use api_key::{ApiKeyInfo, ApiKeyRepository};
pub use block::{Block, BlockRepository, BlockType, BlockUpdate, NewBlock};
pub use dataset::{
	Dataset, DatasetFormat, DatasetKind, DatasetMetadata, DatasetPayload, DatasetPermissions,
	DatasetRepository, DatasetUpdate, NewDataset,
};
pub use document_store::{
	from_document, resolve_server_values, retry_on_conflict, server_timestamp, DocumentStore,
	Precondition, Versioned, WriteBatch, WriteOp, DEFAULT_CAS_ATTEMPTS,
};
pub use error::{DbError, Result};
pub use id::{new_id, IdKind, PushIdGenerator};
pub use pin::{
	NewPin, Pin, PinContent, PinDataType, PinIndexEntry, PinMetadata, PinPermissions,
	PinRepository, PinUpdate,
};
pub use pinboard::{NewPinboard, Pinboard, PinboardRepository, PinboardUpdate};
pub use pool::{create_pool, run_migrations};
pub use sqlite_store::SqliteDocumentStore;
pub use user::{UserProfile, UserRecord, UserRepository};
pub use workflow_data::{WorkflowDataRepository, LAST_UPDATE_FIELD};
