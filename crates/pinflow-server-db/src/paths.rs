// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Path layout of the document tree.
//!
//! Every id that ends up in a path goes through [`validate_key`] first, so a
//! caller-supplied id can never address a different branch of the tree.

use crate::error::DbError;

pub const PINS: &str = "pins";
pub const USER_PINS: &str = "user_pins";
pub const PIN_BLOCKS: &str = "pin_blocks";
pub const PIN_DATASETS: &str = "pin_datasets";
pub const PINBOARDS: &str = "pin_boards";
pub const USER_PINBOARDS: &str = "user_pinboards";
pub const WORKFLOW_DATA: &str = "workflow_data";
pub const API_KEYS: &str = "api_keys";
pub const USERS: &str = "users";

/// Longest path the store accepts, in bytes.
pub const MAX_PATH_BYTES: usize = 768;

const FORBIDDEN: [char; 6] = ['/', '.', '#', '$', '[', ']'];

/// Check a single path segment.
///
/// `what` names the segment in the error message (`"pin id"`, `"user id"`, ...).
pub fn validate_key(what: &str, key: &str) -> Result<(), DbError> {
	if key.is_empty() {
		return Err(DbError::Validation(format!("{what} must not be empty")));
	}
	if key.len() > MAX_PATH_BYTES {
		return Err(DbError::Validation(format!("{what} is too long")));
	}
	if key.chars().any(|c| FORBIDDEN.contains(&c) || c.is_control()) {
		return Err(DbError::Validation(format!(
			"{what} contains a forbidden character"
		)));
	}
	Ok(())
}

/// Check a full slash-separated path.
pub fn validate_path(path: &str) -> Result<(), DbError> {
	if path.len() > MAX_PATH_BYTES {
		return Err(DbError::Validation("path is too long".to_string()));
	}
	for segment in path.split('/') {
		validate_key("path segment", segment)?;
	}
	Ok(())
}

/// Parent of a path (`""` for top-level documents).
pub fn parent_of(path: &str) -> &str {
	path.rsplit_once('/').map(|(parent, _)| parent).unwrap_or("")
}

/// Last segment of a path.
pub fn key_of(path: &str) -> &str {
	path.rsplit_once('/').map(|(_, key)| key).unwrap_or(path)
}

pub fn pin(pin_id: &str) -> String {
	format!("{PINS}/{pin_id}")
}

pub fn user_pins(user_id: &str) -> String {
	format!("{USER_PINS}/{user_id}")
}

pub fn user_pin(user_id: &str, pin_id: &str) -> String {
	format!("{USER_PINS}/{user_id}/{pin_id}")
}

pub fn pin_blocks(pin_id: &str) -> String {
	format!("{PIN_BLOCKS}/{pin_id}")
}

pub fn pin_block(pin_id: &str, block_id: &str) -> String {
	format!("{PIN_BLOCKS}/{pin_id}/{block_id}")
}

pub fn pin_datasets(pin_id: &str) -> String {
	format!("{PIN_DATASETS}/{pin_id}")
}

pub fn pin_dataset(pin_id: &str, dataset_id: &str) -> String {
	format!("{PIN_DATASETS}/{pin_id}/{dataset_id}")
}

pub fn pinboard(pinboard_id: &str) -> String {
	format!("{PINBOARDS}/{pinboard_id}")
}

pub fn user_pinboards(user_id: &str) -> String {
	format!("{USER_PINBOARDS}/{user_id}")
}

pub fn user_pinboard(user_id: &str, pinboard_id: &str) -> String {
	format!("{USER_PINBOARDS}/{user_id}/{pinboard_id}")
}

pub fn workflow_data(pin_id: &str) -> String {
	format!("{WORKFLOW_DATA}/{pin_id}")
}

pub fn workflow_entry(pin_id: &str, workflow_id: &str) -> String {
	format!("{WORKFLOW_DATA}/{pin_id}/{workflow_id}")
}

pub fn user_api_keys(user_id: &str) -> String {
	format!("{API_KEYS}/{user_id}")
}

pub fn api_key(user_id: &str, key_id: &str) -> String {
	format!("{API_KEYS}/{user_id}/{key_id}")
}

pub fn user(uid: &str) -> String {
	format!("{USERS}/{uid}")
}
