// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! API key generation and hashing.
//!
//! Keys look like `key_<32 alphanumeric chars>`. Only the salted hash
//! `hex(SHA-256(key ‖ salt))` is ever stored.

use rand::distributions::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Prefix of every API key handed to users.
pub const API_KEY_PREFIX: &str = "key_";

const API_KEY_RANDOM_LEN: usize = 32;

/// Generate a fresh plaintext API key.
pub fn generate_api_key() -> String {
	let random: String = rand::thread_rng()
		.sample_iter(&Alphanumeric)
		.take(API_KEY_RANDOM_LEN)
		.map(char::from)
		.collect();
	format!("{API_KEY_PREFIX}{random}")
}

/// Hash a plaintext key with the server-side salt.
pub fn hash_api_key(key: &str, salt: &str) -> String {
	let mut hasher = Sha256::new();
	hasher.update(key.as_bytes());
	hasher.update(salt.as_bytes());
	hex::encode(hasher.finalize())
}
