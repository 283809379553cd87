// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identifier generation.
//!
//! Stores hand out push keys: 8 characters of millisecond timestamp followed
//! by 12 random characters, all from a 64-character URL-safe alphabet whose
//! byte order matches its numeric order. Keys generated later sort later,
//! and keys generated within the same millisecond are strictly increasing.
//!
//! Entity ids are a type prefix plus a store key (`p`, `b`, `d`, `pb`).

use chrono::Utc;
use rand::Rng;
use std::sync::Mutex;

use crate::document_store::DocumentStore;

const PUSH_CHARS: &[u8; 64] = b"-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

const TIME_CHARS: usize = 8;
const RANDOM_CHARS: usize = 12;

/// Length of every push key.
pub const PUSH_KEY_LEN: usize = TIME_CHARS + RANDOM_CHARS;

#[derive(Debug, Default)]
struct PushState {
	last_millis: i64,
	last_random: [u8; RANDOM_CHARS],
}

/// Time-ordered, collision-resistant key generator.
#[derive(Debug, Default)]
pub struct PushIdGenerator {
	state: Mutex<PushState>,
}

impl PushIdGenerator {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn next_key(&self) -> String {
		self.next_key_at(Utc::now().timestamp_millis())
	}

	fn next_key_at(&self, millis: i64) -> String {
		let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

		let millis = millis.max(0);
		if millis == state.last_millis {
			for r in state.last_random.iter_mut().rev() {
				if *r == 63 {
					*r = 0;
				} else {
					*r += 1;
					break;
				}
			}
		} else {
			let mut rng = rand::thread_rng();
			for r in state.last_random.iter_mut() {
				*r = rng.gen_range(0..64);
			}
		}
		state.last_millis = millis;

		let mut key = [0u8; PUSH_KEY_LEN];
		let mut now = millis;
		for slot in key[..TIME_CHARS].iter_mut().rev() {
			*slot = PUSH_CHARS[(now % 64) as usize];
			now /= 64;
		}
		for (slot, r) in key[TIME_CHARS..].iter_mut().zip(state.last_random.iter()) {
			*slot = PUSH_CHARS[*r as usize];
		}

		key.iter().map(|b| char::from(*b)).collect()
	}
}

/// Entity kinds and their id prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
	Pin,
	Block,
	Dataset,
	Pinboard,
}

impl IdKind {
	pub fn prefix(&self) -> &'static str {
		match self {
			IdKind::Pin => "p",
			IdKind::Block => "b",
			IdKind::Dataset => "d",
			IdKind::Pinboard => "pb",
		}
	}
}

/// Allocate a new entity id from the store's key generator.
pub fn new_id(store: &dyn DocumentStore, kind: IdKind) -> String {
	format!("{}{}", kind.prefix(), store.generate_key())
}
