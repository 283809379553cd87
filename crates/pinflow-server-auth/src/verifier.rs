// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bearer token verification.
//!
//! [`IdentityVerifier`] is the seam to whatever issues user tokens. The
//! bundled [`HmacTokenVerifier`] handles tokens of the form
//! `base64url(claims).hex(HMAC-SHA256(secret, base64url(claims)))`.

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;

use crate::types::UserId;

type HmacSha256 = Hmac<Sha256>;

/// Identity established by a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
	pub user_id: UserId,
	pub email: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
	#[error("malformed token")]
	Malformed,

	#[error("invalid token signature")]
	InvalidSignature,

	#[error("token expired")]
	Expired,

	#[error("verifier unavailable: {0}")]
	Unavailable(String),
}

/// Verifies bearer tokens against an identity provider.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
	async fn verify(&self, token: &str) -> Result<VerifiedIdentity, VerifyError>;
}

/// Claims carried in an HMAC token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
	pub uid: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	/// Expiry as unix seconds.
	pub exp: i64,
}

impl TokenClaims {
	pub fn new(uid: impl Into<String>, email: Option<String>, ttl: Duration) -> Self {
		Self {
			uid: uid.into(),
			email,
			exp: (Utc::now() + ttl).timestamp(),
		}
	}
}

/// HMAC-SHA256 token verifier and issuer.
#[derive(Clone)]
pub struct HmacTokenVerifier {
	secret: Vec<u8>,
}

impl fmt::Debug for HmacTokenVerifier {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HmacTokenVerifier")
			.field("secret", &"[REDACTED]")
			.finish()
	}
}

impl HmacTokenVerifier {
	pub fn new(secret: impl AsRef<[u8]>) -> Self {
		Self {
			secret: secret.as_ref().to_vec(),
		}
	}

	fn mac(&self) -> Result<HmacSha256, VerifyError> {
		HmacSha256::new_from_slice(&self.secret).map_err(|e| VerifyError::Unavailable(e.to_string()))
	}

	/// Sign a set of claims.
	pub fn issue(&self, claims: &TokenClaims) -> Result<String, VerifyError> {
		let payload = serde_json::to_vec(claims).map_err(|e| VerifyError::Unavailable(e.to_string()))?;
		let encoded = URL_SAFE_NO_PAD.encode(payload);

		let mut mac = self.mac()?;
		mac.update(encoded.as_bytes());
		let signature = hex::encode(mac.finalize().into_bytes());

		Ok(format!("{encoded}.{signature}"))
	}

	/// Issue a token for `uid` that expires after `ttl`.
	pub fn issue_for(
		&self,
		uid: impl Into<String>,
		email: Option<String>,
		ttl: Duration,
	) -> Result<String, VerifyError> {
		self.issue(&TokenClaims::new(uid, email, ttl))
	}

	fn decode(&self, token: &str) -> Result<TokenClaims, VerifyError> {
		let (encoded, signature) = token.split_once('.').ok_or(VerifyError::Malformed)?;
		let signature = hex::decode(signature).map_err(|_| VerifyError::Malformed)?;

		let mut mac = self.mac()?;
		mac.update(encoded.as_bytes());
		mac
			.verify_slice(&signature)
			.map_err(|_| VerifyError::InvalidSignature)?;

		let payload = URL_SAFE_NO_PAD
			.decode(encoded)
			.map_err(|_| VerifyError::Malformed)?;
		let claims: TokenClaims =
			serde_json::from_slice(&payload).map_err(|_| VerifyError::Malformed)?;

		if claims.uid.is_empty() {
			return Err(VerifyError::Malformed);
		}
		if claims.exp <= Utc::now().timestamp() {
			return Err(VerifyError::Expired);
		}
		Ok(claims)
	}
}

#[async_trait]
impl IdentityVerifier for HmacTokenVerifier {
	async fn verify(&self, token: &str) -> Result<VerifiedIdentity, VerifyError> {
		let claims = self.decode(token)?;
		Ok(VerifiedIdentity {
			user_id: UserId::new(claims.uid),
			email: claims.email,
		})
	}
}
