// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication and access control for the pinflow server.
//!
//! This crate provides:
//! - [`Principal`] - the resolved identity attached to a request
//! - [`IdentityResolver`] - turns inbound [`Credentials`] into a principal
//! - [`AccessPolicy`] - decides whether a principal may act on a pin, pinboard or pin child
//! - API key generation and salted hashing
//! - [`HmacTokenVerifier`] - the bundled bearer token verifier
//!
//! Nothing here touches storage directly. API key lookups go through the
//! [`ApiKeyLookup`] trait so the document store stays on the other side of
//! the seam.

pub mod abac;
pub mod api_key;
pub mod error;
pub mod middleware;
pub mod resolver;
pub mod types;
pub mod verifier;

pub use abac::{AccessDenied, AccessPolicy, Action, ResourceAttrs, ResourceKind};
pub use api_key::{generate_api_key, hash_api_key, API_KEY_PREFIX};
pub use error::AuthError;
pub use middleware::{extract_api_key, extract_bearer_token, AuthConfig, Credentials};
pub use resolver::{ApiKeyGrant, ApiKeyLookup, IdentityResolver, LookupError};
pub use types::{AuthMethod, MissingPermission, Permission, Principal, UserId};
pub use verifier::{HmacTokenVerifier, IdentityVerifier, TokenClaims, VerifiedIdentity, VerifyError};
