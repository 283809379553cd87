// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication middleware for Axum.
//!
//! [`auth_layer`] resolves the `Authorization` header once per request and
//! stores the outcome as an [`AuthContext`] extension. Handlers then pick
//! one of:
//!
//! - [`RequireAuth`] - rejects with `AUTH_REQUIRED` / `AUTH_INVALID`
//! - [`OptionalAuth`] - never rejects; anonymous callers get `None`
//! - [`AuthContext`] plus [`resolve_with_body_key`] - for the two endpoints
//!   that also accept an `api_key` field in the JSON body
//!
//! # Security Properties
//!
//! - Credential values are never logged.
//! - Rejections never say which credential was tried.
//! - The development bypass is decided by configuration inside the
//!   resolver, never by anything in the request.

use axum::{
	body::Body,
	extract::{FromRequestParts, State},
	http::{request::Parts, Request},
	middleware::Next,
	response::Response,
};
use pinflow_server_auth::{AuthError, Credentials, IdentityResolver, Principal};
use tracing::{debug, instrument, Span};

use crate::api::AppState;
use crate::error::ServerError;

/// Outcome of credential resolution for one request.
#[derive(Debug, Clone)]
pub struct AuthContext(pub Result<Principal, AuthError>);

impl AuthContext {
	pub fn unauthenticated() -> Self {
		Self(Err(AuthError::AuthRequired))
	}

	pub fn principal(&self) -> Option<&Principal> {
		self.0.as_ref().ok()
	}
}

/// Resolve credentials from the request headers and attach an [`AuthContext`].
#[instrument(
	name = "auth_layer",
	skip(state, request, next),
	fields(
		auth_method = tracing::field::Empty,
		user_id = tracing::field::Empty,
	)
)]
pub async fn auth_layer(
	State(state): State<AppState>,
	mut request: Request<Body>,
	next: Next,
) -> Response {
	let credentials = Credentials::from_headers(request.headers());
	let result = state.resolver.resolve(&credentials).await;

	if let Ok(principal) = &result {
		let span = Span::current();
		span.record("user_id", principal.user_id.as_str());
		span.record("auth_method", tracing::field::debug(principal.auth_method));
	}

	request.extensions_mut().insert(AuthContext(result));
	next.run(request).await
}

/// Retry resolution with an API key taken from the request body.
///
/// Header credentials that already resolved win. A body key is only tried
/// when the headers produced no principal.
pub async fn resolve_with_body_key(
	resolver: &IdentityResolver,
	context: AuthContext,
	body_api_key: Option<String>,
) -> Result<Principal, ServerError> {
	match (context.0, body_api_key) {
		(Ok(principal), _) => Ok(principal),
		(Err(_), Some(key)) if !key.is_empty() => {
			let credentials = Credentials::default().with_body_api_key(Some(key));
			Ok(resolver.resolve(&credentials).await?)
		}
		(Err(e), _) => Err(e.into()),
	}
}

fn context_of(parts: &Parts) -> AuthContext {
	parts
		.extensions
		.get::<AuthContext>()
		.cloned()
		.unwrap_or_else(AuthContext::unauthenticated)
}

impl<S> FromRequestParts<S> for AuthContext
where
	S: Send + Sync,
{
	type Rejection = std::convert::Infallible;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		Ok(context_of(parts))
	}
}

/// Extractor that requires a resolved principal.
pub struct RequireAuth(pub Principal);

impl<S> FromRequestParts<S> for RequireAuth
where
	S: Send + Sync,
{
	type Rejection = ServerError;

	#[instrument(name = "RequireAuth::from_request_parts", skip_all)]
	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		match context_of(parts).0 {
			Ok(principal) => {
				debug!(user_id = %principal.user_id, "Authentication required: success");
				Ok(RequireAuth(principal))
			}
			Err(e) => {
				debug!(code = e.code(), "Authentication required: no valid credentials");
				Err(e.into())
			}
		}
	}
}

/// Extractor for routes that serve anonymous callers too.
pub struct OptionalAuth(pub Option<Principal>);

impl<S> FromRequestParts<S> for OptionalAuth
where
	S: Send + Sync,
{
	type Rejection = std::convert::Infallible;

	#[instrument(name = "OptionalAuth::from_request_parts", skip_all)]
	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		let context = context_of(parts);
		if let Some(principal) = context.principal() {
			debug!(user_id = %principal.user_id, "Optional auth: authenticated");
		} else {
			debug!("Optional auth: unauthenticated");
		}
		Ok(OptionalAuth(context.0.ok()))
	}
}
