// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! API key management for the calling user.

use axum::{
	extract::{Path, State},
	http::StatusCode,
	Json,
};
use pinflow_server_api::{
	CreateApiKeyRequest, CreateApiKeyResponse, ListApiKeysResponse, SuccessResponse,
};
use pinflow_server_auth::{generate_api_key, Permission};
use pinflow_server_db::ApiKeyInfo;
use tracing::{info, instrument};

use crate::{api::AppState, auth_middleware::RequireAuth, error::ServerError};

fn parse_permissions(requested: &[String]) -> Result<Vec<Permission>, ServerError> {
	if requested.is_empty() {
		return Err(ServerError::Validation(
			"at least one permission is required".to_string(),
		));
	}
	let mut permissions = Vec::with_capacity(requested.len());
	for raw in requested {
		let permission = raw
			.parse::<Permission>()
			.map_err(|e| ServerError::Validation(e.to_string()))?;
		if !permissions.contains(&permission) {
			permissions.push(permission);
		}
	}
	Ok(permissions)
}

/// POST /api/auth/api-keys
///
/// Returns the plaintext key exactly once. A key can only carry
/// permissions the caller holds.
#[instrument(skip(state, principal, body), fields(user_id = %principal.user_id))]
pub async fn create_api_key(
	State(state): State<AppState>,
	RequireAuth(principal): RequireAuth,
	Json(body): Json<CreateApiKeyRequest>,
) -> Result<(StatusCode, Json<CreateApiKeyResponse>), ServerError> {
	let permissions = parse_permissions(&body.permissions)?;
	if !principal.can_grant(&permissions) {
		return Err(ServerError::PermissionDenied(
			"cannot grant permissions the caller does not hold".to_string(),
		));
	}

	let key = generate_api_key();
	let key_hash = state.resolver.hash_api_key(&key);
	let id = state
		.api_keys
		.create_api_key(&principal.user_id, &body.name, &permissions, &key_hash)
		.await?;

	info!(key_id = %id, "api key issued");
	Ok((
		StatusCode::CREATED,
		Json(CreateApiKeyResponse {
			id,
			key,
			name: body.name,
			permissions: permissions.iter().map(|p| p.as_str().to_string()).collect(),
		}),
	))
}

/// GET /api/auth/api-keys
#[instrument(skip(state, principal), fields(user_id = %principal.user_id))]
pub async fn list_api_keys(
	State(state): State<AppState>,
	RequireAuth(principal): RequireAuth,
) -> Result<Json<ListApiKeysResponse>, ServerError> {
	let api_keys = state.api_keys.list_api_keys(&principal.user_id).await?;
	Ok(Json(ListApiKeysResponse { api_keys }))
}

/// GET /api/auth/api-keys/{key_id}
#[instrument(skip(state, principal), fields(user_id = %principal.user_id))]
pub async fn get_api_key(
	State(state): State<AppState>,
	RequireAuth(principal): RequireAuth,
	Path(key_id): Path<String>,
) -> Result<Json<ApiKeyInfo>, ServerError> {
	state
		.api_keys
		.get_api_key(&principal.user_id, &key_id)
		.await?
		.map(Json)
		.ok_or_else(|| ServerError::NotFound(format!("api key {key_id}")))
}

/// DELETE /api/auth/api-keys/{key_id}
///
/// Revokes the key. Keys are looked up under the caller's own user, so
/// another user's key id is simply not found.
#[instrument(skip(state, principal), fields(user_id = %principal.user_id))]
pub async fn revoke_api_key(
	State(state): State<AppState>,
	RequireAuth(principal): RequireAuth,
	Path(key_id): Path<String>,
) -> Result<Json<SuccessResponse>, ServerError> {
	state
		.api_keys
		.revoke_api_key(&principal.user_id, &key_id)
		.await?;
	Ok(Json(SuccessResponse::new("API key revoked")))
}
