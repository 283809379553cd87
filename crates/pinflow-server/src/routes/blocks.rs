// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Block handlers. Access follows the parent pin.

use axum::{
	extract::{Path, State},
	http::StatusCode,
	Json,
};
use pinflow_server_api::{
	CreateBlockRequest, CreatedResponse, ListBlocksResponse, SuccessResponse, UpdateBlockRequest,
};
use pinflow_server_auth::{Action, Permission, ResourceKind};
use pinflow_server_db::Block;
use tracing::instrument;

use crate::{api::AppState, auth_middleware::RequireAuth, error::ServerError};

/// POST /api/pins/{pid}/blocks
#[instrument(skip(state, principal, body), fields(user_id = %principal.user_id))]
pub async fn create_block(
	State(state): State<AppState>,
	RequireAuth(principal): RequireAuth,
	Path(pid): Path<String>,
	Json(body): Json<CreateBlockRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ServerError> {
	principal.require(Permission::PinsWrite)?;
	state
		.guard
		.pin_child(Some(&principal), &pid, ResourceKind::Block, Action::Write)
		.await?;
	let id = state.blocks.create_block(&pid, body.into()).await?;
	Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// GET /api/pins/{pid}/blocks
#[instrument(skip(state, principal), fields(user_id = %principal.user_id))]
pub async fn list_blocks(
	State(state): State<AppState>,
	RequireAuth(principal): RequireAuth,
	Path(pid): Path<String>,
) -> Result<Json<ListBlocksResponse>, ServerError> {
	principal.require(Permission::PinsRead)?;
	state
		.guard
		.pin_child(Some(&principal), &pid, ResourceKind::Block, Action::Read)
		.await?;
	let blocks = state.blocks.get_pin_blocks(&pid).await?;
	Ok(Json(ListBlocksResponse { blocks }))
}

/// GET /api/pins/{pid}/blocks/{block_id}
#[instrument(skip(state, principal), fields(user_id = %principal.user_id))]
pub async fn get_block(
	State(state): State<AppState>,
	RequireAuth(principal): RequireAuth,
	Path((pid, block_id)): Path<(String, String)>,
) -> Result<Json<Block>, ServerError> {
	principal.require(Permission::PinsRead)?;
	state
		.guard
		.pin_child(Some(&principal), &pid, ResourceKind::Block, Action::Read)
		.await?;
	state
		.blocks
		.get_block(&pid, &block_id)
		.await?
		.map(Json)
		.ok_or_else(|| ServerError::NotFound(format!("block {block_id}")))
}

/// PUT /api/pins/{pid}/blocks/{block_id}
#[instrument(skip(state, principal, body), fields(user_id = %principal.user_id))]
pub async fn update_block(
	State(state): State<AppState>,
	RequireAuth(principal): RequireAuth,
	Path((pid, block_id)): Path<(String, String)>,
	Json(body): Json<UpdateBlockRequest>,
) -> Result<Json<Block>, ServerError> {
	principal.require(Permission::PinsWrite)?;
	state
		.guard
		.pin_child(Some(&principal), &pid, ResourceKind::Block, Action::Write)
		.await?;
	Ok(Json(
		state.blocks.update_block(&pid, &block_id, body.into()).await?,
	))
}

/// DELETE /api/pins/{pid}/blocks/{block_id}
#[instrument(skip(state, principal), fields(user_id = %principal.user_id))]
pub async fn delete_block(
	State(state): State<AppState>,
	RequireAuth(principal): RequireAuth,
	Path((pid, block_id)): Path<(String, String)>,
) -> Result<Json<SuccessResponse>, ServerError> {
	principal.require(Permission::PinsDelete)?;
	state
		.guard
		.pin_child(Some(&principal), &pid, ResourceKind::Block, Action::Delete)
		.await?;
	state.blocks.delete_block(&pid, &block_id).await?;
	Ok(Json(SuccessResponse::new("Block deleted")))
}
