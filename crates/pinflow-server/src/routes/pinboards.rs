// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Pinboard handlers.

use axum::{
	extract::{Path, State},
	http::StatusCode,
	Json,
};
use pinflow_server_api::{
	AddPinRequest, CreatePinboardRequest, CreatedResponse, ListPinboardsResponse, SuccessResponse,
	UpdatePinboardRequest,
};
use pinflow_server_auth::{Action, Permission};
use pinflow_server_db::Pinboard;
use tracing::instrument;

use crate::{api::AppState, auth_middleware::RequireAuth, error::ServerError};

/// POST /api/pinboards
#[instrument(skip(state, principal, body), fields(user_id = %principal.user_id))]
pub async fn create_pinboard(
	State(state): State<AppState>,
	RequireAuth(principal): RequireAuth,
	Json(body): Json<CreatePinboardRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ServerError> {
	principal.require(Permission::PinsWrite)?;
	if body.name.trim().is_empty() {
		return Err(ServerError::Validation("pinboard name must not be empty".to_string()));
	}
	let id = state
		.pinboards
		.create_pinboard(body.into_new_pinboard(principal.user_id.clone()))
		.await?;
	Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// GET /api/pinboards
#[instrument(skip(state, principal), fields(user_id = %principal.user_id))]
pub async fn list_pinboards(
	State(state): State<AppState>,
	RequireAuth(principal): RequireAuth,
) -> Result<Json<ListPinboardsResponse>, ServerError> {
	principal.require(Permission::PinsRead)?;
	let pinboards = state.pinboards.get_user_pinboards(&principal.user_id).await?;
	Ok(Json(ListPinboardsResponse { pinboards }))
}

/// GET /api/pinboards/{id}
#[instrument(skip(state, principal), fields(user_id = %principal.user_id))]
pub async fn get_pinboard(
	State(state): State<AppState>,
	RequireAuth(principal): RequireAuth,
	Path(id): Path<String>,
) -> Result<Json<Pinboard>, ServerError> {
	principal.require(Permission::PinsRead)?;
	Ok(Json(
		state.guard.pinboard(Some(&principal), &id, Action::Read).await?,
	))
}

/// PUT /api/pinboards/{id}
///
/// Pins in a replacement `pins` list that are not already on the board must
/// exist and be readable by the caller, as with `add_pin`.
#[instrument(skip(state, principal, body), fields(user_id = %principal.user_id))]
pub async fn update_pinboard(
	State(state): State<AppState>,
	RequireAuth(principal): RequireAuth,
	Path(id): Path<String>,
	Json(body): Json<UpdatePinboardRequest>,
) -> Result<Json<Pinboard>, ServerError> {
	principal.require(Permission::PinsWrite)?;
	let board = state.guard.pinboard(Some(&principal), &id, Action::Write).await?;
	if let Some(pins) = &body.pins {
		for pin_id in pins.iter().filter(|pin_id| !board.pins.contains(*pin_id)) {
			state
				.guard
				.pin(Some(&principal), pin_id, Action::Read)
				.await?;
		}
	}
	Ok(Json(state.pinboards.update_pinboard(&id, body.into()).await?))
}

/// DELETE /api/pinboards/{id}
#[instrument(skip(state, principal), fields(user_id = %principal.user_id))]
pub async fn delete_pinboard(
	State(state): State<AppState>,
	RequireAuth(principal): RequireAuth,
	Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ServerError> {
	principal.require(Permission::PinsDelete)?;
	state.guard.pinboard(Some(&principal), &id, Action::Delete).await?;
	state.pinboards.delete_pinboard(&id).await?;
	Ok(Json(SuccessResponse::new("Pinboard deleted")))
}

/// POST /api/pinboards/{id}/pins
///
/// The pin must exist and be readable by the caller. Adding a pin that is
/// already on the board is a no-op.
#[instrument(skip(state, principal, body), fields(user_id = %principal.user_id))]
pub async fn add_pin(
	State(state): State<AppState>,
	RequireAuth(principal): RequireAuth,
	Path(id): Path<String>,
	Json(body): Json<AddPinRequest>,
) -> Result<Json<Pinboard>, ServerError> {
	principal.require(Permission::PinsWrite)?;
	state.guard.pinboard(Some(&principal), &id, Action::Write).await?;
	state
		.guard
		.pin(Some(&principal), &body.pin_id, Action::Read)
		.await?;
	Ok(Json(
		state.pinboards.add_pin_to_pinboard(&id, &body.pin_id).await?,
	))
}

/// DELETE /api/pinboards/{id}/pins/{pin_id}
#[instrument(skip(state, principal), fields(user_id = %principal.user_id))]
pub async fn remove_pin(
	State(state): State<AppState>,
	RequireAuth(principal): RequireAuth,
	Path((id, pin_id)): Path<(String, String)>,
) -> Result<Json<Pinboard>, ServerError> {
	principal.require(Permission::PinsWrite)?;
	state.guard.pinboard(Some(&principal), &id, Action::Write).await?;
	Ok(Json(
		state.pinboards.remove_pin_from_pinboard(&id, &pin_id).await?,
	))
}
