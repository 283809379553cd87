// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Pin handlers.

use axum::{
	extract::{Path, Query, State},
	http::StatusCode,
	Json,
};
use pinflow_server_api::{
	CreatedResponse, ListPinsQuery, ListPinsResponse, PinDetailResponse, SendPinRequest,
	SuccessResponse, UpdatePinRequest,
};
use pinflow_server_auth::{Action, Permission, Principal};
use pinflow_server_db::Pin;
use tracing::instrument;

use crate::{
	api::AppState,
	auth_middleware::{resolve_with_body_key, AuthContext, RequireAuth},
	error::ServerError,
};

/// Blocks (ordered) and datasets of an already authorized pin.
pub(crate) async fn pin_detail(state: &AppState, pin: Pin) -> Result<PinDetailResponse, ServerError> {
	let (blocks, datasets) = tokio::try_join!(
		state.blocks.get_pin_blocks(&pin.id),
		state.datasets.get_pin_datasets(&pin.id),
	)?;
	Ok(PinDetailResponse {
		pin,
		blocks,
		datasets,
	})
}

/// POST /api/pins/send
///
/// Accepts an API key in the body as well as in the `Authorization` header.
#[instrument(skip(state, auth, body))]
pub async fn send_pin(
	State(state): State<AppState>,
	auth: AuthContext,
	Json(mut body): Json<SendPinRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ServerError> {
	let principal = resolve_with_body_key(&state.resolver, auth, body.api_key.take()).await?;
	principal.require(Permission::PinsWrite)?;

	let new = body.into_new_pin(principal.user_id.clone())?;
	let id = state.pins.create_pin(new).await?;
	Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// GET /api/pins
#[instrument(skip(state, principal), fields(user_id = %principal.user_id))]
pub async fn list_pins(
	State(state): State<AppState>,
	RequireAuth(principal): RequireAuth,
	Query(query): Query<ListPinsQuery>,
) -> Result<Json<ListPinsResponse>, ServerError> {
	principal.require(Permission::PinsRead)?;
	let pins = state.pins.get_user_pins(&principal.user_id).await?;
	Ok(Json(ListPinsResponse::page(pins, &query)))
}

/// GET /api/pins/{pid}
#[instrument(skip(state, principal), fields(user_id = %principal.user_id))]
pub async fn get_pin(
	State(state): State<AppState>,
	RequireAuth(principal): RequireAuth,
	Path(pid): Path<String>,
) -> Result<Json<PinDetailResponse>, ServerError> {
	principal.require(Permission::PinsRead)?;
	let pin = state.guard.pin(Some(&principal), &pid, Action::Read).await?;
	Ok(Json(pin_detail(&state, pin).await?))
}

/// PUT /api/pins/{pid}
#[instrument(skip(state, principal, body), fields(user_id = %principal.user_id))]
pub async fn update_pin(
	State(state): State<AppState>,
	RequireAuth(principal): RequireAuth,
	Path(pid): Path<String>,
	Json(body): Json<UpdatePinRequest>,
) -> Result<Json<Pin>, ServerError> {
	principal.require(Permission::PinsWrite)?;
	let pin = state.guard.pin(Some(&principal), &pid, Action::Write).await?;
	let update = body.into_update(pin.data_type)?;
	Ok(Json(state.pins.update_pin(&pid, update).await?))
}

/// DELETE /api/pins/{pid}
#[instrument(skip(state, principal), fields(user_id = %principal.user_id))]
pub async fn delete_pin(
	State(state): State<AppState>,
	RequireAuth(principal): RequireAuth,
	Path(pid): Path<String>,
) -> Result<Json<SuccessResponse>, ServerError> {
	principal.require(Permission::PinsDelete)?;
	state.guard.pin(Some(&principal), &pid, Action::Delete).await?;
	state.pins.delete_pin(&pid).await?;
	Ok(Json(SuccessResponse::new("Pin deleted")))
}

/// POST /api/pins/{pid}/publish
pub async fn publish_pin(
	State(state): State<AppState>,
	RequireAuth(principal): RequireAuth,
	Path(pid): Path<String>,
) -> Result<Json<Pin>, ServerError> {
	set_visibility(&state, &principal, &pid, true).await
}

/// POST /api/pins/{pid}/unpublish
pub async fn unpublish_pin(
	State(state): State<AppState>,
	RequireAuth(principal): RequireAuth,
	Path(pid): Path<String>,
) -> Result<Json<Pin>, ServerError> {
	set_visibility(&state, &principal, &pid, false).await
}

#[instrument(skip(state, principal), fields(user_id = %principal.user_id))]
async fn set_visibility(
	state: &AppState,
	principal: &Principal,
	pid: &str,
	is_public: bool,
) -> Result<Json<Pin>, ServerError> {
	principal.require(Permission::PinsWrite)?;
	state.guard.pin(Some(principal), pid, Action::Write).await?;
	Ok(Json(state.pins.set_visibility(pid, is_public).await?))
}
