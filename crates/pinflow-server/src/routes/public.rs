// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Public views. Credentials are optional: public resources are served to
//! anyone, private ones only to their owner, and everything else is a 404.

use axum::{
	extract::{Path, State},
	Json,
};
use futures::future::try_join_all;
use pinflow_server_api::{PinDetailResponse, PublicPinboardResponse};
use pinflow_server_auth::Action;
use tracing::{debug, instrument};

use crate::{api::AppState, auth_middleware::OptionalAuth, error::ServerError, routes::pins::pin_detail};

/// GET /api/public/pins/{pid}
#[instrument(skip(state, principal))]
pub async fn get_public_pin(
	State(state): State<AppState>,
	OptionalAuth(principal): OptionalAuth,
	Path(pid): Path<String>,
) -> Result<Json<PinDetailResponse>, ServerError> {
	let pin = state.guard.pin(principal.as_ref(), &pid, Action::Read).await?;
	Ok(Json(pin_detail(&state, pin).await?))
}

/// GET /api/public/pinboards/{id}
///
/// Expands the board's pins in board order, leaving out pins that were
/// deleted or that the caller may not read. Callers other than the owner
/// only see the ids of the expanded pins in `pinboard.pins`.
#[instrument(skip(state, principal))]
pub async fn get_public_pinboard(
	State(state): State<AppState>,
	OptionalAuth(principal): OptionalAuth,
	Path(id): Path<String>,
) -> Result<Json<PublicPinboardResponse>, ServerError> {
	let mut pinboard = state.guard.pinboard(principal.as_ref(), &id, Action::Read).await?;

	let fetched = try_join_all(pinboard.pins.iter().map(|pin_id| state.pins.get_pin(pin_id))).await?;
	let listed = fetched.len();
	let pins: Vec<_> = fetched
		.into_iter()
		.flatten()
		.filter(|pin| state.guard.can_read_pin(principal.as_ref(), pin))
		.collect();
	debug!(listed, visible = pins.len(), "expanded pinboard pins");

	let is_owner = principal
		.as_ref()
		.is_some_and(|p| p.user_id == pinboard.user_id);
	if !is_owner {
		pinboard.pins = pins.iter().map(|pin| pin.id.clone()).collect();
	}

	Ok(Json(PublicPinboardResponse { pinboard, pins }))
}
