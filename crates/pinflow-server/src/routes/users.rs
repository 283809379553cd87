// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User record upsert and read. These routes take no credentials.

use axum::{
	extract::{Path, State},
	Json,
};
use pinflow_server_api::UpsertUserRequest;
use pinflow_server_db::UserRecord;
use tracing::instrument;

use crate::{api::AppState, error::ServerError};

/// POST /api/users
#[instrument(skip(state, body), fields(uid = %body.uid))]
pub async fn upsert_user(
	State(state): State<AppState>,
	Json(body): Json<UpsertUserRequest>,
) -> Result<Json<UserRecord>, ServerError> {
	Ok(Json(state.users.upsert_user(body.into()).await?))
}

/// GET /api/users/{uid}
#[instrument(skip(state))]
pub async fn get_user(
	State(state): State<AppState>,
	Path(uid): Path<String>,
) -> Result<Json<UserRecord>, ServerError> {
	state
		.users
		.get_user(&uid)
		.await?
		.map(Json)
		.ok_or_else(|| ServerError::NotFound(format!("user {uid}")))
}
