// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Dataset handlers. Access follows the parent pin.

use axum::{
	extract::{Path, State},
	http::StatusCode,
	Json,
};
use pinflow_server_api::{
	CreateDatasetRequest, CreatedResponse, ListDatasetsResponse, SuccessResponse,
	UpdateDatasetRequest,
};
use pinflow_server_auth::{Action, Permission, ResourceKind};
use pinflow_server_db::Dataset;
use tracing::instrument;

use crate::{api::AppState, auth_middleware::RequireAuth, error::ServerError};

/// POST /api/pins/{pid}/datasets
///
/// Unparseable JSON data is rejected with `VALIDATION_ERROR` and nothing is stored.
#[instrument(skip(state, principal, body), fields(user_id = %principal.user_id))]
pub async fn create_dataset(
	State(state): State<AppState>,
	RequireAuth(principal): RequireAuth,
	Path(pid): Path<String>,
	Json(body): Json<CreateDatasetRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ServerError> {
	principal.require(Permission::PinsWrite)?;
	state
		.guard
		.pin_child(Some(&principal), &pid, ResourceKind::Dataset, Action::Write)
		.await?;
	let new = body.into_new_dataset(principal.user_id.clone())?;
	let id = state.datasets.create_dataset(&pid, new).await?;
	Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// GET /api/pins/{pid}/datasets
#[instrument(skip(state, principal), fields(user_id = %principal.user_id))]
pub async fn list_datasets(
	State(state): State<AppState>,
	RequireAuth(principal): RequireAuth,
	Path(pid): Path<String>,
) -> Result<Json<ListDatasetsResponse>, ServerError> {
	principal.require(Permission::PinsRead)?;
	state
		.guard
		.pin_child(Some(&principal), &pid, ResourceKind::Dataset, Action::Read)
		.await?;
	let datasets = state.datasets.get_pin_datasets(&pid).await?;
	Ok(Json(ListDatasetsResponse { datasets }))
}

/// GET /api/pins/{pid}/datasets/{dataset_id}
#[instrument(skip(state, principal), fields(user_id = %principal.user_id))]
pub async fn get_dataset(
	State(state): State<AppState>,
	RequireAuth(principal): RequireAuth,
	Path((pid, dataset_id)): Path<(String, String)>,
) -> Result<Json<Dataset>, ServerError> {
	principal.require(Permission::PinsRead)?;
	state
		.guard
		.pin_child(Some(&principal), &pid, ResourceKind::Dataset, Action::Read)
		.await?;
	state
		.datasets
		.get_dataset(&pid, &dataset_id)
		.await?
		.map(Json)
		.ok_or_else(|| ServerError::NotFound(format!("dataset {dataset_id}")))
}

/// PUT /api/pins/{pid}/datasets/{dataset_id}
#[instrument(skip(state, principal, body), fields(user_id = %principal.user_id))]
pub async fn update_dataset(
	State(state): State<AppState>,
	RequireAuth(principal): RequireAuth,
	Path((pid, dataset_id)): Path<(String, String)>,
	Json(body): Json<UpdateDatasetRequest>,
) -> Result<Json<Dataset>, ServerError> {
	principal.require(Permission::PinsWrite)?;
	state
		.guard
		.pin_child(Some(&principal), &pid, ResourceKind::Dataset, Action::Write)
		.await?;
	let current = state
		.datasets
		.get_dataset(&pid, &dataset_id)
		.await?
		.ok_or_else(|| ServerError::NotFound(format!("dataset {dataset_id}")))?;

	let update = body.into_update(current.metadata.format)?;
	Ok(Json(
		state
			.datasets
			.update_dataset(&pid, &dataset_id, update)
			.await?,
	))
}

/// DELETE /api/pins/{pid}/datasets/{dataset_id}
#[instrument(skip(state, principal), fields(user_id = %principal.user_id))]
pub async fn delete_dataset(
	State(state): State<AppState>,
	RequireAuth(principal): RequireAuth,
	Path((pid, dataset_id)): Path<(String, String)>,
) -> Result<Json<SuccessResponse>, ServerError> {
	principal.require(Permission::PinsDelete)?;
	state
		.guard
		.pin_child(Some(&principal), &pid, ResourceKind::Dataset, Action::Delete)
		.await?;
	state.datasets.delete_dataset(&pid, &dataset_id).await?;
	Ok(Json(SuccessResponse::new("Dataset deleted")))
}
