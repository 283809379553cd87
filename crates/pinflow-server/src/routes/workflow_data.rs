// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Live workflow payloads. The owner writes; the owner or anyone (for a
//! public pin) reads.

use axum::{
	extract::{Path, State},
	Json,
};
use pinflow_server_api::{WorkflowDataListResponse, WorkflowDataResponse};
use pinflow_server_auth::{Action, Permission, ResourceKind};
use serde_json::Value;
use tracing::instrument;

use crate::{
	api::AppState,
	auth_middleware::{resolve_with_body_key, AuthContext, RequireAuth},
	error::ServerError,
};

/// Body field that carries an API key instead of the `Authorization` header.
const BODY_API_KEY_FIELD: &str = "api_key";

/// PUT /api/workflow-data/{pid}/{wid}
///
/// The body replaces the stored payload. An `api_key` field is taken out
/// and used for authentication; it is never stored.
#[instrument(skip(state, auth, body))]
pub async fn put_workflow_data(
	State(state): State<AppState>,
	auth: AuthContext,
	Path((pid, wid)): Path<(String, String)>,
	Json(mut body): Json<Value>,
) -> Result<Json<WorkflowDataResponse>, ServerError> {
	let body_key = body
		.as_object_mut()
		.and_then(|fields| fields.remove(BODY_API_KEY_FIELD))
		.and_then(|v| v.as_str().map(str::to_string));
	let principal = resolve_with_body_key(&state.resolver, auth, body_key).await?;
	principal.require(Permission::WorkflowDataWrite)?;

	state
		.guard
		.pin_child(Some(&principal), &pid, ResourceKind::WorkflowData, Action::Write)
		.await?;
	state.workflow_data.put(&pid, &wid, body).await?;

	let data = state
		.workflow_data
		.get(&pid, &wid)
		.await?
		.ok_or_else(|| ServerError::Internal(format!("workflow data {pid}/{wid} vanished after write")))?;
	Ok(Json(WorkflowDataResponse {
		pin_id: pid,
		workflow_id: wid,
		data,
	}))
}

/// GET /api/workflow-data/{pid}/{wid}
#[instrument(skip(state, principal), fields(user_id = %principal.user_id))]
pub async fn get_workflow_data(
	State(state): State<AppState>,
	RequireAuth(principal): RequireAuth,
	Path((pid, wid)): Path<(String, String)>,
) -> Result<Json<WorkflowDataResponse>, ServerError> {
	principal.require(Permission::WorkflowDataRead)?;
	state
		.guard
		.pin_child(Some(&principal), &pid, ResourceKind::WorkflowData, Action::Read)
		.await?;

	let data = state
		.workflow_data
		.get(&pid, &wid)
		.await?
		.ok_or_else(|| ServerError::NotFound(format!("workflow data {wid}")))?;
	Ok(Json(WorkflowDataResponse {
		pin_id: pid,
		workflow_id: wid,
		data,
	}))
}

/// GET /api/workflow-data/{pid}
#[instrument(skip(state, principal), fields(user_id = %principal.user_id))]
pub async fn list_workflow_data(
	State(state): State<AppState>,
	RequireAuth(principal): RequireAuth,
	Path(pid): Path<String>,
) -> Result<Json<WorkflowDataListResponse>, ServerError> {
	principal.require(Permission::WorkflowDataRead)?;
	state
		.guard
		.pin_child(Some(&principal), &pid, ResourceKind::WorkflowData, Action::Read)
		.await?;

	let workflows = state.workflow_data.get_all(&pid).await?;
	Ok(Json(WorkflowDataListResponse {
		pin_id: pid,
		workflows,
	}))
}
