// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Server error types and HTTP response conversions.
//!
//! | Variant | Status | Code |
//! |---|---|---|
//! | `Auth(AuthRequired)` | 401 | `AUTH_REQUIRED` |
//! | `Auth(AuthInvalid)` | 401 | `AUTH_INVALID` |
//! | `PermissionDenied` | 403 | `PERMISSION_DENIED` |
//! | `Validation` | 400 | `VALIDATION_ERROR` |
//! | `NotFound` | 404 | `RESOURCE_NOT_FOUND` |
//! | `Conflict` | 409 | `CONFLICT` |
//! | `Internal` | 500 | `SERVER_ERROR` |

use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use pinflow_server_api::ErrorResponse;
use pinflow_server_auth::{AccessDenied, AuthError, MissingPermission};
use pinflow_server_db::DbError;

/// Body message for every 404. Missing and hidden resources are indistinguishable.
pub const NOT_FOUND_MESSAGE: &str = "Resource not found";

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	#[error(transparent)]
	Auth(#[from] AuthError),

	#[error("Permission denied: {0}")]
	PermissionDenied(String),

	#[error("Invalid request: {0}")]
	Validation(String),

	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Conflict: {0}")]
	Conflict(String),

	/// The message is diagnostic only and is returned in `details`.
	#[error("Internal error: {0}")]
	Internal(String),
}

impl ServerError {
	pub fn status(&self) -> StatusCode {
		match self {
			ServerError::Auth(_) => StatusCode::UNAUTHORIZED,
			ServerError::PermissionDenied(_) => StatusCode::FORBIDDEN,
			ServerError::Validation(_) => StatusCode::BAD_REQUEST,
			ServerError::NotFound(_) => StatusCode::NOT_FOUND,
			ServerError::Conflict(_) => StatusCode::CONFLICT,
			ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	pub fn code(&self) -> &'static str {
		match self {
			ServerError::Auth(e) => e.code(),
			ServerError::PermissionDenied(_) => "PERMISSION_DENIED",
			ServerError::Validation(_) => "VALIDATION_ERROR",
			ServerError::NotFound(_) => "RESOURCE_NOT_FOUND",
			ServerError::Conflict(_) => "CONFLICT",
			ServerError::Internal(_) => "SERVER_ERROR",
		}
	}
}

impl From<DbError> for ServerError {
	fn from(e: DbError) -> Self {
		match e {
			DbError::NotFound(what) => ServerError::NotFound(what),
			DbError::Validation(msg) => ServerError::Validation(msg),
			DbError::Conflict(msg) => ServerError::Conflict(msg),
			other => ServerError::Internal(other.to_string()),
		}
	}
}

impl From<AccessDenied> for ServerError {
	fn from(e: AccessDenied) -> Self {
		match e {
			AccessDenied::NotVisible => ServerError::NotFound("resource".to_string()),
			AccessDenied::Forbidden => {
				ServerError::PermissionDenied("not allowed on this resource".to_string())
			}
		}
	}
}

impl From<MissingPermission> for ServerError {
	fn from(e: MissingPermission) -> Self {
		ServerError::PermissionDenied(e.to_string())
	}
}

impl IntoResponse for ServerError {
	fn into_response(self) -> Response {
		let status = self.status();
		let (message, details) = match &self {
			ServerError::Auth(AuthError::AuthRequired) => ("Authentication required".to_string(), None),
			ServerError::Auth(AuthError::AuthInvalid) => ("Authentication failed".to_string(), None),
			ServerError::PermissionDenied(msg) => (format!("Permission denied: {msg}"), None),
			ServerError::Validation(msg) => (msg.clone(), None),
			ServerError::NotFound(what) => {
				tracing::debug!(resource = %what, "resource not found");
				(NOT_FOUND_MESSAGE.to_string(), None)
			}
			ServerError::Conflict(msg) => (msg.clone(), None),
			ServerError::Internal(msg) => {
				tracing::error!(error = %msg, "internal error");
				("An internal error occurred".to_string(), Some(msg.clone()))
			}
		};

		let body = ErrorResponse {
			error: self.code().to_string(),
			message,
			details,
		};
		(status, Json(body)).into_response()
	}
}
