// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Health check handler.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use tokio::time::Instant;

use crate::api::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
	pub status: &'static str,
	pub version: &'static str,
	pub store_latency_ms: u64,
}

/// GET /health - document store round trip.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
	let start = Instant::now();
	let result = state.store.get("health").await;
	let store_latency_ms = start.elapsed().as_millis() as u64;

	let (status, label) = match result {
		Ok(_) => (StatusCode::OK, "healthy"),
		Err(e) => {
			tracing::error!(error = %e, "health check: document store unavailable");
			(StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
		}
	};

	(
		status,
		Json(HealthResponse {
			status: label,
			version: env!("CARGO_PKG_VERSION"),
			store_latency_ms,
		}),
	)
}
