// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::http::StatusCode;
use serde_json::json;

use super::support::{body_json, TestApp};

#[tokio::test]
async fn user_records_need_no_credentials() {
	let app = TestApp::new().await;

	let response = app
		.post(
			"/api/users",
			None,
			json!({
				"uid": "carol",
				"email": "carol@example.com",
				"displayName": "Carol",
				"photoURL": "https://example.com/carol.png",
			}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::OK);
	let created = body_json(response).await;
	assert_eq!(created["displayName"], "Carol");
	assert!(created["createdAt"].is_string());

	let fetched = body_json(app.get("/api/users/carol", None).await).await;
	assert_eq!(fetched["photoURL"], "https://example.com/carol.png");
	assert_eq!(fetched["createdAt"], created["createdAt"]);
}

#[tokio::test]
async fn unknown_user_is_not_found() {
	let app = TestApp::new().await;
	let response = app.get("/api/users/nobody", None).await;
	assert_eq!(response.status(), StatusCode::NOT_FOUND);
	assert_eq!(body_json(response).await["error"], "RESOURCE_NOT_FOUND");
}

#[tokio::test]
async fn health_reports_store_reachable() {
	let app = TestApp::new().await;
	let response = app.get("/health", None).await;
	assert_eq!(response.status(), StatusCode::OK);
	let body = body_json(response).await;
	assert_eq!(body["status"], "healthy");
}
