// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The development bypass reaches pins and their blocks and datasets only.

use axum::http::{Method, StatusCode};
use serde_json::json;

use super::support::{body_json, run_authz_cases, AuthzCase, TestApp};

#[tokio::test]
async fn bypass_covers_pins_but_not_pinboards_or_workflow_data() {
	let app = TestApp::with_dev_mode().await;
	let f = app.fixtures.clone();

	let cases = vec![
		AuthzCase {
			name: "dev principal reads any pin",
			method: Method::GET,
			path: format!("/api/pins/{}", f.private_pin),
			user: None,
			body: None,
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "dev principal edits any pin",
			method: Method::PUT,
			path: format!("/api/pins/{}", f.private_pin),
			user: None,
			body: Some(json!({"title": "edited in dev"})),
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "dev principal adds blocks to any pin",
			method: Method::POST,
			path: format!("/api/pins/{}/blocks", f.private_pin),
			user: None,
			body: Some(json!({"name": "dev", "type": "markdown"})),
			expected_status: StatusCode::CREATED,
		},
		AuthzCase {
			name: "private pinboard stays hidden",
			method: Method::GET,
			path: format!("/api/pinboards/{}", f.private_board),
			user: None,
			body: None,
			expected_status: StatusCode::NOT_FOUND,
		},
		AuthzCase {
			name: "public pinboard stays read-only",
			method: Method::PUT,
			path: format!("/api/pinboards/{}", f.public_board),
			user: None,
			body: Some(json!({"name": "dev rename"})),
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "workflow data keeps owner rule",
			method: Method::PUT,
			path: format!("/api/workflow-data/{}/w1", f.private_pin),
			user: None,
			body: Some(json!({"step": 1})),
			expected_status: StatusCode::NOT_FOUND,
		},
	];

	run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn credentials_are_ignored_in_dev_mode() {
	let app = TestApp::with_dev_mode().await;
	let alice = &app.fixtures.alice;

	let response = app
		.post("/api/pins/send", Some(alice), json!({"content": "# dev"}))
		.await;
	assert_eq!(response.status(), StatusCode::CREATED);
	let id = body_json(response).await["id"].as_str().unwrap().to_string();

	let pin = app.state.pins.get_pin(&id).await.unwrap().unwrap();
	assert_eq!(pin.user_id.as_str(), "dev-user");

	let alices = body_json(app.get("/api/pins", Some(alice)).await).await;
	assert_eq!(alices["total"], 1);
}
