// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::http::{Method, StatusCode};
use pinflow_server_auth::Permission;
use serde_json::json;

use super::support::{body_json, run_authz_cases, AuthzCase, TestApp};

#[tokio::test]
async fn workflow_data_follows_parent_pin() {
	let app = TestApp::new().await;
	let f = app.fixtures.clone();

	app
		.put(
			&format!("/api/workflow-data/{}/w1", f.public_pin),
			Some(&f.alice),
			json!({"progress": 10}),
		)
		.await;

	let cases = vec![
		AuthzCase {
			name: "owner writes",
			method: Method::PUT,
			path: format!("/api/workflow-data/{}/w1", f.private_pin),
			user: Some(f.alice.clone()),
			body: Some(json!({"progress": 50})),
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "stranger cannot write to public pin",
			method: Method::PUT,
			path: format!("/api/workflow-data/{}/w1", f.public_pin),
			user: Some(f.bob.clone()),
			body: Some(json!({"progress": 99})),
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "stranger reads public pin data",
			method: Method::GET,
			path: format!("/api/workflow-data/{}/w1", f.public_pin),
			user: Some(f.bob.clone()),
			body: None,
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "stranger cannot read private pin data",
			method: Method::GET,
			path: format!("/api/workflow-data/{}/w1", f.private_pin),
			user: Some(f.bob.clone()),
			body: None,
			expected_status: StatusCode::NOT_FOUND,
		},
		AuthzCase {
			name: "anonymous write needs credentials",
			method: Method::PUT,
			path: format!("/api/workflow-data/{}/w1", f.private_pin),
			user: None,
			body: Some(json!({"progress": 1})),
			expected_status: StatusCode::UNAUTHORIZED,
		},
		AuthzCase {
			name: "unknown workflow id",
			method: Method::GET,
			path: format!("/api/workflow-data/{}/w-none", f.public_pin),
			user: Some(f.alice.clone()),
			body: None,
			expected_status: StatusCode::NOT_FOUND,
		},
	];

	run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn put_replaces_payload_and_stamps_last_update() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let path = format!("/api/workflow-data/{}/w1", f.private_pin);

	app
		.put(&path, Some(&f.alice), json!({"step": 1, "status": "running"}))
		.await;
	let response = app.put(&path, Some(&f.alice), json!({"step": 2})).await;
	assert_eq!(response.status(), StatusCode::OK);

	let body = body_json(response).await;
	assert_eq!(body["pin_id"], f.private_pin.as_str());
	assert_eq!(body["workflow_id"], "w1");
	assert_eq!(body["data"]["step"], 2);
	assert!(body["data"].get("status").is_none());
	assert!(body["data"]["last_update"].is_string());
}

#[tokio::test]
async fn body_api_key_authenticates_and_is_not_stored() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let key = app
		.issue_api_key(&f.alice, &[Permission::WorkflowDataWrite])
		.await;
	let path = format!("/api/workflow-data/{}/ci", f.private_pin);

	let response = app
		.put(&path, None, json!({"api_key": key, "build": 42}))
		.await;
	assert_eq!(response.status(), StatusCode::OK);

	let stored = body_json(app.get(&path, Some(&f.alice)).await).await;
	assert_eq!(stored["data"]["build"], 42);
	assert!(stored["data"].get("api_key").is_none());
}

#[tokio::test]
async fn key_without_write_grant_is_forbidden() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let key = app.issue_api_key(&f.alice, &[Permission::PinsRead]).await;

	let response = app
		.put(
			&format!("/api/workflow-data/{}/ci", f.private_pin),
			None,
			json!({"api_key": key, "build": 1}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::FORBIDDEN);
	assert_eq!(body_json(response).await["error"], "PERMISSION_DENIED");
}

#[tokio::test]
async fn list_returns_every_workflow_of_the_pin() {
	let app = TestApp::new().await;
	let f = &app.fixtures;

	for wid in ["build", "deploy"] {
		app
			.put(
				&format!("/api/workflow-data/{}/{wid}", f.private_pin),
				Some(&f.alice),
				json!({"ok": true}),
			)
			.await;
	}

	let listed = body_json(
		app
			.get(&format!("/api/workflow-data/{}", f.private_pin), Some(&f.alice))
			.await,
	)
	.await;
	let workflows = listed["workflows"].as_object().unwrap();
	assert_eq!(workflows.len(), 2);
	assert_eq!(workflows["deploy"]["ok"], true);

	let hidden = app
		.get(&format!("/api/workflow-data/{}", f.private_pin), Some(&f.bob))
		.await;
	assert_eq!(hidden.status(), StatusCode::NOT_FOUND);
}
