// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::http::{Method, StatusCode};
use serde_json::json;

use super::support::{body_json, run_authz_cases, AuthzCase, TestApp};

#[tokio::test]
async fn pin_routes_follow_ownership_and_visibility() {
	let app = TestApp::new().await;
	let f = app.fixtures.clone();

	let cases = vec![
		AuthzCase {
			name: "owner reads private pin",
			method: Method::GET,
			path: format!("/api/pins/{}", f.private_pin),
			user: Some(f.alice.clone()),
			body: None,
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "stranger cannot see private pin",
			method: Method::GET,
			path: format!("/api/pins/{}", f.private_pin),
			user: Some(f.bob.clone()),
			body: None,
			expected_status: StatusCode::NOT_FOUND,
		},
		AuthzCase {
			name: "anonymous read needs credentials",
			method: Method::GET,
			path: format!("/api/pins/{}", f.private_pin),
			user: None,
			body: None,
			expected_status: StatusCode::UNAUTHORIZED,
		},
		AuthzCase {
			name: "stranger reads public pin",
			method: Method::GET,
			path: format!("/api/pins/{}", f.public_pin),
			user: Some(f.bob.clone()),
			body: None,
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "stranger cannot edit public pin",
			method: Method::PUT,
			path: format!("/api/pins/{}", f.public_pin),
			user: Some(f.bob.clone()),
			body: Some(json!({"title": "mine now"})),
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "stranger cannot edit private pin",
			method: Method::PUT,
			path: format!("/api/pins/{}", f.private_pin),
			user: Some(f.bob.clone()),
			body: Some(json!({"title": "mine now"})),
			expected_status: StatusCode::NOT_FOUND,
		},
		AuthzCase {
			name: "stranger cannot delete private pin",
			method: Method::DELETE,
			path: format!("/api/pins/{}", f.private_pin),
			user: Some(f.bob.clone()),
			body: None,
			expected_status: StatusCode::NOT_FOUND,
		},
		AuthzCase {
			name: "stranger cannot publish",
			method: Method::POST,
			path: format!("/api/pins/{}/publish", f.public_pin),
			user: Some(f.bob.clone()),
			body: Some(json!({})),
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "missing pin",
			method: Method::GET,
			path: "/api/pins/p-does-not-exist".to_string(),
			user: Some(f.alice.clone()),
			body: None,
			expected_status: StatusCode::NOT_FOUND,
		},
	];

	run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn send_creates_pin_owned_by_caller() {
	let app = TestApp::new().await;
	let alice = &app.fixtures.alice;

	let response = app
		.post(
			"/api/pins/send",
			Some(alice),
			json!({"title": "Weekly", "content": "# numbers", "tags": ["ops"]}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::CREATED);
	let id = body_json(response).await["id"].as_str().unwrap().to_string();

	let detail = body_json(app.get(&format!("/api/pins/{id}"), Some(alice)).await).await;
	assert_eq!(detail["pin"]["user_id"], "alice");
	assert_eq!(detail["pin"]["data_type"], "markdown");
	assert_eq!(detail["pin"]["metadata"]["title"], "Weekly");
	assert_eq!(detail["pin"]["permissions"]["is_public"], false);
	assert_eq!(detail["blocks"], json!([]));
	assert_eq!(detail["datasets"], json!([]));
}

#[tokio::test]
async fn send_without_credentials_is_rejected() {
	let app = TestApp::new().await;
	let response = app
		.post("/api/pins/send", None, json!({"content": "# hi"}))
		.await;
	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
	assert_eq!(body_json(response).await["error"], "AUTH_REQUIRED");
}

#[tokio::test]
async fn send_rejects_content_that_does_not_fit_type() {
	let app = TestApp::new().await;
	let response = app
		.post(
			"/api/pins/send",
			Some(&app.fixtures.alice),
			json!({"data_type": "text", "content": {"not": "a string"}}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(body_json(response).await["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn list_is_scoped_to_caller_and_paginated() {
	let app = TestApp::new().await;
	let f = &app.fixtures;

	let page = body_json(app.get("/api/pins?limit=1", Some(&f.alice)).await).await;
	assert_eq!(page["total"], 2);
	assert_eq!(page["limit"], 1);
	assert_eq!(page["offset"], 0);
	assert_eq!(page["pins"].as_array().unwrap().len(), 1);

	let clamped = body_json(app.get("/api/pins?limit=1000", Some(&f.alice)).await).await;
	assert_eq!(clamped["limit"], 100);

	let bobs = body_json(app.get("/api/pins", Some(&f.bob)).await).await;
	assert_eq!(bobs["total"], 0);
}

#[tokio::test]
async fn owner_update_changes_title() {
	let app = TestApp::new().await;
	let f = &app.fixtures;

	let response = app
		.put(
			&format!("/api/pins/{}", f.private_pin),
			Some(&f.alice),
			json!({"title": "Renamed"}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::OK);
	let pin = body_json(response).await;
	assert_eq!(pin["metadata"]["title"], "Renamed");
	assert_eq!(pin["content"], "# private");
}

#[tokio::test]
async fn delete_removes_pin_from_listing() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let path = format!("/api/pins/{}", f.private_pin);

	assert_eq!(app.delete(&path, Some(&f.alice)).await.status(), StatusCode::OK);
	assert_eq!(app.get(&path, Some(&f.alice)).await.status(), StatusCode::NOT_FOUND);

	let page = body_json(app.get("/api/pins", Some(&f.alice)).await).await;
	assert_eq!(page["total"], 1);
	assert_eq!(page["pins"][0]["id"], f.public_pin.as_str());
}

#[tokio::test]
async fn publish_and_unpublish_toggle_public_view() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let public_path = format!("/api/public/pins/{}", f.private_pin);

	assert_eq!(app.get(&public_path, None).await.status(), StatusCode::NOT_FOUND);

	let published = app
		.post(
			&format!("/api/pins/{}/publish", f.private_pin),
			Some(&f.alice),
			json!({}),
		)
		.await;
	assert_eq!(published.status(), StatusCode::OK);
	let pin = body_json(published).await;
	assert_eq!(pin["permissions"]["is_public"], true);
	assert_eq!(pin["metadata"]["is_public"], true);
	assert_eq!(app.get(&public_path, None).await.status(), StatusCode::OK);

	app
		.post(
			&format!("/api/pins/{}/unpublish", f.private_pin),
			Some(&f.alice),
			json!({}),
		)
		.await;
	assert_eq!(app.get(&public_path, None).await.status(), StatusCode::NOT_FOUND);
}
