// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::http::{Method, StatusCode};
use serde_json::json;

use super::support::{body_json, run_authz_cases, AuthzCase, TestApp};

#[tokio::test]
async fn public_views_hide_private_resources() {
	let app = TestApp::new().await;
	let f = app.fixtures.clone();

	let cases = vec![
		AuthzCase {
			name: "anonymous reads public pin",
			method: Method::GET,
			path: format!("/api/public/pins/{}", f.public_pin),
			user: None,
			body: None,
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "anonymous cannot see private pin",
			method: Method::GET,
			path: format!("/api/public/pins/{}", f.private_pin),
			user: None,
			body: None,
			expected_status: StatusCode::NOT_FOUND,
		},
		AuthzCase {
			name: "stranger cannot see private pin",
			method: Method::GET,
			path: format!("/api/public/pins/{}", f.private_pin),
			user: Some(f.bob.clone()),
			body: None,
			expected_status: StatusCode::NOT_FOUND,
		},
		AuthzCase {
			name: "owner sees own private pin",
			method: Method::GET,
			path: format!("/api/public/pins/{}", f.private_pin),
			user: Some(f.alice.clone()),
			body: None,
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "anonymous cannot see private board",
			method: Method::GET,
			path: format!("/api/public/pinboards/{}", f.private_board),
			user: None,
			body: None,
			expected_status: StatusCode::NOT_FOUND,
		},
		AuthzCase {
			name: "anonymous reads public board",
			method: Method::GET,
			path: format!("/api/public/pinboards/{}", f.public_board),
			user: None,
			body: None,
			expected_status: StatusCode::OK,
		},
	];

	run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn public_board_expands_only_readable_pins() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let path = format!("/api/public/pinboards/{}", f.public_board);

	let anonymous = body_json(app.get(&path, None).await).await;
	let ids: Vec<&str> = anonymous["pins"]
		.as_array()
		.unwrap()
		.iter()
		.map(|p| p["id"].as_str().unwrap())
		.collect();
	assert_eq!(ids, [f.public_pin.as_str()]);
	assert_eq!(anonymous["pinboard"]["pins"], json!([f.public_pin]));

	let stranger = body_json(app.get(&path, Some(&f.bob)).await).await;
	assert_eq!(stranger["pinboard"]["pins"], json!([f.public_pin]));
	assert!(!stranger.to_string().contains(f.private_pin.as_str()));

	let owner = body_json(app.get(&path, Some(&f.alice)).await).await;
	assert_eq!(owner["pins"].as_array().unwrap().len(), 2);
	assert_eq!(owner["pins"][0]["id"], f.private_pin.as_str());
	assert_eq!(
		owner["pinboard"]["pins"],
		json!([f.private_pin, f.public_pin])
	);
}

#[tokio::test]
async fn hidden_and_missing_resources_share_one_body() {
	let app = TestApp::new().await;
	let f = &app.fixtures;

	let pairs = [
		(
			format!("/api/public/pins/{}", f.private_pin),
			"/api/public/pins/pDOESNOTEXIST".to_string(),
		),
		(
			format!("/api/public/pinboards/{}", f.private_board),
			"/api/public/pinboards/bDOESNOTEXIST".to_string(),
		),
		(
			format!("/api/pins/{}", f.private_pin),
			"/api/pins/pDOESNOTEXIST".to_string(),
		),
	];
	for (hidden_path, missing_path) in pairs {
		let hidden = app.get(&hidden_path, Some(&f.bob)).await;
		let missing = app.get(&missing_path, Some(&f.bob)).await;
		assert_eq!(hidden.status(), StatusCode::NOT_FOUND, "{hidden_path}");
		assert_eq!(missing.status(), StatusCode::NOT_FOUND, "{missing_path}");
		let hidden = axum::body::to_bytes(hidden.into_body(), usize::MAX)
			.await
			.unwrap();
		let missing = axum::body::to_bytes(missing.into_body(), usize::MAX)
			.await
			.unwrap();
		assert_eq!(hidden, missing, "{hidden_path} vs {missing_path}");
	}
}

#[tokio::test]
async fn deleted_pins_are_skipped_on_expand() {
	let app = TestApp::new().await;
	let f = &app.fixtures;

	let deleted = app
		.delete(&format!("/api/pins/{}", f.public_pin), Some(&f.alice))
		.await;
	assert_eq!(deleted.status(), StatusCode::OK);

	let response = app
		.get(&format!("/api/public/pinboards/{}", f.public_board), Some(&f.alice))
		.await;
	assert_eq!(response.status(), StatusCode::OK);
	let body = body_json(response).await;
	assert_eq!(body["pinboard"]["pins"].as_array().unwrap().len(), 2);
	let pins = body["pins"].as_array().unwrap();
	assert_eq!(pins.len(), 1);
	assert_eq!(pins[0]["id"], f.private_pin.as_str());
}
