// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::http::{Method, StatusCode};
use serde_json::json;

use super::support::{body_json, run_authz_cases, AuthzCase, TestApp};

#[tokio::test]
async fn pinboard_routes_follow_ownership_and_visibility() {
	let app = TestApp::new().await;
	let f = app.fixtures.clone();

	let cases = vec![
		AuthzCase {
			name: "owner reads private board",
			method: Method::GET,
			path: format!("/api/pinboards/{}", f.private_board),
			user: Some(f.alice.clone()),
			body: None,
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "stranger cannot see private board",
			method: Method::GET,
			path: format!("/api/pinboards/{}", f.private_board),
			user: Some(f.bob.clone()),
			body: None,
			expected_status: StatusCode::NOT_FOUND,
		},
		AuthzCase {
			name: "stranger reads public board",
			method: Method::GET,
			path: format!("/api/pinboards/{}", f.public_board),
			user: Some(f.bob.clone()),
			body: None,
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "stranger cannot rename public board",
			method: Method::PUT,
			path: format!("/api/pinboards/{}", f.public_board),
			user: Some(f.bob.clone()),
			body: Some(json!({"name": "hijacked"})),
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "stranger cannot add to private board",
			method: Method::POST,
			path: format!("/api/pinboards/{}/pins", f.private_board),
			user: Some(f.bob.clone()),
			body: Some(json!({"pin_id": f.public_pin})),
			expected_status: StatusCode::NOT_FOUND,
		},
		AuthzCase {
			name: "stranger cannot delete public board",
			method: Method::DELETE,
			path: format!("/api/pinboards/{}", f.public_board),
			user: Some(f.bob.clone()),
			body: None,
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "adding a missing pin",
			method: Method::POST,
			path: format!("/api/pinboards/{}/pins", f.private_board),
			user: Some(f.alice.clone()),
			body: Some(json!({"pin_id": "p-missing"})),
			expected_status: StatusCode::NOT_FOUND,
		},
	];

	run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn create_requires_a_name() {
	let app = TestApp::new().await;
	let alice = &app.fixtures.alice;

	let blank = app
		.post("/api/pinboards", Some(alice), json!({"name": "  "}))
		.await;
	assert_eq!(blank.status(), StatusCode::BAD_REQUEST);

	let created = app
		.post(
			"/api/pinboards",
			Some(alice),
			json!({"name": "Quarterly", "tags": ["finance"]}),
		)
		.await;
	assert_eq!(created.status(), StatusCode::CREATED);
	let id = body_json(created).await["id"].as_str().unwrap().to_string();

	let listed = body_json(app.get("/api/pinboards", Some(alice)).await).await;
	let ids: Vec<&str> = listed["pinboards"]
		.as_array()
		.unwrap()
		.iter()
		.map(|b| b["id"].as_str().unwrap())
		.collect();
	assert_eq!(ids.len(), 3);
	assert!(ids.contains(&id.as_str()));
}

#[tokio::test]
async fn adding_a_pin_twice_keeps_one_entry() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let path = format!("/api/pinboards/{}/pins", f.private_board);

	for _ in 0..2 {
		let response = app
			.post(&path, Some(&f.alice), json!({"pin_id": f.private_pin}))
			.await;
		assert_eq!(response.status(), StatusCode::OK);
	}

	let board = body_json(
		app
			.get(&format!("/api/pinboards/{}", f.private_board), Some(&f.alice))
			.await,
	)
	.await;
	assert_eq!(board["pins"], json!([f.private_pin]));
}

#[tokio::test]
async fn concurrent_adds_keep_both_pins() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let path = format!("/api/pinboards/{}/pins", f.private_board);

	let (first, second) = tokio::join!(
		app.post(&path, Some(&f.alice), json!({"pin_id": f.private_pin})),
		app.post(&path, Some(&f.alice), json!({"pin_id": f.public_pin})),
	);
	assert_eq!(first.status(), StatusCode::OK);
	assert_eq!(second.status(), StatusCode::OK);

	let board = body_json(
		app
			.get(&format!("/api/pinboards/{}", f.private_board), Some(&f.alice))
			.await,
	)
	.await;
	let pins = board["pins"].as_array().unwrap();
	assert_eq!(pins.len(), 2);
	assert!(pins.contains(&json!(f.private_pin)));
	assert!(pins.contains(&json!(f.public_pin)));
}

#[tokio::test]
async fn stranger_cannot_add_someone_elses_private_pin() {
	let app = TestApp::new().await;
	let f = &app.fixtures;

	let created = app
		.post("/api/pinboards", Some(&f.bob), json!({"name": "Bob's"}))
		.await;
	let board = body_json(created).await["id"].as_str().unwrap().to_string();
	let path = format!("/api/pinboards/{board}/pins");

	let private = app
		.post(&path, Some(&f.bob), json!({"pin_id": f.private_pin}))
		.await;
	assert_eq!(private.status(), StatusCode::NOT_FOUND);

	let public = app
		.post(&path, Some(&f.bob), json!({"pinId": f.public_pin}))
		.await;
	assert_eq!(public.status(), StatusCode::OK);
}

#[tokio::test]
async fn remove_pin_and_delete_board() {
	let app = TestApp::new().await;
	let f = &app.fixtures;

	let removed = app
		.delete(
			&format!("/api/pinboards/{}/pins/{}", f.public_board, f.private_pin),
			Some(&f.alice),
		)
		.await;
	assert_eq!(removed.status(), StatusCode::OK);
	assert_eq!(body_json(removed).await["pins"], json!([f.public_pin]));

	let board_path = format!("/api/pinboards/{}", f.public_board);
	assert_eq!(app.delete(&board_path, Some(&f.alice)).await.status(), StatusCode::OK);
	assert_eq!(app.get(&board_path, Some(&f.alice)).await.status(), StatusCode::NOT_FOUND);

	let listed = body_json(app.get("/api/pinboards", Some(&f.alice)).await).await;
	assert_eq!(listed["pinboards"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn replacing_pins_checks_each_new_pin() {
	let app = TestApp::new().await;
	let f = &app.fixtures;

	let created = app
		.post("/api/pinboards", Some(&f.bob), json!({"name": "Borrowed"}))
		.await;
	assert_eq!(created.status(), StatusCode::CREATED);
	let board_path = format!(
		"/api/pinboards/{}",
		body_json(created).await["id"].as_str().unwrap()
	);

	let hidden = app
		.put(&board_path, Some(&f.bob), json!({"pins": [f.private_pin]}))
		.await;
	assert_eq!(hidden.status(), StatusCode::NOT_FOUND);

	let missing = app
		.put(&board_path, Some(&f.bob), json!({"pins": ["pDOESNOTEXIST"]}))
		.await;
	assert_eq!(missing.status(), StatusCode::NOT_FOUND);

	let board = body_json(app.get(&board_path, Some(&f.bob)).await).await;
	assert_eq!(board["pins"], json!([]));

	let readable = app
		.put(&board_path, Some(&f.bob), json!({"pins": [f.public_pin]}))
		.await;
	assert_eq!(readable.status(), StatusCode::OK);
	assert_eq!(body_json(readable).await["pins"], json!([f.public_pin]));
}

#[tokio::test]
async fn owner_can_reorder_pins_already_on_the_board() {
	let app = TestApp::new().await;
	let f = &app.fixtures;

	let response = app
		.put(
			&format!("/api/pinboards/{}", f.public_board),
			Some(&f.alice),
			json!({"pins": [f.public_pin, f.private_pin]}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(
		body_json(response).await["pins"],
		json!([f.public_pin, f.private_pin])
	);
}
