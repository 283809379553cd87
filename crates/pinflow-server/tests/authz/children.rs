// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Blocks and datasets inherit access from their pin.

use axum::http::{Method, StatusCode};
use pinflow_server_db::DocumentStore;
use serde_json::json;

use super::support::{body_json, run_authz_cases, AuthzCase, TestApp};

#[tokio::test]
async fn children_follow_parent_pin() {
	let app = TestApp::new().await;
	let f = app.fixtures.clone();
	let block = json!({"name": "intro", "type": "markdown", "template": "# {{title}}"});

	let cases = vec![
		AuthzCase {
			name: "owner adds block",
			method: Method::POST,
			path: format!("/api/pins/{}/blocks", f.private_pin),
			user: Some(f.alice.clone()),
			body: Some(block.clone()),
			expected_status: StatusCode::CREATED,
		},
		AuthzCase {
			name: "stranger cannot add block to private pin",
			method: Method::POST,
			path: format!("/api/pins/{}/blocks", f.private_pin),
			user: Some(f.bob.clone()),
			body: Some(block.clone()),
			expected_status: StatusCode::NOT_FOUND,
		},
		AuthzCase {
			name: "stranger cannot add block to public pin",
			method: Method::POST,
			path: format!("/api/pins/{}/blocks", f.public_pin),
			user: Some(f.bob.clone()),
			body: Some(block.clone()),
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "stranger lists blocks of public pin",
			method: Method::GET,
			path: format!("/api/pins/{}/blocks", f.public_pin),
			user: Some(f.bob.clone()),
			body: None,
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "stranger cannot list datasets of private pin",
			method: Method::GET,
			path: format!("/api/pins/{}/datasets", f.private_pin),
			user: Some(f.bob.clone()),
			body: None,
			expected_status: StatusCode::NOT_FOUND,
		},
		AuthzCase {
			name: "block under missing pin",
			method: Method::POST,
			path: "/api/pins/p-missing/blocks".to_string(),
			user: Some(f.alice.clone()),
			body: Some(block.clone()),
			expected_status: StatusCode::NOT_FOUND,
		},
	];

	run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn blocks_are_listed_by_order() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let path = format!("/api/pins/{}/blocks", f.private_pin);

	for (name, order) in [("third", 2), ("first", 0), ("second", 1)] {
		let response = app
			.post(
				&path,
				Some(&f.alice),
				json!({"name": name, "type": "markdown", "order": order}),
			)
			.await;
		assert_eq!(response.status(), StatusCode::CREATED);
	}

	let listed = body_json(app.get(&path, Some(&f.alice)).await).await;
	let names: Vec<&str> = listed["blocks"]
		.as_array()
		.unwrap()
		.iter()
		.map(|b| b["name"].as_str().unwrap())
		.collect();
	assert_eq!(names, ["first", "second", "third"]);

	let detail = body_json(
		app
			.get(&format!("/api/pins/{}", f.private_pin), Some(&f.alice))
			.await,
	)
	.await;
	assert_eq!(detail["blocks"][0]["name"], "first");
}

#[tokio::test]
async fn block_update_and_delete() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let created = app
		.post(
			&format!("/api/pins/{}/blocks", f.private_pin),
			Some(&f.alice),
			json!({"name": "chart", "type": "mermaid"}),
		)
		.await;
	let id = body_json(created).await["id"].as_str().unwrap().to_string();
	let path = format!("/api/pins/{}/blocks/{id}", f.private_pin);

	let updated = app
		.put(&path, Some(&f.alice), json!({"template": "graph TD; A-->B"}))
		.await;
	assert_eq!(updated.status(), StatusCode::OK);
	let block = body_json(updated).await;
	assert_eq!(block["type"], "mermaid");
	assert_eq!(block["template"], "graph TD; A-->B");

	assert_eq!(app.delete(&path, Some(&f.alice)).await.status(), StatusCode::OK);
	assert_eq!(app.get(&path, Some(&f.alice)).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn json_dataset_text_is_parsed() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let collection = format!("/api/pins/{}/datasets", f.private_pin);

	let created = app
		.post(
			&collection,
			Some(&f.alice),
			json!({"name": "metrics", "type": "json", "data": "{\"rows\": [1, 2, 3]}"}),
		)
		.await;
	assert_eq!(created.status(), StatusCode::CREATED);
	let id = body_json(created).await["id"].as_str().unwrap().to_string();

	let dataset = body_json(
		app
			.get(&format!("{collection}/{id}"), Some(&f.alice))
			.await,
	)
	.await;
	assert_eq!(dataset["data"], json!({"rows": [1, 2, 3]}));
	assert_eq!(dataset["metadata"]["type"], "json");
	assert_eq!(dataset["metadata"]["createdBy"], "alice");
}

#[tokio::test]
async fn invalid_json_dataset_is_rejected_and_not_stored() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let collection = format!("/api/pins/{}/datasets", f.private_pin);

	let response = app
		.post(
			&collection,
			Some(&f.alice),
			json!({"name": "broken", "type": "json", "data": "{not json"}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(body_json(response).await["error"], "VALIDATION_ERROR");

	let listed = body_json(app.get(&collection, Some(&f.alice)).await).await;
	assert_eq!(listed["datasets"], json!([]));
}

#[tokio::test]
async fn markdown_dataset_is_wrapped() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let collection = format!("/api/pins/{}/datasets", f.private_pin);

	let created = app
		.post(
			&collection,
			Some(&f.alice),
			json!({"name": "notes", "type": "markdown", "data": "# findings"}),
		)
		.await;
	let id = body_json(created).await["id"].as_str().unwrap().to_string();

	let dataset = body_json(
		app
			.get(&format!("{collection}/{id}"), Some(&f.alice))
			.await,
	)
	.await;
	assert_eq!(dataset["data"], json!({"content": "# findings"}));
}

#[tokio::test]
async fn deleting_a_pin_removes_its_children() {
	let app = TestApp::new().await;
	let f = &app.fixtures;

	app
		.post(
			&format!("/api/pins/{}/blocks", f.private_pin),
			Some(&f.alice),
			json!({"name": "intro", "type": "markdown"}),
		)
		.await;
	app
		.post(
			&format!("/api/pins/{}/datasets", f.private_pin),
			Some(&f.alice),
			json!({"name": "d", "type": "json", "data": {"a": 1}}),
		)
		.await;
	app
		.put(
			&format!("/api/workflow-data/{}/w1", f.private_pin),
			Some(&f.alice),
			json!({"step": 1}),
		)
		.await;

	let deleted = app
		.delete(&format!("/api/pins/{}", f.private_pin), Some(&f.alice))
		.await;
	assert_eq!(deleted.status(), StatusCode::OK);

	let store = &app.state.store;
	for prefix in ["pin_blocks", "pin_datasets", "workflow_data"] {
		let remaining = store
			.children(&format!("{prefix}/{}", f.private_pin))
			.await
			.unwrap();
		assert!(remaining.is_empty(), "{prefix} left behind");
	}
}
