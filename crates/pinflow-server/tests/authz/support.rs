// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::{
	body::Body,
	http::{header::AUTHORIZATION, HeaderValue, Method, Request, StatusCode},
	response::Response,
	Router,
};
use pinflow_server::{create_app_state, create_router, AppState, ServerConfig};
use pinflow_server_auth::{HmacTokenVerifier, Permission, UserId};
use pinflow_server_config::{AuthConfig, SecretString};
use pinflow_server_db::{
	testing::create_test_store, DocumentStore, NewPin, NewPinboard, PinContent,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const TOKEN_SECRET: &str = "authz-test-token-secret";
pub const API_KEY_SALT: &str = "authz-test-salt";

#[derive(Clone)]
pub struct TestUser {
	pub id: UserId,
	pub authorization: String,
}

impl TestUser {
	fn with_token(uid: &str) -> Self {
		let token = HmacTokenVerifier::new(TOKEN_SECRET)
			.issue_for(uid, Some(format!("{uid}@example.com")), chrono::Duration::hours(1))
			.unwrap();
		Self {
			id: UserId::new(uid),
			authorization: format!("Bearer {token}"),
		}
	}

	/// A caller authenticating with a plaintext API key.
	pub fn with_api_key(owner: &UserId, key: &str) -> Self {
		Self {
			id: owner.clone(),
			authorization: format!("ApiKey {key}"),
		}
	}

	pub fn auth_header(&self) -> HeaderValue {
		HeaderValue::from_str(&self.authorization).unwrap()
	}
}

#[derive(Clone)]
pub struct Fixtures {
	pub alice: TestUser,
	pub bob: TestUser,
	/// Owned by alice, private.
	pub private_pin: String,
	/// Owned by alice, public.
	pub public_pin: String,
	/// Owned by alice, private, empty.
	pub private_board: String,
	/// Owned by alice, public, holds both of alice's pins.
	pub public_board: String,
}

pub struct TestApp {
	pub router: Router,
	pub fixtures: Fixtures,
	pub state: AppState,
}

impl TestApp {
	pub async fn new() -> Self {
		Self::new_internal(false).await
	}

	pub async fn with_dev_mode() -> Self {
		Self::new_internal(true).await
	}

	async fn new_internal(dev_mode: bool) -> Self {
		let store: Arc<dyn DocumentStore> = create_test_store().await.unwrap();
		let config = ServerConfig {
			auth: AuthConfig {
				dev_mode,
				environment: "development".to_string(),
				api_key_salt: SecretString::new(API_KEY_SALT),
				token_secret: SecretString::new(TOKEN_SECRET),
			},
			..Default::default()
		};
		let state = create_app_state(store, &config);
		let fixtures = create_fixtures(&state).await;
		let router = create_router(state.clone());

		Self {
			router,
			fixtures,
			state,
		}
	}

	pub async fn get(&self, path: &str, user: Option<&TestUser>) -> Response<Body> {
		self
			.request(Method::GET, path, user, Option::<()>::None)
			.await
	}

	pub async fn post(
		&self,
		path: &str,
		user: Option<&TestUser>,
		body: impl Serialize,
	) -> Response<Body> {
		self.request(Method::POST, path, user, Some(body)).await
	}

	pub async fn put(
		&self,
		path: &str,
		user: Option<&TestUser>,
		body: impl Serialize,
	) -> Response<Body> {
		self.request(Method::PUT, path, user, Some(body)).await
	}

	pub async fn delete(&self, path: &str, user: Option<&TestUser>) -> Response<Body> {
		self
			.request(Method::DELETE, path, user, Option::<()>::None)
			.await
	}

	async fn request<T: Serialize>(
		&self,
		method: Method,
		path: &str,
		user: Option<&TestUser>,
		body: Option<T>,
	) -> Response<Body> {
		let mut builder = Request::builder().method(method).uri(path);

		if let Some(test_user) = user {
			builder = builder.header(AUTHORIZATION, test_user.auth_header());
		}

		let request_body = match body {
			Some(b) => {
				builder = builder.header("content-type", "application/json");
				Body::from(serde_json::to_string(&b).unwrap())
			}
			None => Body::empty(),
		};

		let request = builder.body(request_body).unwrap();

		self.router.clone().oneshot(request).await.unwrap()
	}

	/// Issue an API key for `owner` through the HTTP surface.
	pub async fn issue_api_key(&self, owner: &TestUser, permissions: &[Permission]) -> String {
		let grants: Vec<&str> = permissions.iter().map(Permission::as_str).collect();
		let response = self
			.post(
				"/api/auth/api-keys",
				Some(owner),
				serde_json::json!({"name": "test key", "permissions": grants}),
			)
			.await;
		assert_eq!(response.status(), StatusCode::CREATED);
		body_json(response).await["key"]
			.as_str()
			.unwrap()
			.to_string()
	}
}

pub async fn body_json(response: Response<Body>) -> Value {
	let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
		.await
		.unwrap();
	serde_json::from_slice(&bytes).unwrap()
}

pub struct AuthzCase {
	pub name: &'static str,
	pub method: Method,
	pub path: String,
	pub user: Option<TestUser>,
	pub body: Option<Value>,
	pub expected_status: StatusCode,
}

pub async fn run_authz_cases(app: &TestApp, cases: &[AuthzCase]) {
	for case in cases {
		let response = match (&case.method, &case.body) {
			(m, Some(body)) if *m == Method::POST => {
				app.post(&case.path, case.user.as_ref(), body.clone()).await
			}
			(m, Some(body)) if *m == Method::PUT => {
				app.put(&case.path, case.user.as_ref(), body.clone()).await
			}
			(m, _) if *m == Method::DELETE => app.delete(&case.path, case.user.as_ref()).await,
			_ => app.get(&case.path, case.user.as_ref()).await,
		};

		if response.status() != case.expected_status {
			let (parts, body) = response.into_parts();
			let body_bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
			let body_str = String::from_utf8_lossy(&body_bytes);
			panic!(
				"Case '{}': {} {} - expected {}, got {}\nResponse body: {}",
				case.name, case.method, case.path, case.expected_status, parts.status, body_str
			);
		}
	}
}

async fn create_fixtures(state: &AppState) -> Fixtures {
	let alice = TestUser::with_token("alice");
	let bob = TestUser::with_token("bob");

	let private_pin = state
		.pins
		.create_pin(NewPin::new(
			alice.id.clone(),
			"Private report",
			PinContent::Markdown("# private".to_string()),
		))
		.await
		.unwrap();

	let mut public = NewPin::new(
		alice.id.clone(),
		"Public report",
		PinContent::Markdown("# public".to_string()),
	);
	public.is_public = true;
	let public_pin = state.pins.create_pin(public).await.unwrap();

	let private_board = state
		.pinboards
		.create_pinboard(NewPinboard::new(alice.id.clone(), "Private board"))
		.await
		.unwrap();

	let mut board = NewPinboard::new(alice.id.clone(), "Public board");
	board.is_public = true;
	board.pins = vec![private_pin.clone(), public_pin.clone()];
	let public_board = state.pinboards.create_pinboard(board).await.unwrap();

	Fixtures {
		alice,
		bob,
		private_pin,
		public_pin,
		private_board,
		public_board,
	}
}
