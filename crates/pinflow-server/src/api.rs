// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Application state and router.

use axum::{
	middleware::from_fn_with_state,
	routing::{delete, get, post, put},
	Router,
};
use pinflow_server_auth::{AccessPolicy, HmacTokenVerifier, IdentityResolver};
use pinflow_server_config::ServerConfig;
use pinflow_server_db::{
	ApiKeyRepository, BlockRepository, DatasetRepository, DocumentStore, PinRepository,
	PinboardRepository, UserRepository, WorkflowDataRepository,
};
use std::sync::Arc;

use crate::{access::AccessGuard, auth_middleware::auth_layer, routes};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
	pub store: Arc<dyn DocumentStore>,
	pub pins: PinRepository,
	pub blocks: BlockRepository,
	pub datasets: DatasetRepository,
	pub pinboards: PinboardRepository,
	pub api_keys: ApiKeyRepository,
	pub users: UserRepository,
	pub workflow_data: WorkflowDataRepository,
	pub resolver: Arc<IdentityResolver>,
	pub guard: AccessGuard,
}

/// Translate the configuration section into the auth crate's view of it.
pub fn auth_config(config: &ServerConfig) -> pinflow_server_auth::AuthConfig {
	pinflow_server_auth::AuthConfig::new()
		.with_dev_mode(config.auth.dev_mode)
		.with_environment(config.auth.environment.clone())
}

/// Build the state around an already migrated document store.
pub fn create_app_state(store: Arc<dyn DocumentStore>, config: &ServerConfig) -> AppState {
	let auth = auth_config(config);
	let pins = PinRepository::new(store.clone());
	let pinboards = PinboardRepository::new(store.clone());
	let api_keys = ApiKeyRepository::new(store.clone());

	let verifier = Arc::new(HmacTokenVerifier::new(config.auth.token_secret.expose()));
	let resolver = IdentityResolver::new(
		auth.clone(),
		verifier,
		Arc::new(api_keys.clone()),
		config.auth.api_key_salt.expose(),
	);
	let guard = AccessGuard::new(
		AccessPolicy::from_config(&auth),
		pins.clone(),
		pinboards.clone(),
	);

	AppState {
		pins,
		blocks: BlockRepository::new(store.clone()),
		datasets: DatasetRepository::new(store.clone()),
		pinboards,
		api_keys,
		users: UserRepository::new(store.clone()),
		workflow_data: WorkflowDataRepository::new(store.clone()),
		resolver: Arc::new(resolver),
		guard,
		store,
	}
}

pub fn create_router(state: AppState) -> Router {
	// Routes that never look at credentials
	let open = Router::new()
		.route("/health", get(routes::health::health_check))
		.route("/api/users", post(routes::users::upsert_user))
		.route("/api/users/{uid}", get(routes::users::get_user));

	let resolved = Router::new()
		// Pins
		.route("/api/pins/send", post(routes::pins::send_pin))
		.route("/api/pins", get(routes::pins::list_pins))
		.route(
			"/api/pins/{pid}",
			get(routes::pins::get_pin)
				.put(routes::pins::update_pin)
				.delete(routes::pins::delete_pin),
		)
		.route("/api/pins/{pid}/publish", post(routes::pins::publish_pin))
		.route("/api/pins/{pid}/unpublish", post(routes::pins::unpublish_pin))
		// Blocks
		.route(
			"/api/pins/{pid}/blocks",
			post(routes::blocks::create_block).get(routes::blocks::list_blocks),
		)
		.route(
			"/api/pins/{pid}/blocks/{block_id}",
			get(routes::blocks::get_block)
				.put(routes::blocks::update_block)
				.delete(routes::blocks::delete_block),
		)
		// Datasets
		.route(
			"/api/pins/{pid}/datasets",
			post(routes::datasets::create_dataset).get(routes::datasets::list_datasets),
		)
		.route(
			"/api/pins/{pid}/datasets/{dataset_id}",
			get(routes::datasets::get_dataset)
				.put(routes::datasets::update_dataset)
				.delete(routes::datasets::delete_dataset),
		)
		// Pinboards
		.route(
			"/api/pinboards",
			post(routes::pinboards::create_pinboard).get(routes::pinboards::list_pinboards),
		)
		.route(
			"/api/pinboards/{id}",
			get(routes::pinboards::get_pinboard)
				.put(routes::pinboards::update_pinboard)
				.delete(routes::pinboards::delete_pinboard),
		)
		.route("/api/pinboards/{id}/pins", post(routes::pinboards::add_pin))
		.route(
			"/api/pinboards/{id}/pins/{pin_id}",
			delete(routes::pinboards::remove_pin),
		)
		// Public views
		.route("/api/public/pins/{pid}", get(routes::public::get_public_pin))
		.route(
			"/api/public/pinboards/{id}",
			get(routes::public::get_public_pinboard),
		)
		// Workflow data
		.route(
			"/api/workflow-data/{pid}",
			get(routes::workflow_data::list_workflow_data),
		)
		.route(
			"/api/workflow-data/{pid}/{wid}",
			put(routes::workflow_data::put_workflow_data).get(routes::workflow_data::get_workflow_data),
		)
		// API keys
		.route(
			"/api/auth/api-keys",
			post(routes::api_keys::create_api_key).get(routes::api_keys::list_api_keys),
		)
		.route(
			"/api/auth/api-keys/{key_id}",
			get(routes::api_keys::get_api_key).delete(routes::api_keys::revoke_api_key),
		)
		.layer(from_fn_with_state(state.clone(), auth_layer));

	open.merge(resolved).with_state(state)
}
