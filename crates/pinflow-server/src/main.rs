// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! pinflow server binary.

use clap::Parser;
use pinflow_server::{create_app_state, create_router};
use pinflow_server_config::LogFormat;
use pinflow_server_db::{create_pool, run_migrations, DocumentStore, SqliteDocumentStore};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{
	cors::{Any, CorsLayer},
	trace::TraceLayer,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// pinflow server - pins, pinboards and live workflow data over HTTP.
#[derive(Parser, Debug)]
#[command(name = "pinflow-server", about = "Pins and pinboards server", version)]
struct Args {
	/// Config file to use instead of /etc/pinflow/server.toml
	#[arg(long, env = "PINFLOW_SERVER_CONFIG")]
	config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Load .env file if present
	dotenvy::dotenv().ok();

	let config = match &args.config {
		Some(path) => pinflow_server_config::load_config_with_file(path)?,
		None => pinflow_server_config::load_config()?,
	};

	let (pretty, json) = match config.logging.format {
		LogFormat::Pretty => (Some(fmt::layer()), None),
		LogFormat::Json => (None, Some(fmt::layer().json())),
	};
	tracing_subscriber::registry()
		.with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level)))
		.with(pretty)
		.with(json)
		.init();

	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		database = %config.database.url,
		"starting pinflow-server"
	);
	if config.auth.dev_mode {
		tracing::warn!("development auth bypass is enabled; every request acts as the development user");
	}
	if config.auth.token_secret.is_empty() {
		tracing::warn!("PINFLOW_SERVER_TOKEN_SECRET is empty; bearer tokens are signed with an empty key");
	}

	let pool = create_pool(&config.database.url).await?;
	run_migrations(&pool).await?;
	let store: Arc<dyn DocumentStore> = Arc::new(SqliteDocumentStore::new(pool));

	let state = create_app_state(store, &config);
	let app = create_router(state)
		.layer(TraceLayer::new_for_http())
		.layer(
			CorsLayer::new()
				.allow_origin(Any)
				.allow_methods(Any)
				.allow_headers(Any),
		);

	let addr = config.socket_addr();
	tracing::info!("listening on {}", addr);
	let listener = tokio::net::TcpListener::bind(&addr).await?;

	tokio::select! {
		result = axum::serve(listener, app) => {
			if let Err(e) = result {
				tracing::error!(error = %e, "Server error");
			}
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("Received shutdown signal");
		}
	}

	tracing::info!("Server shutdown complete");
	Ok(())
}
