// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The draft-hub HTTP binary: loads configuration, runs migrations, wires
//! the router, and serves until `SIGINT`/`SIGTERM`.

mod config;

use anyhow::{Context, Result};
use config::ServerConfig;
use drafthub_api::{router::build_router, AppState};
use drafthub_hub::Hub;
use drafthub_store::{run_migrations, PgCostPresetRepository, PgSessionRepository};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::load().context("load configuration")?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs))
        .connect(&config.database_url)
        .await
        .context("connect to postgres")?;
    run_migrations(&pool).await.context("run migrations")?;

    let sessions = Arc::new(PgSessionRepository::new(pool.clone()));
    let presets = Arc::new(PgCostPresetRepository::new(pool));
    let hub = Arc::new(Hub::new());
    let state = AppState::new(sessions, presets, hub);

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("bind {}", config.listen))?;

    info!(listen = %config.listen, "draft-hub listening");
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve")?;

    Ok(())
}

/// Resolves once `SIGINT` (Ctrl+C) or, on Unix, `SIGTERM` is received —
/// the same dual-signal shutdown trigger `echo-session-ws-gateway::main`
/// installs via `tokio::signal`, adapted to axum's built-in graceful-shutdown
/// future instead of an `axum_server::Handle`.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install sigterm handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("shutdown signal received");
}
