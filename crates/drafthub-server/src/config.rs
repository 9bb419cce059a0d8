// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Process configuration: CLI flags layered over environment/`.env`, the way
//! `cebartling-nfl-draft-2026`'s workspace pulls in `config` + `dotenvy` for
//! its database URL and pool knobs, combined with `echo-session-ws-gateway`'s
//! `clap::Parser` `Args` shape for everything else.

use clap::Parser;
use serde::Deserialize;
use std::net::SocketAddr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read environment configuration: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Parser, Debug)]
#[command(author, version, about = "draft-hub HTTP service")]
struct Args {
    /// TCP listener for HTTP clients.
    #[arg(long, env = "DRAFTHUB_LISTEN", default_value = "0.0.0.0:8080")]
    listen: SocketAddr,
    /// Postgres connection string.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
    /// Maximum Postgres connections held in the pool.
    #[arg(long, env = "DRAFTHUB_DB_MAX_CONNECTIONS", default_value_t = 10)]
    db_max_connections: u32,
    /// Seconds to wait for a pool connection before failing.
    #[arg(long, env = "DRAFTHUB_DB_ACQUIRE_TIMEOUT_SECS", default_value_t = 5)]
    db_acquire_timeout_secs: u64,
}

/// Resolved process configuration. `database_url` is required but kept
/// optional on `Args` so a missing value produces a descriptive error
/// instead of a `clap` usage message that hides which env var was meant.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl ServerConfig {
    /// Loads `.env` (if present), then CLI flags, env vars named on each
    /// flag taking precedence over `.env`.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let args = Args::parse();
        let database_url = args
            .database_url
            .ok_or_else(|| config::ConfigError::NotFound("DATABASE_URL".into()))?;
        Ok(Self {
            listen: args.listen,
            database_url,
            db_max_connections: args.db_max_connections,
            db_acquire_timeout_secs: args.db_acquire_timeout_secs,
        })
    }
}
