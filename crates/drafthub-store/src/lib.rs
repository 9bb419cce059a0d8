// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The Persistence Store and Cost Preset Store (spec.md §2, "external
//! collaborators"): Postgres-backed repositories, row shapes, and id/token
//! generation for draft sessions.

pub mod error;
pub mod ids;
pub mod repository;
pub mod row;

pub use error::StoreError;
pub use repository::{
    CostPresetRepository, PgCostPresetRepository, PgSessionRepository, SessionPatch,
    SessionRepository,
};
pub use row::{CostPresetRow, NewSession, SessionRow};

/// Run pending migrations against `pool`. Idempotent.
pub async fn run_migrations(pool: &sqlx::PgPool) -> Result<(), StoreError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
