// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Store-level error type. Maps to the "Internal" and "Not found" error
//! classes at the API boundary (spec.md §7).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session not found")]
    SessionNotFound,
    #[error("cost preset not found")]
    PresetNotFound,
    #[error("owner already has {0} cost presets, the limit")]
    PresetLimitExceeded(i64),
    #[error("session was modified concurrently")]
    VersionConflict,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("state document is malformed: {0}")]
    Decode(#[from] serde_json::Error),
}
