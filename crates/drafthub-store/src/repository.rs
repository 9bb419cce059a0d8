// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Repository ports for the Persistence Store and Cost Preset Store
//! (spec.md §2, "external collaborators"), plus their Postgres adapters.

use crate::error::StoreError;
use crate::row::{CostPresetRow, NewSession, SessionRow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Partial update applied by an owner (spec.md §4.5, "Owner Update"). `None`
/// fields are left untouched; `cost_profile_id` is itself an `Option<Uuid>`,
/// so clearing it is `Some(None)` and leaving it alone is `None`.
#[derive(Debug, Clone, Default)]
pub struct SessionPatch {
    pub state: Option<serde_json::Value>,
    pub is_complete: Option<bool>,
    pub featured: Option<serde_json::Value>,
    pub cost_profile_id: Option<Option<Uuid>>,
    pub cost_limit: Option<f64>,
    pub penalty_per_point: Option<i32>,
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, id: &str, new: &NewSession, blue_token: &str, red_token: &str) -> Result<SessionRow, StoreError>;
    async fn find_by_id(&self, session_key: &str) -> Result<Option<SessionRow>, StoreError>;
    /// The owner's single open (not-yet-complete) session, if any (spec.md
    /// §4.5, "if the owner already has an open session, returns that
    /// session's identifiers and tokens rather than creating a new one").
    async fn find_open_by_owner(&self, owner_user_id: &str) -> Result<Option<SessionRow>, StoreError>;
    /// Persist the state produced by a player action; bumps `last_activity_at`
    /// and `version`. No other column changes (spec.md §4.5, "Apply Action").
    /// `expected_version` must match the row's current `version` or the call
    /// fails with `StoreError::VersionConflict` instead of overwriting a
    /// write it never saw (spec.md §5, "per-session serialization").
    async fn update_state(
        &self,
        session_key: &str,
        state: &serde_json::Value,
        expected_version: i64,
        now: DateTime<Utc>,
    ) -> Result<SessionRow, StoreError>;
    /// Apply an owner's partial update (spec.md §4.5, "Owner Update"). Same
    /// `expected_version` guard as `update_state`.
    async fn apply_patch(
        &self,
        session_key: &str,
        patch: &SessionPatch,
        expected_version: i64,
        now: DateTime<Utc>,
    ) -> Result<SessionRow, StoreError>;
    /// Deletes the row. Callers must first check `!is_complete` (spec.md
    /// §3, "An unfinished session is deletable only by the owner").
    async fn delete(&self, session_key: &str) -> Result<(), StoreError>;
    /// Completed sessions, most recently completed first (spec.md §4.5, "Recent").
    async fn list_recent(&self, limit: i64, offset: i64) -> Result<Vec<SessionRow>, StoreError>;
    /// Incomplete sessions active within `window_minutes`, most recent first
    /// (spec.md §4.5, "Live").
    async fn list_live(&self, window_minutes: i64) -> Result<Vec<SessionRow>, StoreError>;
}

#[async_trait]
pub trait CostPresetRepository: Send + Sync {
    /// Counts the owner's existing presets and inserts the new one inside a
    /// single transaction serialized by a per-owner advisory lock, so two
    /// concurrent creates from the same owner cannot both pass the `limit`
    /// check before either commits (spec.md §4.6).
    async fn create(
        &self,
        owner_user_id: &str,
        name: &str,
        char_cost: &serde_json::Value,
        accessory_cost: &serde_json::Value,
        limit: i64,
    ) -> Result<CostPresetRow, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<CostPresetRow>, StoreError>;
    async fn list_by_owner(&self, owner_user_id: &str) -> Result<Vec<CostPresetRow>, StoreError>;
    async fn count_by_owner(&self, owner_user_id: &str) -> Result<i64, StoreError>;
    /// Removing a preset leaves referencing sessions valid: the
    /// `cost_profile_id` foreign key is `ON DELETE SET NULL` (spec.md §4.6).
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}

pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Distinguishes "no such session" from "version mismatch" after an
    /// `expected_version`-guarded update affected zero rows.
    async fn missing_or_conflict(&self, session_key: &str) -> Result<StoreError, StoreError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM sessions WHERE session_key = $1)")
                .bind(session_key)
                .fetch_one(&self.pool)
                .await?;
        Ok(if exists {
            StoreError::VersionConflict
        } else {
            StoreError::SessionNotFound
        })
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn create(&self, id: &str, new: &NewSession, blue_token: &str, red_token: &str) -> Result<SessionRow, StoreError> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            INSERT INTO sessions (
                session_key, owner_user_id, mode, team1, team2, state, featured,
                is_complete, completed_at, last_activity_at, blue_token, red_token,
                cost_profile_id, cost_limit, penalty_per_point
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, false, NULL, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&new.owner_user_id)
        .bind(&new.mode)
        .bind(&new.team1)
        .bind(&new.team2)
        .bind(&new.state)
        .bind(&new.featured)
        .bind(now)
        .bind(blue_token)
        .bind(red_token)
        .bind(new.cost_profile_id)
        .bind(new.cost_limit)
        .bind(new.penalty_per_point)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_by_id(&self, session_key: &str) -> Result<Option<SessionRow>, StoreError> {
        let row = sqlx::query_as::<_, SessionRow>("SELECT * FROM sessions WHERE session_key = $1")
            .bind(session_key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_open_by_owner(&self, owner_user_id: &str) -> Result<Option<SessionRow>, StoreError> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT * FROM sessions WHERE owner_user_id = $1 AND is_complete = false \
             ORDER BY last_activity_at DESC LIMIT 1",
        )
        .bind(owner_user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_state(
        &self,
        session_key: &str,
        state: &serde_json::Value,
        expected_version: i64,
        now: DateTime<Utc>,
    ) -> Result<SessionRow, StoreError> {
        let row = sqlx::query_as::<_, SessionRow>(
            "UPDATE sessions SET state = $1, last_activity_at = $2, version = version + 1 \
             WHERE session_key = $3 AND version = $4 RETURNING *",
        )
        .bind(state)
        .bind(now)
        .bind(session_key)
        .bind(expected_version)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(row),
            None => Err(self.missing_or_conflict(session_key).await?),
        }
    }

    async fn apply_patch(
        &self,
        session_key: &str,
        patch: &SessionPatch,
        expected_version: i64,
        now: DateTime<Utc>,
    ) -> Result<SessionRow, StoreError> {
        // `COALESCE` with a sentinel placeholder isn't usable for a nullable
        // FK we might want to *clear*, so each optional column gets its own
        // "leave as-is" guard via `$n IS NULL OR flag` expressed through
        // separate bound parameters instead.
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            UPDATE sessions SET
                state = COALESCE($1, state),
                is_complete = COALESCE($2, is_complete),
                completed_at = CASE
                    WHEN $2 = true AND is_complete = false THEN $3
                    ELSE completed_at
                END,
                featured = COALESCE($4, featured),
                cost_profile_id = CASE WHEN $5 THEN $6 ELSE cost_profile_id END,
                cost_limit = COALESCE($7, cost_limit),
                penalty_per_point = COALESCE($8, penalty_per_point),
                last_activity_at = $3,
                version = version + 1
            WHERE session_key = $9 AND version = $10
            RETURNING *
            "#,
        )
        .bind(&patch.state)
        .bind(patch.is_complete)
        .bind(now)
        .bind(&patch.featured)
        .bind(patch.cost_profile_id.is_some())
        .bind(patch.cost_profile_id.flatten())
        .bind(patch.cost_limit)
        .bind(patch.penalty_per_point)
        .bind(session_key)
        .bind(expected_version)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(row),
            None => Err(self.missing_or_conflict(session_key).await?),
        }
    }

    async fn delete(&self, session_key: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM sessions WHERE session_key = $1 AND is_complete = false")
            .bind(session_key)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::SessionNotFound);
        }
        Ok(())
    }

    async fn list_recent(&self, limit: i64, offset: i64) -> Result<Vec<SessionRow>, StoreError> {
        let rows = sqlx::query_as::<_, SessionRow>(
            "SELECT * FROM sessions WHERE is_complete = true \
             ORDER BY completed_at DESC NULLS LAST LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_live(&self, window_minutes: i64) -> Result<Vec<SessionRow>, StoreError> {
        let rows = sqlx::query_as::<_, SessionRow>(
            "SELECT * FROM sessions WHERE is_complete = false \
             AND last_activity_at >= now() - make_interval(mins => $1) \
             ORDER BY last_activity_at DESC",
        )
        .bind(window_minutes as i32)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

pub struct PgCostPresetRepository {
    pool: PgPool,
}

impl PgCostPresetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CostPresetRepository for PgCostPresetRepository {
    async fn create(
        &self,
        owner_user_id: &str,
        name: &str,
        char_cost: &serde_json::Value,
        accessory_cost: &serde_json::Value,
        limit: i64,
    ) -> Result<CostPresetRow, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Per-owner advisory lock held for the transaction: serializes
        // concurrent creates from the same owner so the count-then-insert
        // below can't race (spec.md §4.6, "at most `limit` presets").
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(owner_user_id)
            .execute(&mut *tx)
            .await?;

        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM cost_presets WHERE owner_user_id = $1")
                .bind(owner_user_id)
                .fetch_one(&mut *tx)
                .await?;
        if count >= limit {
            tx.rollback().await?;
            return Err(StoreError::PresetLimitExceeded(limit));
        }

        let row = sqlx::query_as::<_, CostPresetRow>(
            "INSERT INTO cost_presets (id, owner_user_id, name, char_cost, accessory_cost) \
             VALUES (gen_random_uuid(), $1, $2, $3, $4) RETURNING *",
        )
        .bind(owner_user_id)
        .bind(name)
        .bind(char_cost)
        .bind(accessory_cost)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CostPresetRow>, StoreError> {
        let row = sqlx::query_as::<_, CostPresetRow>("SELECT * FROM cost_presets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_by_owner(&self, owner_user_id: &str) -> Result<Vec<CostPresetRow>, StoreError> {
        let rows = sqlx::query_as::<_, CostPresetRow>(
            "SELECT * FROM cost_presets WHERE owner_user_id = $1 ORDER BY name",
        )
        .bind(owner_user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn count_by_owner(&self, owner_user_id: &str) -> Result<i64, StoreError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM cost_presets WHERE owner_user_id = $1")
                .bind(owner_user_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM cost_presets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::PresetNotFound);
        }
        Ok(())
    }
}
