// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Cost Preset endpoints (spec.md §4.6). Trivial except for two invariants:
//! a per-owner preset cap, and `ON DELETE SET NULL` semantics on removal
//! (enforced by the `drafthub-store` migration, not here).

use crate::auth::OwnerId;
use crate::dto::CreatePresetRequest;
use crate::error::{ApiError, ApiResult};
use crate::state::{AppState, MAX_PRESETS_PER_OWNER};
use axum::extract::{Path, State};
use axum::Json;
use drafthub_proto::CostPreset;
use uuid::Uuid;

/// POST `/presets` — owner-authenticated.
pub async fn create_preset(
    State(state): State<AppState>,
    OwnerId(owner_user_id): OwnerId,
    Json(req): Json<CreatePresetRequest>,
) -> ApiResult<Json<CostPreset>> {
    if !state.owner_limiter.check(&owner_user_id) {
        return Err(ApiError::rate_limited());
    }
    if req.name.chars().count() > 40 {
        return Err(ApiError::Validation("name exceeds 40 characters".into()));
    }

    let char_cost = serde_json::to_value(&req.char_cost).map_err(|e| ApiError::Internal(e.into()))?;
    let accessory_cost =
        serde_json::to_value(&req.accessory_cost).map_err(|e| ApiError::Internal(e.into()))?;
    // Count-then-insert happens atomically inside `create` (a per-owner
    // advisory lock over one transaction), so two concurrent requests from
    // the same owner can't both slip past the cap.
    let row = state
        .presets
        .create(
            &owner_user_id,
            &req.name,
            &char_cost,
            &accessory_cost,
            MAX_PRESETS_PER_OWNER,
        )
        .await?;
    Ok(Json(row.into_preset()?))
}

/// GET `/presets` — owner-authenticated listing.
pub async fn list_presets(
    State(state): State<AppState>,
    OwnerId(owner_user_id): OwnerId,
) -> ApiResult<Json<Vec<CostPreset>>> {
    let rows = state.presets.list_by_owner(&owner_user_id).await?;
    let presets = rows
        .into_iter()
        .map(|r| r.into_preset())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(presets))
}

/// DELETE `/presets/:id` — owner-authenticated; referencing sessions are left
/// valid, their `costProfileId` cleared by the foreign key (spec.md §4.6).
pub async fn delete_preset(
    State(state): State<AppState>,
    OwnerId(owner_user_id): OwnerId,
    Path(id): Path<Uuid>,
) -> ApiResult<axum::http::StatusCode> {
    if !state.owner_limiter.check(&owner_user_id) {
        return Err(ApiError::rate_limited());
    }
    let preset = state.presets.find_by_id(id).await?.ok_or(ApiError::NotFound)?;
    if preset.owner_user_id != owner_user_id {
        return Err(ApiError::Unauthorized);
    }
    state.presets.delete(id).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
