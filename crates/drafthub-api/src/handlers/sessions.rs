// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Handlers for the Session API Surface (spec.md §4.5).

use crate::auth::{OwnerId, OWNER_HEADER};
use crate::dto::{
    CreateSessionRequest, CreateSessionResponse, ListResponse, LiveQuery, OwnerUpdateRequest,
    PaginationQuery, ResolveTokenQuery, ResolveTokenResponse,
};
use crate::error::{ApiError, ApiResult};
use crate::rate_limit::action_bucket_key;
use crate::state::{default_cost_limit, AppState};
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use drafthub_proto::{ActionRequest, FeaturedRule, Side, StateDocument, TimerFields};
use drafthub_store::{NewSession, SessionPatch, SessionRow};
use tracing::{info, warn};

const DEFAULT_PENALTY_PER_POINT: i32 = 2500;

fn requester_is_owner(headers: &HeaderMap, owner_user_id: &str) -> bool {
    headers
        .get(OWNER_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == owner_user_id)
}

pub(crate) async fn shape_row(
    state: &AppState,
    row: &SessionRow,
    include_tokens: bool,
) -> ApiResult<drafthub_proto::ShapedSession> {
    let preset = match row.cost_profile_id {
        Some(id) => state
            .presets
            .find_by_id(id)
            .await?
            .map(|p| p.into_preset())
            .transpose()?,
        None => None,
    };
    Ok(row.shape(preset, include_tokens)?)
}

fn build_initial_state(req: &CreateSessionRequest) -> Result<StateDocument, ApiError> {
    if req.draft_sequence.is_empty() {
        return Err(ApiError::Validation("draftSequence must be non-empty".into()));
    }
    if req.draft_sequence.iter().any(|t| Side::of_token(t).is_none()) {
        return Err(ApiError::Validation(
            "every draftSequence token must start with B or R".into(),
        ));
    }
    let now_ms = Utc::now().timestamp_millis();
    let timer = if req.timer_enabled {
        TimerFields::enabled(req.reserve_seconds, now_ms)
    } else {
        TimerFields::disabled(now_ms)
    };
    Ok(StateDocument {
        picks: vec![None; req.draft_sequence.len()],
        draft_sequence: req.draft_sequence.clone(),
        current_turn: 0,
        blue_scores: vec![],
        red_scores: vec![],
        blue_locked: false,
        red_locked: false,
        timer: Some(timer),
    })
}

/// POST `/sessions` — owner-authenticated (spec.md §4.5, "Create").
pub async fn create_session(
    State(state): State<AppState>,
    OwnerId(owner_user_id): OwnerId,
    Json(req): Json<CreateSessionRequest>,
) -> ApiResult<Json<CreateSessionResponse>> {
    if !state.owner_limiter.check(&owner_user_id) {
        return Err(ApiError::rate_limited());
    }

    if let Some(existing) = state.sessions.find_open_by_owner(&owner_user_id).await? {
        let shaped = shape_row(&state, &existing, true).await?;
        return Ok(Json(CreateSessionResponse {
            session: shaped,
            reused: true,
        }));
    }

    if let Some(preset_id) = req.cost_profile_id {
        let preset = state
            .presets
            .find_by_id(preset_id)
            .await?
            .ok_or(ApiError::NotFound)?;
        if preset.owner_user_id != owner_user_id {
            return Err(ApiError::Unauthorized);
        }
    }

    let doc = build_initial_state(&req)?;
    let new = NewSession {
        owner_user_id: owner_user_id.clone(),
        mode: req.mode.clone(),
        team1: req.team1.clone(),
        team2: req.team2.clone(),
        state: serde_json::to_value(&doc).map_err(|e| ApiError::Internal(e.into()))?,
        featured: serde_json::to_value(FeaturedRule::normalize(req.featured.clone()))
            .map_err(|e| ApiError::Internal(e.into()))?,
        cost_profile_id: req.cost_profile_id,
        cost_limit: req.cost_limit.unwrap_or_else(|| default_cost_limit(&req.mode)),
        penalty_per_point: req.penalty_per_point.unwrap_or(DEFAULT_PENALTY_PER_POINT),
    };

    let session_id = drafthub_store::ids::new_session_id();
    let blue_token = drafthub_store::ids::new_side_token();
    let red_token = drafthub_store::ids::new_side_token();
    let row = state
        .sessions
        .create(&session_id, &new, &blue_token, &red_token)
        .await?;

    info!(session = %session_id, owner = %owner_user_id, "session created");
    let shaped = shape_row(&state, &row, true).await?;
    Ok(Json(CreateSessionResponse {
        session: shaped,
        reused: false,
    }))
}

/// PATCH `/sessions/:id` — owner-authenticated (spec.md §4.5, "Owner Update").
/// Bypasses the Reducer entirely; no burn is applied (spec.md §9).
pub async fn owner_update(
    State(state): State<AppState>,
    OwnerId(owner_user_id): OwnerId,
    Path(session_key): Path<String>,
    Json(req): Json<OwnerUpdateRequest>,
) -> ApiResult<Json<drafthub_proto::ShapedSession>> {
    if !state.owner_limiter.check(&owner_user_id) {
        return Err(ApiError::rate_limited());
    }

    let lock = state.session_lock(&session_key);
    let _guard = lock.lock().await;

    let row = state
        .sessions
        .find_by_id(&session_key)
        .await?
        .ok_or(ApiError::NotFound)?;
    if row.owner_user_id != owner_user_id {
        return Err(ApiError::Unauthorized);
    }

    if let Some(Some(preset_id)) = req.cost_profile_id {
        let preset = state
            .presets
            .find_by_id(preset_id)
            .await?
            .ok_or(ApiError::NotFound)?;
        if preset.owner_user_id != owner_user_id {
            return Err(ApiError::Unauthorized);
        }
    }

    let state_value = match req.state {
        Some(value) => {
            let mut doc: StateDocument =
                serde_json::from_value(value).map_err(|_| ApiError::Validation("malformed state".into()))?;
            doc.ensure_timer(Utc::now().timestamp_millis());
            Some(serde_json::to_value(doc).map_err(|e| ApiError::Internal(e.into()))?)
        }
        None => None,
    };
    let featured_value = match req.featured {
        Some(rules) => Some(
            serde_json::to_value(FeaturedRule::normalize(rules))
                .map_err(|e| ApiError::Internal(e.into()))?,
        ),
        None => None,
    };
    if req.is_complete == Some(false) && row.is_complete {
        return Err(ApiError::Validation("isComplete is monotone".into()));
    }

    let patch = SessionPatch {
        state: state_value,
        is_complete: req.is_complete,
        featured: featured_value,
        cost_profile_id: req.cost_profile_id,
        cost_limit: req.cost_limit,
        penalty_per_point: req.penalty_per_point,
    };
    let updated = state
        .sessions
        .apply_patch(&session_key, &patch, row.version, Utc::now())
        .await?;

    let shaped = shape_row(&state, &updated, true).await?;
    state
        .hub
        .publish_update(&session_key, shaped.clone(), updated.state_document()?)
        .await;
    Ok(Json(shaped))
}

/// POST `/sessions/:id/actions` — unauthenticated at the HTTP boundary,
/// authorized by possession of a side token (spec.md §4.5, "Apply Action").
pub async fn apply_action(
    State(state): State<AppState>,
    Path(session_key): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> ApiResult<Json<drafthub_proto::ShapedSession>> {
    let request = ActionRequest::parse(&body).map_err(ApiError::Rejected)?;

    let bucket = action_bucket_key(&session_key, &request.player_token);
    if !state.action_limiter.check(&bucket) {
        return Err(ApiError::rate_limited());
    }

    let lock = state.session_lock(&session_key);
    let _guard = lock.lock().await;

    let row = state
        .sessions
        .find_by_id(&session_key)
        .await?
        .ok_or(ApiError::NotFound)?;

    let side = if request.player_token == row.blue_token {
        Side::Blue
    } else if request.player_token == row.red_token {
        Side::Red
    } else {
        return Err(ApiError::Unauthorized);
    };

    if row.is_complete {
        return Err(ApiError::Rejected(drafthub_proto::Rejection::DraftAlreadyCompleted));
    }

    let doc = row.state_document()?;
    let featured = row.featured_rules()?;
    let now_ms = Utc::now().timestamp_millis();
    let next = drafthub_reducer::reduce(&doc, &featured, side, &request.op, now_ms)
        .map_err(ApiError::Rejected)?;

    let next_value = serde_json::to_value(&next).map_err(|e| ApiError::Internal(e.into()))?;
    let updated = state
        .sessions
        .update_state(&session_key, &next_value, row.version, Utc::now())
        .await?;

    let shaped = shape_row(&state, &updated, false).await?;
    state.hub.publish_update(&session_key, shaped.clone(), next).await;
    Ok(Json(shaped))
}

/// GET `/sessions/:id` — public (spec.md §4.5, "Read").
pub async fn read_session(
    State(state): State<AppState>,
    Path(session_key): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<drafthub_proto::ShapedSession>> {
    let row = state
        .sessions
        .find_by_id(&session_key)
        .await?
        .ok_or(ApiError::NotFound)?;
    let include_tokens = requester_is_owner(&headers, &row.owner_user_id);
    let shaped = shape_row(&state, &row, include_tokens).await?;
    Ok(Json(shaped))
}

/// GET `/sessions/recent` — public, paginated by `completed_at` (spec.md §4.5).
pub async fn recent_sessions(
    State(state): State<AppState>,
    Query(q): Query<PaginationQuery>,
) -> ApiResult<Json<ListResponse>> {
    let rows = state.sessions.list_recent(q.limit, q.offset).await?;
    let mut sessions = Vec::with_capacity(rows.len());
    for row in &rows {
        sessions.push(shape_row(&state, row, false).await?);
    }
    Ok(Json(ListResponse { sessions }))
}

/// GET `/sessions/live` — public, paginated by `last_activity_at` (spec.md §4.5).
pub async fn live_sessions(
    State(state): State<AppState>,
    Query(q): Query<LiveQuery>,
) -> ApiResult<Json<ListResponse>> {
    let rows = state.sessions.list_live(q.window_minutes).await?;
    let mut sessions = Vec::with_capacity(rows.len());
    for row in &rows {
        sessions.push(shape_row(&state, row, false).await?);
    }
    Ok(Json(ListResponse { sessions }))
}

/// GET `/sessions/:id/resolve-token` — given a player token, the side it
/// belongs to, or 403 (spec.md §4.5, "Resolve Token").
pub async fn resolve_token(
    State(state): State<AppState>,
    Path(session_key): Path<String>,
    Query(q): Query<ResolveTokenQuery>,
) -> ApiResult<Json<ResolveTokenResponse>> {
    let row = state
        .sessions
        .find_by_id(&session_key)
        .await?
        .ok_or(ApiError::NotFound)?;
    let side = if q.token == row.blue_token {
        Side::Blue
    } else if q.token == row.red_token {
        Side::Red
    } else {
        return Err(ApiError::Unauthorized);
    };
    Ok(Json(ResolveTokenResponse::from_side(side)))
}

/// DELETE `/sessions/:id` — owner-authenticated, only while incomplete
/// (spec.md §4.5, "Delete").
pub async fn delete_session(
    State(state): State<AppState>,
    OwnerId(owner_user_id): OwnerId,
    Path(session_key): Path<String>,
) -> ApiResult<axum::http::StatusCode> {
    if !state.owner_limiter.check(&owner_user_id) {
        return Err(ApiError::rate_limited());
    }

    let lock = state.session_lock(&session_key);
    let _guard = lock.lock().await;

    let row = state
        .sessions
        .find_by_id(&session_key)
        .await?
        .ok_or(ApiError::NotFound)?;
    if row.owner_user_id != owner_user_id {
        return Err(ApiError::Unauthorized);
    }
    if row.is_complete {
        return Err(ApiError::Validation(
            "a completed session cannot be deleted".into(),
        ));
    }
    state.sessions.delete(&session_key).await?;
    state.hub.publish_deleted(&session_key).await;
    state.forget_session_lock(&session_key);
    warn!(session = %session_key, owner = %owner_user_id, "session deleted");
    Ok(axum::http::StatusCode::NO_CONTENT)
}
