// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `/healthz` and `/api/metrics` (SPEC_FULL.md §2), matching the density of
//! `echo-session-ws-gateway`'s own `metrics_handler`.

use crate::dto::MetricsResponse;
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

pub async fn metrics(State(state): State<AppState>) -> Json<MetricsResponse> {
    Json(MetricsResponse {
        active_sessions: state.hub.active_session_count(),
        open_streams: state.hub.open_stream_count().await,
        uptime_ms: state.started_at.elapsed().as_millis(),
    })
}
