// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Router assembly, matching the layer stack `cebartling-nfl-draft-2026`
//! applies (CORS, request tracing) over `echo-session-ws-gateway`'s flat
//! route list shape.

use crate::handlers::{ops, presets, sessions, stream};
use crate::state::AppState;
use axum::routing::{delete, get, patch, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(ops::healthz))
        .route("/api/metrics", get(ops::metrics))
        .route("/sessions", post(sessions::create_session))
        .route("/sessions/recent", get(sessions::recent_sessions))
        .route("/sessions/live", get(sessions::live_sessions))
        .route("/sessions/:id", get(sessions::read_session))
        .route("/sessions/:id", patch(sessions::owner_update))
        .route("/sessions/:id", delete(sessions::delete_session))
        .route("/sessions/:id/actions", post(sessions::apply_action))
        .route("/sessions/:id/resolve-token", get(sessions::resolve_token))
        .route("/sessions/:id/stream", get(stream::stream_session))
        .route("/presets", post(presets::create_preset))
        .route("/presets", get(presets::list_presets))
        .route("/presets/:id", delete(presets::delete_preset))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
