// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The five error classes of spec.md §7, mapped to transport status codes.
//! Mirrors the shape of `cebartling-nfl-draft-2026`'s `ApiResult`/`DomainError`
//! split: a single enum at the handler boundary, one `IntoResponse` impl.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use drafthub_proto::Rejection;
use drafthub_store::StoreError;
use serde::Serialize;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed body, out-of-range enums, wrong shape.
    #[error("validation: {0}")]
    Validation(String),
    /// Missing/invalid player token, owner mismatch, missing admin privilege.
    #[error("unauthorized")]
    Unauthorized,
    /// A Reducer precondition failed; the session state did not change.
    #[error("rejected: {0}")]
    Rejected(#[from] Rejection),
    /// Session id or preset id unknown.
    #[error("not found")]
    NotFound,
    /// The row changed between load and persist (spec.md §5); the caller
    /// should retry.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Database or programmer error. Never surfaced with internal detail.
    #[error("internal error")]
    Internal(#[source] anyhow::Error),
}

impl ApiError {
    pub fn rate_limited() -> ApiError {
        ApiError::Validation("rate limit exceeded".into())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::SessionNotFound | StoreError::PresetNotFound => ApiError::NotFound,
            StoreError::PresetLimitExceeded(n) => {
                ApiError::Validation(format!("preset limit of {n} reached"))
            }
            StoreError::VersionConflict => {
                ApiError::Conflict("session was modified concurrently, retry".into())
            }
            other => ApiError::Internal(other.into()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match &self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation", msg.clone()),
            ApiError::Unauthorized => (
                StatusCode::FORBIDDEN,
                "unauthorized",
                "missing or invalid credentials".to_string(),
            ),
            ApiError::Rejected(rejection) => {
                (StatusCode::CONFLICT, rejection.code(), rejection.to_string())
            }
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                "not-found",
                "no such resource".to_string(),
            ),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ApiError::Internal(err) => {
                error!(error = ?err, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "internal error".to_string(),
                )
            }
        };
        let kind: &'static str = kind;
        (status, Json(ErrorBody { error: kind, message })).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
