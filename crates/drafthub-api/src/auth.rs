// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Owner authentication. spec.md treats authentication as "responsibilities,
//! not wire detail" (§4.5) and assumes it happens upstream of this surface;
//! this extractor reads the caller's resolved identity from a header, the
//! same boundary an upstream reverse proxy or session-cookie layer would fill
//! in before requests reach this service.

use crate::error::ApiError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

pub const OWNER_HEADER: &str = "x-owner-id";

/// The authenticated owner's opaque user id.
pub struct OwnerId(pub String);

impl<S> FromRequestParts<S> for OwnerId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(OWNER_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|s| !s.is_empty())
            .ok_or(ApiError::Unauthorized)?;
        Ok(OwnerId(value.to_string()))
    }
}
