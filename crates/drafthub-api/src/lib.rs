// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The Session API Surface (spec.md §4.5/§4.6): axum handlers, owner
//! authentication, rate limiting, and router assembly over
//! `drafthub-reducer`, `drafthub-store`, and `drafthub-hub`.

pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod rate_limit;
pub mod router;
pub mod state;

pub use auth::OwnerId;
pub use error::{ApiError, ApiResult};
pub use router::build_router;
pub use state::AppState;
