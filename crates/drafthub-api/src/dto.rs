// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Request/response bodies for the Session API Surface (spec.md §4.5).
//! Wire detail is the caller's choice; these shapes follow the same
//! camelCase convention as the shaped session payloads.

use drafthub_proto::{FeaturedRule, ShapedSession, Side};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub mode: String,
    pub team1: String,
    pub team2: String,
    #[serde(rename = "draftSequence")]
    pub draft_sequence: Vec<String>,
    #[serde(rename = "timerEnabled", default)]
    pub timer_enabled: bool,
    #[serde(rename = "reserveSeconds", default)]
    pub reserve_seconds: f64,
    #[serde(default)]
    pub featured: Vec<FeaturedRule>,
    #[serde(rename = "costProfileId", default)]
    pub cost_profile_id: Option<Uuid>,
    #[serde(rename = "costLimit", default)]
    pub cost_limit: Option<f64>,
    #[serde(rename = "penaltyPerPoint", default)]
    pub penalty_per_point: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    #[serde(flatten)]
    pub session: ShapedSession,
    /// `true` when an existing open session was returned instead of a new one.
    #[serde(rename = "reused")]
    pub reused: bool,
}

/// A partial update (spec.md §4.5, "Owner Update"). Every field is optional;
/// absence means "leave untouched". `costProfileId` is doubly-nested so a
/// present-but-null value clears the reference.
#[derive(Debug, Deserialize, Default)]
pub struct OwnerUpdateRequest {
    pub state: Option<serde_json::Value>,
    #[serde(rename = "isComplete")]
    pub is_complete: Option<bool>,
    pub featured: Option<Vec<FeaturedRule>>,
    #[serde(rename = "costProfileId", default, deserialize_with = "de_nested_option")]
    pub cost_profile_id: Option<Option<Uuid>>,
    #[serde(rename = "costLimit")]
    pub cost_limit: Option<f64>,
    #[serde(rename = "penaltyPerPoint")]
    pub penalty_per_point: Option<i32>,
}

/// Deserialize a JSON field that distinguishes "absent" from "present and
/// null" into `Option<Option<T>>`, matching `serde_with`'s `double_option`
/// without the extra dependency.
fn de_nested_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

#[derive(Debug, Serialize)]
pub struct ResolveTokenResponse {
    pub side: &'static str,
}

impl ResolveTokenResponse {
    pub fn from_side(side: Side) -> Self {
        Self {
            side: match side {
                Side::Blue => "B",
                Side::Red => "R",
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ResolveTokenQuery {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Deserialize)]
pub struct LiveQuery {
    #[serde(rename = "windowMinutes", default = "default_window_minutes")]
    pub window_minutes: i64,
}

fn default_window_minutes() -> i64 {
    120
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub sessions: Vec<ShapedSession>,
}

#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub active_sessions: usize,
    pub open_streams: usize,
    pub uptime_ms: u128,
}

#[derive(Debug, Deserialize)]
pub struct CreatePresetRequest {
    pub name: String,
    #[serde(rename = "charCost")]
    pub char_cost: std::collections::BTreeMap<String, [f64; 7]>,
    #[serde(rename = "accessoryCost")]
    pub accessory_cost: std::collections::BTreeMap<String, [f64; 5]>,
}

