// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared router state, analogous to `cebartling-nfl-draft-2026`'s `AppState`.

use crate::rate_limit::KeyedLimiter;
use dashmap::DashMap;
use drafthub_hub::Hub;
use drafthub_store::{CostPresetRepository, SessionRepository};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

/// Maximum cost presets per owner (spec.md §4.6, "two in one variant").
pub const MAX_PRESETS_PER_OWNER: i64 = 2;

/// Default `costLimit` for the 2-ban/2v2 variant (spec.md §4.5).
pub const DEFAULT_COST_LIMIT_2BAN: f64 = 6.0;
/// Default `costLimit` for the 3-ban/3v3 variant (spec.md §4.5).
pub const DEFAULT_COST_LIMIT_3BAN: f64 = 9.0;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<dyn SessionRepository>,
    pub presets: Arc<dyn CostPresetRepository>,
    pub hub: Arc<Hub>,
    pub action_limiter: Arc<KeyedLimiter>,
    pub owner_limiter: Arc<KeyedLimiter>,
    pub started_at: Instant,
    /// Per-session lock table serializing `load -> reduce/validate ->
    /// persist -> broadcast` (spec.md §5, "a lock table keyed by session
    /// id"), the same shape as `cebartling-nfl-draft-2026`'s
    /// `state.session_locks: DashMap<Uuid, Arc<Mutex<()>>>`.
    session_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl AppState {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        presets: Arc<dyn CostPresetRepository>,
        hub: Arc<Hub>,
    ) -> Self {
        Self {
            sessions,
            presets,
            hub,
            action_limiter: Arc::new(KeyedLimiter::per_minute(120)),
            owner_limiter: Arc::new(KeyedLimiter::per_minute(60)),
            started_at: Instant::now(),
            session_locks: Arc::new(DashMap::new()),
        }
    }

    /// The mutex guarding `session_key`'s critical section. Hold it for the
    /// full load/reduce/persist/broadcast sequence.
    pub fn session_lock(&self, session_key: &str) -> Arc<Mutex<()>> {
        self.session_locks
            .entry(session_key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drops the lock table entry for a deleted session. Safe to call while
    /// still holding that session's guard: this only removes the map entry,
    /// not the `Arc<Mutex<_>>` the caller is holding.
    pub fn forget_session_lock(&self, session_key: &str) {
        self.session_locks.remove(session_key);
    }
}

/// `costLimit` default for a mode string (spec.md §4.5). Any mode not
/// recognized as the 3-ban/3v3 variant defaults to the 2-ban value.
pub fn default_cost_limit(mode: &str) -> f64 {
    if mode.contains('3') {
        DEFAULT_COST_LIMIT_3BAN
    } else {
        DEFAULT_COST_LIMIT_2BAN
    }
}
