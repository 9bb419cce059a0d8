// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The persisted row shapes (spec.md §6) and their mapping to the wire-facing
//! `ShapedSession` (spec.md §4.4).

use crate::error::StoreError;
use chrono::{DateTime, Utc};
use drafthub_proto::{CostPreset, FeaturedRule, ShapedSession, ShapedState, StateDocument};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One row in the `sessions` table, columns exactly as named in spec.md §6.
#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
    pub session_key: String,
    pub owner_user_id: String,
    pub mode: String,
    pub team1: String,
    pub team2: String,
    pub state: serde_json::Value,
    pub featured: serde_json::Value,
    pub is_complete: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub last_activity_at: DateTime<Utc>,
    pub blue_token: String,
    pub red_token: String,
    pub cost_profile_id: Option<Uuid>,
    pub cost_limit: f64,
    pub penalty_per_point: i32,
    /// Optimistic-concurrency counter (spec.md §5); bumped on every
    /// `update_state`/`apply_patch`.
    pub version: i64,
}

impl SessionRow {
    /// Decode the `state` column into a [`StateDocument`]. Unknown fields the
    /// Reducer does not touch are preserved by `serde`'s default leniency on
    /// the known struct shape (spec.md §9, "Opaque state documents").
    pub fn state_document(&self) -> Result<StateDocument, StoreError> {
        Ok(serde_json::from_value(self.state.clone())?)
    }

    pub fn featured_rules(&self) -> Result<Vec<FeaturedRule>, StoreError> {
        Ok(serde_json::from_value(self.featured.clone())?)
    }

    /// Shape this row for transport (spec.md §4.4). `cost_profile` is the
    /// joined preset, if any; `include_tokens` is true only when the
    /// requester is the session owner.
    pub fn shape(
        &self,
        cost_profile: Option<CostPreset>,
        include_tokens: bool,
    ) -> Result<ShapedSession, StoreError> {
        let state: StateDocument = self.state_document()?;
        let featured: Vec<FeaturedRule> = self.featured_rules()?;
        Ok(ShapedSession {
            id: self.session_key.clone(),
            owner_id: self.owner_user_id.clone(),
            mode: self.mode.clone(),
            team1: self.team1.clone(),
            team2: self.team2.clone(),
            state: ShapedState::from(&state),
            featured,
            is_complete: self.is_complete,
            completed_at: self.completed_at,
            last_activity_at: self.last_activity_at,
            cost_limit: self.cost_limit,
            penalty_per_point: self.penalty_per_point as i64,
            cost_profile,
            blue_token: include_tokens.then(|| self.blue_token.clone()),
            red_token: include_tokens.then(|| self.red_token.clone()),
        })
    }
}

/// One row in the `cost_presets` table (spec.md §6).
#[derive(Debug, Clone, FromRow)]
pub struct CostPresetRow {
    pub id: Uuid,
    pub owner_user_id: String,
    pub name: String,
    pub char_cost: serde_json::Value,
    pub accessory_cost: serde_json::Value,
}

impl CostPresetRow {
    pub fn into_preset(self) -> Result<CostPreset, StoreError> {
        Ok(CostPreset {
            id: self.id,
            owner_id: self.owner_user_id,
            name: self.name,
            char_cost: serde_json::from_value(self.char_cost)?,
            accessory_cost: serde_json::from_value(self.accessory_cost)?,
        })
    }
}

/// Fields accepted by an owner-authenticated session creation (spec.md §4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSession {
    pub owner_user_id: String,
    pub mode: String,
    pub team1: String,
    pub team2: String,
    pub state: serde_json::Value,
    pub featured: serde_json::Value,
    pub cost_profile_id: Option<Uuid>,
    pub cost_limit: f64,
    pub penalty_per_point: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use drafthub_proto::{Side, TimerFields};

    fn sample_row() -> SessionRow {
        let state = StateDocument {
            draft_sequence: vec!["BB".into(), "RR".into(), "B".into(), "R".into()],
            current_turn: 0,
            picks: vec![None, None, None, None],
            blue_scores: vec![],
            red_scores: vec![],
            blue_locked: false,
            red_locked: false,
            timer: Some(TimerFields::enabled(180.0, 0)),
        };
        SessionRow {
            session_key: "s1".into(),
            owner_user_id: "owner1".into(),
            mode: "2ban".into(),
            team1: "Blue Team".into(),
            team2: "Red Team".into(),
            state: serde_json::to_value(state).unwrap(),
            featured: serde_json::to_value(Vec::<FeaturedRule>::new()).unwrap(),
            is_complete: false,
            completed_at: None,
            last_activity_at: Utc::now(),
            blue_token: "bluetok".into(),
            red_token: "redtok".into(),
            cost_profile_id: None,
            cost_limit: 6.0,
            penalty_per_point: 2500,
            version: 0,
        }
    }

    #[test]
    fn shaping_omits_tokens_for_non_owners() {
        let row = sample_row();
        let shaped = row.shape(None, false).unwrap();
        assert!(shaped.blue_token.is_none());
        assert!(shaped.red_token.is_none());
    }

    #[test]
    fn shaping_includes_tokens_for_owners() {
        let row = sample_row();
        let shaped = row.shape(None, true).unwrap();
        assert_eq!(shaped.blue_token.as_deref(), Some("bluetok"));
        assert_eq!(shaped.red_token.as_deref(), Some("redtok"));
    }

    #[test]
    fn state_document_round_trips_through_json_column() {
        let row = sample_row();
        let doc = row.state_document().unwrap();
        assert_eq!(doc.draft_sequence.len(), 4);
        assert_eq!(Side::of_token(&doc.draft_sequence[0]), Some(Side::Blue));
    }
}
