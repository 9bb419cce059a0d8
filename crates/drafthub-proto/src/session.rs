// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Row shaping: the transport-facing view of a session (spec.md §4.4) and
//! the Cost Preset it may embed.

use crate::state::{Slot, StateDocument};
use serde::{Deserialize, Serialize};

/// `{ id, owner_id, name, charCost: code -> number[7], accessoryCost: id -> number[5] }`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CostPreset {
    pub id: uuid::Uuid,
    #[serde(rename = "ownerId")]
    pub owner_id: String,
    pub name: String,
    #[serde(rename = "charCost")]
    pub char_cost: std::collections::BTreeMap<String, [f64; 7]>,
    #[serde(rename = "accessoryCost")]
    pub accessory_cost: std::collections::BTreeMap<String, [f64; 5]>,
}

/// A normalized Slot view exposing both modern and legacy field aliases.
/// Normalization is idempotent: re-shaping an already-shaped slot is a no-op.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShapedSlot {
    #[serde(rename = "characterCode")]
    pub character_code: String,
    pub eidolon: u8,
    #[serde(rename = "mindscape")]
    pub mindscape_alias: u8,
    #[serde(rename = "accessoryId", skip_serializing_if = "Option::is_none")]
    pub accessory_id: Option<String>,
    #[serde(rename = "wengineId", skip_serializing_if = "Option::is_none")]
    pub wengine_id_alias: Option<String>,
    pub superimpose: u8,
    #[serde(rename = "phase")]
    pub phase_alias: u8,
}

impl From<&Slot> for ShapedSlot {
    fn from(slot: &Slot) -> Self {
        ShapedSlot {
            character_code: slot.character_code.clone(),
            eidolon: slot.eidolon,
            mindscape_alias: slot.eidolon,
            accessory_id: slot.accessory_id.clone(),
            wengine_id_alias: slot.accessory_id.clone(),
            superimpose: slot.superimpose,
            phase_alias: slot.superimpose,
        }
    }
}

/// The shaped `state` payload: draft sequence/turn/locks verbatim, `picks`
/// normalized through [`ShapedSlot`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShapedState {
    #[serde(rename = "draftSequence")]
    pub draft_sequence: Vec<String>,
    #[serde(rename = "currentTurn")]
    pub current_turn: usize,
    pub picks: Vec<Option<ShapedSlot>>,
    #[serde(rename = "blueScores")]
    pub blue_scores: Vec<f64>,
    #[serde(rename = "redScores")]
    pub red_scores: Vec<f64>,
    #[serde(rename = "blueLocked")]
    pub blue_locked: bool,
    #[serde(rename = "redLocked")]
    pub red_locked: bool,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub timer: Option<crate::state::TimerFields>,
}

impl From<&StateDocument> for ShapedState {
    fn from(doc: &StateDocument) -> Self {
        ShapedState {
            draft_sequence: doc.draft_sequence.clone(),
            current_turn: doc.current_turn,
            picks: doc
                .picks
                .iter()
                .map(|s| s.as_ref().map(ShapedSlot::from))
                .collect(),
            blue_scores: doc.blue_scores.clone(),
            red_scores: doc.red_scores.clone(),
            blue_locked: doc.blue_locked,
            red_locked: doc.red_locked,
            timer: doc.timer.clone(),
        }
    }
}

/// The full shaped session row sent to clients (create/update/read/stream).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShapedSession {
    pub id: String,
    #[serde(rename = "ownerId")]
    pub owner_id: String,
    pub mode: String,
    pub team1: String,
    pub team2: String,
    pub state: ShapedState,
    pub featured: Vec<crate::featured::FeaturedRule>,
    #[serde(rename = "isComplete")]
    pub is_complete: bool,
    #[serde(rename = "completedAt", skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(rename = "lastActivityAt")]
    pub last_activity_at: chrono::DateTime<chrono::Utc>,
    #[serde(rename = "costLimit")]
    pub cost_limit: f64,
    #[serde(rename = "penaltyPerPoint")]
    pub penalty_per_point: i64,
    #[serde(rename = "costProfile", skip_serializing_if = "Option::is_none")]
    pub cost_profile: Option<CostPreset>,
    // Side tokens are included only when the requester is the owner; the
    // store/API layer is responsible for omitting them otherwise.
    #[serde(rename = "blueToken", skip_serializing_if = "Option::is_none")]
    pub blue_token: Option<String>,
    #[serde(rename = "redToken", skip_serializing_if = "Option::is_none")]
    pub red_token: Option<String>,
}

/// Default `penaltyPerPoint` when absent (spec.md §4.4/§4.5).
pub const DEFAULT_PENALTY_PER_POINT: i64 = 2500;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Slot;

    #[test]
    fn shaping_a_slot_is_idempotent() {
        let slot = Slot {
            character_code: "c1".into(),
            eidolon: 3,
            accessory_id: Some("acc1".into()),
            superimpose: 2,
        };
        let shaped_once = ShapedSlot::from(&slot);
        let value_once = serde_json::to_value(&shaped_once).unwrap();
        let value_twice = serde_json::to_value(&ShapedSlot::from(&slot)).unwrap();
        assert_eq!(value_once, value_twice);
        assert_eq!(shaped_once.accessory_id, shaped_once.wengine_id_alias);
        assert_eq!(shaped_once.eidolon, shaped_once.mindscape_alias);
    }
}
