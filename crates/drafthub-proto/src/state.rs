// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The State Document: the structure reduced by the Reducer on every action.

use serde::{Deserialize, Serialize};

/// Per-turn grace window, reset on every turn boundary.
pub const GRACE_SECONDS: f64 = 30.0;

/// The two competing sides.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Side {
    /// Blue.
    Blue,
    /// Red.
    Red,
}

impl Side {
    /// First character of a turn token identifies the side; anything else is sideless.
    pub fn of_token(token: &str) -> Option<Side> {
        match token.chars().next() {
            Some('B') => Some(Side::Blue),
            Some('R') => Some(Side::Red),
            _ => None,
        }
    }
}

/// `true` iff `token` is one of the sentinel ban tokens.
pub fn is_ban_token(token: &str) -> bool {
    token == "BB" || token == "RR"
}

/// A single slot in `picks`. Used for both pick and ban records; ban slots
/// carry placeholder eidolon/accessory/superimpose values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Slot {
    #[serde(rename = "characterCode")]
    pub character_code: String,
    #[serde(default)]
    pub eidolon: u8,
    #[serde(rename = "accessoryId", default, skip_serializing_if = "Option::is_none")]
    pub accessory_id: Option<String>,
    #[serde(default = "default_superimpose")]
    pub superimpose: u8,
}

fn default_superimpose() -> u8 {
    1
}

impl Slot {
    pub fn new_pick(character_code: String) -> Self {
        Self {
            character_code,
            eidolon: 0,
            accessory_id: None,
            superimpose: 1,
        }
    }

    pub fn new_ban(character_code: String) -> Self {
        // Ban records use the same shape; upgrades are placeholder values.
        Self::new_pick(character_code)
    }
}

/// Per-side lock/pause flags.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SideFlags<T> {
    #[serde(rename = "B")]
    pub blue: T,
    #[serde(rename = "R")]
    pub red: T,
}

impl<T: Copy> SideFlags<T> {
    pub fn get(&self, side: Side) -> T {
        match side {
            Side::Blue => self.blue,
            Side::Red => self.red,
        }
    }

    pub fn set(&mut self, side: Side, value: T) {
        match side {
            Side::Blue => self.blue = value,
            Side::Red => self.red = value,
        }
    }
}

/// Timer fields, present iff the owner enabled the timer at creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimerFields {
    #[serde(rename = "timerEnabled")]
    pub timer_enabled: bool,
    #[serde(rename = "reserveSeconds")]
    pub reserve_seconds: f64,
    #[serde(rename = "reserveLeft")]
    pub reserve_left: SideFlags<f64>,
    #[serde(rename = "graceLeft")]
    pub grace_left: f64,
    pub paused: SideFlags<bool>,
    #[serde(rename = "timerUpdatedAt")]
    pub timer_updated_at: i64,
}

impl TimerFields {
    /// Materialize defaults for a session with no timer configured.
    pub fn disabled(now_ms: i64) -> Self {
        Self {
            timer_enabled: false,
            reserve_seconds: 0.0,
            reserve_left: SideFlags { blue: 0.0, red: 0.0 },
            grace_left: GRACE_SECONDS,
            paused: SideFlags::default(),
            timer_updated_at: now_ms,
        }
    }

    /// Initialize an enabled timer from a configured reserve, at creation time.
    pub fn enabled(reserve_seconds: f64, now_ms: i64) -> Self {
        Self {
            timer_enabled: true,
            reserve_seconds,
            reserve_left: SideFlags {
                blue: reserve_seconds,
                red: reserve_seconds,
            },
            grace_left: GRACE_SECONDS,
            paused: SideFlags::default(),
            timer_updated_at: now_ms,
        }
    }
}

/// The structure reduced by the Reducer (spec.md §3, State Document).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StateDocument {
    #[serde(rename = "draftSequence")]
    pub draft_sequence: Vec<String>,
    #[serde(rename = "currentTurn")]
    pub current_turn: usize,
    pub picks: Vec<Option<Slot>>,
    #[serde(rename = "blueScores", default)]
    pub blue_scores: Vec<f64>,
    #[serde(rename = "redScores", default)]
    pub red_scores: Vec<f64>,
    #[serde(rename = "blueLocked", default)]
    pub blue_locked: bool,
    #[serde(rename = "redLocked", default)]
    pub red_locked: bool,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub timer: Option<TimerFields>,
}

impl StateDocument {
    /// `true` once `currentTurn` reaches the end of the draft sequence.
    pub fn is_pick_complete(&self) -> bool {
        self.current_turn >= self.draft_sequence.len()
    }

    pub fn locked(&self, side: Side) -> bool {
        match side {
            Side::Blue => self.blue_locked,
            Side::Red => self.red_locked,
        }
    }

    pub fn set_locked(&mut self, side: Side, value: bool) {
        match side {
            Side::Blue => self.blue_locked = value,
            Side::Red => self.red_locked = value,
        }
    }

    /// Token of the turn currently on the clock, if any.
    pub fn current_token(&self) -> Option<&str> {
        self.draft_sequence.get(self.current_turn).map(String::as_str)
    }

    /// Ensures timer fields are present, materializing disabled defaults if missing.
    pub fn ensure_timer(&mut self, now_ms: i64) {
        if self.timer.is_none() {
            self.timer = Some(TimerFields::disabled(now_ms));
        }
    }

    /// The first ban slot belonging to `side` is frozen: no earlier index
    /// holds the same sentinel token for that side.
    pub fn is_first_ban_slot_for_side(&self, index: usize) -> bool {
        let Some(token) = self.draft_sequence.get(index) else {
            return false;
        };
        if !is_ban_token(token) {
            return false;
        }
        !self.draft_sequence[..index].iter().any(|t| t == token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_of_token_is_first_character() {
        assert_eq!(Side::of_token("BB"), Some(Side::Blue));
        assert_eq!(Side::of_token("R"), Some(Side::Red));
        assert_eq!(Side::of_token("X1"), None);
        assert_eq!(Side::of_token(""), None);
    }

    #[test]
    fn is_ban_token_is_exact_sentinel_match() {
        assert!(is_ban_token("BB"));
        assert!(is_ban_token("RR"));
        assert!(!is_ban_token("B"));
        assert!(!is_ban_token("R1"));
    }

    #[test]
    fn first_ban_slot_detection() {
        let doc = StateDocument {
            draft_sequence: vec!["BB".into(), "RR".into(), "B".into(), "RR".into()],
            current_turn: 0,
            picks: vec![None, None, None, None],
            blue_scores: vec![],
            red_scores: vec![],
            blue_locked: false,
            red_locked: false,
            timer: None,
        };
        assert!(doc.is_first_ban_slot_for_side(0));
        assert!(doc.is_first_ban_slot_for_side(1));
        assert!(!doc.is_first_ban_slot_for_side(2)); // not a ban token
        assert!(!doc.is_first_ban_slot_for_side(3)); // RR already seen at index 1
    }
}
