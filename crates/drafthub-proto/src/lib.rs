// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Wire schema for the live-draft engine: the State Document reduced by the
//! Reducer, the action envelope clients submit, the closed rejection
//! taxonomy, featured rules, and the shaped payloads sent to spectators.

pub mod action;
pub mod event;
pub mod featured;
pub mod rejection;
pub mod session;
pub mod state;

pub use action::{ActionOp, ActionRequest};
pub use event::{StreamEvent, TimerEvent};
pub use featured::{AccessoryRule, CharacterRule, FeaturedRule, FeaturedRules, RuleKind};
pub use rejection::Rejection;
pub use session::{CostPreset, ShapedSession, ShapedSlot, ShapedState, DEFAULT_PENALTY_PER_POINT};
pub use state::{is_ban_token, Side, SideFlags, Slot, StateDocument, TimerFields, GRACE_SECONDS};
