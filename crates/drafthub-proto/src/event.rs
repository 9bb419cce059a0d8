// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Broadcast Hub event kinds (spec.md §4.3), carried over an SSE-shaped,
//! transport-independent wire format: `event: <name>\ndata: <json>\n\n`.

use crate::session::ShapedSession;
use crate::state::SideFlags;
use serde::Serialize;

/// The minimal periodic timer payload (spec.md §4.2, "Exposure to spectators").
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TimerEvent {
    #[serde(rename = "timerEnabled")]
    pub timer_enabled: bool,
    pub paused: SideFlags<bool>,
    #[serde(rename = "reserveLeft")]
    pub reserve_left: SideFlags<f64>,
    #[serde(rename = "graceLeft")]
    pub grace_left: f64,
    #[serde(rename = "timerUpdatedAt")]
    pub timer_updated_at: i64,
    #[serde(rename = "currentTurn")]
    pub current_turn: usize,
}

/// A single event the hub fans out to a stream. `name()`/`data()` map onto
/// the SSE `event:`/`data:` lines; this type carries no HTTP dependency.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    /// Full shaped payload, sent once per new subscriber.
    Snapshot(Box<ShapedSession>),
    /// Full shaped payload, sent after every persisted state change.
    Update(Box<ShapedSession>),
    /// Minimal timer fields, sent by the per-session ticker.
    Timer(TimerEvent),
    /// The session was removed by its owner; terminal.
    Deleted,
    /// The stream was opened against an unknown session id; terminal.
    NotFound,
}

impl StreamEvent {
    pub fn name(&self) -> &'static str {
        match self {
            StreamEvent::Snapshot(_) => "snapshot",
            StreamEvent::Update(_) => "update",
            StreamEvent::Timer(_) => "timer",
            StreamEvent::Deleted => "deleted",
            StreamEvent::NotFound => "not_found",
        }
    }

    /// `true` if no further events should follow this one on the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Deleted | StreamEvent::NotFound)
    }

    pub fn data_json(&self) -> serde_json::Value {
        match self {
            StreamEvent::Snapshot(s) | StreamEvent::Update(s) => {
                serde_json::to_value(s.as_ref()).unwrap_or(serde_json::Value::Null)
            }
            StreamEvent::Timer(t) => serde_json::to_value(t).unwrap_or(serde_json::Value::Null),
            StreamEvent::Deleted | StreamEvent::NotFound => serde_json::json!({}),
        }
    }
}
