// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The closed Reducer rejection taxonomy (spec.md §4.1).

use thiserror::Error;

/// Every way a player action can be rejected. Closed: the transport maps each
/// variant to a stable short string and never invents new ones.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum Rejection {
    #[error("invalid-argument")]
    InvalidArgument,
    #[error("wrong-turn")]
    WrongTurn,
    #[error("wrong-side")]
    WrongSide,
    #[error("side-locked")]
    SideLocked,
    #[error("globally-banned")]
    GloballyBanned,
    #[error("globally-pick-locked")]
    GloballyPickLocked,
    #[error("already-picked-this-side")]
    AlreadyPickedThisSide,
    #[error("not-a-ban-slot")]
    NotABanSlot,
    #[error("is-a-ban-slot")]
    IsABanSlot,
    #[error("empty-slot")]
    EmptySlot,
    #[error("nothing-to-undo")]
    NothingToUndo,
    #[error("draft-complete")]
    DraftComplete,
    #[error("draft-already-completed")]
    DraftAlreadyCompleted,
}

impl Rejection {
    /// Stable short string surfaced at the transport boundary.
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::InvalidArgument => "invalid-argument",
            Rejection::WrongTurn => "wrong-turn",
            Rejection::WrongSide => "wrong-side",
            Rejection::SideLocked => "side-locked",
            Rejection::GloballyBanned => "globally-banned",
            Rejection::GloballyPickLocked => "globally-pick-locked",
            Rejection::AlreadyPickedThisSide => "already-picked-this-side",
            Rejection::NotABanSlot => "not-a-ban-slot",
            Rejection::IsABanSlot => "is-a-ban-slot",
            Rejection::EmptySlot => "empty-slot",
            Rejection::NothingToUndo => "nothing-to-undo",
            Rejection::DraftComplete => "draft-complete",
            Rejection::DraftAlreadyCompleted => "draft-already-completed",
        }
    }
}
