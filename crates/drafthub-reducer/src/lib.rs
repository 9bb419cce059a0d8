// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The State Reducer: `(current_state, action, featured_rules, now) →
//! (next_state | rejection)` (spec.md §4.1). Deterministic up to the
//! wall-clock `now` that drives timer accrual.

pub mod timer;

use drafthub_proto::{
    is_ban_token, ActionOp, FeaturedRules, Rejection, Side, Slot, StateDocument,
};

/// Apply a single action to `state` on behalf of `side`, at wall-clock
/// `now_ms`. Returns the next state on success; on rejection the caller must
/// discard the result and persist nothing (§7, "Reject atomically").
pub fn reduce(
    state: &StateDocument,
    featured: &[drafthub_proto::FeaturedRule],
    side: Side,
    op: &ActionOp,
    now_ms: i64,
) -> Result<StateDocument, Rejection> {
    let mut next = state.clone();
    timer::burn(&mut next, now_ms);
    let rules = FeaturedRules(featured);

    match op {
        ActionOp::Pick {
            index,
            character_code,
        } => apply_pick(&mut next, side, *index, character_code, &rules, now_ms)?,
        ActionOp::Ban {
            index,
            character_code,
        } => apply_ban(&mut next, side, *index, character_code, &rules, now_ms)?,
        ActionOp::SetEidolon { index, eidolon } => {
            apply_set_eidolon(&mut next, side, *index, *eidolon)?
        }
        ActionOp::SetSuperimpose { index, superimpose } => {
            apply_set_superimpose(&mut next, side, *index, *superimpose)?
        }
        ActionOp::SetAccessory { index, accessory_id } => {
            apply_set_accessory(&mut next, side, *index, accessory_id.clone(), &rules)?
        }
        ActionOp::SetLock { locked } => apply_set_lock(&mut next, side, *locked)?,
        ActionOp::UndoLast { index } => apply_undo_last(&mut next, side, *index, now_ms)?,
    }

    Ok(next)
}

fn turn_token<'a>(doc: &'a StateDocument, index: usize) -> Option<&'a str> {
    doc.draft_sequence.get(index).map(String::as_str)
}

fn apply_pick(
    doc: &mut StateDocument,
    side: Side,
    index: usize,
    character_code: &str,
    rules: &FeaturedRules<'_>,
    now_ms: i64,
) -> Result<(), Rejection> {
    if doc.locked(side) {
        return Err(Rejection::SideLocked);
    }
    if doc.is_pick_complete() {
        return Err(Rejection::DraftComplete);
    }
    if index != doc.current_turn {
        return Err(Rejection::WrongTurn);
    }
    let token = turn_token(doc, index).ok_or(Rejection::InvalidArgument)?;
    if is_ban_token(token) {
        return Err(Rejection::IsABanSlot);
    }
    if Side::of_token(token) != Some(side) {
        return Err(Rejection::WrongSide);
    }
    if rules.character_globally_banned(character_code) {
        return Err(Rejection::GloballyBanned);
    }
    if already_picked_by_side(doc, side, character_code) {
        return Err(Rejection::AlreadyPickedThisSide);
    }

    doc.picks[index] = Some(Slot::new_pick(character_code.to_string()));
    doc.current_turn += 1;
    timer::reset_grace(doc, now_ms);
    Ok(())
}

fn apply_ban(
    doc: &mut StateDocument,
    side: Side,
    index: usize,
    character_code: &str,
    rules: &FeaturedRules<'_>,
    now_ms: i64,
) -> Result<(), Rejection> {
    if doc.locked(side) {
        return Err(Rejection::SideLocked);
    }
    if doc.is_pick_complete() {
        return Err(Rejection::DraftComplete);
    }
    if index != doc.current_turn {
        return Err(Rejection::WrongTurn);
    }
    let token = turn_token(doc, index).ok_or(Rejection::InvalidArgument)?;
    if !is_ban_token(token) {
        return Err(Rejection::NotABanSlot);
    }
    if Side::of_token(token) != Some(side) {
        return Err(Rejection::WrongSide);
    }
    if rules.character_globally_pick_locked(character_code) {
        return Err(Rejection::GloballyPickLocked);
    }

    doc.picks[index] = Some(Slot::new_ban(character_code.to_string()));
    doc.current_turn += 1;
    timer::reset_grace(doc, now_ms);
    Ok(())
}

/// Slots belonging to `side`'s own prior **pick** (non-ban) turns that carry
/// `character_code`. Bans never contribute to duplicate-detection (spec.md
/// §4.1, "Open questions").
fn already_picked_by_side(doc: &StateDocument, side: Side, character_code: &str) -> bool {
    doc.draft_sequence
        .iter()
        .enumerate()
        .take(doc.current_turn)
        .any(|(i, token)| {
            !is_ban_token(token)
                && Side::of_token(token) == Some(side)
                && doc.picks[i]
                    .as_ref()
                    .is_some_and(|s| s.character_code == character_code)
        })
}

fn modifiable_slot<'a>(
    doc: &'a mut StateDocument,
    side: Side,
    index: usize,
) -> Result<&'a mut Slot, Rejection> {
    if doc.locked(side) {
        return Err(Rejection::SideLocked);
    }
    let token = doc
        .draft_sequence
        .get(index)
        .cloned()
        .ok_or(Rejection::InvalidArgument)?;
    if doc.picks.get(index).map(Option::is_none).unwrap_or(true) {
        return Err(Rejection::EmptySlot);
    }
    if Side::of_token(&token) != Some(side) {
        return Err(Rejection::WrongSide);
    }
    if is_ban_token(&token) {
        return Err(Rejection::IsABanSlot);
    }
    // Documented panic: the `is_none` check above already ruled out `None`.
    #[allow(clippy::expect_used)]
    Ok(doc.picks[index].as_mut().expect("checked above"))
}

fn apply_set_eidolon(
    doc: &mut StateDocument,
    side: Side,
    index: usize,
    eidolon: i64,
) -> Result<(), Rejection> {
    let slot = modifiable_slot(doc, side, index)?;
    slot.eidolon = eidolon.clamp(0, 6) as u8;
    Ok(())
}

fn apply_set_superimpose(
    doc: &mut StateDocument,
    side: Side,
    index: usize,
    superimpose: i64,
) -> Result<(), Rejection> {
    let slot = modifiable_slot(doc, side, index)?;
    slot.superimpose = superimpose.clamp(1, 5) as u8;
    Ok(())
}

fn apply_set_accessory(
    doc: &mut StateDocument,
    side: Side,
    index: usize,
    accessory_id: Option<String>,
    rules: &FeaturedRules<'_>,
) -> Result<(), Rejection> {
    if let Some(id) = &accessory_id {
        if rules.accessory_globally_banned(id) {
            return Err(Rejection::GloballyBanned);
        }
    }
    let slot = modifiable_slot(doc, side, index)?;
    slot.accessory_id = accessory_id;
    Ok(())
}

fn apply_set_lock(doc: &mut StateDocument, side: Side, locked: bool) -> Result<(), Rejection> {
    if !locked {
        // Unlock is never accepted via the action protocol.
        return Err(Rejection::InvalidArgument);
    }
    if !doc.is_pick_complete() {
        return Err(Rejection::WrongTurn);
    }
    // Idempotent: locking an already-locked side is a no-op success.
    doc.set_locked(side, true);
    Ok(())
}

fn apply_undo_last(
    doc: &mut StateDocument,
    side: Side,
    index: Option<usize>,
    now_ms: i64,
) -> Result<(), Rejection> {
    if doc.locked(side) {
        return Err(Rejection::SideLocked);
    }
    if doc.current_turn == 0 {
        return Err(Rejection::NothingToUndo);
    }
    let last_idx = doc.current_turn - 1;
    if let Some(idx) = index {
        if idx != last_idx {
            return Err(Rejection::WrongTurn);
        }
    }
    let token = turn_token(doc, last_idx).ok_or(Rejection::InvalidArgument)?;
    if Side::of_token(token) != Some(side) {
        return Err(Rejection::WrongSide);
    }
    if doc.picks[last_idx].is_none() {
        return Err(Rejection::NothingToUndo);
    }

    doc.picks[last_idx] = None;
    doc.current_turn = last_idx;
    timer::reset_grace(doc, now_ms);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use drafthub_proto::{CharacterRule, FeaturedRule, RuleKind, TimerFields};

    fn happy_path_sequence() -> Vec<String> {
        vec!["BB", "RR", "B", "R", "B", "R"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    fn fresh_doc() -> StateDocument {
        let seq = happy_path_sequence();
        StateDocument {
            picks: vec![None; seq.len()],
            draft_sequence: seq,
            current_turn: 0,
            blue_scores: vec![],
            red_scores: vec![],
            blue_locked: false,
            red_locked: false,
            timer: Some(TimerFields::enabled(180.0, 0)),
        }
    }

    #[test]
    fn happy_path_to_completion() {
        let mut doc = fresh_doc();
        let steps: Vec<(Side, ActionOp)> = vec![
            (
                Side::Blue,
                ActionOp::Ban {
                    index: 0,
                    character_code: "c1".into(),
                },
            ),
            (
                Side::Red,
                ActionOp::Ban {
                    index: 1,
                    character_code: "c2".into(),
                },
            ),
            (
                Side::Blue,
                ActionOp::Pick {
                    index: 2,
                    character_code: "c3".into(),
                },
            ),
            (
                Side::Red,
                ActionOp::Pick {
                    index: 3,
                    character_code: "c4".into(),
                },
            ),
            (
                Side::Blue,
                ActionOp::Pick {
                    index: 4,
                    character_code: "c5".into(),
                },
            ),
            (
                Side::Red,
                ActionOp::Pick {
                    index: 5,
                    character_code: "c6".into(),
                },
            ),
        ];
        for (side, op) in steps {
            doc = reduce(&doc, &[], side, &op, 0).expect("step should succeed");
        }
        assert_eq!(doc.current_turn, 6);
        assert!(doc.picks.iter().all(Option::is_some));
        assert!(doc.picks[0].as_ref().unwrap().character_code == "c1");
        assert!(doc.picks[1].as_ref().unwrap().character_code == "c2");

        for side in [Side::Blue, Side::Red] {
            let locked = reduce(&doc, &[], side, &ActionOp::SetLock { locked: true }, 0).unwrap();
            assert!(locked.locked(side));
        }
    }

    #[test]
    fn wrong_side_at_turn_zero() {
        let doc = fresh_doc();
        let err = reduce(
            &doc,
            &[],
            Side::Red,
            &ActionOp::Ban {
                index: 0,
                character_code: "c1".into(),
            },
            0,
        )
        .unwrap_err();
        assert_eq!(err, Rejection::WrongSide);
    }

    #[test]
    fn duplicate_pick_same_side_rejected() {
        let mut doc = fresh_doc();
        doc = reduce(
            &doc,
            &[],
            Side::Blue,
            &ActionOp::Ban {
                index: 0,
                character_code: "cc1".into(),
            },
            0,
        )
        .unwrap();
        doc = reduce(
            &doc,
            &[],
            Side::Red,
            &ActionOp::Ban {
                index: 1,
                character_code: "cc2".into(),
            },
            0,
        )
        .unwrap();
        doc = reduce(
            &doc,
            &[],
            Side::Blue,
            &ActionOp::Pick {
                index: 2,
                character_code: "c3".into(),
            },
            0,
        )
        .unwrap();
        doc = reduce(
            &doc,
            &[],
            Side::Red,
            &ActionOp::Pick {
                index: 3,
                character_code: "c4".into(),
            },
            0,
        )
        .unwrap();
        let err = reduce(
            &doc,
            &[],
            Side::Blue,
            &ActionOp::Pick {
                index: 4,
                character_code: "c3".into(),
            },
            0,
        )
        .unwrap_err();
        assert_eq!(err, Rejection::AlreadyPickedThisSide);
    }

    #[test]
    fn global_ban_precedes_duplicate_check() {
        let mut doc = fresh_doc();
        doc = reduce(
            &doc,
            &[],
            Side::Blue,
            &ActionOp::Ban {
                index: 0,
                character_code: "cc1".into(),
            },
            0,
        )
        .unwrap();
        doc = reduce(
            &doc,
            &[],
            Side::Red,
            &ActionOp::Ban {
                index: 1,
                character_code: "cc2".into(),
            },
            0,
        )
        .unwrap();
        doc = reduce(
            &doc,
            &[],
            Side::Blue,
            &ActionOp::Pick {
                index: 2,
                character_code: "c3".into(),
            },
            0,
        )
        .unwrap();
        doc = reduce(
            &doc,
            &[],
            Side::Red,
            &ActionOp::Pick {
                index: 3,
                character_code: "c4".into(),
            },
            0,
        )
        .unwrap();

        let featured = vec![FeaturedRule::Character(CharacterRule {
            code: "c3".into(),
            rule: RuleKind::GlobalBan,
            custom_cost: None,
        })];
        // c3 is both globally banned AND already picked by Blue; ban check wins.
        let err = reduce(
            &doc,
            &featured,
            Side::Blue,
            &ActionOp::Pick {
                index: 4,
                character_code: "c3".into(),
            },
            0,
        )
        .unwrap_err();
        assert_eq!(err, Rejection::GloballyBanned);
    }

    #[test]
    fn pick_and_ban_on_same_index_do_not_both_succeed() {
        let doc = fresh_doc();
        let pick = reduce(
            &doc,
            &[],
            Side::Blue,
            &ActionOp::Pick {
                index: 0,
                character_code: "c1".into(),
            },
            0,
        );
        let ban = reduce(
            &doc,
            &[],
            Side::Blue,
            &ActionOp::Ban {
                index: 0,
                character_code: "c1".into(),
            },
            0,
        );
        assert!(pick.is_err());
        assert!(ban.is_ok());
    }

    #[test]
    fn set_lock_rejects_before_pick_complete() {
        let doc = fresh_doc();
        let err = reduce(&doc, &[], Side::Blue, &ActionOp::SetLock { locked: true }, 0)
            .unwrap_err();
        assert_eq!(err, Rejection::WrongTurn);
    }

    #[test]
    fn set_lock_is_idempotent_once_complete() {
        let mut doc = fresh_doc();
        doc.current_turn = doc.draft_sequence.len();
        doc = reduce(&doc, &[], Side::Blue, &ActionOp::SetLock { locked: true }, 0).unwrap();
        let again = reduce(&doc, &[], Side::Blue, &ActionOp::SetLock { locked: true }, 0).unwrap();
        assert!(again.blue_locked);
    }

    #[test]
    fn unlock_is_never_accepted() {
        let mut doc = fresh_doc();
        doc.current_turn = doc.draft_sequence.len();
        doc.blue_locked = true;
        let err = reduce(&doc, &[], Side::Blue, &ActionOp::SetLock { locked: false }, 0)
            .unwrap_err();
        assert_eq!(err, Rejection::InvalidArgument);
    }

    #[test]
    fn eidolon_clamps_above_range() {
        let mut doc = fresh_doc();
        doc = reduce(
            &doc,
            &[],
            Side::Blue,
            &ActionOp::Ban {
                index: 0,
                character_code: "c1".into(),
            },
            0,
        )
        .unwrap();
        doc = reduce(
            &doc,
            &[],
            Side::Red,
            &ActionOp::Ban {
                index: 1,
                character_code: "c2".into(),
            },
            0,
        )
        .unwrap();
        doc = reduce(
            &doc,
            &[],
            Side::Blue,
            &ActionOp::Pick {
                index: 2,
                character_code: "c3".into(),
            },
            0,
        )
        .unwrap();
        doc = reduce(
            &doc,
            &[],
            Side::Blue,
            &ActionOp::SetEidolon {
                index: 2,
                eidolon: 7,
            },
            0,
        )
        .unwrap();
        assert_eq!(doc.picks[2].as_ref().unwrap().eidolon, 6);
    }

    #[test]
    fn superimpose_clamps_below_range() {
        let mut doc = fresh_doc();
        doc = reduce(
            &doc,
            &[],
            Side::Blue,
            &ActionOp::Ban {
                index: 0,
                character_code: "c1".into(),
            },
            0,
        )
        .unwrap();
        doc = reduce(
            &doc,
            &[],
            Side::Red,
            &ActionOp::Ban {
                index: 1,
                character_code: "c2".into(),
            },
            0,
        )
        .unwrap();
        doc = reduce(
            &doc,
            &[],
            Side::Blue,
            &ActionOp::Pick {
                index: 2,
                character_code: "c3".into(),
            },
            0,
        )
        .unwrap();
        doc = reduce(
            &doc,
            &[],
            Side::Blue,
            &ActionOp::SetSuperimpose {
                index: 2,
                superimpose: 0,
            },
            0,
        )
        .unwrap();
        assert_eq!(doc.picks[2].as_ref().unwrap().superimpose, 1);
    }

    #[test]
    fn accessory_matching_global_ban_is_rejected() {
        let mut doc = fresh_doc();
        doc = reduce(
            &doc,
            &[],
            Side::Blue,
            &ActionOp::Ban {
                index: 0,
                character_code: "c1".into(),
            },
            0,
        )
        .unwrap();
        doc = reduce(
            &doc,
            &[],
            Side::Red,
            &ActionOp::Ban {
                index: 1,
                character_code: "c2".into(),
            },
            0,
        )
        .unwrap();
        doc = reduce(
            &doc,
            &[],
            Side::Blue,
            &ActionOp::Pick {
                index: 2,
                character_code: "c3".into(),
            },
            0,
        )
        .unwrap();

        let featured = vec![FeaturedRule::Accessory(drafthub_proto::AccessoryRule {
            id: "acc1".into(),
            rule: RuleKind::GlobalBan,
            custom_cost: None,
        })];
        let err = reduce(
            &doc,
            &featured,
            Side::Blue,
            &ActionOp::SetAccessory {
                index: 2,
                accessory_id: Some("acc1".into()),
            },
            0,
        )
        .unwrap_err();
        assert_eq!(err, Rejection::GloballyBanned);
    }

    #[test]
    fn pick_then_undo_restores_state_except_timer() {
        // A sequence whose first two turns both belong to Blue, so the clock
        // is still running against Blue when the undo is submitted.
        let doc = StateDocument {
            draft_sequence: vec!["B".into(), "B".into()],
            current_turn: 0,
            picks: vec![None, None],
            blue_scores: vec![],
            red_scores: vec![],
            blue_locked: false,
            red_locked: false,
            timer: Some(TimerFields::enabled(180.0, 0)),
        };
        let picked = reduce(
            &doc,
            &[],
            Side::Blue,
            &ActionOp::Pick {
                index: 0,
                character_code: "c1".into(),
            },
            10_000,
        )
        .unwrap();
        let undone = reduce(
            &picked,
            &[],
            Side::Blue,
            &ActionOp::UndoLast { index: None },
            45_000,
        )
        .unwrap();
        assert_eq!(undone.current_turn, doc.current_turn);
        assert_eq!(undone.picks, doc.picks);
        // Blue was on the clock since t=0; burn drains grace(30s) then 5s reserve.
        assert_eq!(undone.timer.as_ref().unwrap().reserve_left.blue, 175.0);
        assert_eq!(undone.timer.as_ref().unwrap().grace_left, 30.0);
    }

    #[test]
    fn nothing_to_undo_at_turn_zero() {
        let doc = fresh_doc();
        let err = reduce(&doc, &[], Side::Blue, &ActionOp::UndoLast { index: None }, 0)
            .unwrap_err();
        assert_eq!(err, Rejection::NothingToUndo);
    }

    #[test]
    fn setters_allowed_on_prior_slot_even_after_turn_advances() {
        let mut doc = fresh_doc();
        doc = reduce(
            &doc,
            &[],
            Side::Blue,
            &ActionOp::Ban {
                index: 0,
                character_code: "c1".into(),
            },
            0,
        )
        .unwrap();
        doc = reduce(
            &doc,
            &[],
            Side::Red,
            &ActionOp::Ban {
                index: 1,
                character_code: "c2".into(),
            },
            0,
        )
        .unwrap();
        doc = reduce(
            &doc,
            &[],
            Side::Blue,
            &ActionOp::Pick {
                index: 2,
                character_code: "c3".into(),
            },
            0,
        )
        .unwrap();
        doc = reduce(
            &doc,
            &[],
            Side::Red,
            &ActionOp::Pick {
                index: 3,
                character_code: "c4".into(),
            },
            0,
        )
        .unwrap();
        // currentTurn is now 4; Blue still edits its index-2 slot.
        let edited = reduce(
            &doc,
            &[],
            Side::Blue,
            &ActionOp::SetEidolon {
                index: 2,
                eidolon: 4,
            },
            0,
        )
        .unwrap();
        assert_eq!(edited.picks[2].as_ref().unwrap().eidolon, 4);
    }

    #[test]
    fn ban_on_pick_slot_is_rejected_not_a_ban_slot() {
        let doc = fresh_doc();
        // currentTurn 0 is "BB" (a ban slot); use an index with a pick token instead.
        let mut doc2 = doc.clone();
        doc2.current_turn = 2; // "B" pick slot
        let err = reduce(
            &doc2,
            &[],
            Side::Blue,
            &ActionOp::Ban {
                index: 2,
                character_code: "c1".into(),
            },
            0,
        )
        .unwrap_err();
        assert_eq!(err, Rejection::NotABanSlot);
    }
}

#[cfg(test)]
mod invariants {
    //! Property tests for spec.md §8's reducer invariants (P1, P2, P4, P5,
    //! P7). P3 is exercised directly by `duplicate_pick_same_side_rejected`
    //! above; P6 (`is_complete`/`completed_at`) and P8 (burn idempotence)
    //! live outside the reducer's scope (store layer and `timer` module
    //! respectively).
    use super::*;
    use drafthub_proto::{TimerFields, GRACE_SECONDS};
    use proptest::prelude::*;

    const SEQUENCE: [&str; 6] = ["BB", "RR", "B", "R", "B", "R"];

    fn op_for_turn(turn: usize, character_code: String) -> ActionOp {
        if is_ban_token(SEQUENCE[turn]) {
            ActionOp::Ban {
                index: turn,
                character_code,
            }
        } else {
            ActionOp::Pick {
                index: turn,
                character_code,
            }
        }
    }

    fn check_invariants(doc: &StateDocument) {
        // P1
        assert!(doc.current_turn <= doc.draft_sequence.len());
        // P2
        for i in 0..doc.draft_sequence.len() {
            assert_eq!(doc.picks[i].is_some(), i < doc.current_turn);
        }
        // P4
        if let Some(t) = &doc.timer {
            assert!(t.reserve_left.blue >= 0.0);
            assert!(t.reserve_left.red >= 0.0);
            assert!(t.grace_left >= 0.0);
        }
    }

    proptest! {
        /// P1, P2, P4 hold after every successful or rejected action along a
        /// fixed turn order, regardless of which character codes (including
        /// deliberately repeated ones, to exercise rejections) are submitted.
        #[test]
        fn turn_and_reserve_invariants_hold(
            codes in proptest::collection::vec("[a-c][0-9]", 6),
            deltas_ms in proptest::collection::vec(0i64..20_000, 6),
        ) {
            let mut doc = StateDocument {
                draft_sequence: SEQUENCE.iter().map(|s| s.to_string()).collect(),
                current_turn: 0,
                picks: vec![None; SEQUENCE.len()],
                blue_scores: vec![],
                red_scores: vec![],
                blue_locked: false,
                red_locked: false,
                timer: Some(TimerFields::enabled(180.0, 0)),
            };
            let mut now = 0i64;
            for (i, delta) in deltas_ms.into_iter().enumerate() {
                now += delta;
                let turn = doc.current_turn;
                if turn >= doc.draft_sequence.len() {
                    break;
                }
                let side = Side::of_token(&doc.draft_sequence[turn]).unwrap();
                let op = op_for_turn(turn, codes[i].clone());
                if let Ok(next) = reduce(&doc, &[], side, &op, now) {
                    doc = next;
                }
                check_invariants(&doc);
            }
        }

        /// P5: once a side is locked, no sequence of further actions unlocks it.
        #[test]
        fn lock_is_monotone(unlock_attempts in 0usize..5) {
            let mut doc = StateDocument {
                draft_sequence: SEQUENCE.iter().map(|s| s.to_string()).collect(),
                current_turn: SEQUENCE.len(),
                picks: SEQUENCE.iter().map(|_| Some(Slot::new_pick("c1".into()))).collect(),
                blue_scores: vec![],
                red_scores: vec![],
                blue_locked: false,
                red_locked: false,
                timer: None,
            };
            doc = reduce(&doc, &[], Side::Blue, &ActionOp::SetLock { locked: true }, 0).unwrap();
            assert!(doc.blue_locked);
            for _ in 0..unlock_attempts {
                // Unlock is never accepted; the lock must survive every attempt.
                let _ = reduce(&doc, &[], Side::Blue, &ActionOp::SetLock { locked: false }, 0);
                assert!(doc.blue_locked);
            }
        }

        /// P7: a disabled timer's reserve/grace never move, no matter what
        /// sequence of otherwise-valid actions and elapsed time passes.
        #[test]
        fn disabled_timer_is_inert(deltas_ms in proptest::collection::vec(0i64..50_000, 6)) {
            let mut doc = StateDocument {
                draft_sequence: SEQUENCE.iter().map(|s| s.to_string()).collect(),
                current_turn: 0,
                picks: vec![None; SEQUENCE.len()],
                blue_scores: vec![],
                red_scores: vec![],
                blue_locked: false,
                red_locked: false,
                timer: Some(TimerFields::disabled(0)),
            };
            let mut now = 0i64;
            for (i, delta) in deltas_ms.into_iter().enumerate() {
                now += delta;
                let turn = doc.current_turn;
                if turn >= doc.draft_sequence.len() {
                    break;
                }
                let side = Side::of_token(&doc.draft_sequence[turn]).unwrap();
                let op = op_for_turn(turn, format!("c{i}"));
                if let Ok(next) = reduce(&doc, &[], side, &op, now) {
                    doc = next;
                }
            }
            let t = doc.timer.unwrap();
            assert_eq!(t.reserve_left.blue, 0.0);
            assert_eq!(t.reserve_left.red, 0.0);
            assert_eq!(t.grace_left, GRACE_SECONDS);
        }
    }
}
