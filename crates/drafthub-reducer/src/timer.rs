// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The Timer Engine burn algorithm (spec.md §4.2).

use drafthub_proto::{Side, StateDocument, GRACE_SECONDS};

/// Burn elapsed wall-clock time from `timerUpdatedAt` to `now_ms` into the
/// appropriate reserve bucket. A no-op when the timer is disabled, the acting
/// side is sideless or paused, or the current slot is a frozen first ban.
pub fn burn(doc: &mut StateDocument, now_ms: i64) {
    doc.ensure_timer(now_ms);
    let Some(timer) = doc.timer.as_ref() else {
        return;
    };
    if !timer.timer_enabled {
        return;
    }

    let current_turn = doc.current_turn;
    let side = doc.current_token().and_then(Side::of_token);
    let frozen = doc.is_first_ban_slot_for_side(current_turn);

    // Documented panic: `doc.timer` was just matched as `Some` above.
    #[allow(clippy::expect_used)]
    let timer = doc.timer.as_mut().expect("checked above");
    let dt_ms = (now_ms - timer.timer_updated_at).max(0);
    let mut dt = dt_ms as f64 / 1000.0;

    let Some(side) = side else {
        timer.timer_updated_at = now_ms;
        return;
    };
    if timer.paused.get(side) || frozen {
        timer.timer_updated_at = now_ms;
        return;
    }

    let drained = dt.min(timer.grace_left);
    timer.grace_left -= drained;
    dt -= drained;

    let reserve = timer.reserve_left.get(side);
    timer.reserve_left.set(side, (reserve - dt).max(0.0));
    timer.timer_updated_at = now_ms;
}

/// Re-initialize the per-turn grace window at a turn boundary. Must be
/// called after `burn` has accounted for the turn just concluded.
pub fn reset_grace(doc: &mut StateDocument, now_ms: i64) {
    if let Some(timer) = doc.timer.as_mut() {
        if timer.timer_enabled {
            timer.grace_left = GRACE_SECONDS;
            timer.timer_updated_at = now_ms;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drafthub_proto::{Slot, TimerFields};

    fn base_doc(timer_enabled: bool, reserve: f64) -> StateDocument {
        StateDocument {
            draft_sequence: vec!["BB".into(), "RR".into(), "B".into(), "R".into()],
            current_turn: 2,
            picks: vec![
                Some(Slot::new_ban("c1".into())),
                Some(Slot::new_ban("c2".into())),
                None,
                None,
            ],
            blue_scores: vec![],
            red_scores: vec![],
            blue_locked: false,
            red_locked: false,
            timer: Some(if timer_enabled {
                TimerFields::enabled(reserve, 0)
            } else {
                TimerFields::disabled(0)
            }),
        }
    }

    #[test]
    fn disabled_timer_never_changes_reserve_or_grace() {
        let mut doc = base_doc(false, 180.0);
        burn(&mut doc, 100_000);
        let t = doc.timer.unwrap();
        assert_eq!(t.reserve_left.blue, 0.0);
        assert_eq!(t.reserve_left.red, 0.0);
        assert_eq!(t.grace_left, GRACE_SECONDS);
    }

    #[test]
    fn burn_drains_grace_before_reserve() {
        // Blue on the clock at index 2; 35s elapse: 30s grace, 5s reserve.
        let mut doc = base_doc(true, 180.0);
        burn(&mut doc, 35_000);
        let t = doc.timer.unwrap();
        assert_eq!(t.grace_left, 0.0);
        assert_eq!(t.reserve_left.blue, 175.0);
        assert_eq!(t.reserve_left.red, 180.0);
        assert_eq!(t.timer_updated_at, 35_000);
    }

    #[test]
    fn burn_is_a_noop_for_zero_duration() {
        let mut doc = base_doc(true, 180.0);
        burn(&mut doc, 0);
        let t = doc.timer.clone().unwrap();
        assert_eq!(t.reserve_left.blue, 180.0);
        assert_eq!(t.grace_left, GRACE_SECONDS);
    }

    #[test]
    fn first_ban_slot_is_frozen() {
        let mut doc = base_doc(true, 180.0);
        doc.current_turn = 0; // BB, first (and only) Blue ban slot
        burn(&mut doc, 60_000);
        let t = doc.timer.unwrap();
        assert_eq!(t.reserve_left.blue, 180.0);
        assert_eq!(t.grace_left, GRACE_SECONDS);
        assert_eq!(t.timer_updated_at, 60_000);
    }

    #[test]
    fn paused_side_does_not_burn() {
        let mut doc = base_doc(true, 180.0);
        doc.timer.as_mut().unwrap().paused.blue = true;
        burn(&mut doc, 60_000);
        let t = doc.timer.unwrap();
        assert_eq!(t.reserve_left.blue, 180.0);
        assert_eq!(t.grace_left, GRACE_SECONDS);
    }

    #[test]
    fn reserve_floors_at_zero() {
        let mut doc = base_doc(true, 10.0);
        burn(&mut doc, ((30.0 + 10.0 + 50.0) * 1000.0) as i64);
        let t = doc.timer.unwrap();
        assert_eq!(t.reserve_left.blue, 0.0);
    }
}
