// Session accounting when the tick loop misses one or more session ends.

mod common;

use assert_matches::assert_matches;
use common::{short_day, Harness, MINUTE};
use focus_break::{
    config::TimerSettings,
    state::{TickOutcome, TimerKind},
};

const BREAK: i64 = 12_000;

#[test]
fn focus_overshoot_completes_several_sessions() {
    let mut h = Harness::new(TimerSettings::new(60_000, 5, 6).unwrap());
    h.coordinator.start_or_pause(TimerKind::Focus).unwrap();
    assert_eq!(h.coordinator.current_session_end(TimerKind::Focus), Some(60_000));

    // Session end recorded 185s in the past.
    h.clock.set(60_000 + 185_000);
    let outcome = h.coordinator.tick(TimerKind::Focus);

    assert_eq!(h.completed(TimerKind::Focus), 4);
    assert_matches!(outcome, TickOutcome::Reschedule { active: TimerKind::Focus, .. });
    let end = h.coordinator.current_session_end(TimerKind::Focus).unwrap();
    assert_eq!(end, 300_000);
    assert!(end > h.clock_now());
    assert_eq!(h.coordinator.timer(TimerKind::Focus).remaining_ms(), 55_000);
}

#[test]
fn tick_without_overshoot_only_refreshes() {
    let mut h = Harness::new(short_day(4));
    h.coordinator.start_or_pause(TimerKind::Focus).unwrap();
    let projected = h.projected_end();

    h.clock.advance(20_000);
    h.coordinator.tick(TimerKind::Focus);

    assert_eq!(h.completed(TimerKind::Focus), 0);
    assert_eq!(h.projected_end(), projected);
    assert_eq!(
        h.display.last_countdown(TimerKind::Focus),
        Some(std::time::Duration::from_millis(40_000))
    );
    assert!(h.coordinator.current_session_end(TimerKind::Focus).unwrap() >= h.clock_now());
}

#[test]
fn break_ending_with_nothing_owed_hands_over_to_focus() {
    // Focus and break have completed the same number of sessions when the
    // break session ends.
    let mut h = Harness::new(short_day(4));
    h.coordinator.start_or_pause(TimerKind::Break).unwrap();
    assert_eq!(h.coordinator.current_session_end(TimerKind::Break), Some(BREAK));

    h.clock.set(BREAK + 5_000);
    h.coordinator.tick(TimerKind::Break);

    assert_eq!(h.completed(TimerKind::Break), 1);
    assert_eq!(h.completed(TimerKind::Focus), 0);
    assert_eq!(h.coordinator.active_kind(), Some(TimerKind::Focus));
    assert_eq!(h.coordinator.timer(TimerKind::Break).remaining_ms(), BREAK);
    // Focus picked up right where the break ended.
    assert_eq!(h.coordinator.current_session_end(TimerKind::Focus), Some(BREAK + MINUTE));
    assert_eq!(h.coordinator.remaining_ms(TimerKind::Focus), 55_000);
}

#[test]
fn break_ending_with_nothing_owed_counts_later_focus_sessions() {
    let mut h = Harness::new(short_day(4));
    h.coordinator.start_or_pause(TimerKind::Break).unwrap();

    h.clock.set(BREAK + 130_000);
    h.coordinator.tick(TimerKind::Break);

    assert_eq!(h.completed(TimerKind::Break), 1);
    assert_eq!(h.completed(TimerKind::Focus), 2);
    assert_eq!(h.coordinator.active_kind(), Some(TimerKind::Focus));
    assert_eq!(
        h.coordinator.current_session_end(TimerKind::Focus),
        Some(BREAK + 3 * MINUTE)
    );
}

/// Three focus sessions done, then the break timer is started.
fn owed_three_breaks() -> Harness {
    let mut h = Harness::new(short_day(5));
    h.coordinator.start_or_pause(TimerKind::Focus).unwrap();
    h.clock.set(3 * MINUTE + 1_000);
    h.coordinator.tick(TimerKind::Focus);
    assert_eq!(h.completed(TimerKind::Focus), 3);

    h.coordinator.start_or_pause(TimerKind::Break).unwrap();
    assert_eq!(h.coordinator.timer(TimerKind::Focus).remaining_ms(), 59_000);
    assert_eq!(
        h.coordinator.current_session_end(TimerKind::Break),
        Some(3 * MINUTE + 1_000 + BREAK)
    );
    h
}

#[test]
fn owed_breaks_keep_break_running_until_paid() {
    let mut h = owed_three_breaks();
    let break_end = 3 * MINUTE + 1_000 + BREAK;

    h.clock.set(break_end + 13_000);
    h.coordinator.tick(TimerKind::Break);
    assert_eq!(h.completed(TimerKind::Break), 2);
    assert_eq!(h.coordinator.active_kind(), Some(TimerKind::Break));
    assert_eq!(
        h.coordinator.current_session_end(TimerKind::Break),
        Some(break_end + 2 * BREAK)
    );

    h.clock.set(break_end + 2 * BREAK + 500);
    h.coordinator.tick(TimerKind::Break);
    assert_eq!(h.completed(TimerKind::Break), 3);
    assert_eq!(h.completed(TimerKind::Focus), 3);
    assert_eq!(h.coordinator.active_kind(), Some(TimerKind::Focus));
    assert_eq!(
        h.coordinator.current_session_end(TimerKind::Focus),
        Some(break_end + 2 * BREAK + 59_000)
    );
}

#[test]
fn long_gap_pays_all_owed_breaks_then_counts_focus() {
    let mut h = owed_three_breaks();
    let break_end = 3 * MINUTE + 1_000 + BREAK;

    h.clock.set(break_end + 106_000);
    h.coordinator.tick(TimerKind::Break);

    assert_eq!(h.completed(TimerKind::Break), 3);
    assert_eq!(h.completed(TimerKind::Focus), 4);
    assert_eq!(h.coordinator.active_kind(), Some(TimerKind::Focus));
    let end = h.coordinator.current_session_end(TimerKind::Focus).unwrap();
    assert_eq!(end, break_end + 2 * BREAK + 59_000 + MINUTE);
    assert!(end > h.clock_now());
}

#[test]
fn gap_past_the_last_focus_session_completes_the_day() {
    let mut h = owed_three_breaks();
    let break_end = 3 * MINUTE + 1_000 + BREAK;

    h.clock.set(break_end + 150_000);
    assert_eq!(h.coordinator.tick(TimerKind::Break), TickOutcome::Stopped);

    assert_eq!(h.notifier.day_complete_count(), 1);
    assert_eq!(h.completed(TimerKind::Focus), 0);
    assert_eq!(h.completed(TimerKind::Break), 0);
    assert_eq!(h.coordinator.active_kind(), None);
    assert_eq!(h.projected_end(), None);
}

#[test]
fn focus_catch_up_to_total_resets_everything_once() {
    let mut h = Harness::new(short_day(4));
    h.coordinator.start_or_pause(TimerKind::Focus).unwrap();
    h.coordinator
        .adjust_session_count(TimerKind::Break, focus_break::Adjustment::Increase, true)
        .unwrap();

    h.clock.set(10 * MINUTE);
    assert_eq!(h.coordinator.tick(TimerKind::Focus), TickOutcome::Stopped);
    assert_eq!(h.coordinator.tick(TimerKind::Focus), TickOutcome::Stopped);

    assert_eq!(h.notifier.day_complete_count(), 1);
    for kind in [TimerKind::Focus, TimerKind::Break] {
        let timer = h.coordinator.timer(kind);
        assert_eq!(timer.sessions_completed(), 0);
        assert_eq!(timer.remaining_ms(), timer.full_session_ms());
        assert!(!timer.is_running());
        assert!(!timer.all_sessions_completed());
    }
    assert_eq!(h.projected_end(), None);
}

#[test]
fn overdue_session_is_reconciled_before_pausing() {
    let mut h = Harness::new(short_day(4));
    h.coordinator.start_or_pause(TimerKind::Focus).unwrap();

    // Pause pressed after the session ended but before any tick saw it.
    h.clock.set(MINUTE + 15_000);
    h.coordinator.start_or_pause(TimerKind::Focus).unwrap();

    assert_eq!(h.completed(TimerKind::Focus), 1);
    assert_eq!(h.coordinator.active_kind(), None);
    assert_eq!(h.coordinator.timer(TimerKind::Focus).remaining_ms(), 45_000);
}

impl Harness {
    fn clock_now(&self) -> i64 {
        use focus_break::clock::Clock;
        self.clock.now_ms()
    }
}
