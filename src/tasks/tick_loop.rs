//! Self-rescheduling tick of the running timer

use std::sync::Arc;

use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::{
    clock::Clock,
    state::{AppState, TickOutcome, TICK_INTERVAL},
};

/// Wall-clock gap between two loop iterations that means the host was
/// suspended rather than merely busy
pub const SUSPENSION_GAP_MS: i64 = 5_000;

/// Length of a gap that indicates a suspension, if any
pub fn suspension_gap(last_seen_ms: i64, now_ms: i64) -> Option<i64> {
    let gap = now_ms - last_seen_ms;
    (gap > SUSPENSION_GAP_MS).then_some(gap)
}

/// Background task ticking whichever timer runs.
///
/// The tick cadence only drives the display; missed ticks are harmless
/// because every tick reconciles against the wall clock.
pub async fn tick_loop_task(state: AppState, clock: Arc<dyn Clock>) {
    info!("Starting tick loop");

    let mut last_seen = clock.now_ms();

    loop {
        let now = clock.now_ms();
        if let Some(gap) = suspension_gap(last_seen, now) {
            info!("Tick loop resumed after {}s away, catching up", gap / 1_000);
        }
        last_seen = now;

        let outcome = state.with(|coordinator| match coordinator.active_kind() {
            Some(kind) => coordinator.tick(kind),
            None => TickOutcome::Stopped,
        });

        match outcome {
            Ok(TickOutcome::Reschedule { active, after }) => {
                tokio::select! {
                    _ = sleep(after) => {}
                    _ = state.woken() => {
                        debug!("Tick loop woken while {} timer runs", active);
                    }
                }
            }
            Ok(TickOutcome::Stopped) => {
                debug!("No timer running, tick loop waiting");
                state.woken().await;
                last_seen = clock.now_ms();
            }
            Err(e) => {
                error!("Failed to tick: {}", e);
                sleep(TICK_INTERVAL).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::ManualClock,
        config::{TimerSettings, MS_PER_MINUTE},
        persistence::MemoryStore,
        sinks::{RecordingDisplay, RecordingNotifier},
        state::{Collaborators, DualTimerCoordinator, TimerKind},
    };
    use std::time::Duration;

    #[test]
    fn short_gaps_are_not_suspensions() {
        assert_eq!(suspension_gap(0, 1_000), None);
        assert_eq!(suspension_gap(0, SUSPENSION_GAP_MS), None);
        assert_eq!(suspension_gap(0, 60_000), Some(60_000));
    }

    #[tokio::test]
    async fn loop_catches_up_after_clock_jump() {
        let clock = ManualClock::new(0);
        let settings = TimerSettings::new(MS_PER_MINUTE, 1, 10).unwrap();
        let coordinator = DualTimerCoordinator::new(
            settings,
            Collaborators {
                clock: Arc::new(clock.clone()),
                display: Box::new(RecordingDisplay::new()),
                notifier: Box::new(RecordingNotifier::new()),
                store: Box::new(MemoryStore::new()),
            },
        );
        let state = AppState::new(coordinator);
        state
            .with(|c| c.start_or_pause(TimerKind::Focus))
            .unwrap()
            .unwrap();

        // Three and a bit sessions pass while nothing ticks.
        clock.advance(3 * MS_PER_MINUTE + 500);
        let handle = tokio::spawn(tick_loop_task(state.clone(), Arc::new(clock.clone())));

        let mut completed = 0;
        for _ in 0..200 {
            completed = state
                .with(|c| c.timer(TimerKind::Focus).sessions_completed())
                .unwrap();
            if completed > 0 {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }
        handle.abort();

        assert_eq!(completed, 3);
        assert_eq!(state.active_kind().unwrap(), Some(TimerKind::Focus));
    }
}
