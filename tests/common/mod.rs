// Shared harness for driving the coordinator with a hand-moved clock.

#![allow(dead_code)]

use std::sync::Arc;

use focus_break::{
    clock::ManualClock,
    config::{TimerSettings, MS_PER_MINUTE},
    persistence::MemoryStore,
    sinks::{RecordingDisplay, RecordingNotifier},
    state::{Collaborators, DualTimerCoordinator, TimerKind},
};

pub const MINUTE: i64 = MS_PER_MINUTE;

pub struct Harness {
    pub clock: ManualClock,
    pub display: RecordingDisplay,
    pub notifier: RecordingNotifier,
    pub store: MemoryStore,
    pub settings: TimerSettings,
    pub coordinator: DualTimerCoordinator,
}

impl Harness {
    pub fn new(settings: TimerSettings) -> Self {
        Self::with_store(settings, MemoryStore::new(), ManualClock::new(0))
    }

    /// Restore a coordinator from `store` at the clock's current time
    pub fn with_store(settings: TimerSettings, store: MemoryStore, clock: ManualClock) -> Self {
        let display = RecordingDisplay::new();
        let notifier = RecordingNotifier::new();
        let coordinator = DualTimerCoordinator::restore(
            settings,
            Collaborators {
                clock: Arc::new(clock.clone()),
                display: Box::new(display.clone()),
                notifier: Box::new(notifier.clone()),
                store: Box::new(store.clone()),
            },
        );
        Self {
            clock,
            display,
            notifier,
            store,
            settings,
            coordinator,
        }
    }

    /// Simulate a process restart on the same store and clock
    pub fn restart(&self) -> Self {
        Self::with_store(self.settings, self.store.clone(), self.clock.clone())
    }

    pub fn completed(&self, kind: TimerKind) -> u32 {
        self.coordinator.timer(kind).sessions_completed()
    }

    pub fn projected_end(&self) -> Option<i64> {
        self.coordinator.projection().projected_end()
    }

    pub fn assert_at_most_one_running(&self) {
        let focus = self.coordinator.timer(TimerKind::Focus).is_running();
        let brk = self.coordinator.timer(TimerKind::Break).is_running();
        assert!(!(focus && brk), "both timers running");
    }
}

/// One-minute focus sessions, 12 second breaks
pub fn short_day(sessions: u32) -> TimerSettings {
    TimerSettings::new(MINUTE, 5, sessions).unwrap()
}
