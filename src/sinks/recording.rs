//! In-memory sinks for tests and headless hosts

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use chrono::{DateTime, Utc};

use super::{DisplaySink, NotificationSink};
use crate::state::{ProjectionEntry, TimerKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayEvent {
    Countdown(TimerKind, Duration),
    Markers(TimerKind, u32, u32),
    Projection(Option<DateTime<Utc>>),
    History(Vec<ProjectionEntry>),
}

/// Display sink that keeps every rendered value. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct RecordingDisplay {
    events: Arc<Mutex<Vec<DisplayEvent>>>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DisplayEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }

    /// Most recent countdown rendered for `kind`
    pub fn last_countdown(&self, kind: TimerKind) -> Option<Duration> {
        self.events().into_iter().rev().find_map(|event| match event {
            DisplayEvent::Countdown(k, remaining) if k == kind => Some(remaining),
            _ => None,
        })
    }

    /// Most recent projection rendered
    pub fn last_projection(&self) -> Option<Option<DateTime<Utc>>> {
        self.events().into_iter().rev().find_map(|event| match event {
            DisplayEvent::Projection(at) => Some(at),
            _ => None,
        })
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }

    fn push(&self, event: DisplayEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl DisplaySink for RecordingDisplay {
    fn render_countdown(&mut self, kind: TimerKind, remaining: Duration) {
        self.push(DisplayEvent::Countdown(kind, remaining));
    }

    fn render_session_markers(&mut self, kind: TimerKind, completed: u32, total: u32) {
        self.push(DisplayEvent::Markers(kind, completed, total));
    }

    fn render_projection(&mut self, projected_end: Option<DateTime<Utc>>) {
        self.push(DisplayEvent::Projection(projected_end));
    }

    fn render_projection_history(&mut self, history: &[ProjectionEntry]) {
        self.push(DisplayEvent::History(history.to_vec()));
    }
}

/// Notification sink that counts alerts. Clones share the counters.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    counts: Arc<Mutex<(usize, usize)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn day_complete_count(&self) -> usize {
        self.counts.lock().map(|counts| counts.0).unwrap_or(0)
    }

    pub fn no_breaks_left_count(&self) -> usize {
        self.counts.lock().map(|counts| counts.1).unwrap_or(0)
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify_day_complete(&mut self) {
        if let Ok(mut counts) = self.counts.lock() {
            counts.0 += 1;
        }
    }

    fn notify_no_breaks_left(&mut self) {
        if let Ok(mut counts) = self.counts.lock() {
            counts.1 += 1;
        }
    }
}
