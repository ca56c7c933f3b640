//! Output collaborators of the scheduler
//!
//! The coordinator only pushes values out through these traits; it never
//! reads anything back from them.

pub mod recording;
pub mod terminal;

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::state::{ProjectionEntry, TimerKind};

pub use recording::{DisplayEvent, RecordingDisplay, RecordingNotifier};
pub use terminal::{TerminalDisplay, TerminalNotifier};

/// Receives everything that should be shown to the user
pub trait DisplaySink: Send {
    fn render_countdown(&mut self, kind: TimerKind, remaining: Duration);
    fn render_session_markers(&mut self, kind: TimerKind, completed: u32, total: u32);
    fn render_projection(&mut self, projected_end: Option<DateTime<Utc>>);
    fn render_projection_history(&mut self, history: &[ProjectionEntry]);
}

/// Receives one-off alerts
pub trait NotificationSink: Send {
    fn notify_day_complete(&mut self);
    fn notify_no_breaks_left(&mut self);
}

/// Convert a signed millisecond span into a displayable duration
pub fn display_duration(ms: i64) -> Duration {
    Duration::from_millis(u64::try_from(ms).unwrap_or(0))
}

/// Convert epoch milliseconds into a UTC timestamp
pub fn timestamp(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
}
