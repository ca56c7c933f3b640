//! Terminal rendering of timers and alerts

use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use tracing::{debug, info};

use super::{timestamp, DisplaySink, NotificationSink};
use crate::state::{ProjectionEntry, TimerKind};

/// Format a countdown as `MM:SS` (minutes may exceed 59)
pub fn format_countdown(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Format completed sessions as filled markers followed by empty ones
pub fn format_markers(completed: u32, total: u32) -> String {
    (0..total)
        .map(|index| if index < completed { '●' } else { '○' })
        .collect()
}

/// Local wall-clock `HH:MM`, or `??:??` when unknown
pub fn format_clock(at: Option<DateTime<Utc>>) -> String {
    match at {
        Some(at) => at.with_timezone(&Local).format("%H:%M").to_string(),
        None => "??:??".to_string(),
    }
}

/// Display sink that prints to stdout.
///
/// Per-second countdown refreshes go to the debug log so the terminal is
/// only written when something actually changes.
#[derive(Debug, Default)]
pub struct TerminalDisplay {
    last_countdown: Option<(TimerKind, u64)>,
}

impl TerminalDisplay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DisplaySink for TerminalDisplay {
    fn render_countdown(&mut self, kind: TimerKind, remaining: Duration) {
        let minutes = remaining.as_secs() / 60;
        let text = format_countdown(remaining);
        if self.last_countdown != Some((kind, minutes)) {
            println!("{:>5}  {}", kind, text);
            self.last_countdown = Some((kind, minutes));
        } else {
            debug!("{} countdown {}", kind, text);
        }
    }

    fn render_session_markers(&mut self, kind: TimerKind, completed: u32, total: u32) {
        println!("{:>5}  {} ({}/{})", kind, format_markers(completed, total), completed, total);
    }

    fn render_projection(&mut self, projected_end: Option<DateTime<Utc>>) {
        println!("  end  {}", format_clock(projected_end));
    }

    fn render_projection_history(&mut self, history: &[ProjectionEntry]) {
        if history.is_empty() {
            return;
        }
        let entries: Vec<String> = history
            .iter()
            .map(|entry| {
                format!(
                    "{} (set at {})",
                    format_clock(timestamp(entry.projected_end)),
                    format_clock(timestamp(entry.computed_at))
                )
            })
            .collect();
        println!("  was  {}", entries.join(", "));
    }
}

/// Notification sink that rings the terminal bell
#[derive(Debug, Default)]
pub struct TerminalNotifier;

impl NotificationSink for TerminalNotifier {
    fn notify_day_complete(&mut self) {
        info!("Day complete");
        println!("\x07Focus time completed for today!");
    }

    fn notify_no_breaks_left(&mut self) {
        info!("Break start refused, no sessions left");
        println!("\x07No more break sessions left!");
    }
}
