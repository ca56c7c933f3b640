//! Single focus or break countdown

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which of the two alternating timers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerKind {
    Focus,
    Break,
}

impl TimerKind {
    pub fn other(self) -> Self {
        match self {
            TimerKind::Focus => TimerKind::Break,
            TimerKind::Break => TimerKind::Focus,
        }
    }

    /// Storage key of this timer's persisted record
    pub fn storage_key(self) -> &'static str {
        match self {
            TimerKind::Focus => "focusTimer",
            TimerKind::Break => "breakTimer",
        }
    }
}

impl fmt::Display for TimerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            TimerKind::Focus => "focus",
            TimerKind::Break => "break",
        })
    }
}

/// Per-kind session bookkeeping.
///
/// `remaining_ms` is authoritative only while the timer is paused. While
/// it runs, the coordinator derives the real value from the projection and
/// only writes back the last displayed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTimer {
    kind: TimerKind,
    full_session_ms: i64,
    total_sessions: u32,
    sessions_completed: u32,
    running: bool,
    remaining_ms: i64,
    all_sessions_completed: bool,
}

impl SessionTimer {
    pub fn new(kind: TimerKind, full_session_ms: i64, total_sessions: u32) -> Self {
        Self {
            kind,
            full_session_ms,
            total_sessions,
            sessions_completed: 0,
            running: false,
            remaining_ms: full_session_ms,
            all_sessions_completed: false,
        }
    }

    pub fn kind(&self) -> TimerKind {
        self.kind
    }

    pub fn full_session_ms(&self) -> i64 {
        self.full_session_ms
    }

    pub fn total_sessions(&self) -> u32 {
        self.total_sessions
    }

    pub fn sessions_completed(&self) -> u32 {
        self.sessions_completed
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining_ms(&self) -> i64 {
        self.remaining_ms
    }

    pub fn all_sessions_completed(&self) -> bool {
        self.all_sessions_completed
    }

    pub fn reset(&mut self) {
        self.sessions_completed = 0;
        self.remaining_ms = self.full_session_ms;
        self.running = false;
        self.all_sessions_completed = false;
    }

    /// Complete `n` sessions, never going past the daily total.
    ///
    /// Returns true when the total has been reached, in which case nothing
    /// is left of the current session either.
    pub fn advance(&mut self, n: u32) -> bool {
        self.sessions_completed = self
            .sessions_completed
            .saturating_add(n)
            .min(self.total_sessions);
        if self.sessions_completed == self.total_sessions {
            self.all_sessions_completed = true;
            self.remaining_ms = 0;
        }
        self.all_sessions_completed
    }

    /// Undo one completed session. Returns false at zero.
    ///
    /// Leaving the exhausted state restores a full session so the timer
    /// has something to count down again.
    pub fn rewind(&mut self) -> bool {
        if self.sessions_completed == 0 {
            return false;
        }
        self.sessions_completed -= 1;
        if self.all_sessions_completed {
            self.all_sessions_completed = false;
            self.remaining_ms = self.full_session_ms;
        }
        true
    }

    /// Shift the paused countdown by `delta_ms`.
    ///
    /// Returns false, leaving the timer untouched, when the result would not
    /// be strictly positive.
    pub fn adjust_duration(&mut self, delta_ms: i64) -> bool {
        match self.remaining_ms.checked_add(delta_ms) {
            Some(next) if next > 0 => {
                self.remaining_ms = next;
                true
            }
            _ => false,
        }
    }

    /// Sessions not yet begun, excluding the one in progress
    pub fn future_sessions(&self) -> u32 {
        self.total_sessions
            .saturating_sub(self.sessions_completed)
            .saturating_sub(1)
    }

    pub fn future_sessions_ms(&self) -> i64 {
        i64::from(self.future_sessions()).saturating_mul(self.full_session_ms)
    }

    /// Start the next session from the top
    pub(crate) fn begin_next_session(&mut self) {
        if !self.all_sessions_completed {
            self.remaining_ms = self.full_session_ms;
        }
    }

    pub(crate) fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    pub(crate) fn set_remaining(&mut self, remaining_ms: i64) {
        self.remaining_ms = remaining_ms.max(0);
    }

    /// Rebuild a timer from persisted fields that were already validated
    pub(crate) fn restore(
        &mut self,
        sessions_completed: u32,
        running: bool,
        remaining_ms: i64,
        all_sessions_completed: bool,
    ) {
        self.sessions_completed = sessions_completed;
        self.running = running;
        self.remaining_ms = remaining_ms;
        self.all_sessions_completed = all_sessions_completed;
    }
}
