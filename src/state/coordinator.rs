//! Coordination of the focus and break timers
//!
//! At most one timer runs at a time. While one runs, the projected end of
//! the day is the only absolute time held anywhere; the running timer's
//! session end is derived from it as
//!
//! ```text
//! session_end(active) = projected_end
//!     - remaining(paused)
//!     - future_sessions(active) * full(active)
//!     - future_sessions(paused) * full(paused)
//! ```
//!
//! Completing sessions only moves counts, so the derived session end walks
//! forward while the projection stays put. After any suspension the
//! persisted counts, the paused timer's remaining time and the projection
//! are all that is needed to catch up.

use std::{sync::Arc, time::Duration};

use serde::Serialize;
use tracing::{debug, info, warn};

use super::{EndingProjection, ProjectionEntry, SessionTimer, TimerKind};
use crate::{
    clock::Clock,
    config::{TimerSettings, MS_PER_MINUTE},
    error::Rejected,
    persistence::{Snapshot, StateStore},
    sinks::{display_duration, timestamp, DisplaySink, NotificationSink},
};

/// Delay between display refreshes of the running timer
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Direction of a +/- control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    Increase,
    Decrease,
}

impl Adjustment {
    fn sign(self) -> i64 {
        match self {
            Adjustment::Increase => 1,
            Adjustment::Decrease => -1,
        }
    }
}

/// What the tick loop should do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Tick `active` again after `after`
    Reschedule { active: TimerKind, after: Duration },
    /// Nothing is running any more
    Stopped,
}

/// External collaborators the coordinator pushes into
pub struct Collaborators {
    pub clock: Arc<dyn Clock>,
    pub display: Box<dyn DisplaySink>,
    pub notifier: Box<dyn NotificationSink>,
    pub store: Box<dyn StateStore>,
}

/// Read-only view of one timer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimerStatus {
    pub kind: TimerKind,
    pub running: bool,
    pub remaining_ms: i64,
    pub sessions_completed: u32,
    pub total_sessions: u32,
    pub all_sessions_completed: bool,
}

/// Read-only view of the whole scheduler
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    pub active: Option<TimerKind>,
    pub focus: TimerStatus,
    #[serde(rename = "break")]
    pub brk: TimerStatus,
    pub projected_end: Option<i64>,
    pub history: Vec<ProjectionEntry>,
}

/// Owner of both timers and the ending projection
pub struct DualTimerCoordinator {
    settings: TimerSettings,
    focus: SessionTimer,
    brk: SessionTimer,
    projection: EndingProjection,
    clock: Arc<dyn Clock>,
    display: Box<dyn DisplaySink>,
    notifier: Box<dyn NotificationSink>,
    store: Box<dyn StateStore>,
}

impl DualTimerCoordinator {
    /// Create a coordinator at the start of a fresh day
    pub fn new(settings: TimerSettings, collaborators: Collaborators) -> Self {
        Self {
            settings,
            focus: SessionTimer::new(
                TimerKind::Focus,
                settings.focus_session_ms(),
                settings.focus_sessions(),
            ),
            brk: SessionTimer::new(
                TimerKind::Break,
                settings.break_session_ms(),
                settings.break_sessions(),
            ),
            projection: EndingProjection::new(),
            clock: collaborators.clock,
            display: collaborators.display,
            notifier: collaborators.notifier,
            store: collaborators.store,
        }
    }

    /// Create a coordinator from whatever the store holds.
    ///
    /// Invalid records are discarded as a whole. A timer that was running
    /// when the records were written is running again; the first tick
    /// catches up on the time spent away.
    pub fn restore(settings: TimerSettings, collaborators: Collaborators) -> Self {
        let mut coordinator = Self::new(settings, collaborators);
        match Snapshot::load(&*coordinator.store, &settings) {
            Ok(Some(snapshot)) => {
                snapshot.apply(&mut coordinator.focus, &mut coordinator.brk, &mut coordinator.projection);
                match coordinator.active_kind() {
                    Some(kind) => info!("Restored state, resuming {} timer", kind),
                    None => info!("Restored state, both timers paused"),
                }
            }
            Ok(None) => info!("No saved state, starting a fresh day"),
            Err(e) => warn!("Discarding saved state: {}", e),
        }
        coordinator.render_all();
        coordinator
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    pub fn timer(&self, kind: TimerKind) -> &SessionTimer {
        match kind {
            TimerKind::Focus => &self.focus,
            TimerKind::Break => &self.brk,
        }
    }

    fn timer_mut(&mut self, kind: TimerKind) -> &mut SessionTimer {
        match kind {
            TimerKind::Focus => &mut self.focus,
            TimerKind::Break => &mut self.brk,
        }
    }

    pub fn projection(&self) -> &EndingProjection {
        &self.projection
    }

    pub fn active_kind(&self) -> Option<TimerKind> {
        if self.focus.is_running() {
            Some(TimerKind::Focus)
        } else if self.brk.is_running() {
            Some(TimerKind::Break)
        } else {
            None
        }
    }

    /// Where the running timer's current session ends, derived from the projection
    pub fn current_session_end(&self, kind: TimerKind) -> Option<i64> {
        let projected_end = self.projection.projected_end()?;
        let active = self.timer(kind);
        let other = self.timer(kind.other());
        projected_end
            .checked_sub(other.remaining_ms())?
            .checked_sub(active.future_sessions_ms())?
            .checked_sub(other.future_sessions_ms())
    }

    /// Time left in `kind`'s current session as of now
    pub fn remaining_ms(&self, kind: TimerKind) -> i64 {
        let timer = self.timer(kind);
        if timer.is_running() {
            if let Some(end) = self.current_session_end(kind) {
                return end.saturating_sub(self.clock.now_ms()).max(0);
            }
        }
        timer.remaining_ms()
    }

    pub fn status(&self) -> Status {
        Status {
            active: self.active_kind(),
            focus: self.timer_status(TimerKind::Focus),
            brk: self.timer_status(TimerKind::Break),
            projected_end: self.projection.projected_end(),
            history: self.projection.history().to_vec(),
        }
    }

    fn timer_status(&self, kind: TimerKind) -> TimerStatus {
        let timer = self.timer(kind);
        TimerStatus {
            kind,
            running: timer.is_running(),
            remaining_ms: self.remaining_ms(kind),
            sessions_completed: timer.sessions_completed(),
            total_sessions: timer.total_sessions(),
            all_sessions_completed: timer.all_sessions_completed(),
        }
    }

    /// Start `kind` if it is paused, pause it if it runs.
    ///
    /// Starting one timer pauses the other. Starting from idle computes a
    /// new projection; switching keeps the existing one since the total
    /// time left does not change.
    pub fn start_or_pause(&mut self, kind: TimerKind) -> Result<(), Rejected> {
        let was_running = self.timer(kind).is_running();
        if self.settle() {
            // The day rolled over while we were away; the press is absorbed.
            return Ok(());
        }

        if !was_running && kind == TimerKind::Break && self.brk.all_sessions_completed() {
            warn!("Refusing to start break timer, no sessions left");
            self.notifier.notify_no_breaks_left();
            return Err(Rejected::NoBreaksLeft);
        }

        if was_running {
            // Catching up may have handed over from break to focus.
            if let Some(active) = self.active_kind() {
                self.pause(active);
            }
        } else if !self.timer(kind).is_running() {
            self.start(kind);
        }

        self.persist();
        self.render_all();
        Ok(())
    }

    fn start(&mut self, kind: TimerKind) {
        let now = self.clock.now_ms();
        let other = kind.other();

        if self.timer(other).is_running() {
            let end = self.current_session_end(other).unwrap_or(now);
            let sibling = self.timer_mut(other);
            sibling.set_remaining(end.saturating_sub(now));
            sibling.set_running(false);
            self.timer_mut(kind).set_running(true);
            info!("Switched from {} to {} timer", other, kind);
            return;
        }

        let active = self.timer(kind);
        let sibling = self.timer(other);
        let projected_end = now
            .saturating_add(active.remaining_ms())
            .saturating_add(sibling.remaining_ms())
            .saturating_add(active.future_sessions_ms())
            .saturating_add(sibling.future_sessions_ms());
        self.projection.begin(projected_end, now);
        self.timer_mut(kind).set_running(true);
        info!(
            "Started {} timer, all sessions end in {}s",
            kind,
            (projected_end - now) / 1_000
        );
    }

    fn pause(&mut self, kind: TimerKind) {
        let now = self.clock.now_ms();
        let left = self
            .current_session_end(kind)
            .map_or(0, |end| end.saturating_sub(now));
        let timer = self.timer_mut(kind);
        timer.set_remaining(left);
        timer.set_running(false);
        self.projection.clear(now);
        info!("Paused {} timer with {}ms left", kind, left.max(0));
    }

    /// Refresh the running timer and account for any finished sessions.
    ///
    /// Only ever acts on the timer that is actually running; a stale tick
    /// for a paused timer stops.
    pub fn tick(&mut self, kind: TimerKind) -> TickOutcome {
        if !self.timer(kind).is_running() {
            return TickOutcome::Stopped;
        }
        if self.settle() {
            return TickOutcome::Stopped;
        }
        match self.active_kind() {
            Some(active) => {
                let remaining = self.timer(active).remaining_ms();
                self.display.render_countdown(active, display_duration(remaining));
                TickOutcome::Reschedule {
                    active,
                    after: TICK_INTERVAL,
                }
            }
            None => TickOutcome::Stopped,
        }
    }

    /// Catch the running timer up with the clock.
    ///
    /// Returns true when the day completed along the way.
    fn settle(&mut self) -> bool {
        // Every catch-up pass completes at least one session or hands over
        // from break to focus, so this terminates.
        while let Some(kind) = self.active_kind() {
            let now = self.clock.now_ms();
            let Some(end) = self.current_session_end(kind) else {
                warn!("{} timer has no usable session end, pausing it", kind);
                self.timer_mut(kind).set_running(false);
                self.projection.clear(now);
                self.persist();
                return false;
            };
            if now < end {
                self.timer_mut(kind).set_remaining(end - now);
                return false;
            }
            if self.catch_up(kind, now.saturating_sub(end)) {
                return true;
            }
        }
        false
    }

    fn catch_up(&mut self, kind: TimerKind, overshoot: i64) -> bool {
        let day_complete = match kind {
            TimerKind::Focus => self.catch_up_focus(overshoot),
            TimerKind::Break => self.catch_up_break(overshoot),
        };
        if day_complete {
            self.complete_day();
        } else {
            self.persist();
            self.render_all();
        }
        day_complete
    }

    fn catch_up_focus(&mut self, overshoot: i64) -> bool {
        let sessions = 1 + overshoot / self.focus.full_session_ms();
        info!(
            "{} focus session(s) completed ({}ms past the session end)",
            sessions, overshoot
        );
        self.focus.advance(session_count(sessions))
    }

    fn catch_up_break(&mut self, overshoot: i64) -> bool {
        let break_ms = self.brk.full_session_ms();
        let focus_ms = self.focus.full_session_ms();

        // Breaks owed for focus sessions finished while the break timer lagged.
        let accrued =
            i64::from(self.focus.sessions_completed()) - i64::from(self.brk.sessions_completed());
        let break_sessions = if accrued <= 0 {
            1
        } else if overshoot >= accrued * break_ms {
            accrued
        } else {
            1 + overshoot / break_ms
        };

        if break_sessions < accrued {
            self.brk.advance(session_count(break_sessions));
            info!(
                "{} break session(s) completed, {} still owed",
                break_sessions,
                accrued - break_sessions
            );
            return false;
        }

        self.brk.advance(session_count(break_sessions));
        self.brk.begin_next_session();

        let focus_sessions = (overshoot - (break_sessions - 1) * break_ms) / focus_ms;
        info!(
            "{} break session(s) completed, {} focus session(s) completed since",
            break_sessions, focus_sessions
        );
        if focus_sessions > 0 && self.focus.advance(session_count(focus_sessions)) {
            return true;
        }

        // Hand over without touching the projection: only the label of the
        // running time changes, not the total left.
        self.brk.set_running(false);
        self.focus.set_running(true);
        info!("Break over, switched to focus timer");
        false
    }

    fn complete_day(&mut self) {
        let now = self.clock.now_ms();
        info!(
            "All {} focus sessions completed, resetting both timers",
            self.focus.total_sessions()
        );
        self.focus.reset();
        self.brk.reset();
        self.projection.clear(now);
        self.notifier.notify_day_complete();
        self.persist();
        self.render_all();
    }

    /// Mark one session of `kind` as done or not done.
    ///
    /// Increments stop one short of the total, so this control can never
    /// complete the day. The projection moves by one full session in the
    /// opposite direction when a timer is running.
    pub fn adjust_session_count(
        &mut self,
        kind: TimerKind,
        adjustment: Adjustment,
        log_history: bool,
    ) -> Result<(), Rejected> {
        if self.settle() {
            return Ok(());
        }

        let timer = self.timer_mut(kind);
        let applied = match adjustment {
            Adjustment::Increase => {
                if timer.sessions_completed() + 1 < timer.total_sessions() {
                    timer.advance(1);
                    true
                } else {
                    false
                }
            }
            Adjustment::Decrease => timer.rewind(),
        };
        if !applied {
            debug!("{} session count already at its bound", kind);
            return Err(Rejected::SessionCountAtBound(kind));
        }

        let full = self.timer(kind).full_session_ms();
        self.adjust_projection(-adjustment.sign() * full, log_history);
        debug!(
            "{} sessions completed now {}",
            kind,
            self.timer(kind).sessions_completed()
        );
        self.persist();
        self.render_all();
        Ok(())
    }

    /// Add or remove one minute from `kind`'s current session
    pub fn adjust_minute(
        &mut self,
        kind: TimerKind,
        adjustment: Adjustment,
        log_history: bool,
    ) -> Result<(), Rejected> {
        if self.settle() {
            return Ok(());
        }
        if self.timer(kind).all_sessions_completed() {
            return Err(Rejected::AllSessionsCompleted(kind));
        }

        let delta = adjustment.sign() * MS_PER_MINUTE;
        if self.timer(kind).is_running() {
            let remaining = self.remaining_ms(kind);
            if remaining + delta <= 0 {
                debug!("Not removing a minute from {}, only {}ms left", kind, remaining);
                return Err(Rejected::WouldExhaustSession(kind));
            }
            // The running session end is derived from the projection, so
            // moving the projection is what moves the session.
            self.adjust_projection(delta, log_history);
            self.timer_mut(kind).set_remaining(remaining + delta);
        } else {
            if !self.timer_mut(kind).adjust_duration(delta) {
                debug!("Not removing a minute from paused {}", kind);
                return Err(Rejected::WouldExhaustSession(kind));
            }
            self.adjust_projection(delta, log_history);
        }

        self.persist();
        self.render_all();
        Ok(())
    }

    /// The one place the projection is moved after it was computed
    fn adjust_projection(&mut self, delta_ms: i64, log_history: bool) {
        let now = self.clock.now_ms();
        if self.projection.shift(delta_ms, now, log_history) {
            debug!("Projected end moved by {}ms", delta_ms);
        } else if self.projection.projected_end().is_some() {
            warn!("Projected end cannot move by {}ms", delta_ms);
        }
    }

    /// Pause and reset both timers, forgetting the projection
    pub fn reset(&mut self) {
        let now = self.clock.now_ms();
        self.focus.reset();
        self.brk.reset();
        self.projection.clear(now);
        info!("Both timers reset");
        self.persist();
        self.render_all();
    }

    fn persist(&mut self) {
        let snapshot = Snapshot::capture(&self.focus, &self.brk, &self.projection);
        if let Err(e) = snapshot.save(&mut *self.store) {
            warn!("Failed to persist timer state: {}", e);
        }
    }

    fn render_all(&mut self) {
        for kind in [TimerKind::Focus, TimerKind::Break] {
            let remaining = self.remaining_ms(kind);
            let timer = self.timer(kind);
            let (completed, total) = (timer.sessions_completed(), timer.total_sessions());
            self.display.render_countdown(kind, display_duration(remaining));
            self.display.render_session_markers(kind, completed, total);
        }
        let projected_end = self.projection.projected_end().and_then(timestamp);
        self.display.render_projection(projected_end);
        self.display.render_projection_history(self.projection.history());
    }
}

fn session_count(sessions: i64) -> u32 {
    u32::try_from(sessions.max(0)).unwrap_or(u32::MAX)
}
