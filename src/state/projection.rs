//! Projected end of the working day

use serde::{Deserialize, Serialize};

/// One projection value together with the instant it was computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionEntry {
    pub projected_end: i64,
    pub computed_at: i64,
}

/// The single absolute time value of the scheduler.
///
/// `projected_end` is present exactly while one of the timers runs. The
/// history is append-only and for display only: every freshly computed
/// value goes in, and so does every value a logged shift supersedes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndingProjection {
    projected_end: Option<i64>,
    computed_at: i64,
    history: Vec<ProjectionEntry>,
}

impl EndingProjection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn projected_end(&self) -> Option<i64> {
        self.projected_end
    }

    pub fn computed_at(&self) -> i64 {
        self.computed_at
    }

    pub fn history(&self) -> &[ProjectionEntry] {
        &self.history
    }

    pub fn current(&self) -> Option<ProjectionEntry> {
        self.projected_end.map(|projected_end| ProjectionEntry {
            projected_end,
            computed_at: self.computed_at,
        })
    }

    /// Install a freshly computed projection and log it
    pub fn begin(&mut self, projected_end: i64, now: i64) {
        self.projected_end = Some(projected_end);
        self.computed_at = now;
        self.history.push(ProjectionEntry {
            projected_end,
            computed_at: now,
        });
    }

    /// Move the projection by `delta_ms`.
    ///
    /// Returns false, changing nothing, when there is no projection or the
    /// result would overflow. With `log_history` the superseded value is
    /// appended to the history first.
    pub fn shift(&mut self, delta_ms: i64, now: i64, log_history: bool) -> bool {
        let Some(old) = self.current() else {
            return false;
        };
        let Some(projected_end) = old.projected_end.checked_add(delta_ms) else {
            return false;
        };
        if log_history {
            self.history.push(old);
        }
        self.projected_end = Some(projected_end);
        self.computed_at = now;
        true
    }

    pub fn clear(&mut self, now: i64) {
        self.projected_end = None;
        self.computed_at = now;
    }

    pub(crate) fn restore(&mut self, projected_end: Option<i64>, computed_at: i64, history: Vec<ProjectionEntry>) {
        self.projected_end = projected_end;
        self.computed_at = computed_at;
        self.history = history;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_without_projection_is_noop() {
        let mut projection = EndingProjection::new();
        assert!(!projection.shift(60_000, 5, true));
        assert_eq!(projection.projected_end(), None);
        assert!(projection.history().is_empty());
    }

    #[test]
    fn begin_and_logged_shifts_append_history() {
        let mut projection = EndingProjection::new();
        projection.begin(1_000, 10);
        assert!(projection.shift(500, 20, true));
        assert!(projection.shift(500, 30, false));
        assert!(projection.shift(-1_000, 40, true));

        assert_eq!(projection.projected_end(), Some(1_000));
        assert_eq!(projection.computed_at(), 40);
        assert_eq!(
            projection.history(),
            &[
                ProjectionEntry { projected_end: 1_000, computed_at: 10 },
                ProjectionEntry { projected_end: 1_000, computed_at: 10 },
                ProjectionEntry { projected_end: 2_000, computed_at: 30 },
            ]
        );
    }

    #[test]
    fn overflowing_shift_changes_nothing() {
        let mut projection = EndingProjection::new();
        projection.begin(i64::MAX - 10, 10);
        assert!(!projection.shift(60_000, 20, true));
        assert_eq!(projection.projected_end(), Some(i64::MAX - 10));
        assert_eq!(projection.computed_at(), 10);
        assert_eq!(projection.history().len(), 1);
    }

    #[test]
    fn clear_keeps_history() {
        let mut projection = EndingProjection::new();
        projection.begin(1_000, 10);
        projection.clear(99);
        assert_eq!(projection.current(), None);
        assert_eq!(projection.computed_at(), 99);
        assert_eq!(projection.history().len(), 1);
    }
}
