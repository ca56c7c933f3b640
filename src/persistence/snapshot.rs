//! Persisted records of both timers and the projection
//!
//! Records are stored under three keys:
//!
//! - `focusTimer`: `{ sessionsCompleted, running, remaining }`
//! - `breakTimer`: the same plus `allSessionsCompleted`
//! - `endingProjection`: `{ current: [projectedEnd|null, computedAt], previous: [[end, at], ...] }`
//!
//! A set of records is validated as a whole before anything is applied.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::StateStore;
use crate::{
    config::{TimerSettings, MS_PER_MINUTE},
    error::{SnapshotError, StoreError},
    state::{EndingProjection, ProjectionEntry, SessionTimer, TimerKind},
};

pub const PROJECTION_KEY: &str = "endingProjection";

/// Latest instant accepted from storage, the end of year 9999
pub const MAX_TIMESTAMP_MS: i64 = 253_402_300_799_999;

/// Longest remaining session time accepted from storage, one year
pub const MAX_REMAINING_MS: i64 = 365 * 24 * 60 * MS_PER_MINUTE;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TimerRecord {
    pub sessions_completed: u32,
    pub running: bool,
    pub remaining: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_sessions_completed: Option<bool>,
}

impl TimerRecord {
    pub fn capture(timer: &SessionTimer) -> Self {
        Self {
            sessions_completed: timer.sessions_completed(),
            running: timer.is_running(),
            remaining: timer.remaining_ms(),
            all_sessions_completed: match timer.kind() {
                TimerKind::Focus => None,
                TimerKind::Break => Some(timer.all_sessions_completed()),
            },
        }
    }

    fn initial(kind: TimerKind, full_session_ms: i64) -> Self {
        Self {
            sessions_completed: 0,
            running: false,
            remaining: full_session_ms,
            all_sessions_completed: match kind {
                TimerKind::Focus => None,
                TimerKind::Break => Some(false),
            },
        }
    }

    fn apply(&self, timer: &mut SessionTimer) {
        timer.restore(
            self.sessions_completed,
            self.running,
            self.remaining,
            self.all_sessions_completed.unwrap_or(false),
        );
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectionRecord {
    pub current: (Option<i64>, i64),
    pub previous: Vec<(i64, i64)>,
}

impl ProjectionRecord {
    pub fn capture(projection: &EndingProjection) -> Self {
        Self {
            current: (projection.projected_end(), projection.computed_at()),
            previous: projection
                .history()
                .iter()
                .map(|entry| (entry.projected_end, entry.computed_at))
                .collect(),
        }
    }

    fn apply(&self, projection: &mut EndingProjection) {
        let history = self
            .previous
            .iter()
            .map(|&(projected_end, computed_at)| ProjectionEntry {
                projected_end,
                computed_at,
            })
            .collect();
        projection.restore(self.current.0, self.current.1, history);
    }
}

/// Everything needed to rebuild the coordinator's state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub focus: TimerRecord,
    pub brk: TimerRecord,
    pub projection: ProjectionRecord,
}

impl Snapshot {
    pub fn capture(focus: &SessionTimer, brk: &SessionTimer, projection: &EndingProjection) -> Self {
        Self {
            focus: TimerRecord::capture(focus),
            brk: TimerRecord::capture(brk),
            projection: ProjectionRecord::capture(projection),
        }
    }

    /// Write all three records as one set
    pub fn save(&self, store: &mut dyn StateStore) -> Result<(), StoreError> {
        let focus_key = TimerKind::Focus.storage_key();
        let break_key = TimerKind::Break.storage_key();
        let records = [
            (focus_key, encode(&self.focus, focus_key)?),
            (break_key, encode(&self.brk, break_key)?),
            (PROJECTION_KEY, encode(&self.projection, PROJECTION_KEY)?),
        ];
        store.save(&records)
    }

    /// Read and validate the stored records.
    ///
    /// Returns `Ok(None)` when nothing was stored. Missing individual
    /// records take their initial values. A record that cannot be read
    /// fails the whole load.
    pub fn load(store: &dyn StateStore, settings: &TimerSettings) -> Result<Option<Self>, SnapshotError> {
        let focus = store.load(TimerKind::Focus.storage_key())?;
        let brk = store.load(TimerKind::Break.storage_key())?;
        let projection = store.load(PROJECTION_KEY)?;
        if focus.is_none() && brk.is_none() && projection.is_none() {
            return Ok(None);
        }

        let snapshot = Self {
            focus: match focus {
                Some(value) => serde_json::from_value(value)?,
                None => TimerRecord::initial(TimerKind::Focus, settings.focus_session_ms()),
            },
            brk: match brk {
                Some(value) => serde_json::from_value(value)?,
                None => TimerRecord::initial(TimerKind::Break, settings.break_session_ms()),
            },
            projection: match projection {
                Some(value) => serde_json::from_value(value)?,
                None => ProjectionRecord::default(),
            },
        };
        snapshot.validate(settings)?;
        Ok(Some(snapshot))
    }

    /// Check that the records describe a reachable state
    pub fn validate(&self, settings: &TimerSettings) -> Result<(), SnapshotError> {
        validate_timer("focusTimer", &self.focus, settings.focus_sessions())?;
        validate_timer("breakTimer", &self.brk, settings.break_sessions())?;
        validate_projection(&self.projection)?;

        if self.focus.sessions_completed == settings.focus_sessions() {
            return Err(SnapshotError::Inconsistent(
                "all focus sessions completed without the day being reset".to_string(),
            ));
        }
        if self.focus.all_sessions_completed == Some(true) {
            return Err(SnapshotError::Inconsistent(
                "focus timer cannot be exhausted".to_string(),
            ));
        }
        let break_exhausted = self.brk.sessions_completed == settings.break_sessions();
        if self.brk.all_sessions_completed != Some(break_exhausted) {
            return Err(SnapshotError::Inconsistent(format!(
                "break allSessionsCompleted does not match {} of {} sessions",
                self.brk.sessions_completed,
                settings.break_sessions()
            )));
        }
        if self.focus.running && self.brk.running {
            return Err(SnapshotError::Inconsistent("both timers running".to_string()));
        }
        if self.brk.running && break_exhausted {
            return Err(SnapshotError::Inconsistent(
                "exhausted break timer is running".to_string(),
            ));
        }
        let any_running = self.focus.running || self.brk.running;
        match (any_running, self.projection.current.0) {
            (true, None) => Err(SnapshotError::Inconsistent(
                "timer running without a projected end".to_string(),
            )),
            (false, Some(_)) => Err(SnapshotError::Inconsistent(
                "projected end present while both timers are paused".to_string(),
            )),
            _ => Ok(()),
        }
    }

    pub fn apply(&self, focus: &mut SessionTimer, brk: &mut SessionTimer, projection: &mut EndingProjection) {
        self.focus.apply(focus);
        self.brk.apply(brk);
        self.projection.apply(projection);
    }
}

fn validate_timer(record: &'static str, timer: &TimerRecord, total: u32) -> Result<(), SnapshotError> {
    if timer.sessions_completed > total {
        return Err(SnapshotError::OutOfRange {
            record,
            field: "sessionsCompleted",
            value: i64::from(timer.sessions_completed),
        });
    }
    if !(0..=MAX_REMAINING_MS).contains(&timer.remaining) {
        return Err(SnapshotError::OutOfRange {
            record,
            field: "remaining",
            value: timer.remaining,
        });
    }
    Ok(())
}

fn validate_projection(projection: &ProjectionRecord) -> Result<(), SnapshotError> {
    let (projected_end, computed_at) = projection.current;
    let instants = projected_end
        .map(|end| ("current", end))
        .into_iter()
        .chain([("computedAt", computed_at)])
        .chain(
            projection
                .previous
                .iter()
                .flat_map(|&(end, at)| [("previous", end), ("previous", at)]),
        );
    for (field, value) in instants {
        if !(0..=MAX_TIMESTAMP_MS).contains(&value) {
            return Err(SnapshotError::OutOfRange {
                record: PROJECTION_KEY,
                field,
                value,
            });
        }
    }
    Ok(())
}

fn encode<T: Serialize>(record: &T, key: &str) -> Result<Value, StoreError> {
    serde_json::to_value(record).map_err(|source| StoreError::Encode {
        key: key.to_string(),
        source,
    })
}
