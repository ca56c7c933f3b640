//! Error types shared across the crate

use std::path::PathBuf;
use thiserror::Error;

use crate::state::TimerKind;

/// An operation the state machine refused to apply.
///
/// A rejection changes nothing beyond catching the running timer up with
/// the clock. Callers surface it to the user however they like.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejected {
    #[error("no more break sessions left")]
    NoBreaksLeft,
    #[error("all {0} sessions are already completed")]
    AllSessionsCompleted(TimerKind),
    #[error("{0} session would run out of time")]
    WouldExhaustSession(TimerKind),
    #[error("{0} session count is already at its bound")]
    SessionCountAtBound(TimerKind),
}

/// A persisted record that cannot be applied as-is.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("malformed record: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{record}: {field} out of range ({value})")]
    OutOfRange {
        record: &'static str,
        field: &'static str,
        value: i64,
    },
    #[error("inconsistent snapshot: {0}")]
    Inconsistent(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failure of the backing key-value store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode value for {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Invalid static timer configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("focus session must last at least one minute")]
    FocusTooShort,
    #[error("focus-to-break ratio must be at least 1")]
    ZeroRatio,
    #[error("focus session of {focus_ms}ms cannot be split by ratio {ratio}")]
    IndivisibleRatio { focus_ms: i64, ratio: u64 },
    #[error("at least two focus sessions per day are required, got {0}")]
    TooFewSessions(u32),
}
