//! Persistence of timer state across restarts
//!
//! Writes are best-effort: the coordinator logs failures and carries on
//! with its in-memory state.

pub mod snapshot;
pub mod store;

pub use snapshot::{
    ProjectionRecord, Snapshot, TimerRecord, MAX_REMAINING_MS, MAX_TIMESTAMP_MS, PROJECTION_KEY,
};
pub use store::{FileStore, MemoryStore, StateStore, STATE_FILE};
