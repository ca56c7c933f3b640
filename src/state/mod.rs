//! State management module
//!
//! This module contains the two session timers, the ending projection and
//! the coordinator that owns them.

pub mod app_state;
pub mod coordinator;
pub mod projection;
pub mod session_timer;

// Re-export main types
pub use app_state::AppState;
pub use coordinator::{
    Adjustment, Collaborators, DualTimerCoordinator, Status, TickOutcome, TimerStatus, TICK_INTERVAL,
};
pub use projection::{EndingProjection, ProjectionEntry};
pub use session_timer::{SessionTimer, TimerKind};
