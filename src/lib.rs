//! Focus Break - a dual focus/break countdown scheduler
//!
//! Two timers alternate under a fixed ratio, at most one running at a time.
//! The scheduler keeps a single projected end of the working day, survives
//! restarts through persisted records, and catches up on any sessions that
//! finished while the process was suspended.

pub mod clock;
pub mod config;
pub mod error;
pub mod persistence;
pub mod sinks;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Config, TimerSettings};
pub use error::Rejected;
pub use state::{Adjustment, AppState, Collaborators, DualTimerCoordinator, TickOutcome, TimerKind};
pub use utils::signals::shutdown_signal;
