//! Shared handle used by the background tasks

use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use super::{DualTimerCoordinator, TimerKind};

/// Coordinator behind a lock plus a wake-up signal for the tick loop.
///
/// Every operation runs to completion under the lock, so ticks and user
/// commands never interleave.
#[derive(Clone)]
pub struct AppState {
    coordinator: Arc<Mutex<DualTimerCoordinator>>,
    wake: Arc<Notify>,
}

impl AppState {
    pub fn new(coordinator: DualTimerCoordinator) -> Self {
        Self {
            coordinator: Arc::new(Mutex::new(coordinator)),
            wake: Arc::new(Notify::new()),
        }
    }

    /// Run `f` with exclusive access to the coordinator
    pub fn with<F, R>(&self, f: F) -> Result<R, String>
    where
        F: FnOnce(&mut DualTimerCoordinator) -> R,
    {
        let mut coordinator = self
            .coordinator
            .lock()
            .map_err(|e| format!("Failed to lock coordinator: {}", e))?;
        Ok(f(&mut coordinator))
    }

    pub fn active_kind(&self) -> Result<Option<TimerKind>, String> {
        self.with(|coordinator| coordinator.active_kind())
    }

    /// Tell the tick loop that the running timer may have changed
    pub fn wake_tick_loop(&self) {
        // notify_one keeps a permit if the loop is not waiting yet.
        self.wake.notify_one();
    }

    pub async fn woken(&self) {
        self.wake.notified().await;
    }
}
