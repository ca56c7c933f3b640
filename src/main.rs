//! Focus Break - a dual focus/break countdown scheduler
//!
//! This is the terminal host: it restores saved state, ticks the running
//! timer and reads commands from stdin.

use std::sync::Arc;

use tokio::io::{stdin, BufReader};
use tracing::info;

use focus_break::{
    clock::{Clock, SystemClock},
    config::Config,
    persistence::FileStore,
    sinks::{TerminalDisplay, TerminalNotifier},
    state::{AppState, Collaborators, DualTimerCoordinator},
    tasks::{command_reader_task, tick_loop_task},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("focus_break={}", config.log_level()))
        .init();

    let settings = config.timer_settings()?;
    let state_dir = config.state_dir();

    info!("Starting focus-break v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: focus={}min, ratio={}, sessions={}, state={}",
        settings.focus_session_ms() / 60_000,
        settings.ratio(),
        settings.focus_sessions(),
        state_dir.display()
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let coordinator = DualTimerCoordinator::restore(
        settings,
        Collaborators {
            clock: Arc::clone(&clock),
            display: Box::new(TerminalDisplay::new()),
            notifier: Box::new(TerminalNotifier),
            store: Box::new(FileStore::new(&state_dir)),
        },
    );
    let state = AppState::new(coordinator);

    // A timer restored as running is picked up by the first tick.
    let tick_task = tokio::spawn(tick_loop_task(state.clone(), clock));

    tokio::select! {
        _ = command_reader_task(state, BufReader::new(stdin())) => {}
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    // State is persisted on every change, nothing left to flush.
    tick_task.abort();
    info!("Shutdown complete");
    Ok(())
}
