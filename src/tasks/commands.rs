//! Line commands read from stdin

use std::str::FromStr;

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{error, info, warn};

use crate::{
    error::Rejected,
    state::{Adjustment, AppState, DualTimerCoordinator, TimerKind},
};

/// Most repeats a single minute command may ask for
pub const MAX_REPEAT: u32 = 60;

pub const USAGE: &str = "commands: focus|f, break|b, +min <kind> [1-60], -min <kind> [1-60], \
+session <kind>, -session <kind>, reset, status, quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start or pause a timer
    Toggle(TimerKind),
    /// One minute up or down, repeated `repeat` times as if the button were held
    Minute {
        kind: TimerKind,
        adjustment: Adjustment,
        repeat: u32,
    },
    Session {
        kind: TimerKind,
        adjustment: Adjustment,
    },
    Reset,
    Status,
    Quit,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseCommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}'")]
    Unknown(String),
    #[error("expected 'focus' or 'break', got '{0}'")]
    BadKind(String),
    #[error("missing timer after '{0}'")]
    MissingKind(String),
    #[error("bad repeat count '{0}'")]
    BadRepeat(String),
}

fn parse_kind(word: &str) -> Result<TimerKind, ParseCommandError> {
    match word {
        "focus" | "f" => Ok(TimerKind::Focus),
        "break" | "b" => Ok(TimerKind::Break),
        other => Err(ParseCommandError::BadKind(other.to_string())),
    }
}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let head = words.next().ok_or(ParseCommandError::Empty)?.to_lowercase();

        let (adjustment, target) = match head.as_str() {
            "focus" | "f" => return Ok(Command::Toggle(TimerKind::Focus)),
            "break" | "b" => return Ok(Command::Toggle(TimerKind::Break)),
            "reset" => return Ok(Command::Reset),
            "status" | "s" => return Ok(Command::Status),
            "quit" | "q" | "exit" => return Ok(Command::Quit),
            "+min" => (Adjustment::Increase, "min"),
            "-min" => (Adjustment::Decrease, "min"),
            "+session" => (Adjustment::Increase, "session"),
            "-session" => (Adjustment::Decrease, "session"),
            _ => return Err(ParseCommandError::Unknown(head.clone())),
        };

        let kind = parse_kind(
            &words
                .next()
                .ok_or_else(|| ParseCommandError::MissingKind(head.clone()))?
                .to_lowercase(),
        )?;

        if target == "session" {
            return Ok(Command::Session { kind, adjustment });
        }
        let repeat = match words.next() {
            Some(n) => n
                .parse::<u32>()
                .ok()
                .filter(|n| (1..=MAX_REPEAT).contains(n))
                .ok_or_else(|| ParseCommandError::BadRepeat(n.to_string()))?,
            None => 1,
        };
        Ok(Command::Minute {
            kind,
            adjustment,
            repeat,
        })
    }
}

impl Command {
    /// Apply the command. Returns text to show the user, if any.
    pub fn execute(self, coordinator: &mut DualTimerCoordinator) -> Result<Option<String>, Rejected> {
        match self {
            Command::Toggle(kind) => coordinator.start_or_pause(kind).map(|_| None),
            Command::Minute {
                kind,
                adjustment,
                repeat,
            } => {
                // Only the first press of a hold goes into the history.
                coordinator.adjust_minute(kind, adjustment, true)?;
                for _ in 1..repeat {
                    if coordinator.adjust_minute(kind, adjustment, false).is_err() {
                        break;
                    }
                }
                Ok(None)
            }
            Command::Session { kind, adjustment } => coordinator
                .adjust_session_count(kind, adjustment, true)
                .map(|_| None),
            Command::Reset => {
                coordinator.reset();
                Ok(None)
            }
            Command::Status => Ok(Some(
                serde_json::to_string_pretty(&coordinator.status())
                    .unwrap_or_else(|e| format!("Failed to render status: {}", e)),
            )),
            Command::Quit => Ok(None),
        }
    }
}

/// Background task feeding input lines to the coordinator.
///
/// Returns on `quit` or when the input closes.
pub async fn command_reader_task<R>(state: AppState, reader: R)
where
    R: AsyncBufRead + Unpin,
{
    info!("Reading commands; {}", USAGE);
    let mut lines = reader.lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                info!("Input closed");
                return;
            }
            Err(e) => {
                error!("Failed to read command: {}", e);
                return;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                println!("{}\n{}", e, USAGE);
                continue;
            }
        };
        if command == Command::Quit {
            info!("Quit requested");
            return;
        }

        match state.with(|coordinator| command.execute(coordinator)) {
            Ok(Ok(Some(text))) => println!("{}", text),
            Ok(Ok(None)) => {}
            Ok(Err(rejected)) => println!("{}", rejected),
            Err(e) => warn!("Failed to apply {:?}: {}", command, e),
        }
        state.wake_tick_loop();
    }
}
