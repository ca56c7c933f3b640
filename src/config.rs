//! Configuration and CLI argument handling

use std::path::PathBuf;

use clap::Parser;
use directories::ProjectDirs;

use crate::error::SettingsError;

pub const MS_PER_SECOND: i64 = 1_000;
pub const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "focus-break")]
#[command(about = "A dual focus/break countdown scheduler")]
#[command(version)]
pub struct Config {
    /// Length of one focus session in minutes
    #[arg(long, default_value = "100")]
    pub focus_minutes: u64,

    /// How many times longer a focus session is than a break session
    #[arg(long, default_value = "5")]
    pub ratio: u64,

    /// Focus sessions per day (breaks are always one fewer)
    #[arg(short, long, default_value = "4")]
    pub sessions: u32,

    /// Directory holding the persisted timer records
    #[arg(long)]
    pub state_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Directory for persisted state, falling back to the platform data dir
    pub fn state_dir(&self) -> PathBuf {
        if let Some(dir) = &self.state_dir {
            return dir.clone();
        }
        ProjectDirs::from("", "", "focus-break")
            .map(|dirs| dirs.data_local_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("focus-break-state"))
    }

    pub fn timer_settings(&self) -> Result<TimerSettings, SettingsError> {
        let focus_ms = i64::try_from(self.focus_minutes)
            .ok()
            .and_then(|minutes| minutes.checked_mul(MS_PER_MINUTE))
            .unwrap_or(i64::MAX);
        TimerSettings::new(focus_ms, self.ratio, self.sessions)
    }
}

/// Validated static configuration the timers are built from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSettings {
    focus_session_ms: i64,
    ratio: u64,
    focus_sessions: u32,
}

impl TimerSettings {
    pub fn new(focus_session_ms: i64, ratio: u64, focus_sessions: u32) -> Result<Self, SettingsError> {
        if focus_session_ms < MS_PER_MINUTE {
            return Err(SettingsError::FocusTooShort);
        }
        if ratio == 0 {
            return Err(SettingsError::ZeroRatio);
        }
        let divisor = i64::try_from(ratio).map_err(|_| SettingsError::IndivisibleRatio {
            focus_ms: focus_session_ms,
            ratio,
        })?;
        if focus_session_ms % divisor != 0 {
            return Err(SettingsError::IndivisibleRatio {
                focus_ms: focus_session_ms,
                ratio,
            });
        }
        if focus_sessions < 2 {
            return Err(SettingsError::TooFewSessions(focus_sessions));
        }
        Ok(Self {
            focus_session_ms,
            ratio,
            focus_sessions,
        })
    }

    pub fn focus_session_ms(&self) -> i64 {
        self.focus_session_ms
    }

    pub fn break_session_ms(&self) -> i64 {
        // Divisibility is checked in `new`.
        self.focus_session_ms / self.ratio as i64
    }

    pub fn ratio(&self) -> u64 {
        self.ratio
    }

    pub fn focus_sessions(&self) -> u32 {
        self.focus_sessions
    }

    /// A break never follows the final focus session
    pub fn break_sessions(&self) -> u32 {
        self.focus_sessions - 1
    }
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            focus_session_ms: 100 * MS_PER_MINUTE,
            ratio: 5,
            focus_sessions: 4,
        }
    }
}
