//! Configuration and CLI argument handling

use std::time::Duration;

use clap::Parser;

use crate::state::{
    settings::{
        DEFAULT_LONG_BREAK_MINUTES, DEFAULT_POMODOROS_BEFORE_LONG, DEFAULT_SHORT_BREAK_MINUTES,
        DEFAULT_WORK_MINUTES,
    },
    SettingsError, TimerSettings,
};

pub const MAX_SESSION_TTL_MINUTES: u64 = 365 * 24 * 60;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "focusflow")]
#[command(about = "A session-managed HTTP Pomodoro timer server")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Focused work duration in minutes
    #[arg(short, long, default_value_t = DEFAULT_WORK_MINUTES,
          value_parser = clap::value_parser!(u64).range(1..=60))]
    pub work: u64,

    /// Short break duration in minutes
    #[arg(long, default_value_t = DEFAULT_SHORT_BREAK_MINUTES,
          value_parser = clap::value_parser!(u64).range(1..=30))]
    pub short_break: u64,

    /// Long break duration in minutes
    #[arg(long, default_value_t = DEFAULT_LONG_BREAK_MINUTES,
          value_parser = clap::value_parser!(u64).range(1..=60))]
    pub long_break: u64,

    /// Completed pomodoros before a long break
    #[arg(long, default_value_t = DEFAULT_POMODOROS_BEFORE_LONG,
          value_parser = clap::value_parser!(u64).range(1..=12))]
    pub pomodoros_before_long: u64,

    /// Expiry check interval in milliseconds
    #[arg(long, default_value = "1000",
          value_parser = clap::value_parser!(u64).range(10..))]
    pub tick_ms: u64,

    /// Remove sessions idle for this many minutes (0 disables, max one year)
    #[arg(long, default_value = "720",
          value_parser = clap::value_parser!(u64).range(0..=MAX_SESSION_TTL_MINUTES))]
    pub session_ttl_minutes: u64,

    /// Also clear the completed pomodoro count on reset
    #[arg(long)]
    pub reset_clears_count: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Default settings for new sessions
    pub fn timer_settings(&self) -> Result<TimerSettings, SettingsError> {
        TimerSettings::new(
            self.work,
            self.short_break,
            self.long_break,
            self.pomodoros_before_long,
        )
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn session_ttl(&self) -> Option<Duration> {
        (self.session_ttl_minutes > 0)
            .then(|| Duration::from_secs(self.session_ttl_minutes.saturating_mul(60)))
    }
}
