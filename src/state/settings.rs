//! Timer durations and cycle length

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Phase;

pub const DEFAULT_WORK_MINUTES: u64 = 25;
pub const DEFAULT_SHORT_BREAK_MINUTES: u64 = 5;
pub const DEFAULT_LONG_BREAK_MINUTES: u64 = 15;
pub const DEFAULT_POMODOROS_BEFORE_LONG: u64 = 4;

pub const MAX_WORK_MINUTES: u64 = 60;
pub const MAX_SHORT_BREAK_MINUTES: u64 = 30;
pub const MAX_LONG_BREAK_MINUTES: u64 = 60;
pub const MAX_POMODOROS_BEFORE_LONG: u64 = 12;

/// Rejected timer configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("{field} must be between 1 and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: u64,
        max: u64,
    },
}

/// Durations in minutes plus the number of pomodoros before a long break
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerSettings {
    pub work_minutes: u64,
    pub short_break_minutes: u64,
    pub long_break_minutes: u64,
    pub pomodoros_before_long: u64,
}

impl TimerSettings {
    pub fn new(
        work_minutes: u64,
        short_break_minutes: u64,
        long_break_minutes: u64,
        pomodoros_before_long: u64,
    ) -> Result<Self, SettingsError> {
        let settings = Self {
            work_minutes,
            short_break_minutes,
            long_break_minutes,
            pomodoros_before_long,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Check every value is positive and within the settings surface bounds
    pub fn validate(&self) -> Result<(), SettingsError> {
        check("work_minutes", self.work_minutes, MAX_WORK_MINUTES)?;
        check(
            "short_break_minutes",
            self.short_break_minutes,
            MAX_SHORT_BREAK_MINUTES,
        )?;
        check(
            "long_break_minutes",
            self.long_break_minutes,
            MAX_LONG_BREAK_MINUTES,
        )?;
        check(
            "pomodoros_before_long",
            self.pomodoros_before_long,
            MAX_POMODOROS_BEFORE_LONG,
        )?;
        Ok(())
    }

    /// Configured minutes for a phase, `None` for Ready
    pub fn minutes_for(&self, phase: Phase) -> Option<u64> {
        match phase {
            Phase::Ready => None,
            Phase::Working => Some(self.work_minutes),
            Phase::ShortBreak => Some(self.short_break_minutes),
            Phase::LongBreak => Some(self.long_break_minutes),
        }
    }
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            work_minutes: DEFAULT_WORK_MINUTES,
            short_break_minutes: DEFAULT_SHORT_BREAK_MINUTES,
            long_break_minutes: DEFAULT_LONG_BREAK_MINUTES,
            pomodoros_before_long: DEFAULT_POMODOROS_BEFORE_LONG,
        }
    }
}

fn check(field: &'static str, value: u64, max: u64) -> Result<(), SettingsError> {
    if value == 0 || value > max {
        return Err(SettingsError::OutOfRange { field, value, max });
    }
    Ok(())
}
