//! Pomodoro cycle phases

use std::fmt;

use serde::{Deserialize, Serialize};

/// One stage of the Pomodoro cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Ready,
    Working,
    ShortBreak,
    LongBreak,
}

impl Phase {
    /// Status text shown to the user for this phase
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Ready => "Ready to start",
            Phase::Working => "Focused work",
            Phase::ShortBreak => "Short break",
            Phase::LongBreak => "Long break",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Ready => "ready",
            Phase::Working => "working",
            Phase::ShortBreak => "short_break",
            Phase::LongBreak => "long_break",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_snake_case() {
        let json = serde_json::to_string(&Phase::ShortBreak).unwrap();
        assert_eq!(json, "\"short_break\"");

        let phase: Phase = serde_json::from_str("\"long_break\"").unwrap();
        assert_eq!(phase, Phase::LongBreak);
    }

    #[test]
    fn labels_are_status_text() {
        assert_eq!(Phase::Ready.label(), "Ready to start");
        assert_eq!(Phase::Working.to_string(), "working");
    }
}
