//! Pomodoro timer state machine
//!
//! Every time-dependent operation takes the current instant explicitly, so
//! the machine itself never reads a clock.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::{Phase, TimerSettings};

/// Active countdown, if any
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    Idle,
    Running { deadline: Instant },
    Paused { remaining: Duration },
}

/// A phase change applied by `skip`, `on_expiry` or `start`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: Phase,
    pub to: Phase,
    pub completed_count: u64,
}

/// Per-session timer: current phase, countdown and completed pomodoros
#[derive(Debug, Clone)]
pub struct TimerState {
    phase: Phase,
    completed_count: u64,
    countdown: Countdown,
    running: bool,
}

impl TimerState {
    /// Create a timer in the Ready phase with nothing counted
    pub fn new() -> Self {
        Self {
            phase: Phase::Ready,
            completed_count: 0,
            countdown: Countdown::Idle,
            running: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn completed_count(&self) -> u64 {
        self.completed_count
    }

    pub fn countdown(&self) -> Countdown {
        self.countdown
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self.countdown {
            Countdown::Running { deadline } => Some(deadline),
            _ => None,
        }
    }

    pub fn paused_remaining(&self) -> Option<Duration> {
        match self.countdown {
            Countdown::Paused { remaining } => Some(remaining),
            _ => None,
        }
    }

    pub fn is_paused(&self) -> bool {
        matches!(self.countdown, Countdown::Paused { .. })
    }

    /// Whether a countdown was started since the last reset
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Focus ambience plays only while working with a live countdown
    pub fn focus_ambience(&self) -> bool {
        self.running && self.phase == Phase::Working
    }

    /// Enter `phase` with a countdown of `minutes`. Ready never counts
    /// down, so starting it leaves the timer untouched.
    pub fn start(&mut self, phase: Phase, minutes: u64, now: Instant) -> Option<Transition> {
        if phase == Phase::Ready {
            return None;
        }

        let from = self.phase;
        self.phase = phase;
        self.countdown = Countdown::Running {
            deadline: now + Duration::from_secs(minutes.saturating_mul(60)),
        };
        self.running = true;

        (from != phase).then_some(Transition {
            from,
            to: phase,
            completed_count: self.completed_count,
        })
    }

    /// Enter `phase` with its configured duration. Ready has none and is
    /// left untouched.
    pub fn begin(
        &mut self,
        phase: Phase,
        settings: &TimerSettings,
        now: Instant,
    ) -> Option<Transition> {
        let minutes = settings.minutes_for(phase)?;
        self.start(phase, minutes, now)
    }

    /// Freeze the countdown. Returns false when nothing was paused.
    pub fn pause(&mut self, now: Instant) -> bool {
        let Countdown::Running { deadline } = self.countdown else {
            return false;
        };

        let remaining = deadline.saturating_duration_since(now);
        // A countdown at zero is waiting for its expiry transition
        if remaining.is_zero() {
            return false;
        }

        self.countdown = Countdown::Paused { remaining };
        true
    }

    /// Restart a paused countdown. Returns false when not paused.
    pub fn resume(&mut self, now: Instant) -> bool {
        let Countdown::Paused { remaining } = self.countdown else {
            return false;
        };

        self.countdown = Countdown::Running {
            deadline: now + remaining,
        };
        true
    }

    /// Time left on the countdown, never negative
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.countdown {
            Countdown::Idle => Duration::ZERO,
            Countdown::Running { deadline } => deadline.saturating_duration_since(now),
            Countdown::Paused { remaining } => remaining,
        }
    }

    /// True once a running countdown has reached zero
    pub fn is_expired(&self, now: Instant) -> bool {
        matches!(self.countdown, Countdown::Running { deadline } if deadline <= now)
    }

    /// Back to Ready. The completed count survives unless `clear_count`.
    pub fn reset(&mut self, clear_count: bool) -> Option<Transition> {
        let from = self.phase;
        self.phase = Phase::Ready;
        self.countdown = Countdown::Idle;
        self.running = false;
        if clear_count {
            self.completed_count = 0;
        }

        (from != Phase::Ready).then_some(Transition {
            from,
            to: Phase::Ready,
            completed_count: self.completed_count,
        })
    }

    pub fn reset_counters(&mut self) {
        self.completed_count = 0;
    }

    /// Move to the next phase of the cycle immediately
    pub fn skip(&mut self, settings: &TimerSettings, now: Instant) -> Transition {
        let from = self.phase;
        let next = if from == Phase::Working {
            self.completed_count += 1;
            if self.completed_count % settings.pomodoros_before_long.max(1) == 0 {
                Phase::LongBreak
            } else {
                Phase::ShortBreak
            }
        } else {
            Phase::Working
        };

        self.begin(next, settings, now);
        Transition {
            from,
            to: next,
            completed_count: self.completed_count,
        }
    }

    /// Apply the expiry transition if the running countdown reached zero.
    ///
    /// The next countdown starts at `now`, so calling this again at the same
    /// instant finds a fresh deadline and does nothing.
    pub fn on_expiry(&mut self, settings: &TimerSettings, now: Instant) -> Option<Transition> {
        if !self.is_expired(now) {
            return None;
        }
        Some(self.skip(settings, now))
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Format whole seconds as `mm:ss`; zero or negative gives `00:00`
pub fn format_time(seconds: i64) -> String {
    if seconds <= 0 {
        return "00:00".to_string();
    }
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Format a remaining duration, truncating fractional seconds
pub fn format_remaining(remaining: Duration) -> String {
    format_time(i64::try_from(remaining.as_secs()).unwrap_or(i64::MAX))
}
