//! A single client's timer session

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    timer_state::{format_remaining, Transition},
    Phase, TimerSettings, TimerState,
};

pub type SessionId = u64;

/// Discrete user actions issued by the render surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start(Phase),
    Pause,
    Resume,
    Skip,
    Reset,
    ResetCounters,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Start(_) => "start",
            Action::Pause => "pause",
            Action::Resume => "resume",
            Action::Skip => "skip",
            Action::Reset => "reset",
            Action::ResetCounters => "reset-counters",
        }
    }
}

/// Outcome of applying an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionOutcome {
    /// False when a guard turned the action into a no-op
    pub applied: bool,
    pub transition: Option<Transition>,
}

/// Session-owned timer plus bookkeeping
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub settings: TimerSettings,
    pub timer: TimerState,
    pub created_at: DateTime<Utc>,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
    pub last_seen: Instant,
}

impl Session {
    pub fn new(id: SessionId, settings: TimerSettings, now: Instant) -> Self {
        Self {
            id,
            settings,
            timer: TimerState::new(),
            created_at: Utc::now(),
            last_action: None,
            last_action_time: None,
            last_seen: now,
        }
    }

    /// Run one action against the timer. Starting Ready is not an action
    /// and is filtered out by the caller.
    pub fn apply(
        &mut self,
        action: Action,
        clear_count_on_reset: bool,
        now: Instant,
    ) -> ActionOutcome {
        let (applied, transition) = match action {
            Action::Start(phase) => (true, self.timer.begin(phase, &self.settings, now)),
            Action::Pause => (self.timer.pause(now), None),
            Action::Resume => (self.timer.resume(now), None),
            Action::Skip => (true, Some(self.timer.skip(&self.settings, now))),
            Action::Reset => (true, self.timer.reset(clear_count_on_reset)),
            Action::ResetCounters => {
                self.timer.reset_counters();
                (true, None)
            }
        };

        self.last_seen = now;
        if applied {
            self.last_action = Some(action.name().to_string());
            self.last_action_time = Some(Utc::now());
        }

        ActionOutcome {
            applied,
            transition,
        }
    }

    pub fn snapshot(&self, now: Instant) -> SessionSnapshot {
        let remaining = self.timer.remaining(now);
        let phase = self.timer.phase();

        SessionSnapshot {
            id: self.id,
            phase,
            label: phase.label().to_string(),
            remaining_seconds: remaining.as_secs(),
            display: format_remaining(remaining),
            completed_count: self.timer.completed_count(),
            paused: self.timer.is_paused(),
            running: self.timer.is_running(),
            focus_ambience: self.timer.focus_ambience(),
            settings: self.settings,
            created_at: self.created_at,
            last_action: self.last_action.clone(),
            last_action_time: self.last_action_time,
        }
    }
}

/// Everything the render surface needs to draw a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub phase: Phase,
    pub label: String,
    pub remaining_seconds: u64,
    pub display: String,
    pub completed_count: u64,
    pub paused: bool,
    pub running: bool,
    pub focus_ambience: bool,
    pub settings: TimerSettings,
    pub created_at: DateTime<Utc>,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}
