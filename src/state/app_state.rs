//! Main application state: the session registry

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex, MutexGuard,
    },
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::{
    session::{Action, Session, SessionId, SessionSnapshot},
    timer_state::Transition,
    Phase, TimerSettings,
};

/// Failures of registry operations
#[derive(Debug, Error)]
pub enum StateError {
    #[error("session {0} not found")]
    SessionNotFound(SessionId),
    #[error("failed to lock session registry: {0}")]
    Lock(String),
    #[error("invalid action: {0}")]
    InvalidAction(String),
}

/// What caused a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCause {
    Action,
    Expiry,
}

/// Published on the session event channel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimerEvent {
    /// The session changed phase
    Transition {
        session_id: SessionId,
        cause: EventCause,
        transition: Transition,
        at: DateTime<Utc>,
    },
    /// The session was deleted or reaped; nothing follows for this id
    Ended {
        session_id: SessionId,
        at: DateTime<Utc>,
    },
}

impl TimerEvent {
    pub fn session_id(&self) -> SessionId {
        match self {
            TimerEvent::Transition { session_id, .. } | TimerEvent::Ended { session_id, .. } => {
                *session_id
            }
        }
    }
}

/// Result of an action, as seen by the API layer
#[derive(Debug, Clone)]
pub struct ActionResult {
    pub applied: bool,
    pub transition: Option<Transition>,
    pub snapshot: SessionSnapshot,
}

/// Shared state for handlers and background tasks
#[derive(Debug)]
pub struct AppState {
    sessions: Mutex<HashMap<SessionId, Session>>,
    next_id: AtomicU64,
    /// Settings for sessions created without overrides
    pub defaults: TimerSettings,
    /// Whether reset also clears the completed count
    pub clear_count_on_reset: bool,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    event_tx: broadcast::Sender<TimerEvent>,
}

impl AppState {
    pub fn new(
        port: u16,
        host: String,
        defaults: TimerSettings,
        clear_count_on_reset: bool,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(100);

        Self {
            sessions: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            defaults,
            clear_count_on_reset,
            start_time: Instant::now(),
            port,
            host,
            event_tx,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<SessionId, Session>>, StateError> {
        self.sessions
            .lock()
            .map_err(|e| StateError::Lock(e.to_string()))
    }

    /// Subscribe to transitions and endings of every session
    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.event_tx.subscribe()
    }

    fn publish(&self, event: TimerEvent) {
        let session_id = event.session_id();
        // No subscribers is the normal case
        if self.event_tx.send(event).is_err() {
            debug!("No listeners for session {} events", session_id);
        }
    }

    fn publish_transition(&self, session_id: SessionId, cause: EventCause, transition: Transition) {
        self.publish(TimerEvent::Transition {
            session_id,
            cause,
            transition,
            at: Utc::now(),
        });
    }

    fn publish_ended(&self, session_id: SessionId) {
        self.publish(TimerEvent::Ended {
            session_id,
            at: Utc::now(),
        });
    }

    /// Open a session in the Ready phase
    pub fn create_session(
        &self,
        settings: Option<TimerSettings>,
        now: Instant,
    ) -> Result<SessionSnapshot, StateError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let session = Session::new(id, settings.unwrap_or(self.defaults), now);
        let snapshot = session.snapshot(now);

        self.lock()?.insert(id, session);
        info!("Created session {}", id);
        Ok(snapshot)
    }

    /// Current view of a session; counts as activity for idle reaping
    pub fn session_snapshot(
        &self,
        id: SessionId,
        now: Instant,
    ) -> Result<SessionSnapshot, StateError> {
        let mut sessions = self.lock()?;
        let session = sessions.get_mut(&id).ok_or(StateError::SessionNotFound(id))?;
        session.last_seen = now;
        Ok(session.snapshot(now))
    }

    pub fn remove_session(&self, id: SessionId) -> Result<(), StateError> {
        let removed = self.lock()?.remove(&id);
        match removed {
            Some(_) => {
                info!("Removed session {}", id);
                self.publish_ended(id);
                Ok(())
            }
            None => Err(StateError::SessionNotFound(id)),
        }
    }

    /// Existence check that does not count as activity
    pub fn contains_session(&self, id: SessionId) -> Result<bool, StateError> {
        Ok(self.lock()?.contains_key(&id))
    }

    pub fn session_count(&self) -> Result<usize, StateError> {
        Ok(self.lock()?.len())
    }

    /// Apply a user action to one session
    pub fn apply(
        &self,
        id: SessionId,
        action: Action,
        now: Instant,
    ) -> Result<ActionResult, StateError> {
        if action == Action::Start(Phase::Ready) {
            return Err(StateError::InvalidAction(
                "ready has no countdown to start".to_string(),
            ));
        }

        let mut sessions = self.lock()?;
        let session = sessions.get_mut(&id).ok_or(StateError::SessionNotFound(id))?;
        let outcome = session.apply(action, self.clear_count_on_reset, now);
        let snapshot = session.snapshot(now);
        drop(sessions);

        if outcome.applied {
            info!("Session {}: {} ({})", id, action.name(), snapshot.phase);
        } else {
            debug!("Session {}: {} ignored in current state", id, action.name());
        }

        if let Some(transition) = outcome.transition {
            self.publish_transition(id, EventCause::Action, transition);
        }

        Ok(ActionResult {
            applied: outcome.applied,
            transition: outcome.transition,
            snapshot,
        })
    }

    /// Run expiry transitions for every session whose countdown reached zero
    pub fn expire_due(&self, now: Instant) -> Result<Vec<(SessionId, Transition)>, StateError> {
        let mut sessions = self.lock()?;
        let expired: Vec<(SessionId, Transition)> = sessions
            .values_mut()
            .filter_map(|session| {
                session
                    .timer
                    .on_expiry(&session.settings, now)
                    .map(|transition| (session.id, transition))
            })
            .collect();
        drop(sessions);

        for (id, transition) in &expired {
            self.publish_transition(*id, EventCause::Expiry, *transition);
        }

        Ok(expired)
    }

    /// Drop sessions not seen for longer than `ttl`
    pub fn reap_idle(&self, now: Instant, ttl: Duration) -> Result<usize, StateError> {
        let mut sessions = self.lock()?;
        let mut reaped = Vec::new();
        sessions.retain(|id, session| {
            let keep = now.saturating_duration_since(session.last_seen) < ttl;
            if !keep {
                warn!("Session {} idle for over {}s, removing", id, ttl.as_secs());
                reaped.push(*id);
            }
            keep
        });
        drop(sessions);

        for id in &reaped {
            self.publish_ended(*id);
        }
        Ok(reaped.len())
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}
