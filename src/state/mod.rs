//! State management module
//!
//! This module contains the timer state machine, per-session state and the
//! session registry shared by handlers and background tasks.

pub mod app_state;
pub mod phase;
pub mod session;
pub mod settings;
pub mod timer_state;

// Re-export main types
pub use app_state::{AppState, EventCause, StateError, TimerEvent};
pub use phase::Phase;
pub use session::{Action, Session, SessionId, SessionSnapshot};
pub use settings::{SettingsError, TimerSettings};
pub use timer_state::{format_time, TimerState, Transition};
