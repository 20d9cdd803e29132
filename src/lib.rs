//! FocusFlow - A session-managed HTTP Pomodoro timer server
//!
//! This library provides the Pomodoro state machine, per-session timer
//! state and the HTTP API that drives it.

pub mod config;
pub mod state;
pub mod api;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::AppState;
pub use api::create_router;
pub use utils::signals::shutdown_signal;
