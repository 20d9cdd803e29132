//! Background tasks module
//!
//! This module contains background tasks that run alongside the HTTP server.

pub mod expiry_ticker;
pub mod session_reaper;

// Re-export main functions
pub use expiry_ticker::expiry_ticker_task;
pub use session_reaper::session_reaper_task;
