//! Monotonic clock used by handlers and tasks

use std::time::Instant;

/// Current instant from the runtime clock, so paused test clocks apply
pub fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}
