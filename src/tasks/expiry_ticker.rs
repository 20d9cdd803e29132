//! Expiry ticker background task

use std::{sync::Arc, time::Duration};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use crate::{state::AppState, utils::clock};

/// Background task that drives every session's countdown to its next phase
pub async fn expiry_ticker_task(state: Arc<AppState>, tick: Duration) {
    info!("Starting expiry ticker task ({}ms interval)", tick.as_millis());

    let mut interval = interval(tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        match state.expire_due(clock::now()) {
            Ok(expired) => {
                for (id, transition) in expired {
                    info!(
                        "Session {} countdown expired: {} -> {} (completed: {})",
                        id, transition.from, transition.to, transition.completed_count
                    );
                }
            }
            Err(e) => {
                error!("Failed to run expiry check: {}", e);
            }
        }
    }
}
