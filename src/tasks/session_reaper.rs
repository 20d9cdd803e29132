//! Idle session reaper background task

use std::{sync::Arc, time::Duration};
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::{state::AppState, utils::clock};

const REAP_INTERVAL: Duration = Duration::from_secs(60);

/// Background task that ends sessions nobody has looked at for `ttl`
pub async fn session_reaper_task(state: Arc<AppState>, ttl: Duration) {
    info!("Starting session reaper task (ttl {}min)", ttl.as_secs() / 60);

    let mut interval = interval(REAP_INTERVAL);

    loop {
        interval.tick().await;

        match state.reap_idle(clock::now(), ttl) {
            Ok(0) => debug!("No idle sessions to reap"),
            Ok(removed) => info!("Reaped {} idle sessions", removed),
            Err(e) => warn!("Failed to reap idle sessions: {}", e),
        }
    }
}
