//! FocusFlow - A session-managed HTTP Pomodoro timer server
//!
//! This is the main entry point for the focusflow application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use focusflow::{
    config::Config,
    state::AppState,
    api::create_router,
    tasks::{expiry_ticker_task, session_reaper_task},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("focusflow={},tower_http=info", config.log_level()))
        .init();

    let defaults = config.timer_settings()?;

    info!("Starting focusflow server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, work={}min, short={}min, long={}min, long every {}",
          config.host, config.port, defaults.work_minutes, defaults.short_break_minutes,
          defaults.long_break_minutes, defaults.pomodoros_before_long);

    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        defaults,
        config.reset_clears_count,
    ));

    // Start the expiry ticker background task
    let ticker_state = Arc::clone(&state);
    let tick = config.tick_interval();
    tokio::spawn(async move {
        expiry_ticker_task(ticker_state, tick).await;
    });

    if let Some(ttl) = config.session_ttl() {
        let reaper_state = Arc::clone(&state);
        tokio::spawn(async move {
            session_reaper_task(reaper_state, ttl).await;
        });
    }

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST   /sessions                    - Open a session");
    info!("  GET    /sessions/:id                - Session status and countdown");
    info!("  DELETE /sessions/:id                - End a session");
    info!("  POST   /sessions/:id/start          - Start working, short_break or long_break");
    info!("  POST   /sessions/:id/pause          - Pause the countdown");
    info!("  POST   /sessions/:id/resume         - Resume the countdown");
    info!("  POST   /sessions/:id/skip           - Skip to the next phase");
    info!("  POST   /sessions/:id/reset          - Back to ready");
    info!("  POST   /sessions/:id/reset-counters - Clear completed pomodoros");
    info!("  GET    /sessions/:id/events         - Transition event stream");
    info!("  GET    /status                      - Server status");
    info!("  GET    /health                      - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        result = shutdown_signal() => {
            result?;
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
