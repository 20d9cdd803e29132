//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::{
    state::{Action, AppState, SessionId, SessionSnapshot, TimerEvent, TimerSettings},
    utils::clock,
};
use super::responses::{ActionResponse, ApiError, HealthResponse, StartRequest, StatusResponse};

/// Handle POST /sessions - Open a session, optionally with its own settings.
/// An empty body means server defaults; anything else must parse and validate.
pub async fn create_session_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<SessionSnapshot>), ApiError> {
    let settings = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        let Json(settings) = Json::<TimerSettings>::from_bytes(&body)?;
        settings.validate()?;
        Some(settings)
    };

    let snapshot = state.create_session(settings, clock::now())?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// Handle GET /sessions/:id - Current phase, countdown and counters
pub async fn session_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    Ok(Json(state.session_snapshot(id, clock::now())?))
}

/// Handle DELETE /sessions/:id - End a session
pub async fn delete_session_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
) -> Result<StatusCode, ApiError> {
    state.remove_session(id)?;
    Ok(StatusCode::NO_CONTENT)
}

fn run_action(
    state: &AppState,
    id: SessionId,
    action: Action,
) -> Result<Json<ActionResponse>, ApiError> {
    let result = state.apply(id, action, clock::now())?;
    let response = if result.applied {
        ActionResponse::applied(format!("{} applied", action.name()), result.snapshot)
    } else {
        ActionResponse::ignored(
            format!("{} has no effect in the current state", action.name()),
            result.snapshot,
        )
    };
    Ok(Json(response))
}

/// Handle POST /sessions/:id/start - Start a work or break countdown
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
    Json(request): Json<StartRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    run_action(&state, id, Action::Start(request.phase))
}

/// Handle POST /sessions/:id/pause
pub async fn pause_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
) -> Result<Json<ActionResponse>, ApiError> {
    run_action(&state, id, Action::Pause)
}

/// Handle POST /sessions/:id/resume
pub async fn resume_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
) -> Result<Json<ActionResponse>, ApiError> {
    run_action(&state, id, Action::Resume)
}

/// Handle POST /sessions/:id/skip - Jump to the next phase of the cycle
pub async fn skip_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
) -> Result<Json<ActionResponse>, ApiError> {
    run_action(&state, id, Action::Skip)
}

/// Handle POST /sessions/:id/reset - Back to Ready
pub async fn reset_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
) -> Result<Json<ActionResponse>, ApiError> {
    run_action(&state, id, Action::Reset)
}

/// Handle POST /sessions/:id/reset-counters - Zero the completed count
pub async fn reset_counters_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
) -> Result<Json<ActionResponse>, ApiError> {
    run_action(&state, id, Action::ResetCounters)
}

/// Handle GET /sessions/:id/events - Stream this session's transitions.
/// The stream sends a final `ended` event and closes once the session is gone.
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    // Subscribe before the existence check so no transition slips between
    let rx = state.subscribe();
    state.session_snapshot(id, clock::now())?;
    info!("Client subscribed to session {} events", id);

    let events = stream::unfold(Some(rx), move |rx| {
        let state = Arc::clone(&state);
        async move {
            let Some(mut rx) = rx else {
                return None;
            };

            loop {
                match rx.recv().await {
                    Ok(event) if event.session_id() == id => {
                        let (name, ended) = match &event {
                            TimerEvent::Transition { transition, .. } => {
                                (transition.to.as_str(), false)
                            }
                            TimerEvent::Ended { .. } => ("ended", true),
                        };
                        if ended {
                            info!("Session {} ended, closing event stream", id);
                        }

                        let sse = Event::default()
                            .event(name)
                            .json_data(&event)
                            .unwrap_or_else(|e| {
                                Event::default().event("error").data(e.to_string())
                            });
                        return Some((Ok::<_, Infallible>(sse), (!ended).then_some(rx)));
                    }
                    Ok(_) => continue,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Session {} event stream lagged by {} events", id, skipped);
                        // The ended event may have been among the skipped ones
                        if !state.contains_session(id).unwrap_or(false) {
                            return None;
                        }
                    }
                    Err(RecvError::Closed) => return None,
                }
            }
        }
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// Handle GET /status - Return server status
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, ApiError> {
    Ok(Json(StatusResponse {
        sessions: state.session_count()?,
        defaults: state.defaults,
        reset_clears_count: state.clear_count_on_reset,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
