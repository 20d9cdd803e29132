//! API response structures

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::state::{Phase, SessionSnapshot, SettingsError, StateError, TimerSettings};

/// API response structure for session action endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub session: SessionSnapshot,
}

impl ActionResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, session: SessionSnapshot) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            session,
        }
    }

    /// The action changed the timer
    pub fn applied(message: String, session: SessionSnapshot) -> Self {
        Self::new("applied".to_string(), message, session)
    }

    /// A guard turned the action into a no-op
    pub fn ignored(message: String, session: SessionSnapshot) -> Self {
        Self::new("ignored".to_string(), message, session)
    }
}

/// Body of POST /sessions/:id/start
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartRequest {
    pub phase: Phase,
}

/// Server-wide status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub sessions: usize,
    pub defaults: TimerSettings,
    pub reset_clears_count: bool,
    pub uptime: String,
    pub port: u16,
    pub host: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// JSON error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Handler failure mapped to a status code
#[derive(Debug)]
pub struct ApiError {
    pub code: StatusCode,
    pub message: String,
}

impl From<StateError> for ApiError {
    fn from(e: StateError) -> Self {
        let code = match e {
            StateError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            StateError::InvalidAction(_) => StatusCode::UNPROCESSABLE_ENTITY,
            StateError::Lock(_) => {
                error!("{}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            code,
            message: e.to_string(),
        }
    }
}

impl From<SettingsError> for ApiError {
    fn from(e: SettingsError) -> Self {
        Self {
            code: StatusCode::UNPROCESSABLE_ENTITY,
            message: e.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            code: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            status: "error".to_string(),
            message: self.message,
            timestamp: Utc::now(),
        };
        (self.code, Json(body)).into_response()
    }
}
