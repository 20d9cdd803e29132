use std::{sync::Arc, time::Duration};

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use futures::StreamExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use focusflow::{create_router, state::TimerSettings, AppState};

fn app() -> Router {
    app_with(false)
}

fn app_with(reset_clears_count: bool) -> Router {
    let state = AppState::new(
        0,
        "127.0.0.1".to_string(),
        TimerSettings::default(),
        reset_clears_count,
    );
    create_router(Arc::new(state))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn new_session(app: &Router) -> u64 {
    let (status, body) = send(app, "POST", "/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_u64().unwrap()
}

#[tokio::test]
async fn new_session_starts_ready() {
    let app = app();
    let id = new_session(&app).await;

    let (status, body) = send(&app, "GET", &format!("/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "ready");
    assert_eq!(body["display"], "00:00");
    assert_eq!(body["completed_count"], 0);
    assert_eq!(body["paused"], false);
    assert_eq!(body["settings"]["work_minutes"], 25);
}

#[tokio::test]
async fn start_pause_resume_cycle() {
    let app = app();
    let id = new_session(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/sessions/{id}/start"),
        Some(json!({ "phase": "working" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "applied");
    assert_eq!(body["session"]["phase"], "working");
    assert_eq!(body["session"]["focus_ambience"], true);

    let (_, body) = send(&app, "POST", &format!("/sessions/{id}/pause"), None).await;
    assert_eq!(body["status"], "applied");
    assert_eq!(body["session"]["paused"], true);

    let (_, body) = send(&app, "POST", &format!("/sessions/{id}/pause"), None).await;
    assert_eq!(body["status"], "ignored");

    let (_, body) = send(&app, "POST", &format!("/sessions/{id}/resume"), None).await;
    assert_eq!(body["status"], "applied");
    assert_eq!(body["session"]["paused"], false);
    assert_eq!(body["session"]["phase"], "working");
}

#[tokio::test]
async fn skipping_work_counts_pomodoros_until_long_break() {
    let app = app();
    let id = new_session(&app).await;
    send(
        &app,
        "POST",
        &format!("/sessions/{id}/start"),
        Some(json!({ "phase": "working" })),
    )
    .await;

    let mut phases = Vec::new();
    for _ in 0..8 {
        let (_, body) = send(&app, "POST", &format!("/sessions/{id}/skip"), None).await;
        phases.push(body["session"]["phase"].as_str().unwrap().to_string());
    }

    assert_eq!(
        phases,
        [
            "short_break", "working", "short_break", "working",
            "short_break", "working", "long_break", "working",
        ]
    );

    let (_, body) = send(&app, "GET", &format!("/sessions/{id}"), None).await;
    assert_eq!(body["completed_count"], 4);
}

#[tokio::test]
async fn reset_keeps_count_and_reset_counters_clears_it() {
    let app = app();
    let id = new_session(&app).await;
    send(&app, "POST", &format!("/sessions/{id}/skip"), None).await;
    send(&app, "POST", &format!("/sessions/{id}/skip"), None).await;

    let (_, body) = send(&app, "POST", &format!("/sessions/{id}/reset"), None).await;
    assert_eq!(body["session"]["phase"], "ready");
    assert_eq!(body["session"]["remaining_seconds"], 0);
    assert_eq!(body["session"]["completed_count"], 1);

    let (_, body) = send(&app, "POST", &format!("/sessions/{id}/reset-counters"), None).await;
    assert_eq!(body["session"]["completed_count"], 0);
    assert_eq!(body["session"]["phase"], "ready");
}

#[tokio::test]
async fn reset_can_be_configured_to_clear_count() {
    let app = app_with(true);
    let id = new_session(&app).await;
    send(&app, "POST", &format!("/sessions/{id}/skip"), None).await;
    send(&app, "POST", &format!("/sessions/{id}/skip"), None).await;

    let (_, body) = send(&app, "POST", &format!("/sessions/{id}/reset"), None).await;
    assert_eq!(body["session"]["completed_count"], 0);
}

#[tokio::test]
async fn custom_settings_are_validated() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/sessions",
        Some(json!({ "work_minutes": 50, "pomodoros_before_long": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["settings"]["work_minutes"], 50);
    assert_eq!(body["settings"]["short_break_minutes"], 5);

    let (status, body) = send(&app, "POST", "/sessions", Some(json!({ "work_minutes": 0 }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn settings_that_do_not_parse_are_rejected() {
    let app = app();
    let rejected = [
        json!({ "work_minutes": -5 }),
        json!({ "work_minutes": 2.5 }),
        json!({ "work_minutes": "abc" }),
    ];
    for bad in rejected {
        let (status, _) = send(&app, "POST", "/sessions", Some(bad.clone())).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "accepted {bad}");
    }

    let request = Request::builder()
        .method("POST")
        .uri("/sessions")
        .header("content-type", "application/json")
        .body(Body::from("{"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert!(response.status().is_client_error());

    let (_, body) = send(&app, "GET", "/status", None).await;
    assert_eq!(body["sessions"], 0);
}

#[tokio::test]
async fn empty_json_body_uses_defaults() {
    let app = app();
    let request = Request::builder()
        .method("POST")
        .uri("/sessions")
        .header("content-type", "application/json")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn starting_ready_is_unprocessable() {
    let app = app();
    let id = new_session(&app).await;
    let (status, _) = send(
        &app,
        "POST",
        &format!("/sessions/{id}/start"),
        Some(json!({ "phase": "ready" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn unknown_and_deleted_sessions_are_not_found() {
    let app = app();
    let (status, _) = send(&app, "GET", "/sessions/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let id = new_session(&app).await;
    let (status, _) = send(&app, "DELETE", &format!("/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "POST", &format!("/sessions/{id}/skip"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn status_and_health() {
    let app = app();
    new_session(&app).await;

    let (status, body) = send(&app, "GET", "/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sessions"], 1);
    assert_eq!(body["defaults"]["long_break_minutes"], 15);
    assert_eq!(body["reset_clears_count"], false);

    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn events_for_unknown_session_are_not_found() {
    let app = app();
    let (status, _) = send(&app, "GET", "/sessions/5/events", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

fn data_of(frame: &str) -> Value {
    let data = frame
        .lines()
        .find_map(|line| line.strip_prefix("data:"))
        .unwrap();
    serde_json::from_str(data.trim()).unwrap()
}

#[tokio::test]
async fn event_stream_carries_own_transitions_and_closes_when_session_ends() {
    let app = app();
    let watched = new_session(&app).await;
    let other = new_session(&app).await;
    for id in [watched, other] {
        send(
            &app,
            "POST",
            &format!("/sessions/{id}/start"),
            Some(json!({ "phase": "working" })),
        )
        .await;
    }

    let request = Request::builder()
        .uri(format!("/sessions/{watched}/events"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let mut stream = response.into_body().into_data_stream();

    send(&app, "POST", &format!("/sessions/{other}/skip"), None).await;
    send(&app, "POST", &format!("/sessions/{watched}/skip"), None).await;
    let (status, _) = send(&app, "DELETE", &format!("/sessions/{watched}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let text = tokio::time::timeout(Duration::from_secs(5), async {
        let mut text = String::new();
        while let Some(chunk) = stream.next().await {
            text.push_str(std::str::from_utf8(&chunk.unwrap()).unwrap());
        }
        text
    })
    .await
    .expect("event stream stayed open after the session was deleted");

    let frames: Vec<&str> = text
        .split("\n\n")
        .filter(|frame| !frame.trim().is_empty())
        .collect();
    assert_eq!(frames.len(), 2, "frames: {frames:?}");

    assert!(frames[0].lines().any(|line| line == "event: short_break"));
    let transition = data_of(frames[0]);
    assert_eq!(transition["kind"], "transition");
    assert_eq!(transition["session_id"], watched);
    assert_eq!(transition["cause"], "action");
    assert_eq!(transition["transition"]["from"], "working");
    assert_eq!(transition["transition"]["to"], "short_break");
    assert_eq!(transition["transition"]["completed_count"], 1);

    assert!(frames[1].lines().any(|line| line == "event: ended"));
    let ended = data_of(frames[1]);
    assert_eq!(ended["kind"], "ended");
    assert_eq!(ended["session_id"], watched);
}
