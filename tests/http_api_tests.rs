// Integration tests for the HTTP control API
//
// These tests drive the router in-process with a recording launcher, so no
// worker processes or sockets are involved.

mod common;

use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use common::{LaunchLog, RecordingLauncher};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use whisper_control::microphone::StaticMicrophones;
use whisper_control::{
    create_router, AppState, DisplaySink, SessionConfig, SessionController, SharedDisplay,
    WorkerCommand,
};

fn test_app() -> (Router, AppState, Arc<LaunchLog>) {
    let (launcher, log) = RecordingLauncher::new();
    let controller = SessionController::new(Arc::new(launcher), WorkerCommand::default())
        .with_notice_duration(Duration::from_secs(2));
    let microphones = StaticMicrophones::new(vec!["Built-in".to_string(), "USB".to_string()]);
    let state = AppState::new(
        controller,
        SharedDisplay::new(),
        Arc::new(microphones),
        SessionConfig::default(),
    );
    (create_router(state.clone()), state, log)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let request = match body {
        Some(body) => Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))?,
        None => Request::builder().method(method).uri(uri).body(Body::empty())?,
    };

    dispatch(app, request).await
}

async fn dispatch(app: &Router, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    Ok((status, value))
}

#[tokio::test]
async fn test_health() -> Result<()> {
    let (app, _, _) = test_app();
    let (status, _) = send(&app, "GET", "/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_list_microphones() -> Result<()> {
    let (app, _, _) = test_app();

    let (status, body) = send(&app, "GET", "/microphones", None).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{"index": 0, "name": "Built-in"}, {"index": 1, "name": "USB"}])
    );
    Ok(())
}

#[tokio::test]
async fn test_start_and_stop_session() -> Result<()> {
    let (app, _, log) = test_app();

    let (status, body) = send(
        &app,
        "POST",
        "/session/start",
        Some(json!({"model": "small", "mic_index": 1})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");
    assert_eq!(body["session"]["config"]["model"], "small");
    assert_eq!(body["session"]["config"]["energy_threshold"], 300);

    let (_, body) = send(&app, "GET", "/session", None).await?;
    assert_eq!(body["status"], "running");
    assert_eq!(body["worker_alive"], true);

    let (status, body) = send(&app, "POST", "/session/stop", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "idle");
    assert_eq!(body["message"], "Transcription stopped!");
    assert_eq!(body["report"]["notice_duration"], 2000);

    let (_, body) = send(&app, "GET", "/session", None).await?;
    assert_eq!(body["status"], "idle");
    assert_eq!(body["notice"], "Transcription stopped!");
    assert_eq!(body["worker_alive"], Value::Null);

    assert_eq!(log.launches(), 1);
    assert_eq!(log.terminations(), 1);
    Ok(())
}

#[tokio::test]
async fn test_second_start_conflicts() -> Result<()> {
    let (app, _, log) = test_app();

    send(&app, "POST", "/session/start", Some(json!({}))).await?;
    let (status, body) = send(&app, "POST", "/session/start", Some(json!({}))).await?;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap_or_default().contains("already running"));
    assert_eq!(log.launches(), 1);
    Ok(())
}

#[tokio::test]
async fn test_stop_while_idle_conflicts() -> Result<()> {
    let (app, _, log) = test_app();

    let (status, _) = send(&app, "POST", "/session/stop", None).await?;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(log.terminations(), 0);
    Ok(())
}

#[tokio::test]
async fn test_invalid_config_is_bad_request() -> Result<()> {
    let (app, _, log) = test_app();

    let (status, _) = send(
        &app,
        "POST",
        "/session/start",
        Some(json!({"energy_threshold": 50})),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let body = json!({"model": "large"});
    let (status, _) = send(&app, "POST", "/session/start", Some(body)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let body = json!({"mic_index": 5});
    let (status, body) = send(&app, "POST", "/session/start", Some(body)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap_or_default().contains("microphone"));

    assert_eq!(log.launches(), 0);
    Ok(())
}

#[tokio::test]
async fn test_transcript_reflects_display() -> Result<()> {
    let (app, state, _) = test_app();

    let mut sink = state.display.clone();
    sink.set_text("hello\n\nworld\n\n").await;
    sink.set_status("Last updated: Mon Oct 19 14:03:07 2026").await;

    let (status, body) = send(&app, "GET", "/transcript", None).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "hello\n\nworld\n\n");
    assert_eq!(body["status_line"], "Last updated: Mon Oct 19 14:03:07 2026");
    assert_eq!(body["status"], "idle");
    Ok(())
}

#[tokio::test]
async fn test_bodyless_start_uses_defaults() -> Result<()> {
    let (app, _, log) = test_app();

    let (status, body) = send(&app, "POST", "/session/start", None).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session"]["config"]["model"], "tiny");
    assert_eq!(body["session"]["config"]["mic_index"], 0);
    assert_eq!(log.launches(), 1);
    Ok(())
}

#[tokio::test]
async fn test_malformed_start_body_is_bad_request() -> Result<()> {
    let (app, _, log) = test_app();

    let (status, body) = send(
        &app,
        "POST",
        "/session/start",
        Some(json!({"energy_threshold": 250.5})),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let request = Request::builder()
        .method("POST")
        .uri("/session/start")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))?;
    let (status, body) = dispatch(&app, request).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    assert_eq!(log.launches(), 0);
    Ok(())
}

#[tokio::test]
async fn test_start_while_running_conflicts_before_mic_check() -> Result<()> {
    let (app, _, log) = test_app();

    send(&app, "POST", "/session/start", None).await?;
    let body = json!({"mic_index": 5});
    let (status, body) = send(&app, "POST", "/session/start", Some(body)).await?;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap_or_default().contains("already running"));
    assert_eq!(log.launches(), 1);
    Ok(())
}

#[tokio::test]
async fn test_stop_notice_survives_late_poll_tick() -> Result<()> {
    let (app, state, _) = test_app();

    send(&app, "POST", "/session/start", None).await?;
    send(&app, "POST", "/session/stop", None).await?;

    // A tick that read Running just before the stop lands afterwards
    let mut sink = state.display.clone();
    sink.set_status("Last updated: Mon Oct 19 14:03:07 2026").await;

    let (_, body) = send(&app, "GET", "/transcript", None).await?;
    assert_eq!(body["status"], "idle");
    assert_eq!(body["status_line"], "Transcription stopped!");

    state.clear_notice().await;
    let (_, body) = send(&app, "GET", "/transcript", None).await?;
    assert_eq!(body["status_line"], "Last updated: Mon Oct 19 14:03:07 2026");
    Ok(())
}
