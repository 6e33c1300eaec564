use super::state::AppState;
use crate::microphone::Microphone;
use crate::session::{SessionError, SessionInfo, SessionRequest, SessionStatus, StopReport};
use crate::transcript::DisplaySink;
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct StartSessionResponse {
    pub session_id: String,
    pub status: SessionStatus,
    pub message: String,
    pub session: SessionInfo,
}

#[derive(Debug, Serialize)]
pub struct StopSessionResponse {
    pub session_id: String,
    pub status: SessionStatus,
    pub message: String,
    pub report: StopReport,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionStatusResponse {
    pub status: SessionStatus,
    pub session: Option<SessionInfo>,
    /// `None` while idle
    pub worker_alive: Option<bool>,
    /// Stop notice, while it is still showing
    pub notice: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptResponse {
    pub status: SessionStatus,
    pub content: String,
    pub status_line: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorResponse { error })).into_response()
}

fn session_error_response(err: SessionError) -> Response {
    let status = match &err {
        SessionError::InvalidConfig(_) => StatusCode::BAD_REQUEST,
        SessionError::AlreadyRunning | SessionError::NotRunning => StatusCode::CONFLICT,
        SessionError::Launch(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, err.to_string())
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /microphones
/// List microphones for the selector
pub async fn list_microphones(State(state): State<AppState>) -> impl IntoResponse {
    match state.microphones.list().await {
        Ok(mics) => (StatusCode::OK, Json(mics)).into_response(),
        Err(e) => {
            error!("Failed to list microphones: {:#}", e);
            error_response(
                StatusCode::BAD_GATEWAY,
                format!("Failed to list microphones: {:#}", e),
            )
        }
    }
}

/// GET /session
/// Current session status
pub async fn get_session(State(state): State<AppState>) -> impl IntoResponse {
    let (status, session, worker_alive) = {
        let mut controller = state.controller.lock().await;
        if state.reap_exited_worker {
            if let Some(ended) = controller.reap_exited_worker() {
                info!("Session {} closed after worker exit", ended.session_id);
            }
        }
        (
            controller.status(),
            controller.current().cloned(),
            controller.worker_alive(),
        )
    };

    (
        StatusCode::OK,
        Json(SessionStatusResponse {
            status,
            session,
            worker_alive,
            notice: state.active_notice().await,
        }),
    )
}

/// POST /session/start
/// Start a transcription session; omitted settings use the configured defaults.
///
/// An empty body starts with the defaults. The body is read as JSON whatever
/// its content type, and anything that does not parse is a 400.
pub async fn start_session(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let req = match parse_start_request(&body) {
        Ok(req) => req,
        Err(rejection) => {
            warn!("Rejected start request body: {}", rejection.body_text());
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("Invalid request body: {}", rejection.body_text()),
            );
        }
    };

    // Report a conflict before judging the settings, as the controller does
    if state.controller.lock().await.status().is_running() {
        return session_error_response(SessionError::AlreadyRunning);
    }

    let config = match req.resolve(&state.defaults) {
        Ok(config) => config,
        Err(e) => {
            warn!("Rejected session config: {}", e);
            return session_error_response(e.into());
        }
    };

    // The selector only offers listed devices; hold API callers to the same
    match state.microphones.list().await {
        Ok(mics) if !has_index(&mics, config.mic_index) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!(
                    "Unknown microphone index {} ({} available)",
                    config.mic_index,
                    mics.len()
                ),
            );
        }
        Ok(_) => {}
        Err(e) => warn!("Microphone lookup failed, skipping index check: {:#}", e),
    }

    let result = {
        let mut controller = state.controller.lock().await;
        controller.start(config)
    };

    match result {
        Ok(session) => {
            state.clear_notice().await;
            info!("Transcription started: {}", session.session_id);

            (
                StatusCode::OK,
                Json(StartSessionResponse {
                    session_id: session.session_id.to_string(),
                    status: SessionStatus::Running,
                    message: "Transcription starting...".to_string(),
                    session,
                }),
            )
                .into_response()
        }
        Err(e) => session_error_response(e),
    }
}

/// POST /session/stop
/// Stop the running session
pub async fn stop_session(State(state): State<AppState>) -> impl IntoResponse {
    let result = {
        let mut controller = state.controller.lock().await;
        controller.stop()
    };

    match result {
        Ok(report) => {
            state
                .show_notice(report.notice.clone(), report.notice_duration)
                .await;

            let mut display = state.display.clone();
            display.set_status(&report.notice).await;

            (
                StatusCode::OK,
                Json(StopSessionResponse {
                    session_id: report.session_id.to_string(),
                    status: SessionStatus::Idle,
                    message: report.notice.clone(),
                    report,
                }),
            )
                .into_response()
        }
        Err(e) => session_error_response(e),
    }
}

/// GET /transcript
/// Latest transcript as last read by the poller.
///
/// While the stop notice is showing it is the status line, even if a poll
/// tick that saw the session still running wrote over it after the stop.
pub async fn get_transcript(State(state): State<AppState>) -> impl IntoResponse {
    let status = state.controller.lock().await.status();
    let buffer = state.display.snapshot().await;
    let status_line = match state.active_notice().await {
        Some(notice) => notice,
        None => buffer.status_line,
    };

    (
        StatusCode::OK,
        Json(TranscriptResponse {
            status,
            content: buffer.content,
            status_line,
        }),
    )
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

fn parse_start_request(body: &[u8]) -> Result<SessionRequest, JsonRejection> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(SessionRequest::default());
    }
    Json::<SessionRequest>::from_bytes(body).map(|Json(req)| req)
}

fn has_index(mics: &[Microphone], index: i64) -> bool {
    mics.iter().any(|mic| i64::try_from(mic.index) == Ok(index))
}
