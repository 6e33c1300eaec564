//! HTTP control surface
//!
//! This module exposes the session controller and transcript display over
//! a small REST API:
//! - GET /health - Health check
//! - GET /microphones - Microphone selector entries
//! - GET /session - Session status and stop notice
//! - POST /session/start - Start transcribing
//! - POST /session/stop - Stop transcribing
//! - GET /transcript - Latest transcript from the poller

mod handlers;
mod routes;
mod state;

pub use handlers::{SessionStatusResponse, TranscriptResponse};
pub use routes::create_router;
pub use state::AppState;
