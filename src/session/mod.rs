//! Transcription session management
//!
//! This module provides the `SessionController` that gates session
//! start/stop and owns the external worker's lifetime:
//! - Session config validation
//! - Worker launch with the session's command line flags
//! - Status publication for the transcript poller
//! - Best-effort worker termination on stop

mod config;
mod controller;
mod error;
mod state;

pub use config::{
    ConfigError, SessionConfig, SessionRequest, WhisperModel, ENERGY_THRESHOLD_RANGE,
    PHRASE_TIMEOUT_RANGE, RECORD_TIMEOUT_RANGE,
};
pub use controller::{SessionController, DEFAULT_STOP_NOTICE};
pub use error::SessionError;
pub use state::{SessionInfo, SessionStatus, StopReport, STOPPED_NOTICE};
