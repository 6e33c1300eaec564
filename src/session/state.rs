use super::config::SessionConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Text shown for a moment after a session is stopped
pub const STOPPED_NOTICE: &str = "Transcription stopped!";

/// Lifecycle status of the transcription session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Idle,
    Running,
}

impl SessionStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

/// Details of the currently running session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Unique session identifier
    pub session_id: Uuid,

    /// When the worker was launched
    pub started_at: DateTime<Utc>,

    /// Config the worker was launched with
    pub config: SessionConfig,

    /// OS process id of the worker, if the platform reports one
    pub worker_pid: Option<u32>,
}

/// Result of a successful stop
#[derive(Debug, Clone, Serialize)]
pub struct StopReport {
    pub session_id: Uuid,

    /// Seconds between launch and stop
    pub duration_secs: f64,

    /// Whether the termination signal could be delivered
    pub signal_delivered: bool,

    /// Notice for the UI to show before offering a new start
    pub notice: String,

    /// How long the notice should stay visible
    #[serde(with = "duration_ms")]
    pub notice_duration: Duration,
}

mod duration_ms {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }
}
