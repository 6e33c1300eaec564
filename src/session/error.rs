use super::config::ConfigError;
use crate::worker::LaunchError;
use thiserror::Error;

/// Failures surfaced by [`SessionController`](super::SessionController).
///
/// None of these change session state: a rejected call leaves the
/// controller exactly as it was.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid session config: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error(transparent)]
    Launch(#[from] LaunchError),

    #[error("a transcription session is already running")]
    AlreadyRunning,

    #[error("no transcription session is running")]
    NotRunning,
}

impl SessionError {
    /// Invalid state transitions, as opposed to config or launch failures
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, Self::AlreadyRunning | Self::NotRunning)
    }
}
