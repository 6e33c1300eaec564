use super::config::SessionConfig;
use super::error::SessionError;
use super::state::{SessionInfo, SessionStatus, StopReport, STOPPED_NOTICE};
use crate::worker::{WorkerCommand, WorkerInvocation, WorkerLauncher, WorkerProcess};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Default time the stop notice stays on screen
pub const DEFAULT_STOP_NOTICE: Duration = Duration::from_secs(2);

/// A running session and the worker behind it
struct ActiveSession {
    info: SessionInfo,
    worker: Box<dyn WorkerProcess>,
}

/// Owns the transcription session state and the worker process lifetime.
///
/// `Idle --start--> Running --stop--> Idle`. Any other transition is
/// rejected without touching state. Status changes are published on a
/// watch channel so the transcript poller can gate its reads on them.
pub struct SessionController {
    /// Creates worker processes
    launcher: Arc<dyn WorkerLauncher>,

    /// Program and leading arguments for the worker
    command: WorkerCommand,

    /// Current status, observed by the poller
    status_tx: watch::Sender<SessionStatus>,

    /// Present exactly while Running
    active: Option<ActiveSession>,

    /// How long the UI should show the stop notice
    notice_duration: Duration,
}

impl SessionController {
    pub fn new(launcher: Arc<dyn WorkerLauncher>, command: WorkerCommand) -> Self {
        let (status_tx, _) = watch::channel(SessionStatus::Idle);

        Self {
            launcher,
            command,
            status_tx,
            active: None,
            notice_duration: DEFAULT_STOP_NOTICE,
        }
    }

    pub fn with_notice_duration(mut self, duration: Duration) -> Self {
        self.notice_duration = duration;
        self
    }

    pub fn status(&self) -> SessionStatus {
        *self.status_tx.borrow()
    }

    /// Receiver that observes every status change
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status_tx.subscribe()
    }

    /// The running session, if any
    pub fn current(&self) -> Option<&SessionInfo> {
        self.active.as_ref().map(|active| &active.info)
    }

    /// Validate `config`, launch the worker and move to Running
    pub fn start(&mut self, config: SessionConfig) -> Result<SessionInfo, SessionError> {
        if self.active.is_some() {
            warn!("Start rejected: session already running");
            return Err(SessionError::AlreadyRunning);
        }

        config.validate()?;

        let invocation = WorkerInvocation::new(&self.command, &config);
        let worker = self.launcher.launch(&invocation).map_err(|e| {
            error!("{}", e);
            SessionError::Launch(e)
        })?;

        let info = SessionInfo {
            session_id: Uuid::new_v4(),
            started_at: Utc::now(),
            worker_pid: worker.id(),
            config,
        };

        info!(
            "Transcription session {} started (model={}, mic={})",
            info.session_id, info.config.model, info.config.mic_index
        );

        self.active = Some(ActiveSession {
            info: info.clone(),
            worker,
        });
        self.status_tx.send_replace(SessionStatus::Running);

        Ok(info)
    }

    /// Signal the worker to exit and move to Idle.
    ///
    /// Does not wait for the worker to actually exit.
    pub fn stop(&mut self) -> Result<StopReport, SessionError> {
        let Some(mut active) = self.active.take() else {
            warn!("Stop rejected: no session running");
            return Err(SessionError::NotRunning);
        };

        let signal_delivered = match active.worker.terminate() {
            Ok(()) => true,
            Err(e) => {
                // Usually means the worker already exited on its own
                warn!(
                    "Failed to signal worker for session {}: {}",
                    active.info.session_id, e
                );
                false
            }
        };

        self.status_tx.send_replace(SessionStatus::Idle);

        let duration = Utc::now().signed_duration_since(active.info.started_at);
        info!("Transcription session {} stopped", active.info.session_id);

        Ok(StopReport {
            session_id: active.info.session_id,
            duration_secs: duration.num_milliseconds() as f64 / 1000.0,
            signal_delivered,
            notice: STOPPED_NOTICE.to_string(),
            notice_duration: self.notice_duration,
        })
    }

    /// Whether the worker is still running; `None` while Idle
    pub fn worker_alive(&mut self) -> Option<bool> {
        self.active.as_mut().map(|active| active.worker.is_alive())
    }

    /// Move to Idle if the worker has exited by itself.
    ///
    /// Returns the session that ended. Nothing calls this implicitly;
    /// front-ends opt in through configuration.
    pub fn reap_exited_worker(&mut self) -> Option<SessionInfo> {
        if self.worker_alive()? {
            return None;
        }

        let active = self.active.take()?;
        self.status_tx.send_replace(SessionStatus::Idle);
        warn!(
            "Worker for session {} exited on its own; session closed",
            active.info.session_id
        );

        Some(active.info)
    }
}
