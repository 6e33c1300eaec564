use crate::microphone::MicrophoneDirectory;
use crate::session::{SessionConfig, SessionController};
use crate::transcript::SharedDisplay;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

/// Transient message shown after a stop
#[derive(Debug, Clone)]
pub struct Notice {
    pub text: String,
    pub expires_at: Instant,
}

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The single session controller; one session at a time
    pub controller: Arc<Mutex<SessionController>>,

    /// Latest transcript as rendered by the poller
    pub display: SharedDisplay,

    /// Source for the microphone selector
    pub microphones: Arc<dyn MicrophoneDirectory>,

    /// Values for settings a start request leaves out
    pub defaults: SessionConfig,

    /// Close the session on `GET /session` if the worker died
    pub reap_exited_worker: bool,

    /// Stop notice, if one is still showing
    notice: Arc<RwLock<Option<Notice>>>,
}

impl AppState {
    pub fn new(
        controller: SessionController,
        display: SharedDisplay,
        microphones: Arc<dyn MicrophoneDirectory>,
        defaults: SessionConfig,
    ) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
            display,
            microphones,
            defaults,
            reap_exited_worker: false,
            notice: Arc::new(RwLock::new(None)),
        }
    }

    pub fn with_reap_exited_worker(mut self, enabled: bool) -> Self {
        self.reap_exited_worker = enabled;
        self
    }

    pub async fn show_notice(&self, text: String, duration: Duration) {
        let mut notice = self.notice.write().await;
        *notice = Some(Notice {
            text,
            expires_at: Instant::now() + duration,
        });
    }

    pub async fn clear_notice(&self) {
        self.notice.write().await.take();
    }

    /// Notice text while it has not expired
    pub async fn active_notice(&self) -> Option<String> {
        let notice = self.notice.read().await;
        notice
            .as_ref()
            .filter(|n| Instant::now() < n.expires_at)
            .map(|n| n.text.clone())
    }
}
