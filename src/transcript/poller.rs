use super::artifact::read_artifact;
use super::sink::DisplaySink;
use crate::session::SessionStatus;
use chrono::Local;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Refresh cadence used when none is configured
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// What a single poll tick did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Session not running; nothing was read
    Skipped,
    /// Transcript pushed to the sink
    Refreshed { bytes: usize },
    /// Read failed; the sink keeps its previous text
    Failed,
}

/// Samples the transcript file while a session is running.
///
/// The file is re-read whole on every tick: last complete write wins, and
/// a read that races the worker's write may show a partial transcript until
/// the next tick. A stop is observed at the next tick at the latest.
#[derive(Debug, Clone)]
pub struct TranscriptPoller {
    /// Shared file the worker writes
    artifact_path: PathBuf,

    /// Time between ticks
    interval: Duration,
}

impl TranscriptPoller {
    pub fn new(artifact_path: impl Into<PathBuf>) -> Self {
        Self {
            artifact_path: artifact_path.into(),
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn artifact_path(&self) -> &Path {
        &self.artifact_path
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one tick against the given status
    pub async fn poll_once<S>(&self, status: SessionStatus, sink: &mut S) -> TickOutcome
    where
        S: DisplaySink + ?Sized,
    {
        if !status.is_running() {
            return TickOutcome::Skipped;
        }

        match read_artifact(&self.artifact_path).await {
            Ok(content) => {
                sink.set_text(&content).await;
                let line = format!("Last updated: {}", ctime_now());
                sink.set_status(&line).await;
                TickOutcome::Refreshed {
                    bytes: content.len(),
                }
            }
            Err(e) => {
                warn!("{} ({})", e, self.artifact_path.display());
                let line = format!("Read failed at {}: {}", ctime_now(), e);
                sink.set_status(&line).await;
                TickOutcome::Failed
            }
        }
    }

    /// Tick until `shutdown` completes.
    ///
    /// The sink is only ever handed complete strings, so cancelling this
    /// future leaves it showing the last successfully read transcript.
    pub async fn run<S, F>(self, status: watch::Receiver<SessionStatus>, mut sink: S, shutdown: F)
    where
        S: DisplaySink,
        F: Future<Output = ()>,
    {
        info!(
            "Transcript poller started: {} (every {:?})",
            self.artifact_path.display(),
            self.interval
        );

        tokio::pin!(shutdown);

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    let current = *status.borrow();
                    let outcome = self.poll_once(current, &mut sink).await;
                    debug!("Poll tick: {:?}", outcome);
                }
            }
        }

        info!("Transcript poller stopped");
    }
}

/// Local time in the classic `ctime` layout, e.g. `Mon Oct 19 14:03:07 2026`
fn ctime_now() -> String {
    Local::now().format("%a %b %e %H:%M:%S %Y").to_string()
}
