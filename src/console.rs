//! Interactive terminal front-end
//!
//! Starts one session, renders the transcript in the terminal and stops
//! the session on Enter or Ctrl-C.

use crate::config::Config;
use crate::session::{SessionConfig, SessionController};
use crate::transcript::{TerminalSink, TranscriptPoller};
use crate::worker::ProcessLauncher;
use anyhow::{Context, Result};
use std::io::{self, BufRead};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

/// Control events read from the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlInput {
    /// Enter pressed
    Stop,
    /// Ctrl-C
    Interrupt,
    /// Worker exited by itself (only with `reap_exited_worker`)
    WorkerExited,
}

pub async fn run(cfg: &Config, session: SessionConfig) -> Result<()> {
    let mut controller = SessionController::new(Arc::new(ProcessLauncher), cfg.worker.clone())
        .with_notice_duration(cfg.session.stop_notice());

    let poller = TranscriptPoller::new(&cfg.transcript.artifact_path)
        .with_interval(cfg.transcript.poll_interval());
    let status = controller.subscribe();

    let started = controller
        .start(session)
        .context("Failed to start transcription")?;

    println!("Transcription starting... (press Enter to stop)");
    info!(
        "Session {} reading {}",
        started.session_id,
        cfg.transcript.artifact_path.display()
    );

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let poller_task = tokio::spawn(poller.run(status, TerminalSink::stdout(), async move {
        shutdown_rx.await.ok();
    }));

    let input = read_control_input(&mut controller, cfg).await;
    info!("Control input: {:?}", input);

    if controller.status().is_running() {
        let report = controller.stop()?;
        println!("\n{}", report.notice);
        tokio::time::sleep(report.notice_duration).await;
    } else {
        println!("\nWorker exited; transcription ended");
    }

    shutdown_tx.send(()).ok();
    poller_task.await.context("Transcript poller task panicked")?;

    Ok(())
}

/// Wait for the next control event
async fn read_control_input(controller: &mut SessionController, cfg: &Config) -> ControlInput {
    let reap_exited_worker = cfg.session.reap_exited_worker;
    let mut lines = spawn_stdin_reader();
    let mut stdin_open = true;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut liveness = tokio::time::interval(cfg.transcript.poll_interval());

    loop {
        tokio::select! {
            line = lines.recv(), if stdin_open => match line {
                Some(Ok(_)) => return ControlInput::Stop,
                Some(Err(e)) => {
                    warn!("Failed to read stdin: {}", e);
                    stdin_open = false;
                }
                None => {
                    // Not attached to a terminal; only Ctrl-C can stop us now
                    stdin_open = false;
                }
            },
            _ = &mut ctrl_c => return ControlInput::Interrupt,
            _ = liveness.tick(), if reap_exited_worker => {
                if controller.reap_exited_worker().is_some() {
                    return ControlInput::WorkerExited;
                }
            }
        }
    }
}

/// Read stdin lines on a plain thread.
///
/// A blocking read inside the runtime would hold up shutdown until the
/// next line arrives; this thread is simply abandoned on exit.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<io::Result<String>> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}
