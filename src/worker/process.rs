use super::invocation::WorkerInvocation;
use std::io;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

/// The worker process could not be created
#[derive(Debug, Error)]
#[error("failed to launch worker '{program}': {source}")]
pub struct LaunchError {
    pub program: String,
    #[source]
    pub source: io::Error,
}

/// Handle to a launched worker.
///
/// The process lives on OS time, not program scope: callers terminate it
/// explicitly instead of relying on drop order.
pub trait WorkerProcess: Send {
    /// OS process id, if still known
    fn id(&self) -> Option<u32>;

    /// Ask the process to exit. Returns without waiting for it.
    fn terminate(&mut self) -> io::Result<()>;

    /// Whether the process has not exited yet
    fn is_alive(&mut self) -> bool;
}

/// Creates worker processes
pub trait WorkerLauncher: Send + Sync {
    fn launch(&self, invocation: &WorkerInvocation) -> Result<Box<dyn WorkerProcess>, LaunchError>;
}

/// Launches the worker as a real OS process.
///
/// Output is not captured; stdout and stderr go wherever ours go.
/// Must be called from within a tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessLauncher;

impl WorkerLauncher for ProcessLauncher {
    fn launch(&self, invocation: &WorkerInvocation) -> Result<Box<dyn WorkerProcess>, LaunchError> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        if let Some(dir) = &invocation.working_dir {
            cmd.current_dir(dir);
        }

        let child = cmd.spawn().map_err(|source| LaunchError {
            program: invocation.program.clone(),
            source,
        })?;

        info!(
            "Worker launched (pid={}): {}",
            child.id().unwrap_or(0),
            invocation
        );

        Ok(Box::new(ChildProcess { child }))
    }
}

struct ChildProcess {
    child: Child,
}

impl WorkerProcess for ChildProcess {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    fn terminate(&mut self) -> io::Result<()> {
        // tokio reaps the child in the background once the handle is dropped
        self.child.start_kill()
    }

    fn is_alive(&mut self) -> bool {
        match self.child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) => {
                debug!("Worker exited: {}", status);
                false
            }
            Err(e) => {
                warn!("Failed to query worker status: {}", e);
                false
            }
        }
    }
}
