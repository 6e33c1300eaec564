// Shared fakes for integration tests
//
// A launcher that records every invocation instead of spawning processes.

#![allow(dead_code)]

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use whisper_control::worker::LaunchError;
use whisper_control::{WorkerInvocation, WorkerLauncher, WorkerProcess};

#[derive(Default)]
pub struct LaunchLog {
    pub launches: AtomicUsize,
    pub terminations: AtomicUsize,
    pub invocations: Mutex<Vec<WorkerInvocation>>,
}

impl LaunchLog {
    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn terminations(&self) -> usize {
        self.terminations.load(Ordering::SeqCst)
    }
}

pub struct RecordingLauncher {
    pub log: Arc<LaunchLog>,
}

impl RecordingLauncher {
    pub fn new() -> (Self, Arc<LaunchLog>) {
        let log = Arc::new(LaunchLog::default());
        (
            Self {
                log: Arc::clone(&log),
            },
            log,
        )
    }
}

struct RecordedWorker {
    log: Arc<LaunchLog>,
    pid: u32,
}

impl WorkerProcess for RecordedWorker {
    fn id(&self) -> Option<u32> {
        Some(self.pid)
    }

    fn terminate(&mut self) -> io::Result<()> {
        self.log.terminations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn is_alive(&mut self) -> bool {
        true
    }
}

impl WorkerLauncher for RecordingLauncher {
    fn launch(&self, invocation: &WorkerInvocation) -> Result<Box<dyn WorkerProcess>, LaunchError> {
        let n = self.log.launches.fetch_add(1, Ordering::SeqCst);
        self.log
            .invocations
            .lock()
            .unwrap()
            .push(invocation.clone());
        Ok(Box::new(RecordedWorker {
            log: Arc::clone(&self.log),
            pid: 1000 + n as u32,
        }))
    }
}
