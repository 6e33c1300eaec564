use crate::session::SessionConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// How to invoke the worker, minus the per-session flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerCommand {
    /// Executable or interpreter to run
    pub program: String,

    /// Arguments placed before the session flags (e.g. `-m demo.transcribe`)
    pub args: Vec<String>,

    /// Working directory for the worker; inherits ours when unset
    pub working_dir: Option<PathBuf>,
}

impl Default for WorkerCommand {
    fn default() -> Self {
        Self {
            program: "python".to_string(),
            args: vec!["-m".to_string(), "demo.transcribe".to_string()],
            working_dir: None,
        }
    }
}

/// Complete command line for one session's worker
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerInvocation {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl WorkerInvocation {
    /// Append the session flags to the configured command.
    ///
    /// The flag names are what the worker parses; do not rename them.
    pub fn new(command: &WorkerCommand, config: &SessionConfig) -> Self {
        let mut args = command.args.clone();
        args.extend([
            "--model".to_string(),
            config.model.to_string(),
            "--energy-threshold".to_string(),
            config.energy_threshold.to_string(),
            "--record-timeout".to_string(),
            format_seconds(config.record_timeout),
            "--phrase-timeout".to_string(),
            format_seconds(config.phrase_timeout),
            "--mic-index".to_string(),
            config.mic_index.to_string(),
        ]);

        Self {
            program: command.program.clone(),
            args,
            working_dir: command.working_dir.clone(),
        }
    }
}

impl fmt::Display for WorkerInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Seconds with at least one decimal place (`3.0`, not `3`)
pub fn format_seconds(value: f64) -> String {
    format!("{:?}", value)
}
