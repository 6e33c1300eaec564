//! External transcription worker
//!
//! The worker is a separate OS process that records audio, runs Whisper and
//! writes the transcript to a shared text file. This module only knows how
//! to build its command line and how to launch and signal it:
//! - `WorkerCommand` - configured program and leading arguments
//! - `WorkerInvocation` - full command line for one session
//! - `WorkerLauncher` / `WorkerProcess` - spawn and terminate seams

mod invocation;
mod process;

pub use invocation::{format_seconds, WorkerCommand, WorkerInvocation};
pub use process::{LaunchError, ProcessLauncher, WorkerLauncher, WorkerProcess};
