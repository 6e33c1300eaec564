//! Transcript display loop
//!
//! The worker overwrites a shared text file as it transcribes. This module
//! samples that file on a fixed cadence and pushes it to a display sink:
//! - `read_artifact` - whole-file read, missing file reads as empty
//! - `TranscriptPoller` - status-gated sampling loop
//! - `DisplaySink` - where the text goes (shared buffer, terminal)

mod artifact;
mod poller;
mod sink;

pub use artifact::{read_artifact, ArtifactError};
pub use poller::{TickOutcome, TranscriptPoller, DEFAULT_POLL_INTERVAL};
pub use sink::{DisplayBuffer, DisplaySink, SharedDisplay, TerminalSink};
