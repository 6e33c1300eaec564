pub mod config;
pub mod console;
pub mod http;
pub mod microphone;
pub mod session;
pub mod transcript;
pub mod worker;

pub use config::Config;
pub use http::{create_router, AppState};
pub use microphone::{Microphone, MicrophoneDirectory};
pub use session::{
    SessionConfig, SessionController, SessionError, SessionInfo, SessionRequest, SessionStatus,
    StopReport, WhisperModel,
};
pub use transcript::{DisplaySink, SharedDisplay, TickOutcome, TranscriptPoller};
pub use worker::{ProcessLauncher, WorkerCommand, WorkerInvocation, WorkerLauncher, WorkerProcess};
