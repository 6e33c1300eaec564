use crate::microphone::MicrophoneSettings;
use crate::session::SessionConfig;
use crate::worker::WorkerCommand;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Default config file, relative to the working directory (extension optional)
pub const DEFAULT_CONFIG_PATH: &str = "config/whisper-control";

/// Prefix for environment overrides, e.g. `WHISPER_CONTROL__SERVICE__HTTP__PORT=9000`
pub const ENV_PREFIX: &str = "WHISPER_CONTROL";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub worker: WorkerCommand,
    pub transcript: TranscriptConfig,
    pub session: SessionSettings,
    pub microphones: MicrophoneSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "whisper-control".to_string(),
            http: HttpConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8501,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TranscriptConfig {
    /// File the worker writes the live transcript to
    pub artifact_path: PathBuf,

    /// Time between transcript refreshes
    pub poll_interval_ms: u64,
}

impl TranscriptConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            artifact_path: PathBuf::from("transcription_output.txt"),
            poll_interval_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// How long "Transcription stopped!" stays visible after a stop
    pub stop_notice_ms: u64,

    /// Close the session when the worker exits by itself
    pub reap_exited_worker: bool,

    /// Values used for any setting a start request leaves out
    pub defaults: SessionConfig,
}

impl SessionSettings {
    pub fn stop_notice(&self) -> Duration {
        Duration::from_millis(self.stop_notice_ms)
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            stop_notice_ms: 2000,
            reap_exited_worker: false,
            defaults: SessionConfig::default(),
        }
    }
}

impl Config {
    /// Load `path` (if present) layered under `WHISPER_CONTROL__*` env vars
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read config from {}", path))?;

        let cfg: Config = settings
            .try_deserialize()
            .context("Failed to parse config")?;

        cfg.session
            .defaults
            .validate()
            .context("Invalid [session.defaults]")?;

        Ok(cfg)
    }
}
