use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use thiserror::Error;

pub const ENERGY_THRESHOLD_RANGE: RangeInclusive<i64> = 100..=500;
pub const RECORD_TIMEOUT_RANGE: RangeInclusive<f64> = 1.0..=10.0;
pub const PHRASE_TIMEOUT_RANGE: RangeInclusive<f64> = 5.0..=30.0;

/// Whisper model size handed to the worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WhisperModel {
    Tiny,
    Base,
    Small,
    Medium,
}

impl WhisperModel {
    pub const ALL: [WhisperModel; 4] = [Self::Tiny, Self::Base, Self::Small, Self::Medium];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tiny => "tiny",
            Self::Base => "base",
            Self::Small => "small",
            Self::Medium => "medium",
        }
    }
}

impl fmt::Display for WhisperModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WhisperModel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|model| model.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownModel(s.to_string()))
    }
}

/// A session config value that failed validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unknown model '{0}' (expected one of: tiny, base, small, medium)")]
    UnknownModel(String),

    #[error("{field} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: String,
        min: String,
        max: String,
    },

    #[error("mic_index must be >= 0, got {0}")]
    NegativeMicIndex(i64),
}

/// Configuration for one transcription session.
///
/// Frozen once the session starts. Fields are public, so the controller
/// calls [`SessionConfig::validate`] again before launching anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Whisper model size
    pub model: WhisperModel,

    /// Microphone energy level below which audio counts as silence
    pub energy_threshold: i64,

    /// Seconds of audio per recording slice
    pub record_timeout: f64,

    /// Seconds of silence that end a phrase
    pub phrase_timeout: f64,

    /// Index into the microphone directory
    pub mic_index: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            model: WhisperModel::Tiny,
            energy_threshold: 300,
            record_timeout: 3.0,
            phrase_timeout: 15.0,
            mic_index: 0,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !ENERGY_THRESHOLD_RANGE.contains(&self.energy_threshold) {
            return Err(ConfigError::OutOfRange {
                field: "energy_threshold",
                value: self.energy_threshold.to_string(),
                min: ENERGY_THRESHOLD_RANGE.start().to_string(),
                max: ENERGY_THRESHOLD_RANGE.end().to_string(),
            });
        }

        check_seconds("record_timeout", self.record_timeout, &RECORD_TIMEOUT_RANGE)?;
        check_seconds("phrase_timeout", self.phrase_timeout, &PHRASE_TIMEOUT_RANGE)?;

        if self.mic_index < 0 {
            return Err(ConfigError::NegativeMicIndex(self.mic_index));
        }

        Ok(())
    }
}

// NaN fails `contains`, so non-finite values are rejected here too
fn check_seconds(
    field: &'static str,
    value: f64,
    range: &RangeInclusive<f64>,
) -> Result<(), ConfigError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value: value.to_string(),
            min: format!("{:?}", range.start()),
            max: format!("{:?}", range.end()),
        })
    }
}

/// Untyped session settings as they arrive from a caller (HTTP body, CLI).
///
/// Missing fields fall back to the supplied defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionRequest {
    pub model: Option<String>,
    pub energy_threshold: Option<i64>,
    pub record_timeout: Option<f64>,
    pub phrase_timeout: Option<f64>,
    pub mic_index: Option<i64>,
}

impl SessionRequest {
    /// Fill gaps from `defaults` and validate the result
    pub fn resolve(self, defaults: &SessionConfig) -> Result<SessionConfig, ConfigError> {
        let model = match self.model {
            Some(name) => name.trim().to_ascii_lowercase().parse()?,
            None => defaults.model,
        };

        let config = SessionConfig {
            model,
            energy_threshold: self.energy_threshold.unwrap_or(defaults.energy_threshold),
            record_timeout: self.record_timeout.unwrap_or(defaults.record_timeout),
            phrase_timeout: self.phrase_timeout.unwrap_or(defaults.phrase_timeout),
            mic_index: self.mic_index.unwrap_or(defaults.mic_index),
        };

        config.validate()?;
        Ok(config)
    }
}
