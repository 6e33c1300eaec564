//! Microphone directory
//!
//! The worker selects its input device by index. The names behind those
//! indices come from an external lookup: either a fixed list from the
//! config file or the output of a listing command (one name per line).

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use tokio::process::Command;
use tracing::info;

/// One selectable input device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Microphone {
    /// Value passed to the worker as `--mic-index`
    pub index: usize,
    /// Human-readable device name
    pub name: String,
}

/// Ordered list of microphones
#[async_trait]
pub trait MicrophoneDirectory: Send + Sync {
    async fn list(&self) -> Result<Vec<Microphone>>;
}

/// Microphone settings from the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MicrophoneSettings {
    /// Fixed device names, in index order
    pub names: Vec<String>,

    /// Command whose stdout lists device names; takes precedence over `names`
    pub list_command: Option<Vec<String>>,
}

impl Default for MicrophoneSettings {
    fn default() -> Self {
        Self {
            names: vec!["default".to_string()],
            list_command: None,
        }
    }
}

/// Directory backed by a fixed list of names
#[derive(Debug, Clone)]
pub struct StaticMicrophones {
    names: Vec<String>,
}

impl StaticMicrophones {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }
}

#[async_trait]
impl MicrophoneDirectory for StaticMicrophones {
    async fn list(&self) -> Result<Vec<Microphone>> {
        Ok(indexed(self.names.iter().cloned()))
    }
}

/// Directory backed by an external listing command
#[derive(Debug, Clone)]
pub struct CommandMicrophones {
    program: String,
    args: Vec<String>,
}

impl CommandMicrophones {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

#[async_trait]
impl MicrophoneDirectory for CommandMicrophones {
    async fn list(&self) -> Result<Vec<Microphone>> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .output()
            .await
            .with_context(|| format!("Failed to run microphone lister '{}'", self.program))?;

        if !output.status.success() {
            bail!(
                "Microphone lister '{}' failed ({}): {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let stdout = String::from_utf8(output.stdout)
            .context("Microphone lister produced non-UTF-8 output")?;
        let microphones = parse_listing(&stdout);

        info!("Found {} microphone(s) via {}", microphones.len(), self.program);

        Ok(microphones)
    }
}

/// Build the directory described by the config
pub fn from_settings(settings: &MicrophoneSettings) -> Box<dyn MicrophoneDirectory> {
    match settings.list_command.as_deref() {
        Some([program, args @ ..]) => {
            Box::new(CommandMicrophones::new(program.clone(), args.to_vec()))
        }
        _ => Box::new(StaticMicrophones::new(settings.names.clone())),
    }
}

/// Non-empty lines, in order, become device names
pub fn parse_listing(listing: &str) -> Vec<Microphone> {
    indexed(
        listing
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string),
    )
}

fn indexed(names: impl Iterator<Item = String>) -> Vec<Microphone> {
    names
        .enumerate()
        .map(|(index, name)| Microphone { index, name })
        .collect()
}
