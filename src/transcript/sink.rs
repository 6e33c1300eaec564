use async_trait::async_trait;
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Display target for transcript text and a one-line status indicator
#[async_trait]
pub trait DisplaySink: Send {
    /// Replace the displayed transcript with `content`
    async fn set_text(&mut self, content: &str);

    /// Replace the secondary status line
    async fn set_status(&mut self, status: &str);
}

/// Most recently displayed transcript and status line; no history
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DisplayBuffer {
    pub content: String,
    pub status_line: String,
}

/// Display buffer shared between the poller and readers (HTTP handlers)
#[derive(Debug, Clone, Default)]
pub struct SharedDisplay {
    buffer: Arc<RwLock<DisplayBuffer>>,
}

impl SharedDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> DisplayBuffer {
        self.buffer.read().await.clone()
    }
}

#[async_trait]
impl DisplaySink for SharedDisplay {
    async fn set_text(&mut self, content: &str) {
        let mut buffer = self.buffer.write().await;
        buffer.content.clear();
        buffer.content.push_str(content);
    }

    async fn set_status(&mut self, status: &str) {
        let mut buffer = self.buffer.write().await;
        buffer.status_line.clear();
        buffer.status_line.push_str(status);
    }
}

/// Renders the transcript to a terminal.
///
/// The transcript is reprinted only when it changes; the status line is
/// redrawn in place.
pub struct TerminalSink<W: Write + Send> {
    out: W,
    last_text: Option<String>,
}

impl TerminalSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            last_text: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[async_trait]
impl<W: Write + Send> DisplaySink for TerminalSink<W> {
    async fn set_text(&mut self, content: &str) {
        if self.last_text.as_deref() == Some(content) {
            return;
        }

        write!(self.out, "\n### Transcription\n{}\n", content).ok();
        self.out.flush().ok();
        self.last_text = Some(content.to_string());
    }

    // Erase the whole line first; a shorter status would leave a tail behind
    async fn set_status(&mut self, status: &str) {
        write!(self.out, "\r\x1b[2K{}", status).ok();
        self.out.flush().ok();
    }
}
