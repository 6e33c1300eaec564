use std::io;
use std::path::Path;
use std::string::FromUtf8Error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read transcript file: {0}")]
    Io(#[from] io::Error),

    #[error("transcript file is not valid UTF-8: {0}")]
    Encoding(#[from] FromUtf8Error),
}

/// Read the whole transcript file as written by the worker.
///
/// A missing file means the worker has not written anything yet and reads
/// as an empty string. Content is returned untouched. There is no locking
/// against the writer, so a read racing a write may see a partial file;
/// the next read picks up the complete one.
pub async fn read_artifact(path: &Path) -> Result<String, ArtifactError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(String::from_utf8(bytes)?),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e.into()),
    }
}
