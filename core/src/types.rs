use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by a byte source after it has been opened.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Read fault on the underlying file.
    #[error("read failed: {0}")]
    Io(#[from] io::Error),

    /// The producer went away without announcing end of data.
    #[error("source disconnected before end of data")]
    Disconnected,
}

impl SourceError {
    /// Copy of this error; `io::Error` itself is not `Clone`.
    pub fn duplicate(&self) -> Self {
        match self {
            SourceError::Io(e) => SourceError::Io(io::Error::new(e.kind(), e.to_string())),
            SourceError::Disconnected => SourceError::Disconnected,
        }
    }
}

/// Unified reader error covering configuration, metadata lookup, source faults and API misuse.
/// - `From<T>` impls enable `?` across the reader layers.
/// - Messages aim to be stable for logs and telemetry.
#[derive(Debug, Error)]
pub enum ReaderError {
    /// Invalid or missing construction arguments.
    #[error("configuration error: {0}")]
    Config(String),

    /// Metadata lookup found nothing at the path.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Metadata lookup failed for any other reason (permissions, not a regular file, ...).
    #[error("cannot access {}: {source}", path.display())]
    Access {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Terminal mid-stream fault raised by the byte source.
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// Operation called in the wrong session state.
    #[error("invalid state: {0}")]
    State(&'static str),
}

impl ReaderError {
    /// Classify an I/O error from the metadata lookup or open step.
    pub fn from_lookup(path: PathBuf, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => ReaderError::FileNotFound(path),
            _ => ReaderError::Access { path, source: err },
        }
    }

    /// True for errors that retire the session.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ReaderError::State(_))
    }
}
