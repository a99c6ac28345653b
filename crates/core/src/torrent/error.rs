//! Error types for the torrent module.

use thiserror::Error;

use crate::document::DocumentError;
use crate::outcome::ErrorKind;
use crate::runner::{RunnerError, TemplateError};

/// Errors that can occur while creating a torrent file.
#[derive(Debug, Error)]
pub enum TorrentError {
    /// None of the known torrent creation tools is installed.
    #[error("No torrent client found")]
    NoClient,

    /// The client command could not be rendered.
    #[error("Invalid torrent command: {0}")]
    Template(#[from] TemplateError),

    /// The client could not be started or supervised.
    #[error("Failed to run torrent client: {0}")]
    Runner(#[from] RunnerError),

    /// The client exited with a failure status.
    #[error("Torrent client exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    /// Embedding the source tag into the created file failed.
    #[error("Failed to set torrent source: {0}")]
    Source(#[from] DocumentError),
}

impl TorrentError {
    /// The exit-status category of this error.
    pub fn error_kind(&self) -> ErrorKind {
        match self {
            Self::NoClient => ErrorKind::NoTorrentClient,
            _ => ErrorKind::TorrentError,
        }
    }

    /// Label used for the `result` metric dimension.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoClient => "no_client",
            Self::Source(_) => "source_failed",
            _ => "failed",
        }
    }
}
