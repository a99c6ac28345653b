//! Error types for the album module.

use std::path::PathBuf;
use thiserror::Error;

use crate::outcome::ErrorKind;

/// Errors that can occur while preparing an album for transcoding.
#[derive(Debug, Error)]
pub enum AlbumError {
    /// Album path does not exist.
    #[error("The directory \"{path}\" doesn't exist")]
    NotFound { path: PathBuf },

    /// Album path is not a directory.
    #[error("\"{path}\" is not a directory")]
    NotADirectory { path: PathBuf },

    /// Only lossy audio, which must never be transcoded again.
    #[error("Cannot transcode lossy formats")]
    LossyOnly,

    /// Lossy and lossless audio mixed without an explicit request.
    #[error("Found mixed lossy and lossless, transcoding must be explicitly enabled")]
    MixedLossy,

    /// No lossless audio at all.
    #[error("Nothing to transcode")]
    NothingToTranscode,

    /// Walking the album directory failed.
    #[error("Failed to read {path}: {reason}")]
    Walk { path: PathBuf, reason: String },

    /// Failed to create an output directory.
    #[error("Failed to create directory: {path}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to copy a file into the output directory.
    #[error("Failed to copy file from {source} to {destination}")]
    CopyFailed {
        source: PathBuf,
        destination: PathBuf,
        #[source]
        error: std::io::Error,
    },
}

impl AlbumError {
    /// Creates a copy failed error.
    pub fn copy_failed(source: PathBuf, destination: PathBuf, error: std::io::Error) -> Self {
        Self::CopyFailed {
            source,
            destination,
            error,
        }
    }

    /// The exit-status category of this error.
    pub fn error_kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::FileNotFound,
            Self::NotADirectory { .. } => ErrorKind::ArgNotDirectory,
            Self::LossyOnly | Self::MixedLossy | Self::NothingToTranscode => {
                ErrorKind::TranscodeAgainstRules
            }
            Self::Walk { .. } | Self::DirectoryCreationFailed { .. } | Self::CopyFailed { .. } => {
                ErrorKind::TranscodeError
            }
        }
    }
}
