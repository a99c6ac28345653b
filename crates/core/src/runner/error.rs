//! Error types for the runner module.

use thiserror::Error;

/// Errors that can occur while launching or querying a process.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The command could not be launched at all.
    #[error("Cannot launch '{program}': {reason}")]
    Launch { program: String, reason: String },

    /// Querying the process failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RunnerError {
    /// Creates a new launch error.
    pub fn launch(program: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Launch {
            program: program.into(),
            reason: reason.into(),
        }
    }
}
