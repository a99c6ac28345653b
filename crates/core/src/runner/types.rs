//! Types for the runner module.

use std::fmt;

/// Status of a launched process as seen by a non-blocking poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    /// Still running.
    Running,
    /// Exited with code zero.
    ExitedOk,
    /// Exited with a non-zero code, or was killed by a signal (`None`).
    ExitedError(Option<i32>),
}

impl ProcessStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::ExitedOk)
    }
}

impl From<std::process::ExitStatus> for ProcessStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        if status.success() {
            Self::ExitedOk
        } else {
            Self::ExitedError(status.code())
        }
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::ExitedOk => write!(f, "exited with code 0"),
            Self::ExitedError(Some(code)) => write!(f, "exited with code {}", code),
            Self::ExitedError(None) => write!(f, "terminated by signal"),
        }
    }
}
