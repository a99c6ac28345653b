//! Trait definitions for the runner module.

use async_trait::async_trait;
use std::time::Duration;

use super::error::RunnerError;
use super::template::{which, CommandLine};
use super::types::ProcessStatus;

/// Launches external command lines.
pub trait ProcessRunner: Send + Sync {
    /// Handle type for a launched process.
    type Handle: ProcessHandle;

    /// Returns the name of this runner implementation.
    fn name(&self) -> &str;

    /// Whether `program` can be launched by this runner.
    fn is_available(&self, program: &str) -> bool {
        which(program).is_some()
    }

    /// Starts `command` with stdout and stderr captured.
    ///
    /// Fails with [`RunnerError::Launch`] if any program in the command
    /// cannot be found or the process cannot be spawned.
    fn start(&self, command: &CommandLine) -> Result<Self::Handle, RunnerError>;
}

/// A launched process.
#[async_trait]
pub trait ProcessHandle: Send {
    /// OS process id, if still known.
    fn id(&self) -> Option<u32>;

    /// Non-blocking status query.
    fn poll(&mut self) -> Result<ProcessStatus, RunnerError>;

    /// Best-effort termination. Errors (e.g. already exited) are swallowed.
    fn kill(&mut self);

    /// Captured stderr. Meant to be called once the process is not running.
    async fn collect_stderr(&mut self) -> Vec<u8>;

    /// Captured stdout. Meant to be called once the process is not running.
    async fn collect_stdout(&mut self) -> Vec<u8>;
}

/// Polls `handle` every `interval` until it stops running.
pub async fn wait_for_exit<H: ProcessHandle + ?Sized>(
    handle: &mut H,
    interval: Duration,
) -> Result<ProcessStatus, RunnerError> {
    loop {
        let status = handle.poll()?;
        if !status.is_running() {
            return Ok(status);
        }
        tokio::time::sleep(interval).await;
    }
}
