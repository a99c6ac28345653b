//! Shell-based process runner.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use super::error::RunnerError;
use super::template::CommandLine;
use super::traits::{ProcessHandle, ProcessRunner};
use super::types::ProcessStatus;

/// Runs command lines through `sh -c`.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    shell: PathBuf,
    output_grace: Duration,
}

impl ShellRunner {
    /// Creates a runner using `sh` from `PATH`.
    pub fn new() -> Self {
        Self {
            shell: PathBuf::from("sh"),
            output_grace: Duration::from_secs(5),
        }
    }

    /// Uses a different shell binary.
    pub fn with_shell(mut self, shell: impl Into<PathBuf>) -> Self {
        self.shell = shell.into();
        self
    }

    /// How long `collect_*` waits for output pipes to close after exit.
    ///
    /// A grandchild that inherited the pipe can keep it open past the exit of
    /// the shell; whatever was captured by then is returned.
    pub fn with_output_grace(mut self, grace: Duration) -> Self {
        self.output_grace = grace;
        self
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessRunner for ShellRunner {
    type Handle = ShellHandle;

    fn name(&self) -> &str {
        "shell"
    }

    fn start(&self, command: &CommandLine) -> Result<ShellHandle, RunnerError> {
        for program in command.programs() {
            if !self.is_available(program) {
                return Err(RunnerError::launch(program, "not found in PATH"));
            }
        }

        let mut child = Command::new(&self.shell)
            .arg("-c")
            .arg(command.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| RunnerError::launch(self.shell.display().to_string(), e.to_string()))?;

        trace!(pid = ?child.id(), command = %command, "Spawned process");

        let stdout = Capture::spawn(child.stdout.take());
        let stderr = Capture::spawn(child.stderr.take());

        Ok(ShellHandle {
            child,
            stdout,
            stderr,
            exited: None,
            output_grace: self.output_grace,
        })
    }
}

/// Output pipe drained in the background so the child never blocks on a
/// full pipe buffer while the scheduler is only polling.
struct Capture {
    buffer: Arc<Mutex<Vec<u8>>>,
    task: Option<JoinHandle<()>>,
}

impl Capture {
    fn spawn<R>(pipe: Option<R>) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let task = pipe.map(|mut pipe| {
            let buffer = Arc::clone(&buffer);
            tokio::spawn(async move {
                let mut chunk = [0u8; 8192];
                loop {
                    match pipe.read(&mut chunk).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => match buffer.lock() {
                            Ok(mut buf) => buf.extend_from_slice(&chunk[..n]),
                            Err(poisoned) => poisoned.into_inner().extend_from_slice(&chunk[..n]),
                        },
                    }
                }
            })
        });
        Self { buffer, task }
    }

    async fn collect(&mut self, grace: Duration) -> Vec<u8> {
        if let Some(task) = self.task.take() {
            if tokio::time::timeout(grace, task).await.is_err() {
                debug!("Output pipe still open after grace period, returning partial output");
            }
        }
        match self.buffer.lock() {
            Ok(buf) => buf.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

/// Handle to a process launched by [`ShellRunner`].
pub struct ShellHandle {
    child: Child,
    stdout: Capture,
    stderr: Capture,
    exited: Option<ProcessStatus>,
    output_grace: Duration,
}

#[async_trait]
impl ProcessHandle for ShellHandle {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    fn poll(&mut self) -> Result<ProcessStatus, RunnerError> {
        if let Some(status) = self.exited {
            return Ok(status);
        }
        match self.child.try_wait()? {
            Some(exit) => {
                let status = ProcessStatus::from(exit);
                self.exited = Some(status);
                Ok(status)
            }
            None => Ok(ProcessStatus::Running),
        }
    }

    fn kill(&mut self) {
        if let Err(e) = self.child.start_kill() {
            trace!(error = %e, "Kill ignored");
        }
    }

    async fn collect_stderr(&mut self) -> Vec<u8> {
        self.stderr.collect(self.output_grace).await
    }

    async fn collect_stdout(&mut self) -> Vec<u8> {
        self.stdout.collect(self.output_grace).await
    }
}
