//! Process runner module.
//!
//! Launches external command lines with captured stdout/stderr and exposes a
//! non-blocking status query, so a single control loop can supervise many
//! encoders at once.
//!
//! # Example
//!
//! ```ignore
//! use transpack_core::runner::{CommandTemplate, ProcessHandle, ProcessRunner, ShellRunner};
//!
//! let template = CommandTemplate::new("ffmpeg -i {0} -acodec alac {1}");
//! let line = template.render(&["in.flac", "out.m4a"])?;
//!
//! let runner = ShellRunner::new();
//! let mut handle = runner.start(&line)?;
//! while handle.poll()?.is_running() {
//!     tokio::time::sleep(Duration::from_millis(50)).await;
//! }
//! let stderr = handle.collect_stderr().await;
//! ```

mod error;
mod shell;
mod template;
mod traits;
mod types;

pub use error::RunnerError;
pub use shell::{ShellHandle, ShellRunner};
pub use template::{quote, which, CommandLine, CommandTemplate, TemplateError};
pub use traits::{wait_for_exit, ProcessHandle, ProcessRunner};
pub use types::ProcessStatus;
