//! Job scheduler module.
//!
//! Runs a batch of conversions through a fixed pool of slots. A single
//! control loop sweeps the slots, starts pending work in idle ones and
//! finalizes processes that stopped running, sleeping a short interval
//! between sweeps. One item failing never stops the batch.
//!
//! # Example
//!
//! ```ignore
//! use transpack_core::runner::{CommandTemplate, ShellRunner};
//! use transpack_core::scheduler::{JobScheduler, SchedulerConfig, WorkItem};
//!
//! let template = CommandTemplate::new("ffmpeg -i {0} -acodec alac {1}");
//! let items = vec![
//!     WorkItem::new("01.flac", "out/01.m4a", template.clone()),
//!     WorkItem::new("02.flac", "out/02.m4a", template),
//! ];
//!
//! let scheduler = JobScheduler::new(ShellRunner::new(), SchedulerConfig::with_pool_size(2));
//! let result = scheduler.run(items).await?;
//! for failure in &result.failures {
//!     eprintln!("{}: {}", failure.item.source.display(), failure.diagnostic);
//! }
//! ```

mod config;
mod error;
#[allow(clippy::module_inception)]
mod scheduler;
mod types;

pub use config::SchedulerConfig;
pub use error::SchedulerError;
pub use scheduler::JobScheduler;
pub use types::{BatchResult, FailureKind, ItemFailure, WorkItem};
