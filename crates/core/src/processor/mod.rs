//! Album processor module.
//!
//! Ties the album, scheduler and torrent modules together for a run over
//! several albums. All run state lives in an [`AlbumProcessor`]; every
//! problem is recorded as an [`ErrorKind`](crate::ErrorKind) and processing
//! continues with the next format or album.
//!
//! # Example
//!
//! ```ignore
//! use transpack_core::processor::{AlbumProcessor, RunOptions};
//! use transpack_core::runner::ShellRunner;
//! use transpack_core::tags::FfprobeTagReader;
//!
//! let processor = AlbumProcessor::new(
//!     config,
//!     RunOptions::default(),
//!     ShellRunner::new(),
//!     FfprobeTagReader::default(),
//! );
//! let errors = processor.process(&albums).await;
//! std::process::exit(errors.bits() as i32);
//! ```

mod options;
#[allow(clippy::module_inception)]
mod processor;

pub use options::RunOptions;
pub use processor::AlbumProcessor;
