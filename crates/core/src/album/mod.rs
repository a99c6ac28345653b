//! Album module.
//!
//! Everything needed to turn a source album directory into the inputs of a
//! transcode batch: classifying its files, enforcing the transcode rules,
//! naming and populating the output directory, and building work items.
//!
//! # Example
//!
//! ```ignore
//! use transpack_core::album::{self, AlbumContents};
//! use transpack_core::formats::Format;
//!
//! let contents = album::enumerate_contents(src)?;
//! album::check_transcode_allowed(&contents, false)?;
//!
//! let name = album::transcode_dir_name(src, Format::Mp3V0, "", &[]);
//! let dst = output_dir.join(name);
//! album::copy_contents(src, &dst, &contents).await?;
//! let items = album::build_work_items(src, &dst, &contents, Format::Mp3V0, &tag_reader).await;
//! ```

mod contents;
mod copy;
mod error;
mod naming;

pub use contents::{
    check_album_dir, check_transcode_allowed, enumerate_contents, AlbumContents, LOSSLESS_EXTENSIONS,
    LOSSY_EXTENSIONS,
};
pub use copy::{build_work_items, copy_contents};
pub use error::AlbumError;
pub use naming::{strip_prefix, torrent_file_name, transcode_dir_name};
