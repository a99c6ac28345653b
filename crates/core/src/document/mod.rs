//! Document store for bencoded files.
//!
//! Loads a whole `.torrent`-style file into memory, lets callers read and
//! replace fields by key path, and writes the result back atomically.
//!
//! # Example
//!
//! ```ignore
//! use transpack_core::document::Document;
//!
//! let mut doc = Document::load("album.torrent").await?;
//! doc.set_path(&["info", "source"], "RED")?;
//! doc.save().await?;
//! ```

mod error;
mod store;

pub use error::DocumentError;
pub use store::Document;
