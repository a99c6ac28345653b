//! Torrent module.
//!
//! Creates `.torrent` files with whichever supported client is installed
//! and stamps an optional source tag into them so the uploaded file does
//! not have to be downloaded again.

mod error;
mod maker;

pub use error::TorrentError;
pub use maker::{discover_client, TorrentMaker, CLIENT_COMMANDS};
