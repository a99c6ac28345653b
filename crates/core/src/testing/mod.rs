//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the process runner and tag
//! reader traits, allowing album processing to be tested without encoders
//! or torrent clients installed.
//!
//! # Example
//!
//! ```rust,ignore
//! use transpack_core::testing::{MockRunner, MockScript, StaticTagReader};
//!
//! let runner = MockRunner::new();
//! runner.script("02.flac", MockScript::failing(1, "decode error"));
//!
//! let tags = StaticTagReader::new(TrackTags::default());
//! let processor = AlbumProcessor::new(config, options, runner.clone(), tags);
//! let errors = processor.process(&albums).await;
//! ```

mod mock_runner;
mod mock_tags;

pub use mock_runner::{MockEvent, MockHandle, MockRunner, MockScript};
pub use mock_tags::StaticTagReader;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::{Path, PathBuf};

    use crate::bencode::{encode_document, Dict, Value};

    /// Bytes of a minimal single-file torrent named `name`.
    pub fn torrent_bytes(name: &str) -> Vec<u8> {
        let mut info = Dict::new();
        info.insert("length".into(), Value::from(1024_i64));
        info.insert("name".into(), Value::from(name));
        info.insert("piece length".into(), Value::from(262_144_i64));
        info.insert("pieces".into(), Value::from(vec![0u8; 20]));
        info.insert("private".into(), Value::from(1_i64));

        let mut root = Dict::new();
        root.insert("announce".into(), Value::from("https://tracker.example/announce"));
        root.insert("created by".into(), Value::from("transpack tests"));
        root.insert("info".into(), Value::Dict(info));
        encode_document(&root)
    }

    /// Creates an album directory under `parent` containing `files`
    /// (relative paths, parents created as needed).
    pub fn album(parent: &Path, name: &str, files: &[&str]) -> PathBuf {
        let dir = parent.join(name);
        std::fs::create_dir_all(&dir).expect("create album dir");
        for file in files {
            let path = dir.join(file);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).expect("create album subdir");
            }
            std::fs::write(&path, format!("contents of {file}")).expect("write album file");
        }
        dir
    }
}
