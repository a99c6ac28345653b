//! Static tag reader for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::tags::{TagReader, TrackTags};

/// Tag reader returning fixed tags, optionally per file.
#[derive(Debug, Clone, Default)]
pub struct StaticTagReader {
    default: TrackTags,
    by_path: HashMap<PathBuf, TrackTags>,
    reads: Arc<Mutex<Vec<PathBuf>>>,
}

impl StaticTagReader {
    /// Returns `tags` for every file.
    pub fn new(tags: TrackTags) -> Self {
        Self {
            default: tags,
            ..Default::default()
        }
    }

    /// Returns `tags` for `path` only.
    pub fn with_file(mut self, path: impl Into<PathBuf>, tags: TrackTags) -> Self {
        self.by_path.insert(path.into(), tags);
        self
    }

    /// Files that were read, in order.
    pub fn reads(&self) -> Vec<PathBuf> {
        match self.reads.lock() {
            Ok(reads) => reads.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl TagReader for StaticTagReader {
    async fn read_tags(&self, path: &Path) -> TrackTags {
        match self.reads.lock() {
            Ok(mut reads) => reads.push(path.to_path_buf()),
            Err(poisoned) => poisoned.into_inner().push(path.to_path_buf()),
        }
        self.by_path
            .get(path)
            .cloned()
            .unwrap_or_else(|| self.default.clone())
    }
}
