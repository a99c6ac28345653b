//! Track tag extraction.
//!
//! Tags feed the `{2}`..`{6}` placeholders of encoder commands so lossy
//! outputs carry the same title/artist/album/date/track as their source.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

/// Errors from probing a file for tags.
#[derive(Debug, Error)]
pub enum TagError {
    #[error("Failed to run {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with status {status}")]
    Failed { program: String, status: String },

    #[error("Failed to parse probe output: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tags of one track. Missing tags are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackTags {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub date: String,
    /// Track number, `n/total` when the total is known.
    pub track: String,
}

impl TrackTags {
    /// Values in placeholder order `{2}`..`{6}`.
    pub fn into_args(self) -> Vec<String> {
        vec![self.title, self.artist, self.album, self.date, self.track]
    }

    /// Builds tags from a raw key/value map; keys match case-insensitively.
    pub fn from_raw(raw: &HashMap<String, String>) -> Self {
        let tags: HashMap<String, &str> = raw
            .iter()
            .map(|(k, v)| (k.to_lowercase(), v.as_str()))
            .collect();
        let get = |key: &str| tags.get(key).map(|v| v.to_string()).unwrap_or_default();

        let mut track = get("track");
        let total = get("tracktotal");
        if !track.is_empty() && !total.is_empty() {
            track = format!("{track}/{total}");
        }

        Self {
            title: get("title"),
            artist: get("artist"),
            album: get("album"),
            date: get("date"),
            track,
        }
    }
}

/// Reads tags from audio files.
#[async_trait]
pub trait TagReader: Send + Sync {
    /// Tags of `path`. Never fails; unreadable files yield empty tags.
    async fn read_tags(&self, path: &Path) -> TrackTags;
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    #[serde(default)]
    tags: HashMap<String, String>,
}

/// Parses `ffprobe -print_format json -show_format` output.
pub fn parse_probe_output(json: &[u8]) -> Result<TrackTags, TagError> {
    let output: ProbeOutput = serde_json::from_slice(json)?;
    Ok(output
        .format
        .map(|f| TrackTags::from_raw(&f.tags))
        .unwrap_or_default())
}

/// Tag reader backed by `ffprobe`.
#[derive(Debug, Clone)]
pub struct FfprobeTagReader {
    program: PathBuf,
}

impl FfprobeTagReader {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Runs the probe, reporting every failure.
    pub async fn probe(&self, path: &Path) -> Result<TrackTags, TagError> {
        let program = self.program.display().to_string();
        let output = Command::new(&self.program)
            .args(["-v", "0", "-print_format", "json", "-show_format"])
            .arg(path)
            .stdin(std::process::Stdio::null())
            .output()
            .await
            .map_err(|source| TagError::Launch {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(TagError::Failed {
                program,
                status: output.status.to_string(),
            });
        }
        parse_probe_output(&output.stdout)
    }
}

impl Default for FfprobeTagReader {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

#[async_trait]
impl TagReader for FfprobeTagReader {
    async fn read_tags(&self, path: &Path) -> TrackTags {
        match self.probe(path).await {
            Ok(tags) => {
                debug!(file = %path.display(), ?tags, "Read tags");
                tags
            }
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Could not read tags, continuing without them");
                TrackTags::default()
            }
        }
    }
}
