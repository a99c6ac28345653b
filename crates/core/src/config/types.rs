use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::scheduler::SchedulerConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub transcode: TranscodeConfig,
    #[serde(default)]
    pub naming: NamingConfig,
    #[serde(default)]
    pub torrent: TorrentConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
}

impl Config {
    /// Scheduler settings derived from the transcode section.
    pub fn scheduler_config(&self) -> SchedulerConfig {
        let config = SchedulerConfig::default().with_poll_interval_ms(self.transcode.poll_interval_ms);
        match self.transcode.max_parallel {
            0 => config,
            n => SchedulerConfig {
                pool_size: n,
                ..config
            },
        }
    }
}

/// Output locations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Where created .torrent files go
    #[serde(default = "default_dir")]
    pub torrent_dir: PathBuf,
    /// Where transcoded albums go
    #[serde(default = "default_dir")]
    pub transcode_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            torrent_dir: default_dir(),
            transcode_dir: default_dir(),
        }
    }
}

fn default_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Transcoding configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranscodeConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Target format names (e.g. "320", "v0")
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,
    /// Concurrent encoders; 0 means one per CPU
    #[serde(default)]
    pub max_parallel: usize,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            formats: default_formats(),
            max_parallel: 0,
            poll_interval_ms: default_poll_interval(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_formats() -> Vec<String> {
    vec!["320".to_string(), "v0".to_string()]
}

fn default_poll_interval() -> u64 {
    50
}

/// Output naming configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NamingConfig {
    /// Prepended to transcode directories and torrent files
    #[serde(default)]
    pub prefix: String,
    /// Removed from the start of transcode directory names (first match wins)
    #[serde(default)]
    pub snip_prefixes: Vec<String>,
}

/// Which torrents to create
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TorrentMode {
    None,
    #[default]
    Transcodes,
    /// Transcodes and the original album
    All,
}

/// Torrent configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TorrentConfig {
    #[serde(default)]
    pub mode: TorrentMode,
    /// Tracker announce URL
    #[serde(default)]
    pub announce: String,
    /// Written to `info.source` of created torrents
    #[serde(default)]
    pub source: Option<String>,
}

/// External tool locations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default = "default_ffprobe")]
    pub ffprobe_path: PathBuf,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffprobe_path: default_ffprobe(),
        }
    }
}

fn default_ffprobe() -> PathBuf {
    PathBuf::from("ffprobe")
}
