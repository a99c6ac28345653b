//! Command line arguments.

use clap::{ArgAction, Parser};
use std::path::PathBuf;

use transpack_core::{Config, RunOptions, TorrentMode};

/// Transcode albums and create torrents in one command.
///
/// Defaults come from the configuration file; every flag given here
/// overrides it for this run.
#[derive(Debug, Parser)]
#[command(name = "transpack", version, about)]
pub struct Cli {
    /// The albums to process
    #[arg(required = true)]
    pub albums: Vec<PathBuf>,

    /// The torrent announce URL to use
    #[arg(short = 'a', long)]
    pub announce: Option<String>,

    /// Transcode the given albums into other formats
    #[arg(short = 't', long, conflicts_with = "no_transcode")]
    pub transcode: bool,

    /// Ensure the given albums are NOT transcoded
    #[arg(short = 'T', long)]
    pub no_transcode: bool,

    /// Create torrents of transcoded albums; give twice (-mm) to also
    /// create one of the source album
    #[arg(short = 'm', long = "make-torrent", action = ArgAction::Count, conflicts_with = "no_torrent")]
    pub make_torrent: u8,

    /// Ensure no .torrent files are created
    #[arg(short = 'M', long)]
    pub no_torrent: bool,

    /// Comma separated formats to transcode to (16-48,16-44,alac,320,v0,v1,v2)
    #[arg(short = 'f', long)]
    pub formats: Option<String>,

    /// Prefix added to transcode directories and .torrent files
    #[arg(short = 'p', long)]
    pub prefix: Option<String>,

    /// Prefixes removed from the start of transcode directories and
    /// .torrent files, before the prefix is added
    #[arg(short = 'x', long, num_args = 0..)]
    pub snip_prefixes: Option<Vec<String>>,

    /// Source embedded in created torrents (e.g. "RED")
    #[arg(short = 's', long)]
    pub source: Option<String>,

    /// Number of encoders to run at once; below 1 means one per CPU core
    #[arg(short = 'c', long, allow_negative_numbers = true)]
    pub cores: Option<i64>,

    /// Directory to store created .torrent files in
    #[arg(short = 'o', long)]
    pub torrent_output: Option<PathBuf>,

    /// Directory to store transcoded albums in
    #[arg(short = 'O', long)]
    pub transcode_output: Option<PathBuf>,

    /// Configuration file (default: $TRANSPACK_CONFIG)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write Prometheus metrics to this file when done
    #[arg(long)]
    pub metrics_file: Option<PathBuf>,

    /// Log debug output
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl Cli {
    /// Applies the flags on top of `config` and returns what was explicitly
    /// requested.
    pub fn apply(&self, config: &mut Config) -> RunOptions {
        if let Some(announce) = &self.announce {
            config.torrent.announce = announce.clone();
        }

        if self.transcode {
            config.transcode.enabled = true;
        } else if self.no_transcode {
            config.transcode.enabled = false;
        }

        if self.no_torrent {
            config.torrent.mode = TorrentMode::None;
        } else if self.make_torrent >= 2 {
            config.torrent.mode = TorrentMode::All;
        } else if self.make_torrent == 1 {
            config.torrent.mode = TorrentMode::Transcodes;
        }

        if let Some(formats) = &self.formats {
            config.transcode.formats = formats
                .split(',')
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty())
                .collect();
        }
        if let Some(prefix) = &self.prefix {
            config.naming.prefix = prefix.clone();
        }
        if let Some(snip) = &self.snip_prefixes {
            config.naming.snip_prefixes = snip.clone();
        }
        if let Some(source) = &self.source {
            config.torrent.source = Some(source.clone());
        }
        if let Some(cores) = self.cores {
            config.transcode.max_parallel = usize::try_from(cores).unwrap_or(0);
        }
        if let Some(dir) = &self.torrent_output {
            config.output.torrent_dir = dir.clone();
        }
        if let Some(dir) = &self.transcode_output {
            config.output.transcode_dir = dir.clone();
        }

        RunOptions {
            explicit_transcode: self.transcode,
            explicit_torrent: self.make_torrent > 0,
        }
    }

    /// Config file from the flag, else the environment.
    pub fn config_path(&self) -> Option<PathBuf> {
        self.config
            .clone()
            .or_else(|| std::env::var_os("TRANSPACK_CONFIG").map(PathBuf::from))
    }
}
