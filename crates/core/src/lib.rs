pub mod album;
pub mod bencode;
pub mod config;
pub mod document;
pub mod formats;
pub mod metrics;
pub mod outcome;
pub mod processor;
pub mod runner;
pub mod scheduler;
pub mod tags;
pub mod testing;
pub mod torrent;

pub use album::{AlbumContents, AlbumError};
pub use bencode::{decode, decode_document, encode, encode_document, ByteString, CodecError, Dict, Value};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, TorrentMode,
};
pub use document::{Document, DocumentError};
pub use formats::{Format, UnknownFormat};
pub use outcome::{ErrorKind, ErrorSet};
pub use processor::{AlbumProcessor, RunOptions};
pub use runner::{
    CommandLine, CommandTemplate, ProcessHandle, ProcessRunner, ProcessStatus, RunnerError,
    ShellRunner, TemplateError,
};
pub use scheduler::{
    BatchResult, FailureKind, ItemFailure, JobScheduler, SchedulerConfig, SchedulerError, WorkItem,
};
pub use tags::{FfprobeTagReader, TagError, TagReader, TrackTags};
pub use torrent::{TorrentError, TorrentMaker};
