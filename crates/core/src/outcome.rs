//! Run outcome: the set of distinct error kinds hit during a run.
//!
//! Each kind owns one bit of the process exit status so that a caller can
//! tell every kind of problem that occurred, not just the first one.

use std::collections::BTreeSet;
use std::fmt;

/// A user-visible category of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorKind {
    /// An album path does not exist.
    FileNotFound,
    /// A path that must be a directory is not one.
    ArgNotDirectory,
    /// No torrent creation tool is installed.
    NoTorrentClient,
    /// The album's contents may not be transcoded (lossy source, nothing to do).
    TranscodeAgainstRules,
    /// The transcode output directory already exists.
    TranscodeDirExists,
    /// An unknown transcode format was requested.
    UnknownTranscode,
    /// Torrents were requested without an announce URL.
    NoAnnounceUrl,
    /// An encoder program is missing or could not be launched.
    NoTranscoder,
    /// Creating or editing a torrent file failed.
    TorrentError,
    /// An encoder failed or produced missing/empty output.
    TranscodeError,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 10] = [
        Self::FileNotFound,
        Self::ArgNotDirectory,
        Self::NoTorrentClient,
        Self::TranscodeAgainstRules,
        Self::TranscodeDirExists,
        Self::UnknownTranscode,
        Self::NoAnnounceUrl,
        Self::NoTranscoder,
        Self::TorrentError,
        Self::TranscodeError,
    ];

    /// Exit status bit for this kind.
    pub fn bit(&self) -> u32 {
        match self {
            Self::FileNotFound => 1 << 0,
            Self::ArgNotDirectory => 1 << 1,
            Self::NoTorrentClient => 1 << 2,
            Self::TranscodeAgainstRules => 1 << 3,
            Self::TranscodeDirExists => 1 << 4,
            Self::UnknownTranscode => 1 << 5,
            Self::NoAnnounceUrl => 1 << 6,
            Self::NoTranscoder => 1 << 7,
            Self::TorrentError => 1 << 8,
            Self::TranscodeError => 1 << 9,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FileNotFound => "file_not_found",
            Self::ArgNotDirectory => "arg_not_directory",
            Self::NoTorrentClient => "no_torrent_client",
            Self::TranscodeAgainstRules => "transcode_against_rules",
            Self::TranscodeDirExists => "transcode_dir_exists",
            Self::UnknownTranscode => "unknown_transcode",
            Self::NoAnnounceUrl => "no_announce_url",
            Self::NoTranscoder => "no_transcoder",
            Self::TorrentError => "torrent_error",
            Self::TranscodeError => "transcode_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Distinct error kinds accumulated over a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorSet {
    kinds: BTreeSet<ErrorKind>,
}

impl ErrorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: ErrorKind) {
        self.kinds.insert(kind);
    }

    pub fn merge(&mut self, other: &ErrorSet) {
        self.kinds.extend(other.kinds.iter().copied());
    }

    pub fn contains(&self, kind: ErrorKind) -> bool {
        self.kinds.contains(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ErrorKind> + '_ {
        self.kinds.iter().copied()
    }

    /// All kinds ORed together as an exit status.
    pub fn bits(&self) -> u32 {
        self.kinds.iter().fold(0, |acc, kind| acc | kind.bit())
    }

    /// Reconstructs the set from an exit status.
    pub fn from_bits(bits: u32) -> Self {
        ErrorKind::ALL
            .iter()
            .copied()
            .filter(|kind| bits & kind.bit() != 0)
            .collect()
    }
}

impl FromIterator<ErrorKind> for ErrorSet {
    fn from_iter<I: IntoIterator<Item = ErrorKind>>(iter: I) -> Self {
        Self {
            kinds: iter.into_iter().collect(),
        }
    }
}

impl Extend<ErrorKind> for ErrorSet {
    fn extend<I: IntoIterator<Item = ErrorKind>>(&mut self, iter: I) {
        self.kinds.extend(iter);
    }
}

impl fmt::Display for ErrorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.kinds.iter().map(ErrorKind::as_str).collect();
        write!(f, "{}", names.join(", "))
    }
}
