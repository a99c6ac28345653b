//! Per-run options that are not configuration.

/// What the user asked for explicitly on this run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Transcoding was requested explicitly. Allows albums mixing lossy and
    /// lossless audio, and reuses existing transcode directories.
    pub explicit_transcode: bool,
    /// Torrent creation was requested explicitly; an announce URL is then
    /// mandatory.
    pub explicit_torrent: bool,
}
