//! Album processing run.

use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use super::options::RunOptions;
use crate::album::{self, AlbumContents};
use crate::config::{Config, TorrentMode};
use crate::formats::Format;
use crate::outcome::{ErrorKind, ErrorSet};
use crate::runner::ProcessRunner;
use crate::scheduler::JobScheduler;
use crate::tags::TagReader;
use crate::torrent::TorrentMaker;

/// Context for one run over a set of albums.
pub struct AlbumProcessor<R: ProcessRunner + Clone, T: TagReader> {
    config: Config,
    options: RunOptions,
    scheduler: JobScheduler<R>,
    torrents: TorrentMaker<R>,
    tags: T,
}

impl<R: ProcessRunner + Clone, T: TagReader> AlbumProcessor<R, T> {
    pub fn new(config: Config, options: RunOptions, runner: R, tags: T) -> Self {
        let scheduler_config = config.scheduler_config();
        let torrents = TorrentMaker::new(
            runner.clone(),
            config.torrent.announce.clone(),
            config.output.torrent_dir.clone(),
        )
        .with_source(config.torrent.source.clone())
        .with_poll_interval(scheduler_config.poll_interval());

        Self {
            scheduler: JobScheduler::new(runner, scheduler_config),
            torrents,
            config,
            options,
            tags,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Processes every album and returns every kind of error encountered.
    ///
    /// Output directories that are not directories abort the run before any
    /// album is touched; any other problem only affects its own album.
    pub async fn process(&self, albums: &[PathBuf]) -> ErrorSet {
        let mut errors = ErrorSet::new();

        for (label, dir) in [
            ("torrent output", &self.config.output.torrent_dir),
            ("transcode output", &self.config.output.transcode_dir),
        ] {
            if !is_dir(dir).await {
                error!("The given {} dir ({}) is not a directory", label, dir.display());
                errors.insert(ErrorKind::ArgNotDirectory);
            }
        }
        if !errors.is_empty() {
            return errors;
        }

        for album in albums {
            info!("Processing {}", album.display());
            let album_errors = self.process_album(album).await;
            if !album_errors.is_empty() {
                warn!(album = %album.display(), errors = %album_errors, "Album finished with errors");
            }
            errors.merge(&album_errors);
        }

        if !errors.is_empty() {
            error!("An error occurred, exiting with code {}", errors.bits());
        }
        errors
    }

    /// Processes one album.
    pub async fn process_album(&self, album: &Path) -> ErrorSet {
        let mut errors = ErrorSet::new();
        let album = std::path::absolute(album).unwrap_or_else(|_| album.to_path_buf());

        let formats = self.check_album(&album, &mut errors).await;
        if !errors.is_empty() {
            return errors;
        }

        if self.config.torrent.mode == TorrentMode::All {
            info!("Making the original torrent");
            let name = album
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let name = format!(
                "{}{}",
                self.config.naming.prefix,
                album::strip_prefix(&name, &self.config.naming.snip_prefixes)
            );
            self.make_torrent(&album, &name, &mut errors).await;
        }

        if !self.config.transcode.enabled {
            return errors;
        }

        let contents = match album::enumerate_contents(&album)
            .and_then(|c| album::check_transcode_allowed(&c, self.options.explicit_transcode).map(|_| c))
        {
            Ok(contents) => contents,
            Err(e) => {
                error!(album = %album.display(), "{}", e);
                errors.insert(e.error_kind());
                return errors;
            }
        };

        for format in formats {
            self.transcode(&album, &contents, format, &mut errors).await;
        }
        errors
    }

    /// Validates the album path and run settings, returning the formats to
    /// produce.
    async fn check_album(&self, album: &Path, errors: &mut ErrorSet) -> Vec<Format> {
        if let Err(e) = album::check_album_dir(album).await {
            error!("{}", e);
            errors.insert(e.error_kind());
        }

        let (formats, unknown) = Format::parse_list(&self.config.transcode.formats.join(","));
        for e in unknown {
            error!("{}", e);
            errors.insert(ErrorKind::UnknownTranscode);
        }

        if self.options.explicit_torrent && self.config.torrent.announce.is_empty() {
            error!("You cannot create torrents without first setting your announce URL");
            errors.insert(ErrorKind::NoAnnounceUrl);
        }

        formats
    }

    async fn transcode(
        &self,
        album: &Path,
        contents: &AlbumContents,
        format: Format,
        errors: &mut ErrorSet,
    ) {
        let missing = format.command().missing_programs(self.scheduler.runner());
        if let Some(program) = missing.first() {
            error!("Cannot transcode to {}, \"{}\" not found", format, program);
            errors.insert(ErrorKind::NoTranscoder);
            return;
        }

        info!("Transcoding to {}", format);
        let name = album::transcode_dir_name(
            album,
            format,
            &self.config.naming.prefix,
            &self.config.naming.snip_prefixes,
        );
        let dst = self.config.output.transcode_dir.join(&name);

        if tokio::fs::try_exists(&dst).await.unwrap_or(true) {
            warn!("Directory already exists: {}", dst.display());
            if !self.options.explicit_transcode {
                errors.insert(ErrorKind::TranscodeDirExists);
                return;
            }
        } else {
            if let Err(e) = album::copy_contents(album, &dst, contents).await {
                error!("{}", e);
                errors.insert(e.error_kind());
                return;
            }

            let items =
                album::build_work_items(album, &dst, contents, format, &self.tags).await;
            match self.scheduler.run(items).await {
                Ok(result) => errors.merge(&result.error_kinds()),
                Err(e) => {
                    error!("{}", e);
                    errors.insert(ErrorKind::TranscodeError);
                }
            }
        }

        if self.config.torrent.mode != TorrentMode::None {
            self.make_torrent(&dst, &name, errors).await;
        }
    }

    async fn make_torrent(&self, dir: &Path, name: &str, errors: &mut ErrorSet) {
        let file_name = album::torrent_file_name(name);
        match self.torrents.make(dir, &file_name).await {
            Ok(path) => info!("Created {}", path.display()),
            Err(e) => {
                error!("{}", e);
                errors.insert(e.error_kind());
            }
        }
    }
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
}
