//! Torrent file creation through an external client.

use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use super::error::TorrentError;
use crate::document::Document;
use crate::metrics::TORRENTS_TOTAL;
use crate::runner::{wait_for_exit, CommandTemplate, ProcessHandle, ProcessRunner};

/// Known clients, in order of preference.
///
/// Placeholders: `{0}` directory, `{1}` output file, `{2}` announce URL.
pub const CLIENT_COMMANDS: &[&str] = &[
    "transmission-create -p -o {1} -t {2} {0}",
    "mktorrent -p -o {1} -a {2} {0}",
];

/// First client command whose programs `runner` can launch.
pub fn discover_client<R: ProcessRunner + ?Sized>(runner: &R) -> Option<CommandTemplate> {
    CLIENT_COMMANDS
        .iter()
        .map(|line| CommandTemplate::new(*line))
        .find(|template| template.missing_programs(runner).is_empty())
}

/// Creates private torrents for directories and optionally tags their
/// source.
pub struct TorrentMaker<R: ProcessRunner> {
    runner: R,
    announce: String,
    source: Option<String>,
    output_dir: PathBuf,
    poll_interval: Duration,
    client: OnceCell<Option<CommandTemplate>>,
}

impl<R: ProcessRunner> TorrentMaker<R> {
    pub fn new(runner: R, announce: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            announce: announce.into(),
            source: None,
            output_dir: output_dir.into(),
            poll_interval: Duration::from_millis(50),
            client: OnceCell::new(),
        }
    }

    /// Source tag written to `info.source` of every created torrent.
    pub fn with_source(mut self, source: Option<String>) -> Self {
        self.source = source.filter(|s| !s.is_empty());
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Uses `client` instead of discovering one.
    pub fn with_client(self, client: CommandTemplate) -> Self {
        // A fresh cell is always empty, so `set` cannot fail here.
        let _ = self.client.set(Some(client));
        self
    }

    /// The client command, discovered on first use.
    pub fn client(&self) -> Option<&CommandTemplate> {
        self.client
            .get_or_init(|| {
                let client = discover_client(&self.runner);
                match &client {
                    Some(c) => debug!(command = c.as_str(), "Found torrent client"),
                    None => debug!("No torrent client installed"),
                }
                client
            })
            .as_ref()
    }

    /// Creates `<output_dir>/<file_name>` for `dir`.
    pub async fn make(&self, dir: &Path, file_name: &str) -> Result<PathBuf, TorrentError> {
        let result = self.try_make(dir, file_name).await;
        let label = match &result {
            Ok(_) => "success",
            Err(e) => e.as_str(),
        };
        TORRENTS_TOTAL.with_label_values(&[label]).inc();
        result
    }

    async fn try_make(&self, dir: &Path, file_name: &str) -> Result<PathBuf, TorrentError> {
        info!("Making torrent for {}", dir.display());
        let client = self.client().ok_or(TorrentError::NoClient)?;
        let output = self.output_dir.join(file_name);

        let args = [
            dir.to_string_lossy().into_owned(),
            output.to_string_lossy().into_owned(),
            self.announce.clone(),
        ];
        let line = client.render(&args)?;

        let mut handle = self.runner.start(&line)?;
        let status = wait_for_exit(&mut handle, self.poll_interval).await?;
        if !status.is_success() {
            let stderr = handle.collect_stderr().await;
            return Err(TorrentError::Failed {
                status: status.to_string(),
                stderr: String::from_utf8_lossy(&stderr).trim_end().to_string(),
            });
        }

        if let Some(source) = &self.source {
            let mut document = Document::load(&output).await?;
            document.set_path(&["info", "source"], source.as_str())?;
            document.save().await?;
            debug!(torrent = %output.display(), source = %source, "Set torrent source");
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bencode::{encode_document, Dict, Value};
    use crate::runner::ShellRunner;
    use crate::testing::MockRunner;
    use tempfile::TempDir;

    fn write_fixture(dir: &Path) -> PathBuf {
        let mut info = Dict::new();
        info.insert("name".into(), Value::from("Album"));
        info.insert("piece length".into(), Value::from(16384_i64));
        info.insert("private".into(), Value::from(1_i64));
        let mut root = Dict::new();
        root.insert("announce".into(), Value::from("http://tracker/announce"));
        root.insert("info".into(), Value::Dict(info));
        let path = dir.join("fixture.torrent");
        std::fs::write(&path, encode_document(&root)).unwrap();
        path
    }

    fn maker(out: &TempDir, fixture: &Path) -> TorrentMaker<ShellRunner> {
        // Stand-in client that copies a prepared torrent to the output path.
        let client = format!("cp {} {{1}} # {{0}} {{2}}", fixture.display());
        TorrentMaker::new(ShellRunner::new(), "http://tracker/announce", out.path())
            .with_client(CommandTemplate::new(client))
            .with_poll_interval(Duration::from_millis(5))
    }

    #[test]
    fn test_discover_prefers_first_available() {
        let runner = MockRunner::new();
        assert_eq!(discover_client(&runner).unwrap().as_str(), CLIENT_COMMANDS[0]);

        runner.set_unavailable("transmission-create");
        assert_eq!(discover_client(&runner).unwrap().as_str(), CLIENT_COMMANDS[1]);

        runner.set_unavailable("mktorrent");
        assert!(discover_client(&runner).is_none());
    }

    #[tokio::test]
    async fn test_no_client() {
        let runner = MockRunner::new();
        runner.set_unavailable("transmission-create");
        runner.set_unavailable("mktorrent");
        let out = TempDir::new().unwrap();
        let maker = TorrentMaker::new(runner, "x", out.path());
        let err = maker.make(Path::new("/a"), "a.torrent").await.unwrap_err();
        assert!(matches!(err, TorrentError::NoClient));
        assert_eq!(err.error_kind(), crate::ErrorKind::NoTorrentClient);
    }

    #[tokio::test]
    async fn test_make_without_source() {
        let out = TempDir::new().unwrap();
        let fixture = write_fixture(out.path());
        let path = maker(&out, &fixture)
            .make(Path::new("/music/Album"), "Album.torrent")
            .await
            .unwrap();
        assert_eq!(path, out.path().join("Album.torrent"));
        assert_eq!(std::fs::read(&path).unwrap(), std::fs::read(&fixture).unwrap());
    }

    #[tokio::test]
    async fn test_make_sets_source() {
        let out = TempDir::new().unwrap();
        let fixture = write_fixture(out.path());
        let path = maker(&out, &fixture)
            .with_source(Some("RED".to_string()))
            .make(Path::new("/music/Album"), "Album.torrent")
            .await
            .unwrap();

        let document = Document::load(&path).await.unwrap();
        assert_eq!(
            document.get_path(&["info", "source"]).unwrap().as_str(),
            Some("RED")
        );
        assert_eq!(
            document.get_path(&["info", "name"]).unwrap().as_str(),
            Some("Album")
        );
    }

    #[tokio::test]
    async fn test_client_failure() {
        let out = TempDir::new().unwrap();
        let maker = TorrentMaker::new(ShellRunner::new(), "x", out.path())
            .with_client(CommandTemplate::new("sh -c 'echo nope >&2; exit 2' {0} {1} {2}"))
            .with_poll_interval(Duration::from_millis(5));
        let err = maker.make(Path::new("/a"), "a.torrent").await.unwrap_err();
        assert!(matches!(err, TorrentError::Failed { ref stderr, .. } if stderr == "nope"));
        assert_eq!(err.error_kind(), crate::ErrorKind::TorrentError);
    }

    #[tokio::test]
    async fn test_source_on_malformed_output() {
        let out = TempDir::new().unwrap();
        let maker = TorrentMaker::new(ShellRunner::new(), "x", out.path())
            .with_client(CommandTemplate::new("sh -c 'echo junk > \"$1\"' _ {1} # {0} {2}"))
            .with_source(Some("RED".into()))
            .with_poll_interval(Duration::from_millis(5));
        let err = maker.make(Path::new("/a"), "a.torrent").await.unwrap_err();
        assert!(matches!(err, TorrentError::Source(_)));
    }
}
