//! Preparing a transcode directory.

use std::path::Path;
use tokio::fs;
use tracing::debug;

use super::contents::AlbumContents;
use super::error::AlbumError;
use crate::formats::Format;
use crate::scheduler::WorkItem;
use crate::tags::TagReader;

/// Creates `dst` with the album's directory layout and copies every data
/// file into it.
///
/// `dst` itself must not exist yet.
pub async fn copy_contents(src: &Path, dst: &Path, contents: &AlbumContents) -> Result<(), AlbumError> {
    fs::create_dir(dst)
        .await
        .map_err(|e| AlbumError::DirectoryCreationFailed {
            path: dst.to_path_buf(),
            source: e,
        })?;

    for dir in &contents.directories {
        let path = dst.join(dir);
        fs::create_dir_all(&path)
            .await
            .map_err(|e| AlbumError::DirectoryCreationFailed { path, source: e })?;
    }

    for file in &contents.data_files {
        let from = src.join(file);
        let to = dst.join(file);
        let bytes = fs::copy(&from, &to)
            .await
            .map_err(|e| AlbumError::copy_failed(from.clone(), to.clone(), e))?;
        debug!(file = %file.display(), bytes, "Copied data file");
    }

    Ok(())
}

/// One work item per lossless file, writing `<dst>/<same path>.<format ext>`.
pub async fn build_work_items(
    src: &Path,
    dst: &Path,
    contents: &AlbumContents,
    format: Format,
    tags: &dyn TagReader,
) -> Vec<WorkItem> {
    let command = format.command();
    let mut items = Vec::with_capacity(contents.lossless_files.len());

    for file in &contents.lossless_files {
        let source = src.join(file);
        let destination = dst.join(file.with_extension(format.extension()));
        let track_tags = tags.read_tags(&source).await;
        items.push(WorkItem::new(source, destination, command.clone()).with_tags(track_tags.into_args()));
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::album::enumerate_contents;
    use crate::testing::StaticTagReader;
    use crate::tags::TrackTags;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, TempDir) {
        let src = TempDir::new().unwrap();
        std::fs::create_dir_all(src.path().join("CD1")).unwrap();
        std::fs::write(src.path().join("CD1/01.flac"), b"audio").unwrap();
        std::fs::write(src.path().join("CD1/cover.jpg"), b"jpeg").unwrap();
        std::fs::write(src.path().join("info.txt"), b"notes").unwrap();
        (src, TempDir::new().unwrap())
    }

    #[tokio::test]
    async fn test_copy_contents() {
        let (src, out) = fixture();
        let contents = enumerate_contents(src.path()).unwrap();
        let dst = out.path().join("Album [V0]");

        copy_contents(src.path(), &dst, &contents).await.unwrap();

        assert_eq!(std::fs::read(dst.join("CD1/cover.jpg")).unwrap(), b"jpeg");
        assert_eq!(std::fs::read(dst.join("info.txt")).unwrap(), b"notes");
        assert!(!dst.join("CD1/01.flac").exists());
    }

    #[tokio::test]
    async fn test_copy_into_existing_dir_fails() {
        let (src, out) = fixture();
        let contents = enumerate_contents(src.path()).unwrap();
        let err = copy_contents(src.path(), out.path(), &contents)
            .await
            .unwrap_err();
        assert!(matches!(err, AlbumError::DirectoryCreationFailed { .. }));
    }

    #[tokio::test]
    async fn test_build_work_items() {
        let (src, out) = fixture();
        let contents = enumerate_contents(src.path()).unwrap();
        let dst = out.path().join("Album [V0]");
        let reader = StaticTagReader::new(TrackTags {
            title: "One".into(),
            track: "1/9".into(),
            ..Default::default()
        });

        let items = build_work_items(src.path(), &dst, &contents, Format::Mp3V0, &reader).await;

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].source, src.path().join("CD1/01.flac"));
        assert_eq!(items[0].destination, dst.join(PathBuf::from("CD1/01.mp3")));
        assert_eq!(items[0].tags, ["One", "", "", "", "1/9"]);
        assert_eq!(items[0].command, Format::Mp3V0.command());
    }
}
