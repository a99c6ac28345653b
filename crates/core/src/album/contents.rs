//! Album directory enumeration and transcode rules.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::error::AlbumError;

/// Extensions treated as lossless sources.
pub const LOSSLESS_EXTENSIONS: &[&str] = &["flac", "wav", "m4a"];

/// Extensions treated as lossy audio.
pub const LOSSY_EXTENSIONS: &[&str] = &["mp3", "aac", "opus", "ogg", "vorbis"];

/// Contents of an album directory. All paths are relative to the album root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlbumContents {
    /// Subdirectories, parents before children.
    pub directories: Vec<PathBuf>,
    /// Everything that is not lossless audio (artwork, logs, lossy audio).
    pub data_files: Vec<PathBuf>,
    /// Lossless audio files to transcode.
    pub lossless_files: Vec<PathBuf>,
    /// Whether any lossy audio was found.
    pub has_lossy: bool,
}

fn extension(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Checks that `dir` exists and is a directory.
pub async fn check_album_dir(dir: &Path) -> Result<(), AlbumError> {
    match tokio::fs::metadata(dir).await {
        Err(_) => Err(AlbumError::NotFound {
            path: dir.to_path_buf(),
        }),
        Ok(meta) if !meta.is_dir() => Err(AlbumError::NotADirectory {
            path: dir.to_path_buf(),
        }),
        Ok(_) => Ok(()),
    }
}

/// Walks `dir` and classifies every file.
pub fn enumerate_contents(dir: &Path) -> Result<AlbumContents, AlbumError> {
    let mut contents = AlbumContents::default();

    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| AlbumError::Walk {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })?;
        let relative = match entry.path().strip_prefix(dir) {
            Ok(relative) => relative.to_path_buf(),
            Err(_) => continue,
        };

        if entry.file_type().is_dir() {
            contents.directories.push(relative);
            continue;
        }

        let ext = extension(&relative);
        if LOSSLESS_EXTENSIONS.contains(&ext.as_str()) {
            contents.lossless_files.push(relative);
        } else {
            if LOSSY_EXTENSIONS.contains(&ext.as_str()) {
                contents.has_lossy = true;
            }
            contents.data_files.push(relative);
        }
    }

    Ok(contents)
}

/// Checks whether the album may be transcoded.
///
/// Lossy audio is never a valid source. An album mixing lossy and lossless
/// audio is only transcoded when explicitly requested.
pub fn check_transcode_allowed(contents: &AlbumContents, explicit: bool) -> Result<(), AlbumError> {
    if contents.has_lossy {
        if contents.lossless_files.is_empty() {
            return Err(AlbumError::LossyOnly);
        }
        if !explicit {
            return Err(AlbumError::MixedLossy);
        }
    }
    if contents.lossless_files.is_empty() {
        return Err(AlbumError::NothingToTranscode);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn album(files: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for file in files {
            let path = dir.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, b"x").unwrap();
        }
        dir
    }

    #[test]
    fn test_enumerate_classifies_files() {
        let dir = album(&[
            "01 Intro.flac",
            "02 Song.FLAC",
            "cover.jpg",
            "CD2/01 Outro.wav",
            "CD2/rip.log",
        ]);
        let contents = enumerate_contents(dir.path()).unwrap();
        assert_eq!(contents.directories, [PathBuf::from("CD2")]);
        assert_eq!(
            contents.lossless_files,
            [
                PathBuf::from("01 Intro.flac"),
                PathBuf::from("02 Song.FLAC"),
                PathBuf::from("CD2/01 Outro.wav"),
            ]
        );
        assert_eq!(
            contents.data_files,
            [PathBuf::from("CD2/rip.log"), PathBuf::from("cover.jpg")]
        );
        assert!(!contents.has_lossy);
    }

    #[test]
    fn test_enumerate_detects_lossy() {
        let dir = album(&["01.mp3", "cover.png"]);
        let contents = enumerate_contents(dir.path()).unwrap();
        assert!(contents.has_lossy);
        assert!(contents.lossless_files.is_empty());
        assert_eq!(contents.data_files.len(), 2);
    }

    #[test]
    fn test_lossy_only_is_rejected() {
        let contents = AlbumContents {
            has_lossy: true,
            data_files: vec!["01.mp3".into()],
            ..Default::default()
        };
        assert!(matches!(
            check_transcode_allowed(&contents, true),
            Err(AlbumError::LossyOnly)
        ));
    }

    #[test]
    fn test_mixed_requires_explicit() {
        let contents = AlbumContents {
            has_lossy: true,
            lossless_files: vec!["01.flac".into()],
            data_files: vec!["bonus.mp3".into()],
            ..Default::default()
        };
        assert!(matches!(
            check_transcode_allowed(&contents, false),
            Err(AlbumError::MixedLossy)
        ));
        assert!(check_transcode_allowed(&contents, true).is_ok());
    }

    #[test]
    fn test_nothing_to_transcode() {
        let contents = AlbumContents {
            data_files: vec!["cover.jpg".into()],
            ..Default::default()
        };
        let err = check_transcode_allowed(&contents, true).unwrap_err();
        assert_eq!(err.error_kind(), crate::ErrorKind::TranscodeAgainstRules);
    }

    #[tokio::test]
    async fn test_check_album_dir() {
        let dir = album(&["01.flac"]);
        assert!(check_album_dir(dir.path()).await.is_ok());

        let missing = dir.path().join("missing");
        let err = check_album_dir(&missing).await.unwrap_err();
        assert!(matches!(err, AlbumError::NotFound { ref path } if path == &missing));
        assert_eq!(err.error_kind(), crate::ErrorKind::FileNotFound);

        let file = dir.path().join("01.flac");
        let err = check_album_dir(&file).await.unwrap_err();
        assert!(matches!(err, AlbumError::NotADirectory { .. }));
        assert_eq!(err.error_kind(), crate::ErrorKind::ArgNotDirectory);
    }
}
