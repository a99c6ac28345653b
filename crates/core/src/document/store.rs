//! Bencoded document loading, editing and atomic persistence.

use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::bencode::{decode_document, encode_document, ByteString, Dict, Value};

use super::error::DocumentError;

/// A bencoded dictionary loaded from a file.
///
/// Not safe for concurrent use against the same path: callers must serialize
/// load/edit/save sequences per file.
#[derive(Debug, Clone)]
pub struct Document {
    path: PathBuf,
    root: Dict,
}

impl Document {
    /// Creates an empty document that will be saved at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            root: Dict::new(),
        }
    }

    /// Loads and decodes a document from disk.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let bytes = fs::read(path).await.map_err(|e| read_error(path, e))?;

        debug!(path = %path.display(), bytes = bytes.len(), "Loaded document");
        Self::from_bytes(path, &bytes)
    }

    /// Decodes a document from bytes, associating it with `path`.
    pub fn from_bytes(path: impl Into<PathBuf>, bytes: &[u8]) -> Result<Self, DocumentError> {
        let path = path.into();
        match decode_document(bytes) {
            Ok(root) => Ok(Self { path, root }),
            Err(source) => Err(DocumentError::Malformed { path, source }),
        }
    }

    /// The path this document was loaded from and saves to by default.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The root dictionary.
    pub fn root(&self) -> &Dict {
        &self.root
    }

    /// Looks up a value through nested dictionaries.
    pub fn get_path<K: AsRef<[u8]>>(&self, keys: &[K]) -> Result<&Value, DocumentError> {
        let (last, parents) = keys.split_last().ok_or(DocumentError::EmptyPath)?;
        let parent = Self::resolve(&self.root, parents)?;
        parent
            .get(last.as_ref())
            .ok_or_else(|| DocumentError::missing_field(dotted(keys), "key is absent"))
    }

    /// Sets a value through nested dictionaries.
    ///
    /// Every key but the last must already resolve to a dictionary. The last
    /// key is created or overwritten. Returns the previous value, if any.
    pub fn set_path<K: AsRef<[u8]>>(
        &mut self,
        keys: &[K],
        value: impl Into<Value>,
    ) -> Result<Option<Value>, DocumentError> {
        let (last, parents) = keys.split_last().ok_or(DocumentError::EmptyPath)?;
        let parent = Self::resolve_mut(&mut self.root, parents)?;
        Ok(parent.insert(ByteString::from(last.as_ref()), value.into()))
    }

    /// Encodes the full document.
    pub fn to_bytes(&self) -> Vec<u8> {
        encode_document(&self.root)
    }

    /// Writes the document back to the path it was loaded from.
    pub async fn save(&self) -> Result<(), DocumentError> {
        self.save_as(&self.path).await
    }

    /// Writes the document to `path`, replacing any existing file.
    ///
    /// The bytes go to a sibling temporary file which is then renamed over
    /// the target, so readers never see a partially written document.
    pub async fn save_as(&self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let path = path.as_ref();
        let bytes = self.to_bytes();
        let tmp_path = temp_sibling(path);

        if let Err(e) = write_synced(&tmp_path, &bytes).await {
            discard(&tmp_path).await;
            return Err(DocumentError::io(&tmp_path, e));
        }

        if let Err(e) = fs::rename(&tmp_path, path).await {
            discard(&tmp_path).await;
            return Err(DocumentError::io(path, e));
        }

        debug!(path = %path.display(), bytes = bytes.len(), "Saved document");
        Ok(())
    }

    fn resolve<'a, K: AsRef<[u8]>>(
        mut dict: &'a Dict,
        keys: &[K],
    ) -> Result<&'a Dict, DocumentError> {
        for (i, key) in keys.iter().enumerate() {
            dict = match dict.get(key.as_ref()) {
                Some(Value::Dict(inner)) => inner,
                Some(other) => {
                    return Err(DocumentError::missing_field(
                        dotted(&keys[..=i]),
                        format!("is a {}, not a dictionary", other.kind()),
                    ))
                }
                None => {
                    return Err(DocumentError::missing_field(
                        dotted(&keys[..=i]),
                        "key is absent",
                    ))
                }
            };
        }
        Ok(dict)
    }

    fn resolve_mut<'a, K: AsRef<[u8]>>(
        mut dict: &'a mut Dict,
        keys: &[K],
    ) -> Result<&'a mut Dict, DocumentError> {
        for (i, key) in keys.iter().enumerate() {
            dict = match dict.get_mut(key.as_ref()) {
                Some(Value::Dict(inner)) => inner,
                Some(other) => {
                    return Err(DocumentError::missing_field(
                        dotted(&keys[..=i]),
                        format!("is a {}, not a dictionary", other.kind()),
                    ))
                }
                None => {
                    return Err(DocumentError::missing_field(
                        dotted(&keys[..=i]),
                        "key is absent",
                    ))
                }
            };
        }
        Ok(dict)
    }
}

/// Renders a key path as `a.b.c` for diagnostics.
fn dotted<K: AsRef<[u8]>>(keys: &[K]) -> String {
    keys.iter()
        .map(|k| String::from_utf8_lossy(k.as_ref()).into_owned())
        .collect::<Vec<_>>()
        .join(".")
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    path.with_file_name(format!(".{}.{}.tmp", name, std::process::id()))
}

async fn write_synced(path: &Path, bytes: &[u8]) -> Result<(), std::io::Error> {
    let mut file = File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    Ok(())
}

async fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "Failed to remove temporary file");
        }
    }
}

/// Missing and unreadable files are both reported as not found.
fn read_error(path: &Path, error: std::io::Error) -> DocumentError {
    match error.kind() {
        std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
            DocumentError::NotFound {
                path: path.to_path_buf(),
            }
        }
        _ => DocumentError::io(path, error),
    }
}
