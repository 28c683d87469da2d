//! Filesystem storage backend.

use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::{Result, TtmlCaptureError};
use crate::storage::Storage;

/// Storage backend that writes files under a download directory.
///
/// Intermediate directories are created automatically. Existing files with
/// the same name are overwritten. Keys must be relative paths made of plain
/// names; `..`, `.`, roots and drive prefixes are refused.
///
/// # Example
///
/// ```rust,no_run
/// use ttml_capture::FsStorage;
///
/// let storage = FsStorage::new("/home/me/Downloads/lyrics");
/// ```
pub struct FsStorage {
    base_dir: PathBuf,
}

impl FsStorage {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

impl Storage for FsStorage {
    async fn put(&self, key: &str, content: &[u8], _content_type: &str) -> Result<()> {
        let relative = Path::new(key);
        if key.is_empty() || !relative.components().all(|c| matches!(c, Component::Normal(_))) {
            return Err(TtmlCaptureError::StorageUpload(Box::new(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("refusing key outside the download directory: {key:?}"),
            ))));
        }
        let path = self.base_dir.join(relative);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| TtmlCaptureError::StorageUpload(Box::new(e)))?;
        }

        tokio::fs::write(&path, content)
            .await
            .map_err(|e| TtmlCaptureError::StorageUpload(Box::new(e)))?;

        tracing::debug!("Wrote {} bytes to {}", content.len(), path.display());
        Ok(())
    }
}
