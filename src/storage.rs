//! Byte storage for uploads. Only metadata goes through the record store.

use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::StorageError;

/// Where an upload landed and how many bytes it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub path: PathBuf,
    pub size: u64,
}

#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
    max_size: u64,
}

/// Final path component of a client-supplied name, or `None` if nothing usable remains.
pub fn sanitize_filename(name: &str) -> Option<String> {
    // Browsers on Windows may send the full client path.
    let name = name.rsplit(['/', '\\']).next()?.trim();
    match name {
        "" | "." | ".." => None,
        _ => Path::new(name)
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string),
    }
}

impl FileStorage {
    /// Create the upload folder if it does not exist yet.
    pub async fn init(root: impl Into<PathBuf>, max_size: u64) -> std::io::Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root, max_size })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    /// Write `bytes` under a collision-free name.
    pub async fn save(&self, filename: &str, bytes: &[u8]) -> Result<StoredFile, StorageError> {
        let name = sanitize_filename(filename)
            .ok_or_else(|| StorageError::InvalidFilename(filename.to_string()))?;

        let size = bytes.len() as u64;
        if size > self.max_size {
            return Err(StorageError::TooLarge {
                limit: self.max_size,
            });
        }

        let path = self
            .root
            .join(format!("{}_{}", Uuid::new_v4().simple(), name));
        tokio::fs::write(&path, bytes).await?;

        tracing::debug!(path = %path.display(), size, "Stored upload");
        Ok(StoredFile { path, size })
    }

    /// Delete a previously saved upload. A file that is already gone is not an error.
    pub async fn remove(&self, stored: &StoredFile) -> Result<(), StorageError> {
        match tokio::fs::remove_file(&stored.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
