//! Derivative persistence.
//!
//! A [`DerivativeStore`] writes compressed bytes under a content root and
//! exposes that root so the HTTP layer can serve it statically. The layout is
//! flat: `root/{filename}`, no subdirectories, no manifest.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::error::StorageError;

/// Persists derivatives under a content root.
///
/// Writes to different filenames are independent; no lock is taken around
/// [`put`](Self::put). Implementations never delete or list.
#[async_trait]
pub trait DerivativeStore: Send + Sync {
    /// Directory from which stored derivatives are served.
    fn root(&self) -> &Path;

    /// Write `bytes` to `root/filename`, creating the root if needed.
    ///
    /// Returns the path the derivative was written to. The write has
    /// completed when this returns.
    async fn put(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, StorageError>;
}

// =============================================================================
// Local directory store
// =============================================================================

/// [`DerivativeStore`] on a local directory.
#[derive(Debug, Clone)]
pub struct LocalDirStore {
    root: PathBuf,
}

impl LocalDirStore {
    /// Create a store rooted at `root`. The directory is created lazily on
    /// the first [`put`](DerivativeStore::put).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve where `filename` lives, without touching the filesystem.
    pub fn path_for(&self, filename: &str) -> Result<PathBuf, StorageError> {
        validate_filename(filename)?;
        Ok(self.root.join(filename))
    }
}

#[async_trait]
impl DerivativeStore for LocalDirStore {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn put(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, StorageError> {
        let path = self.path_for(filename)?;

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StorageError::CreateRoot {
                path: self.root.clone(),
                message: e.to_string(),
            })?;

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| StorageError::Write {
                path: path.clone(),
                message: e.to_string(),
            })?;

        debug!(path = %path.display(), size = bytes.len(), "Stored derivative");
        Ok(path)
    }
}

/// A stored name must be a single, ordinary path element.
fn validate_filename(filename: &str) -> Result<(), StorageError> {
    let invalid = filename.is_empty()
        || filename == "."
        || filename == ".."
        || filename.contains(['/', '\\', '\0']);

    if invalid {
        return Err(StorageError::InvalidName {
            filename: filename.to_string(),
        });
    }
    Ok(())
}
