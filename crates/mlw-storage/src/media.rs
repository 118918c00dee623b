//! On-disk survey directories under the media root.

use std::io;
use std::path::{Path, PathBuf};

use mlw_core::media_paths;

use crate::error::StorageError;

/// What happened when removing a survey's directory tree.
#[derive(Debug)]
pub enum CleanupOutcome {
    Removed,
    /// Nothing existed at the path. Treated as success.
    AlreadyAbsent,
    Failed(io::Error),
}

impl CleanupOutcome {
    /// Only a failure blocks deleting the survey row.
    pub fn into_result(self, path: &Path) -> Result<(), StorageError> {
        match self {
            CleanupOutcome::Removed | CleanupOutcome::AlreadyAbsent => Ok(()),
            CleanupOutcome::Failed(source) => Err(StorageError::Cleanup {
                path: path.display().to_string(),
                source,
            }),
        }
    }
}

/// The directory under which every survey's files live.
#[derive(Debug, Clone)]
pub struct MediaRoot {
    root: PathBuf,
}

impl MediaRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a survey directory. Fails for paths that would
    /// leave the media root.
    pub fn resolve(&self, directory: &str) -> Result<PathBuf, StorageError> {
        Ok(media_paths::resolve(&self.root, directory)?)
    }

    /// Create a survey directory (and any missing parents).
    pub async fn create_dir(&self, directory: &str) -> Result<PathBuf, StorageError> {
        let path = self.resolve(directory)?;
        tokio::fs::create_dir_all(&path).await?;
        tracing::debug!(path = %path.display(), "survey directory created");
        Ok(path)
    }

    /// Recursively remove a survey directory, distinguishing absence from
    /// failure.
    pub async fn remove_dir(&self, directory: &str) -> Result<(PathBuf, CleanupOutcome), StorageError> {
        let path = self.resolve(directory)?;
        let outcome = remove_tree(&path).await;

        match &outcome {
            CleanupOutcome::Removed => {
                tracing::info!(path = %path.display(), "survey directory removed");
            }
            CleanupOutcome::AlreadyAbsent => {
                tracing::warn!(path = %path.display(), "survey directory already absent");
            }
            CleanupOutcome::Failed(e) => {
                tracing::error!(path = %path.display(), error = %e, "survey directory removal failed");
            }
        }

        Ok((path, outcome))
    }
}

pub async fn remove_tree(path: &Path) -> CleanupOutcome {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => CleanupOutcome::Removed,
        Err(e) if e.kind() == io::ErrorKind::NotFound => CleanupOutcome::AlreadyAbsent,
        Err(e) => CleanupOutcome::Failed(e),
    }
}
