//! Filesystem primitives used by the mirror layer.
//!
//! Only three operations are needed: checking whether a path is a directory,
//! creating a directory tree and removing one. They sit behind
//! [`FileSystemOperations`] so the coordinators can be tested without
//! touching the disk.

use std::io::ErrorKind;
use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;

/// Trait for filesystem operations - allows mocking in tests
#[async_trait]
pub trait FileSystemOperations: Send + Sync {
    /// Whether `path` exists and is a directory.
    async fn is_dir(&self, path: &Path) -> bool;

    /// Create `path` and any missing parents.
    async fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Remove `path` recursively. A missing path is not an error.
    async fn remove_dir_all(&self, path: &Path) -> Result<()>;
}

/// The default implementation of `FileSystemOperations`, backed by
/// `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFileSystemOperations;

#[async_trait]
impl FileSystemOperations for DefaultFileSystemOperations {
    async fn is_dir(&self, path: &Path) -> bool {
        tokio::fs::metadata(path)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    async fn create_dir_all(&self, path: &Path) -> Result<()> {
        tokio::fs::create_dir_all(path).await?;
        Ok(())
    }

    async fn remove_dir_all(&self, path: &Path) -> Result<()> {
        match tokio::fs::remove_dir_all(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
