//! Exporting a mirror's tree at a given reference into a directory.
//!
//! Exports are not de-duplicated. Exports into different directories run
//! fully in parallel; two exports into the same directory race on the
//! filesystem and the resulting tree is unspecified.

use std::path::Path;

use log::info;

use crate::error::Result;
use crate::repository::{RepositoryHandle, RepositoryManager};

impl RepositoryManager {
    /// Write the tree at `reference` into `target_dir`, creating it if
    /// needed. Existing files in `target_dir` are overwritten, others are
    /// left alone.
    pub async fn copy(
        &self,
        handle: &RepositoryHandle,
        reference: &str,
        target_dir: &Path,
    ) -> Result<()> {
        handle.require_installed("copy")?;

        self.fs_ops.create_dir_all(target_dir).await?;
        self.git_ops
            .archive(handle.local_context(), reference, target_dir)
            .await?;
        info!(
            "exported {}@{} to {}",
            handle.public_url(),
            reference,
            target_dir.display()
        );
        Ok(())
    }
}
