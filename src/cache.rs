//! On-disk layout of the mirror cache.
//!
//! Every mirror lives at `<root>/<provider>/<owner>/<repo>`. The root is
//! created by [`MirrorCache::open`], which must complete before any mirror
//! path is handed out.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};

use crate::error::{Error, Result};
use crate::filesystem::FileSystemOperations;

/// The cache root and the filesystem it lives on.
#[derive(Clone)]
pub struct MirrorCache {
    root: PathBuf,
    fs_ops: Arc<dyn FileSystemOperations>,
}

impl MirrorCache {
    /// Create the cache root if needed and return the ready cache.
    pub async fn open(root: PathBuf, fs_ops: Arc<dyn FileSystemOperations>) -> Result<Self> {
        fs_ops.create_dir_all(&root).await?;
        debug!("mirror cache ready at {}", root.display());
        Ok(Self { root, fs_ops })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the mirror of `owner/repo` on `provider` lives.
    pub fn mirror_path(&self, provider: &str, owner: &str, repo: &str) -> Result<PathBuf> {
        for segment in [provider, owner, repo] {
            validate_segment(segment)?;
        }
        Ok(self.root.join(provider).join(owner).join(repo))
    }

    /// Remove every mirror and recreate an empty root.
    pub async fn clean(&self) -> Result<()> {
        self.fs_ops.remove_dir_all(&self.root).await?;
        self.fs_ops.create_dir_all(&self.root).await?;
        info!("cleaned mirror cache at {}", self.root.display());
        Ok(())
    }
}

impl std::fmt::Debug for MirrorCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MirrorCache")
            .field("root", &self.root)
            .finish()
    }
}

/// A path segment must be a single normal component.
fn validate_segment(segment: &str) -> Result<()> {
    let mut components = Path::new(segment).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !segment.contains(['/', '\\']) => Ok(()),
        _ => Err(Error::InvalidName {
            name: segment.to_string(),
        }),
    }
}
