//! # Mirror Management
//!
//! This module provides the [`RepositoryManager`], the coordinating object
//! for all mirror operations, and the [`RepositoryHandle`] identifying one
//! mirrored repository.
//!
//! ## Design
//!
//! The manager is built around two traits that separate the coordination
//! logic from the concrete side effects:
//!
//! - **`GitOperations`**: cloning, fetching, listing and resolving
//!   references, and exporting trees.
//! - **`FileSystemOperations`**: directory checks, creation and removal.
//!
//! In the main application `DefaultGitOperations` and
//! `DefaultFileSystemOperations` run the real `git` binary and touch the
//! real disk. In tests they are replaced by mocks that count calls.
//!
//! ## De-duplication
//!
//! Installs and updates mutate the mirror on disk, so they go through an
//! [`OperationRegistry`] keyed by `install:<mirror>` / `update:<mirror>`.
//! Concurrent callers for the same mirror share one clone or one fetch and
//! all observe its outcome. Reference resolution, listing and export are
//! read-only and run independently (see `resolver` and `archive`).
//!
//! A handle's `installed` flag only ever goes from false to true. Deleting a
//! mirror from disk while the process runs is not noticed by live handles.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info, warn};

use crate::cache::MirrorCache;
use crate::error::{classify_install_failure, Error, Result};
use crate::filesystem::{DefaultFileSystemOperations, FileSystemOperations};
use crate::git::{DefaultGitOperations, ExecContext, GitOperations};
use crate::references::parse_fetch;
use crate::registry::{OperationKey, OperationKind, OperationRegistry};
use crate::remote::RemoteDescriptor;

/// One mirrored repository.
///
/// Obtained from [`RepositoryManager::handle`], which guarantees the
/// mirror's parent directories exist.
pub struct RepositoryHandle {
    remote: Arc<RemoteDescriptor>,
    owner: String,
    repo: String,
    mirror_path: PathBuf,
    metadata_path: PathBuf,
    url: String,
    local_context: ExecContext,
    remote_context: ExecContext,
    installed: AtomicBool,
}

impl RepositoryHandle {
    pub fn remote(&self) -> &RemoteDescriptor {
        &self.remote
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// The mirror's directory.
    pub fn mirror_path(&self) -> &Path {
        &self.mirror_path
    }

    /// The mirror's `.git` directory; its presence means installed.
    pub fn metadata_path(&self) -> &Path {
        &self.metadata_path
    }

    /// Fetch URL, including credentials when configured.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// URL without credentials.
    pub fn public_url(&self) -> String {
        self.remote.public_url_of(&self.owner, &self.repo)
    }

    /// Context for commands run against the mirror.
    pub fn local_context(&self) -> &ExecContext {
        &self.local_context
    }

    /// Context for commands that talk to the remote directly.
    pub fn remote_context(&self) -> &ExecContext {
        &self.remote_context
    }

    /// Whether this handle has seen the mirror installed.
    pub fn installed(&self) -> bool {
        self.installed.load(Ordering::Acquire)
    }

    pub(crate) fn mark_installed(&self) {
        self.installed.store(true, Ordering::Release);
    }

    pub(crate) fn require_installed(&self, operation: &'static str) -> Result<()> {
        if self.installed() {
            Ok(())
        } else {
            Err(Error::PreconditionViolation {
                operation,
                path: self.mirror_path.clone(),
            })
        }
    }
}

impl fmt::Debug for RepositoryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepositoryHandle")
            .field("remote", &self.remote.name())
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("mirror_path", &self.mirror_path)
            .field("installed", &self.installed())
            .finish()
    }
}

/// The main entry point for managing mirrors.
///
/// Cloning a manager is cheap and the clones share their registries, so
/// one manager per cache root should be shared by everything in a process
/// that touches that cache.
#[derive(Clone)]
pub struct RepositoryManager {
    pub(crate) cache: MirrorCache,
    pub(crate) git_ops: Arc<dyn GitOperations>,
    pub(crate) fs_ops: Arc<dyn FileSystemOperations>,
    install_checks: Arc<OperationRegistry<bool>>,
    installs: Arc<OperationRegistry<()>>,
    updates: Arc<OperationRegistry<bool>>,
}

impl RepositoryManager {
    /// Open the cache at `cache_root` with the default git and filesystem
    /// operations, creating the root if needed.
    pub async fn open(cache_root: PathBuf) -> Result<Self> {
        Self::with_operations(
            cache_root,
            Arc::new(DefaultGitOperations),
            Arc::new(DefaultFileSystemOperations),
        )
        .await
    }

    /// Open the cache with custom `GitOperations` and
    /// `FileSystemOperations` implementations.
    pub async fn with_operations(
        cache_root: PathBuf,
        git_ops: Arc<dyn GitOperations>,
        fs_ops: Arc<dyn FileSystemOperations>,
    ) -> Result<Self> {
        let cache = MirrorCache::open(cache_root, Arc::clone(&fs_ops)).await?;
        Ok(Self {
            cache,
            git_ops,
            fs_ops,
            install_checks: Arc::new(OperationRegistry::new()),
            installs: Arc::new(OperationRegistry::new()),
            updates: Arc::new(OperationRegistry::new()),
        })
    }

    pub fn cache_root(&self) -> &Path {
        self.cache.root()
    }

    /// Build the handle for `owner/repo` on `remote`.
    ///
    /// The mirror's parent directory is created before the handle is
    /// returned. The mirror itself is not installed.
    pub async fn handle(
        &self,
        remote: Arc<RemoteDescriptor>,
        owner: &str,
        repo: &str,
    ) -> Result<RepositoryHandle> {
        let mirror_path = self.cache.mirror_path(remote.name(), owner, repo)?;
        if let Some(parent) = mirror_path.parent() {
            self.fs_ops.create_dir_all(parent).await?;
        }

        Ok(RepositoryHandle {
            url: remote.url_of(owner, repo),
            metadata_path: mirror_path.join(".git"),
            local_context: ExecContext::new(&mirror_path),
            remote_context: ExecContext::new(self.cache.root()),
            mirror_path,
            owner: owner.to_string(),
            repo: repo.to_string(),
            remote,
            installed: AtomicBool::new(false),
        })
    }

    /// Remove every mirror under the cache root.
    ///
    /// Handles created before the clean still consider themselves
    /// installed.
    pub async fn clean(&self) -> Result<()> {
        self.cache.clean().await
    }

    /// Whether the mirror exists on disk.
    ///
    /// Concurrent checks for one mirror share a single stat.
    pub async fn is_installed(&self, handle: &RepositoryHandle) -> Result<bool> {
        if handle.installed() {
            return Ok(true);
        }

        let fs_ops = Arc::clone(&self.fs_ops);
        let metadata_path = handle.metadata_path().to_path_buf();
        let key = OperationKey::new(OperationKind::IsInstalled, handle.mirror_path());
        let check = self
            .install_checks
            .submit(key, move || async move { Ok(fs_ops.is_dir(&metadata_path).await) })?;

        let installed = check.await?;
        if installed {
            handle.mark_installed();
        }
        Ok(installed)
    }

    /// Make sure the mirror exists on disk, cloning it if necessary.
    ///
    /// A mirror already present on disk (from an earlier process) is
    /// adopted without cloning. Clone failures are classified into
    /// `RepositoryNotFound`, `AuthenticationRejected` or `InstallFailed`.
    pub async fn install(&self, handle: &RepositoryHandle) -> Result<()> {
        if handle.installed() {
            return Ok(());
        }

        let git_ops = Arc::clone(&self.git_ops);
        let fs_ops = Arc::clone(&self.fs_ops);
        let url = handle.url().to_string();
        let public_url = handle.public_url();
        let mirror_path = handle.mirror_path().to_path_buf();
        let metadata_path = handle.metadata_path().to_path_buf();
        let key = OperationKey::new(OperationKind::Install, handle.mirror_path());

        let operation = self.installs.submit(key, move || async move {
            if fs_ops.is_dir(&metadata_path).await {
                debug!("adopting existing mirror at {}", mirror_path.display());
                return Ok(());
            }

            match git_ops.clone_mirror(&url, &mirror_path).await {
                Ok(()) => {
                    info!("installed {} into {}", public_url, mirror_path.display());
                    Ok(())
                }
                Err(error) => {
                    let error = classify_install_failure(&public_url, &error.detail());
                    warn!("{}", error);
                    Err(error)
                }
            }
        })?;

        operation.await?;
        handle.mark_installed();
        Ok(())
    }

    /// Force-fetch all remotes into the mirror.
    ///
    /// Returns whether anything changed. Concurrent updates of one mirror
    /// share a single fetch.
    pub async fn update(&self, handle: &RepositoryHandle) -> Result<bool> {
        handle.require_installed("update")?;

        let git_ops = Arc::clone(&self.git_ops);
        let context = handle.local_context().clone();
        let key = OperationKey::new(OperationKind::Update, handle.mirror_path());

        let operation = self.updates.submit(key, move || async move {
            let progress = git_ops
                .fetch_all(&context)
                .await
                .map_err(|error| Error::UpdateFailed {
                    path: context.working_dir.clone(),
                    message: error.detail(),
                })?;
            let changed = parse_fetch(&progress);
            debug!(
                "fetched {} ({})",
                context.working_dir.display(),
                if changed { "changed" } else { "up to date" }
            );
            Ok(changed)
        })?;

        operation.await
    }
}

impl fmt::Debug for RepositoryManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepositoryManager")
            .field("cache", &self.cache)
            .field("installs", &self.installs)
            .field("updates", &self.updates)
            .finish()
    }
}
