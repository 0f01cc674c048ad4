//! # Repo Mirror Library
//!
//! This library keeps local mirrors of remote git repositories and answers
//! questions about them: which branches and tags exist, what commit a
//! reference points at, which tag is the newest version in a range. It can
//! also export the tree at any reference into a directory.
//!
//! It is used by the `repo-mirror` command-line tool but is designed to be
//! embedded in services that fetch many repositories concurrently.
//!
//! ## Quick Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use repo_mirror::remote::RemoteDescriptor;
//! use repo_mirror::repository::RepositoryManager;
//!
//! # async fn run() -> repo_mirror::error::Result<()> {
//! let manager = RepositoryManager::open("/tmp/mirrors".into()).await?;
//! let handle = manager
//!     .handle(Arc::new(RemoteDescriptor::github()), "jonathanong", "routington")
//!     .await?;
//!
//! manager.install(&handle).await?;
//! let commit_id = manager.resolve(&handle, "master", true).await?;
//! let newest = manager.max_satisfying(&handle, "^1", false).await?;
//! # let _ = (commit_id, newest);
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! - **Mirrors (`repository`, `cache`)**: one on-disk clone without a
//!   working tree per `(provider, owner, repo)`, under a configurable cache
//!   root.
//! - **De-duplication (`registry`)**: concurrent installs or updates of the
//!   same mirror share one clone or fetch and observe one outcome.
//! - **Resolution (`resolver`, `references`, `version`)**: reference
//!   listing and parsing, commit resolution with a single update-and-retry
//!   escalation, and SemVer ordering of tags.
//! - **Export (`archive`)**: materializing the tree at a reference.
//! - **Collaborators (`git`, `filesystem`)**: traits for the side effects,
//!   with default implementations over the `git` binary and `tokio::fs`.

pub mod archive;
pub mod cache;
pub mod config;
pub mod defaults;
pub mod error;
pub mod filesystem;
pub mod git;
pub mod references;
pub mod registry;
pub mod remote;
pub mod repository;
pub mod resolver;
pub mod version;

#[cfg(test)]
mod mock_ops;
