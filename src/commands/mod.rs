//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `repo-mirror` command-line tool. Each subcommand is defined in its own file.
//!
//! ## Structure
//!
//! Each command module contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and the [`Session`]
//!   built from the global options, and calls into the `repo_mirror` library.
//!
//! Commands that read the local mirror install it first, so every command can
//! be run against a repository that has never been fetched.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use repo_mirror::config::Config;
use repo_mirror::references::ReferenceEntry;
use repo_mirror::repository::{RepositoryHandle, RepositoryManager};

pub mod clean;
pub mod copy;
pub mod heads;
pub mod install;
pub mod max_satisfying;
pub mod refs;
pub mod resolve;
pub mod tags;
pub mod update;
pub mod versions;

/// Configuration shared by every command of one invocation.
pub struct Session {
    pub config: Config,
}

impl Session {
    /// Build the configuration from `--config`, the environment and
    /// `--cache-root`, in increasing order of precedence.
    pub fn load(config_path: Option<&Path>, cache_root: Option<PathBuf>) -> Result<Self> {
        let config = match config_path {
            Some(path) => Config::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => Config::from_env(),
        };
        let config = match cache_root {
            Some(cache_root) => config.with_cache_root(cache_root),
            None => config,
        };
        Ok(Self { config })
    }

    pub async fn manager(&self) -> Result<RepositoryManager> {
        let root = self.config.cache_root.clone();
        RepositoryManager::open(root.clone())
            .await
            .with_context(|| format!("Failed to open mirror cache at {}", root.display()))
    }

    /// The manager and handle for `target`.
    pub async fn open(&self, target: &RepoTarget) -> Result<(RepositoryManager, RepositoryHandle)> {
        let remote = self.config.remotes.get(&target.remote)?;
        let manager = self.manager().await?;
        let handle = manager.handle(remote, &target.owner, &target.repo).await?;
        Ok((manager, handle))
    }

    /// Like [`Session::open`], with the mirror installed.
    pub async fn open_installed(
        &self,
        target: &RepoTarget,
    ) -> Result<(RepositoryManager, RepositoryHandle)> {
        let (manager, handle) = self.open(target).await?;
        manager.install(&handle).await?;
        Ok((manager, handle))
    }
}

/// The repository a command operates on.
#[derive(Args, Debug)]
pub struct RepoTarget {
    /// Remote provider name or alias (github/gh, bitbucket/bb, or one
    /// declared in the config file)
    pub remote: String,

    /// Repository owner
    pub owner: String,

    /// Repository name
    pub repo: String,
}

/// Print entries as `name<TAB>commit` lines, or as a JSON array.
pub fn print_entries(entries: &[ReferenceEntry], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(entries)?);
    } else {
        for entry in entries {
            println!("{}\t{}", entry.name, entry.commit_id);
        }
    }
    Ok(())
}
