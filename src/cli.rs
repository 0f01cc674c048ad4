//! CLI argument parsing and command dispatch

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::{self, Session};

/// Repo Mirror - Local mirrors of remote git repositories
#[derive(Parser, Debug)]
#[command(name = "repo-mirror")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// The root directory for the mirror cache.
    ///
    /// Defaults to the system cache directory (`~/.cache/repo-mirror` on
    /// Linux). Can also be set with the `REPO_MIRROR_CACHE` environment
    /// variable.
    #[arg(long, global = true, value_name = "DIR", env = "REPO_MIRROR_CACHE")]
    cache_root: Option<PathBuf>,

    /// YAML file declaring additional remotes and the cache root
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Clone a repository into the cache if it is not there yet
    Install(commands::install::InstallArgs),

    /// Fetch all references of a mirrored repository
    Update(commands::update::UpdateArgs),

    /// Resolve a branch, tag or abbreviated commit id to a full commit id
    Resolve(commands::resolve::ResolveArgs),

    /// List branches and tags
    Refs(commands::refs::RefsArgs),

    /// List branches
    Heads(commands::heads::HeadsArgs),

    /// List tags
    Tags(commands::tags::TagsArgs),

    /// List tags that are versions, newest first
    Versions(commands::versions::VersionsArgs),

    /// Find the newest tagged version within a range
    MaxSatisfying(commands::max_satisfying::MaxSatisfyingArgs),

    /// Export the tree at a reference into a directory
    Copy(commands::copy::CopyArgs),

    /// Remove every mirror from the cache
    Clean(commands::clean::CleanArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(self.log_level.as_str()),
        )
        .init();

        let session = Session::load(self.config.as_deref(), self.cache_root)?;
        match self.command {
            Commands::Install(args) => commands::install::execute(args, &session).await,
            Commands::Update(args) => commands::update::execute(args, &session).await,
            Commands::Resolve(args) => commands::resolve::execute(args, &session).await,
            Commands::Refs(args) => commands::refs::execute(args, &session).await,
            Commands::Heads(args) => commands::heads::execute(args, &session).await,
            Commands::Tags(args) => commands::tags::execute(args, &session).await,
            Commands::Versions(args) => commands::versions::execute(args, &session).await,
            Commands::MaxSatisfying(args) => {
                commands::max_satisfying::execute(args, &session).await
            }
            Commands::Copy(args) => commands::copy::execute(args, &session).await,
            Commands::Clean(args) => commands::clean::execute(args, &session).await,
        }
    }
}
