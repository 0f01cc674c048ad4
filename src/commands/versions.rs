//! # Versions Command Implementation
//!
//! Lists the tags whose names are semantic versions, newest first. Strict
//! parsing is the default; `--loose` also accepts forms like `=1.2.3` or
//! `v01.2.3`.

use anyhow::Result;
use clap::Args;

use repo_mirror::version::VersionMode;

use super::{print_entries, RepoTarget, Session};

/// List version tags, newest first
#[derive(Args, Debug)]
pub struct VersionsArgs {
    #[command(flatten)]
    pub target: RepoTarget,

    /// Query the remote instead of the local mirror
    #[arg(long = "remote", id = "remote_flag")]
    pub remote: bool,

    /// Accept loosely formatted version tags
    #[arg(long)]
    pub loose: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Execute the `versions` command.
pub async fn execute(args: VersionsArgs, session: &Session) -> Result<()> {
    let (manager, handle) = if args.remote {
        session.open(&args.target).await?
    } else {
        session.open_installed(&args.target).await?
    };
    let versions = manager
        .versions(&handle, args.remote, VersionMode::from_strict(!args.loose))
        .await?;
    print_entries(&versions, args.json)
}
