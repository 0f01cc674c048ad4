//! # Tags Command Implementation

use anyhow::Result;
use clap::Args;

use super::{print_entries, RepoTarget, Session};

/// List tags
#[derive(Args, Debug)]
pub struct TagsArgs {
    #[command(flatten)]
    pub target: RepoTarget,

    /// Query the remote instead of the local mirror
    #[arg(long = "remote", id = "remote_flag")]
    pub remote: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Execute the `tags` command.
pub async fn execute(args: TagsArgs, session: &Session) -> Result<()> {
    let (manager, handle) = if args.remote {
        session.open(&args.target).await?
    } else {
        session.open_installed(&args.target).await?
    };
    let tags = manager.tags(&handle, args.remote).await?;
    print_entries(&tags, args.json)
}
