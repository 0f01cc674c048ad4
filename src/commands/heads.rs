//! # Heads Command Implementation

use anyhow::Result;
use clap::Args;

use super::{print_entries, RepoTarget, Session};

/// List branches
#[derive(Args, Debug)]
pub struct HeadsArgs {
    #[command(flatten)]
    pub target: RepoTarget,

    /// Query the remote instead of the local mirror
    #[arg(long = "remote", id = "remote_flag")]
    pub remote: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Execute the `heads` command.
pub async fn execute(args: HeadsArgs, session: &Session) -> Result<()> {
    let (manager, handle) = if args.remote {
        session.open(&args.target).await?
    } else {
        session.open_installed(&args.target).await?
    };
    let heads = manager.heads(&handle, args.remote).await?;
    print_entries(&heads, args.json)
}
