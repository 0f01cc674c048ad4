//! # Resolve Command Implementation

use anyhow::Result;
use clap::Args;

use super::{RepoTarget, Session};

/// Resolve a reference to a full commit id
#[derive(Args, Debug)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub target: RepoTarget,

    /// Branch, tag or (abbreviated) commit id
    pub reference: String,

    /// Update the mirror and retry once if the reference is not found locally
    #[arg(long = "remote", id = "remote_flag")]
    pub remote: bool,
}

/// Execute the `resolve` command.
pub async fn execute(args: ResolveArgs, session: &Session) -> Result<()> {
    let (manager, handle) = session.open_installed(&args.target).await?;
    let commit_id = manager
        .resolve(&handle, &args.reference, args.remote)
        .await?;
    println!("{}", commit_id);
    Ok(())
}
