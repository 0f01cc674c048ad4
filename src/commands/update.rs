//! # Update Command Implementation
//!
//! Force-fetches every reference of a mirror, installing it first if needed,
//! and reports whether anything changed.

use anyhow::Result;
use clap::Args;

use super::{RepoTarget, Session};

/// Fetch all references of a mirrored repository
#[derive(Args, Debug)]
pub struct UpdateArgs {
    #[command(flatten)]
    pub target: RepoTarget,
}

/// Execute the `update` command.
pub async fn execute(args: UpdateArgs, session: &Session) -> Result<()> {
    let (manager, handle) = session.open_installed(&args.target).await?;
    let changed = manager.update(&handle).await?;
    println!("{}", if changed { "updated" } else { "up to date" });
    Ok(())
}
