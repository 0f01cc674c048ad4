//! # Copy Command Implementation
//!
//! Exports the tree at a reference into a directory, installing the mirror
//! first if needed.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use super::{RepoTarget, Session};

/// Export the tree at a reference into a directory
#[derive(Args, Debug)]
pub struct CopyArgs {
    #[command(flatten)]
    pub target: RepoTarget,

    /// Branch, tag or commit id to export
    pub reference: String,

    /// Directory to write the tree into; created if missing
    #[arg(value_name = "DIR")]
    pub destination: PathBuf,
}

/// Execute the `copy` command.
pub async fn execute(args: CopyArgs, session: &Session) -> Result<()> {
    let (manager, handle) = session.open_installed(&args.target).await?;
    manager
        .copy(&handle, &args.reference, &args.destination)
        .await?;
    println!("{}", args.destination.display());
    Ok(())
}
