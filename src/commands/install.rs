//! # Install Command Implementation
//!
//! Clones a repository into the cache, or adopts a mirror already on disk.
//! A failure whose cause the remote made clear reports the HTTP-equivalent
//! status alongside the message.

use anyhow::{anyhow, Result};
use clap::Args;

use super::{RepoTarget, Session};

/// Clone a repository into the cache
#[derive(Args, Debug)]
pub struct InstallArgs {
    #[command(flatten)]
    pub target: RepoTarget,
}

/// Execute the `install` command.
pub async fn execute(args: InstallArgs, session: &Session) -> Result<()> {
    let (manager, handle) = session.open(&args.target).await?;

    if let Err(error) = manager.install(&handle).await {
        return Err(match error.status() {
            Some(status) => anyhow!("[{}] {}", status, error),
            None => error.into(),
        });
    }

    println!("{}", handle.mirror_path().display());
    Ok(())
}
