//! # Clean Command Implementation

use anyhow::Result;
use clap::Args;

use super::Session;

/// Remove every mirror from the cache
#[derive(Args, Debug)]
pub struct CleanArgs {}

/// Execute the `clean` command.
pub async fn execute(_args: CleanArgs, session: &Session) -> Result<()> {
    let manager = session.manager().await?;
    manager.clean().await?;
    println!("Cleaned {}", manager.cache_root().display());
    Ok(())
}
