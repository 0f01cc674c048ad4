//! # Repo Mirror CLI
//!
//! This is the binary entry point for the `repo-mirror` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Setting up logging and the tokio runtime.
//! - Executing the appropriate command and reporting its error, if any.
//!
//! The mirror logic lives in the `repo_mirror` library crate; the binary is a
//! thin wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute().await
}
