//! # Max-Satisfying Command Implementation
//!
//! Prints the newest tag matching a version range. Exits with an error when
//! no tag matches.

use anyhow::{bail, Result};
use clap::Args;

use repo_mirror::version::parse_range;

use super::{print_entries, RepoTarget, Session};

/// Find the newest tagged version within a range
#[derive(Args, Debug)]
pub struct MaxSatisfyingArgs {
    #[command(flatten)]
    pub target: RepoTarget,

    /// Version range in npm syntax, e.g. "^1.2", "~0.1.3", ">=2.0.0 <3.0.0", "^1 || ^2"
    pub range: String,

    /// Query the remote instead of the local mirror
    #[arg(long = "remote", id = "remote_flag")]
    pub remote: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Execute the `max-satisfying` command.
pub async fn execute(args: MaxSatisfyingArgs, session: &Session) -> Result<()> {
    // reject a malformed range before touching the network
    parse_range(&args.range)?;

    let (manager, handle) = if args.remote {
        session.open(&args.target).await?
    } else {
        session.open_installed(&args.target).await?
    };
    match manager
        .max_satisfying(&handle, &args.range, args.remote)
        .await?
    {
        Some(entry) => print_entries(&[entry], args.json),
        None => bail!("No version satisfies \"{}\"", args.range),
    }
}
