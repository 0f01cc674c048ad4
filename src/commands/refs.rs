//! # Refs Command Implementation
//!
//! Lists branches and tags of a repository, either from the local mirror or
//! straight from the remote. With `--remote` no mirror is created.

use anyhow::Result;
use clap::Args;

use super::{print_entries, RepoTarget, Session};

/// List branches and tags
#[derive(Args, Debug)]
pub struct RefsArgs {
    #[command(flatten)]
    pub target: RepoTarget,

    /// Only list references matching this pattern (e.g. a tag name)
    #[arg(long, value_name = "PATTERN")]
    pub filter: Option<String>,

    /// Query the remote instead of the local mirror
    #[arg(long = "remote", id = "remote_flag")]
    pub remote: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Execute the `refs` command.
pub async fn execute(args: RefsArgs, session: &Session) -> Result<()> {
    let (manager, handle) = if args.remote {
        session.open(&args.target).await?
    } else {
        session.open_installed(&args.target).await?
    };

    let references = manager
        .list_references(&handle, args.filter.as_deref(), args.remote)
        .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&references)?);
        return Ok(());
    }

    println!("heads:");
    print_entries(&references.heads, false)?;
    println!("tags:");
    print_entries(&references.tags, false)
}
