//! # Git Subprocesses
//!
//! All version-control work shells out to the system `git` binary through
//! [`tokio::process::Command`]. The [`GitOperations`] trait is the seam the
//! rest of the crate talks to, so tests can substitute a mock that counts
//! invocations instead of spawning processes.
//!
//! Output is decoded as UTF-8, lossily. `GIT_TERMINAL_PROMPT=0` is set on
//! every command so that a remote asking for credentials fails instead of
//! blocking on a terminal prompt.

use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};

use async_trait::async_trait;
use log::{debug, warn};
use tokio::process::Command;

use crate::error::{Error, Result};

/// Where a git command runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecContext {
    pub working_dir: PathBuf,
}

impl ExecContext {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }
}

/// Trait for git operations - allows mocking in tests
#[async_trait]
pub trait GitOperations: Send + Sync {
    /// Clone `url` into `target_dir` with submodules and no working tree.
    async fn clone_mirror(&self, url: &str, target_dir: &Path) -> Result<()>;

    /// Force-fetch every remote. Returns the combined progress output.
    async fn fetch_all(&self, context: &ExecContext) -> Result<String>;

    /// Resolve `reference` to the commit it names.
    async fn rev_parse(&self, context: &ExecContext, reference: &str) -> Result<String>;

    /// List local references, optionally restricted to `pattern`.
    async fn show_ref(&self, context: &ExecContext, pattern: Option<&str>) -> Result<String>;

    /// List the references advertised by `url`, optionally restricted to
    /// `pattern`.
    async fn ls_remote(
        &self,
        context: &ExecContext,
        url: &str,
        pattern: Option<&str>,
    ) -> Result<String>;

    /// Extract the tree at `reference` into the existing `target_dir`.
    async fn archive(&self, context: &ExecContext, reference: &str, target_dir: &Path)
        -> Result<()>;
}

/// The default implementation of `GitOperations`, which runs the system
/// `git` command.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultGitOperations;

fn git_command(context: Option<&ExecContext>) -> Command {
    let mut cmd = Command::new("git");
    if let Some(context) = context {
        cmd.current_dir(&context.working_dir);
    }
    cmd.env("GIT_TERMINAL_PROMPT", "0");
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    cmd
}

async fn output_of(mut cmd: Command, name: &str) -> Result<Output> {
    debug!("spawning {}", name);
    cmd.output().await.map_err(|e| Error::GitCommand {
        command: name.to_string(),
        stderr: e.to_string(),
    })
}

fn failure(name: &str, output: &Output) -> Error {
    Error::GitCommand {
        command: name.to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
}

/// Run a command and return its stdout, failing on a non-zero exit.
async fn run(cmd: Command, name: &str) -> Result<String> {
    let output = output_of(cmd, name).await?;
    if !output.status.success() {
        return Err(failure(name, &output));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[async_trait]
impl GitOperations for DefaultGitOperations {
    async fn clone_mirror(&self, url: &str, target_dir: &Path) -> Result<()> {
        let mut cmd = git_command(None);
        cmd.args(["clone", "--recursive", "--no-checkout", url])
            .arg(target_dir);
        run(cmd, "git clone").await?;
        debug!("git clone into {} succeeded", target_dir.display());
        Ok(())
    }

    async fn fetch_all(&self, context: &ExecContext) -> Result<String> {
        let mut cmd = git_command(Some(context));
        cmd.args(["fetch", "-f", "--all"]);
        let name = "git fetch";
        let output = output_of(cmd, name).await?;
        if !output.status.success() {
            return Err(failure(name, &output));
        }
        // ref updates are reported on stderr, the banner on stdout
        let mut progress = String::from_utf8_lossy(&output.stdout).into_owned();
        progress.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(progress)
    }

    async fn rev_parse(&self, context: &ExecContext, reference: &str) -> Result<String> {
        if reference.starts_with('-') {
            return Err(Error::GitCommand {
                command: "git rev-parse".to_string(),
                stderr: format!("refusing option-like reference `{}`", reference),
            });
        }
        let mut cmd = git_command(Some(context));
        cmd.args(["rev-parse", "--verify", "--quiet"])
            .arg(format!("{}^{{commit}}", reference));
        run(cmd, "git rev-parse").await
    }

    async fn show_ref(&self, context: &ExecContext, pattern: Option<&str>) -> Result<String> {
        let mut cmd = git_command(Some(context));
        cmd.arg("show-ref");
        if let Some(pattern) = pattern {
            cmd.arg("--").arg(pattern);
        }
        let name = "git show-ref";
        let output = output_of(cmd, name).await?;
        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
        }
        // exit status 1 without a message just means nothing matched
        if output.status.code() == Some(1) && output.stderr.iter().all(u8::is_ascii_whitespace) {
            return Ok(String::new());
        }
        Err(failure(name, &output))
    }

    async fn ls_remote(
        &self,
        context: &ExecContext,
        url: &str,
        pattern: Option<&str>,
    ) -> Result<String> {
        let mut cmd = git_command(Some(context));
        cmd.args(["ls-remote", url]);
        if let Some(pattern) = pattern {
            cmd.arg(pattern);
        }
        run(cmd, "git ls-remote").await
    }

    async fn archive(
        &self,
        context: &ExecContext,
        reference: &str,
        target_dir: &Path,
    ) -> Result<()> {
        if reference.starts_with('-') {
            return Err(Error::GitCommand {
                command: "git archive".to_string(),
                stderr: format!("refusing option-like reference `{}`", reference),
            });
        }

        let mut archive = git_command(Some(context));
        archive.args(["archive", "--format=tar", reference]);
        debug!("spawning git archive {} | tar -x", reference);
        let mut archive = archive.spawn().map_err(|e| Error::GitCommand {
            command: "git archive".to_string(),
            stderr: e.to_string(),
        })?;

        let tar_input: Result<Stdio> = match archive.stdout.take() {
            Some(stdout) => TryInto::<Stdio>::try_into(stdout).map_err(Error::from),
            None => Err(Error::GitCommand {
                command: "git archive".to_string(),
                stderr: "archive output was not captured".to_string(),
            }),
        };
        let tar_input = match tar_input {
            Ok(tar_input) => tar_input,
            Err(e) => {
                if let Err(kill_error) = archive.kill().await {
                    warn!("failed to reap git archive: {}", kill_error);
                }
                return Err(e);
            }
        };

        let mut extract = Command::new("tar");
        extract
            .arg("-x")
            .arg("-C")
            .arg(target_dir)
            .stdin(tar_input)
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        // tar owns the only read end; if it cannot start, git archive sees a
        // broken pipe and exits
        let (extracted, archived) = tokio::join!(
            output_of(extract, "tar -x"),
            archive.wait_with_output()
        );
        let extracted = extracted?;
        let archived = archived?;

        if !archived.status.success() {
            return Err(failure("git archive", &archived));
        }
        if !extracted.status.success() {
            return Err(failure("tar -x", &extracted));
        }
        Ok(())
    }
}
