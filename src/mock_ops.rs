//! Mock git and filesystem operations shared by the unit tests.
//!
//! Both mocks record every call so tests can assert how many subprocesses
//! a coordinator would have started.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::filesystem::FileSystemOperations;
use crate::git::{ExecContext, GitOperations};

pub const SHA_1_0_0: &str = "08c7518caf831f10c667e91e978c5103349bfd7f";
pub const SHA_0_1_3: &str = "d8f88b84e0269dd779073d45a41f9e58c000c15f";
pub const SHA_MASTER: &str = "fb86d51f293e8baa553a46e94a37bb0aa7584304";

#[derive(Default)]
struct MockGitState {
    calls: Vec<String>,
    clone_error: Option<String>,
    fetch_error: Option<String>,
    fetch_output: String,
    archive_error: Option<String>,
    commits: HashMap<String, String>,
    commits_after_fetch: HashMap<String, String>,
    local_refs: String,
    remote_refs: String,
}

/// Scripted stand-in for the `git` binary.
#[derive(Default)]
pub struct MockGitOperations {
    state: Mutex<MockGitState>,
    delay: Duration,
}

impl MockGitOperations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call take `delay`, so concurrent callers overlap.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_clone_error(mut self, message: &str) -> Self {
        self.state.get_mut().unwrap().clone_error = Some(message.to_string());
        self
    }

    pub fn with_fetch_error(mut self, message: &str) -> Self {
        self.state.get_mut().unwrap().fetch_error = Some(message.to_string());
        self
    }

    pub fn with_fetch_output(mut self, output: &str) -> Self {
        self.state.get_mut().unwrap().fetch_output = output.to_string();
        self
    }

    pub fn with_archive_error(mut self, message: &str) -> Self {
        self.state.get_mut().unwrap().archive_error = Some(message.to_string());
        self
    }

    /// `reference` resolves locally to `commit_id`.
    pub fn with_commit(mut self, reference: &str, commit_id: &str) -> Self {
        self.state
            .get_mut()
            .unwrap()
            .commits
            .insert(reference.to_string(), commit_id.to_string());
        self
    }

    /// `reference` only resolves once a fetch has run.
    pub fn with_commit_after_fetch(mut self, reference: &str, commit_id: &str) -> Self {
        self.state
            .get_mut()
            .unwrap()
            .commits_after_fetch
            .insert(reference.to_string(), commit_id.to_string());
        self
    }

    pub fn with_local_refs(mut self, listing: &str) -> Self {
        self.state.get_mut().unwrap().local_refs = listing.to_string();
        self
    }

    pub fn with_remote_refs(mut self, listing: &str) -> Self {
        self.state.get_mut().unwrap().remote_refs = listing.to_string();
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Number of recorded calls of one kind, e.g. `"clone"`.
    pub fn count(&self, kind: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.split_whitespace().next() == Some(kind))
            .count()
    }

    async fn record(&self, call: String) {
        self.state.lock().unwrap().calls.push(call);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

fn command_error(command: &str, stderr: &str) -> Error {
    Error::GitCommand {
        command: command.to_string(),
        stderr: stderr.to_string(),
    }
}

fn filter_listing(listing: &str, pattern: Option<&str>) -> String {
    let Some(pattern) = pattern else {
        return listing.to_string();
    };
    let suffix = format!("/{}", pattern);
    listing
        .lines()
        .filter(|line| {
            line.split_whitespace()
                .nth(1)
                .is_some_and(|name| name == pattern || name.ends_with(&suffix))
        })
        .map(|line| format!("{}\n", line))
        .collect()
}

#[async_trait]
impl GitOperations for MockGitOperations {
    async fn clone_mirror(&self, url: &str, target_dir: &Path) -> Result<()> {
        self.record(format!("clone {} {}", url, target_dir.display()))
            .await;
        match &self.state.lock().unwrap().clone_error {
            Some(message) => Err(command_error("git clone", message)),
            None => Ok(()),
        }
    }

    async fn fetch_all(&self, context: &ExecContext) -> Result<String> {
        self.record(format!("fetch {}", context.working_dir.display()))
            .await;
        let mut state = self.state.lock().unwrap();
        if let Some(message) = &state.fetch_error {
            return Err(command_error("git fetch", message));
        }
        let fetched: Vec<(String, String)> = state.commits_after_fetch.drain().collect();
        state.commits.extend(fetched);
        Ok(state.fetch_output.clone())
    }

    async fn rev_parse(&self, _context: &ExecContext, reference: &str) -> Result<String> {
        self.record(format!("rev-parse {}", reference)).await;
        match self.state.lock().unwrap().commits.get(reference) {
            Some(commit_id) => Ok(format!("{}\n", commit_id)),
            None => Err(command_error("git rev-parse", "")),
        }
    }

    async fn show_ref(&self, _context: &ExecContext, pattern: Option<&str>) -> Result<String> {
        self.record(format!("show-ref {}", pattern.unwrap_or_default()))
            .await;
        Ok(filter_listing(&self.state.lock().unwrap().local_refs, pattern))
    }

    async fn ls_remote(
        &self,
        _context: &ExecContext,
        url: &str,
        pattern: Option<&str>,
    ) -> Result<String> {
        self.record(format!("ls-remote {}", url)).await;
        Ok(filter_listing(&self.state.lock().unwrap().remote_refs, pattern))
    }

    async fn archive(
        &self,
        _context: &ExecContext,
        reference: &str,
        target_dir: &Path,
    ) -> Result<()> {
        self.record(format!("archive {} {}", reference, target_dir.display()))
            .await;
        match &self.state.lock().unwrap().archive_error {
            Some(message) => Err(command_error("git archive", message)),
            None => Ok(()),
        }
    }
}

/// In-memory directory tree.
#[derive(Default)]
pub struct MockFileSystemOperations {
    dirs: Mutex<HashSet<PathBuf>>,
}

impl MockFileSystemOperations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `path` (and its ancestors) present.
    pub fn with_dir(self, path: &Path) -> Self {
        self.insert(path);
        self
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.dirs.lock().unwrap().contains(path)
    }

    fn insert(&self, path: &Path) {
        let mut dirs = self.dirs.lock().unwrap();
        for ancestor in path.ancestors() {
            if !ancestor.as_os_str().is_empty() {
                dirs.insert(ancestor.to_path_buf());
            }
        }
    }
}

#[async_trait]
impl FileSystemOperations for MockFileSystemOperations {
    async fn is_dir(&self, path: &Path) -> bool {
        self.contains(path)
    }

    async fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.insert(path);
        Ok(())
    }

    async fn remove_dir_all(&self, path: &Path) -> Result<()> {
        self.dirs
            .lock()
            .unwrap()
            .retain(|dir| !dir.starts_with(path));
        Ok(())
    }
}
