//! Default values for repo-mirror configuration.
//!
//! This module provides centralized default values and environment variable
//! names used across the library and the CLI.

use std::path::PathBuf;

/// Environment variable overriding the cache root.
pub const CACHE_ROOT_ENV: &str = "REPO_MIRROR_CACHE";

/// Environment variable holding inline credentials for GitHub.
pub const GITHUB_CREDENTIAL_ENV: &str = "REPO_MIRROR_GITHUB";

/// Environment variable holding inline credentials for Bitbucket.
pub const BITBUCKET_CREDENTIAL_ENV: &str = "REPO_MIRROR_BITBUCKET";

/// Prefix git prints before fetch progress when fetching all remotes.
pub const FETCH_PROGRESS_PREFIX: &str = "Fetching origin";

/// Returns the default cache root directory.
///
/// Uses the platform-appropriate cache directory:
/// - Linux: `~/.cache/repo-mirror` (XDG Base Directory)
/// - macOS: `~/Library/Caches/repo-mirror`
/// - Windows: `{FOLDERID_LocalAppData}\repo-mirror`
///
/// Falls back to `.repo-mirror-cache` in the current directory if the
/// platform cache directory cannot be determined.
///
/// This can be overridden by the `--cache-root` CLI flag or the
/// `REPO_MIRROR_CACHE` environment variable.
pub fn default_cache_root() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".repo-mirror-cache"))
        .join("repo-mirror")
}
