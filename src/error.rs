//! # Error Handling
//!
//! This module defines the centralized error type for `repo-mirror`. It uses
//! the `thiserror` library to build an `Error` enum covering every failure
//! the mirror layer can surface, with descriptive messages.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. The first group of variants is the failure
//!   taxonomy callers are expected to match on:
//!   - `RepositoryNotFound` / `AuthenticationRejected` / `InstallFailed` for
//!     a failed clone, classified from the remote's error text.
//!   - `UpdateFailed` for a failed fetch.
//!   - `ReferenceNotFound` when a reference cannot be resolved.
//!   - `PreconditionViolation` when a mirror operation is attempted before
//!     the mirror was installed.
//!
//!   The remaining variants carry plumbing failures (git subprocesses,
//!   configuration, I/O, URL and range parsing, lock poisoning).
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! `Error` is `Clone`: a single in-flight install or update hands the same
//! outcome to every caller joined on it, so the failure value is cloned per
//! caller. Sources that are not `Clone` themselves are kept behind an `Arc`.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use thiserror::Error;

/// Main error type for repo-mirror operations
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// The remote reported that the repository does not exist.
    #[error("Repository not found: {url}: {message}")]
    RepositoryNotFound { url: String, message: String },

    /// The remote rejected the configured credentials.
    #[error("Authentication rejected for {url}: {message}")]
    AuthenticationRejected { url: String, message: String },

    /// Cloning the mirror failed for any other reason.
    #[error("Install failed for {url}: {message}")]
    InstallFailed { url: String, message: String },

    /// Fetching into an existing mirror failed.
    #[error("Update failed for {}: {message}", path.display())]
    UpdateFailed { path: PathBuf, message: String },

    /// A reference could not be resolved to a commit id.
    #[error("Reference not found: {reference}{}", if message.is_empty() { String::new() } else { format!(" ({})", message) })]
    ReferenceNotFound { reference: String, message: String },

    /// A mirror operation was attempted before the mirror was installed.
    #[error("Precondition violated: `{operation}` requires an installed mirror at {}", path.display())]
    PreconditionViolation {
        operation: &'static str,
        path: PathBuf,
    },

    /// A git subprocess could not be spawned or exited unsuccessfully.
    #[error("Git command failed: {command} - {stderr}")]
    GitCommand { command: String, stderr: String },

    /// No remote provider is registered under the given name or alias.
    #[error("Unsupported remote: \"{name}\"")]
    UnknownRemote { name: String },

    /// A provider, owner or repository name is not a single path segment.
    #[error("Invalid repository name segment: \"{name}\"")]
    InvalidName { name: String },

    /// A version range expression could not be parsed.
    #[error("Invalid version range \"{range}\": {message}")]
    InvalidRange { range: String, message: String },

    /// The configuration file or environment could not be interpreted.
    #[error("Configuration error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(Arc<std::io::Error>),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// An error indicating that a mutex has been poisoned.
    #[error("Lock poisoned: {context}")]
    LockPoisoned { context: String },
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(Arc::new(err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::ConfigParse {
            message: err.to_string(),
            hint: None,
        }
    }
}

impl Error {
    /// HTTP-equivalent status for errors that have one.
    ///
    /// `RepositoryNotFound` is a 404 and `AuthenticationRejected` a 403;
    /// everything else has no meaningful status.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::RepositoryNotFound { .. } => Some(404),
            Error::AuthenticationRejected { .. } => Some(403),
            _ => None,
        }
    }

    /// The text a failed subprocess reported, or the display form otherwise.
    pub(crate) fn detail(&self) -> String {
        match self {
            Error::GitCommand { stderr, .. } => stderr.clone(),
            other => other.to_string(),
        }
    }
}

/// Classify a failed clone from the remote's error message.
///
/// This is a best-effort mapping over free text. Providers word these
/// messages differently and may change them, so only the literal phrases
/// below are recognised, case-insensitively.
pub fn classify_install_failure(url: &str, message: &str) -> Error {
    let message = message.trim().to_string();
    let url = url.to_string();
    if matches_pattern(not_found_pattern(), &message) {
        Error::RepositoryNotFound { url, message }
    } else if matches_pattern(rejected_pattern(), &message) {
        Error::AuthenticationRejected { url, message }
    } else {
        Error::InstallFailed { url, message }
    }
}

fn not_found_pattern() -> Option<&'static Regex> {
    static NOT_FOUND: OnceLock<Option<Regex>> = OnceLock::new();
    NOT_FOUND
        .get_or_init(|| Regex::new(r"(?i)repository not found").ok())
        .as_ref()
}

fn rejected_pattern() -> Option<&'static Regex> {
    static REJECTED: OnceLock<Option<Regex>> = OnceLock::new();
    REJECTED
        .get_or_init(|| Regex::new(r"(?i)invalid username or password").ok())
        .as_ref()
}

fn matches_pattern(pattern: Option<&Regex>, message: &str) -> bool {
    pattern.is_some_and(|re| re.is_match(message))
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
