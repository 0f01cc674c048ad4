//! # Configuration
//!
//! Process-wide configuration consumed by the mirror layer: where mirrors
//! live on disk and which remote providers are available (with their
//! credentials).
//!
//! Configuration is assembled from three layers, later layers winning:
//!
//! 1.  Built-in defaults: the platform cache directory and the `github` /
//!     `bitbucket` providers.
//! 2.  An optional YAML file (see [`ConfigFile`]) that can move the cache
//!     root and declare additional providers.
//! 3.  The `REPO_MIRROR_CACHE` environment variable.
//!
//! Credentials are read from the environment once, while the configuration
//! is built, and are never re-read afterwards.
//!
//! ## File Format
//!
//! ```yaml
//! cache_root: /var/cache/mirrors
//! remotes:
//!   - name: gitea
//!     host: git.example.com
//!     aliases: [ge]
//!     credential_env: MIRROR_GITEA_TOKEN
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::defaults::{default_cache_root, CACHE_ROOT_ENV};
use crate::error::{Error, Result};
use crate::remote::{RemoteDescriptor, Remotes};

/// On-disk representation of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Root directory under which mirrors are stored.
    #[serde(default)]
    pub cache_root: Option<PathBuf>,
    /// Additional remote providers.
    #[serde(default)]
    pub remotes: Vec<RemoteEntry>,
}

/// A remote provider declared in the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoteEntry {
    pub name: String,
    pub host: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Name of the environment variable holding this provider's credential.
    #[serde(default)]
    pub credential_env: Option<String>,
}

/// Resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub cache_root: PathBuf,
    pub remotes: Remotes,
}

impl Config {
    /// Built-in defaults overlaid with the environment.
    pub fn from_env() -> Self {
        Self {
            cache_root: cache_root_from_env().unwrap_or_else(default_cache_root),
            remotes: Remotes::builtin(),
        }
    }

    /// Load configuration from a YAML file, overlaid with the environment.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::ConfigParse {
            message: format!("cannot read {}: {}", path.display(), e),
            hint: None,
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from YAML text, overlaid with the environment.
    pub fn parse(yaml_content: &str) -> Result<Self> {
        let file: ConfigFile = if yaml_content.trim().is_empty() {
            ConfigFile::default()
        } else {
            serde_yaml::from_str(yaml_content)?
        };
        Self::from_config_file(file)
    }

    fn from_config_file(file: ConfigFile) -> Result<Self> {
        let mut remotes = Remotes::builtin();
        for entry in file.remotes {
            if entry.name.is_empty() {
                return Err(Error::ConfigParse {
                    message: format!("remote with host `{}` has no name", entry.host),
                    hint: Some("Add 'name:' to the remote entry".to_string()),
                });
            }
            let credential = entry
                .credential_env
                .as_deref()
                .and_then(|var| std::env::var(var).ok());
            let remote = RemoteDescriptor::new(&entry.name, &entry.host, credential)?;
            let aliases: Vec<&str> = entry.aliases.iter().map(String::as_str).collect();
            remotes.register(remote, &aliases);
        }

        let cache_root = cache_root_from_env()
            .or(file.cache_root)
            .unwrap_or_else(default_cache_root);

        Ok(Self {
            cache_root,
            remotes,
        })
    }

    /// Override the cache root, e.g. from a command-line flag.
    pub fn with_cache_root(mut self, cache_root: PathBuf) -> Self {
        self.cache_root = cache_root;
        self
    }
}

fn cache_root_from_env() -> Option<PathBuf> {
    std::env::var_os(CACHE_ROOT_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}
