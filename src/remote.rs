//! # Remote Providers
//!
//! A [`RemoteDescriptor`] names a hosting provider and knows how to turn an
//! `(owner, repo)` pair into a fetchable URL. If a credential was configured
//! for the provider it is embedded in the URL as inline userinfo.
//!
//! Credentials are captured once, when the descriptor is built; changing the
//! environment afterwards has no effect on existing descriptors.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use url::Url;

use crate::defaults::{BITBUCKET_CREDENTIAL_ENV, GITHUB_CREDENTIAL_ENV};
use crate::error::{Error, Result};

/// A remote hosting provider.
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteDescriptor {
    name: String,
    host: String,
    credential: Option<String>,
}

impl RemoteDescriptor {
    /// Build a descriptor for `host`, validating that it forms a URL.
    pub fn new(name: &str, host: &str, credential: Option<String>) -> Result<Self> {
        let parsed = Url::parse(&format!("https://{}/", host))?;
        if parsed.host_str().is_none() || parsed.path() != "/" {
            return Err(Error::ConfigParse {
                message: format!("remote `{}` has an invalid host `{}`", name, host),
                hint: Some("Use a bare host name such as `github.com`".to_string()),
            });
        }

        Ok(Self {
            name: name.to_string(),
            host: host.to_string(),
            credential: credential.filter(|c| !c.is_empty()),
        })
    }

    /// GitHub, with the credential read from `REPO_MIRROR_GITHUB`.
    pub fn github() -> Self {
        Self {
            name: "github".to_string(),
            host: "github.com".to_string(),
            credential: credential_from_env(GITHUB_CREDENTIAL_ENV),
        }
    }

    /// Bitbucket, with the credential read from `REPO_MIRROR_BITBUCKET`.
    pub fn bitbucket() -> Self {
        Self {
            name: "bitbucket".to_string(),
            host: "bitbucket.org".to_string(),
            credential: credential_from_env(BITBUCKET_CREDENTIAL_ENV),
        }
    }

    /// Provider name; also the first path component of its mirrors.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    /// The fetch URL for `owner/repo` on this provider.
    pub fn url_of(&self, owner: &str, repo: &str) -> String {
        match &self.credential {
            Some(credential) => format!("https://{}@{}/{}/{}", credential, self.host, owner, repo),
            None => self.public_url_of(owner, repo),
        }
    }

    /// The URL for `owner/repo` without credentials, for messages and logs.
    pub fn public_url_of(&self, owner: &str, repo: &str) -> String {
        format!("https://{}/{}/{}", self.host, owner, repo)
    }
}

impl fmt::Debug for RemoteDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteDescriptor")
            .field("name", &self.name)
            .field("host", &self.host)
            .field(
                "credential",
                &self.credential.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

fn credential_from_env(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|value| !value.is_empty())
}

/// Registered remote providers, addressable by name or alias.
#[derive(Debug, Clone, Default)]
pub struct Remotes {
    by_name: BTreeMap<String, Arc<RemoteDescriptor>>,
}

impl Remotes {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in providers: `github` (alias `gh`) and `bitbucket`
    /// (alias `bb`).
    pub fn builtin() -> Self {
        let mut remotes = Self::new();
        remotes.register(RemoteDescriptor::github(), &["gh"]);
        remotes.register(RemoteDescriptor::bitbucket(), &["bb"]);
        remotes
    }

    /// Register `remote` under its own name and every alias, replacing any
    /// provider previously registered under those names.
    pub fn register(&mut self, remote: RemoteDescriptor, aliases: &[&str]) {
        let remote = Arc::new(remote);
        for alias in aliases {
            self.by_name.insert(alias.to_string(), Arc::clone(&remote));
        }
        self.by_name.insert(remote.name().to_string(), remote);
    }

    pub fn get(&self, name: &str) -> Result<Arc<RemoteDescriptor>> {
        self.by_name
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownRemote {
                name: name.to_string(),
            })
    }

    /// Names and aliases currently registered, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }
}
