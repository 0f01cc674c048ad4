//! # Reference Parsing
//!
//! Parsers for the plumbing output of `git show-ref`, `git ls-remote`,
//! `git rev-parse` and `git fetch`. They are pure functions over text, which
//! keeps them testable without a repository.
//!
//! A reference listing is one `<sha> <refname>` pair per line, separated by
//! whitespace. Only `refs/heads/*` and `refs/tags/*` are kept. `HEAD` and the
//! peeled-tag entries (`refs/tags/v1.0.0^{}`) that `ls-remote` emits for
//! annotated tags are dropped.

use serde::Serialize;

use crate::defaults::FETCH_PROGRESS_PREFIX;

/// Marker git appends to the name of a peeled (dereferenced) tag entry.
pub const PEELED_TAG_MARKER: &str = "^{}";

/// A named reference and the commit it points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ReferenceEntry {
    pub name: String,
    pub commit_id: String,
}

impl ReferenceEntry {
    pub fn new(name: impl Into<String>, commit_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commit_id: commit_id.into(),
        }
    }
}

/// Branches and tags of a repository, in listing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReferenceSet {
    pub tags: Vec<ReferenceEntry>,
    pub heads: Vec<ReferenceEntry>,
}

impl ReferenceSet {
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.heads.is_empty()
    }
}

/// Parse a `show-ref` / `ls-remote` listing into a [`ReferenceSet`].
pub fn parse_references(listing: &str) -> ReferenceSet {
    let mut references = ReferenceSet::default();

    for line in listing.lines() {
        let mut fields = line.split_whitespace();
        let (Some(commit_id), Some(full_name)) = (fields.next(), fields.next()) else {
            continue;
        };

        if full_name == "HEAD" {
            continue;
        }

        if let Some(name) = full_name.strip_prefix("refs/tags/") {
            if name.is_empty() || name.contains(PEELED_TAG_MARKER) {
                continue;
            }
            references.tags.push(ReferenceEntry::new(name, commit_id));
        } else if let Some(name) = full_name.strip_prefix("refs/heads/") {
            if name.is_empty() {
                continue;
            }
            references.heads.push(ReferenceEntry::new(name, commit_id));
        }
    }

    references
}

/// Extract the first full commit id from resolution output.
///
/// Accepts both bare `rev-parse` output and `git show` headers
/// (`commit <sha>`).
pub fn parse_commit_id(output: &str) -> Option<String> {
    output
        .split_whitespace()
        .find(|token| is_full_commit_id(token))
        .map(str::to_string)
}

/// Whether `candidate` is a 40 character lowercase hex object id.
pub fn is_full_commit_id(candidate: &str) -> bool {
    candidate.len() == 40
        && candidate
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

/// Whether a `git fetch --all` changed anything.
///
/// Anything left after the "Fetching origin" banner means refs moved.
pub fn parse_fetch(output: &str) -> bool {
    let remainder = output.trim();
    let remainder = remainder
        .strip_prefix(FETCH_PROGRESS_PREFIX)
        .unwrap_or(remainder);
    !remainder.trim().is_empty()
}
