//! # Semantic Version Tags
//!
//! This module turns a repository's tag list into its semantic versions and
//! answers range queries over them.
//!
//! ## Process
//!
//! 1.  **Parsing**: Each tag name is parsed as a version under a
//!     [`VersionMode`]. Tags that do not parse are dropped.
//! 2.  **Sorting**: The remaining tags are sorted newest first. Versions
//!     with equal precedence (e.g. `v1.0.0` and `1.0.0`, or two versions
//!     differing only in build metadata) keep their listing order.
//! 3.  **Range queries**: [`max_satisfying`] returns the newest tag whose
//!     version matches an npm-style range such as `~1.0.0`,
//!     `>=1.0.0 <2.0.0`, `1.0.0 - 1.2.0` or `^1 || ^2`. Each alternative is
//!     rewritten into a `semver::VersionReq` for matching.

use std::cmp::Ordering;
use std::sync::OnceLock;

use regex::Regex;
use semver::{BuildMetadata, Prerelease, Version, VersionReq};

use crate::error::{Error, Result};
use crate::references::ReferenceEntry;

/// How permissive tag-name parsing is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VersionMode {
    /// An optional leading `v` followed by a SemVer 2.0 version.
    #[default]
    Strict,
    /// Also accepts leading `=`/whitespace, zero-padded numbers and a
    /// prerelease without the `-` separator (`0.2.5c`).
    Loose,
}

impl VersionMode {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            VersionMode::Strict
        } else {
            VersionMode::Loose
        }
    }
}

/// A tag together with the version parsed from its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionTag {
    pub entry: ReferenceEntry,
    pub version: Version,
}

/// Parse a tag name as a version.
pub fn parse_tag_version(name: &str, mode: VersionMode) -> Option<Version> {
    match mode {
        VersionMode::Strict => {
            let stripped = name.strip_prefix('v').unwrap_or(name);
            Version::parse(stripped).ok()
        }
        VersionMode::Loose => parse_loose(name),
    }
}

fn parse_loose(name: &str) -> Option<Version> {
    static LOOSE_VERSION: OnceLock<Option<Regex>> = OnceLock::new();
    let pattern = LOOSE_VERSION
        .get_or_init(|| {
            Regex::new(
                r"^[v=\s]*(\d+)\.(\d+)\.(\d+)(?:-?([0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*))?(?:\+([0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*))?$",
            )
            .ok()
        })
        .as_ref()?;
    let captures = pattern.captures(name.trim())?;

    let number = |index: usize| captures.get(index)?.as_str().parse::<u64>().ok();
    let mut version = Version::new(number(1)?, number(2)?, number(3)?);
    if let Some(pre) = captures.get(4) {
        version.pre = Prerelease::new(pre.as_str()).ok()?;
    }
    if let Some(build) = captures.get(5) {
        version.build = BuildMetadata::new(build.as_str()).ok()?;
    }
    Some(version)
}

/// Precedence order, ignoring build metadata.
pub fn compare_precedence(a: &Version, b: &Version) -> Ordering {
    (a.major, a.minor, a.patch)
        .cmp(&(b.major, b.minor, b.patch))
        .then_with(|| a.pre.cmp(&b.pre))
}

/// Keep the tags that parse as versions, newest first.
pub fn sort_versions(tags: Vec<ReferenceEntry>, mode: VersionMode) -> Vec<VersionTag> {
    let mut versions: Vec<VersionTag> = tags
        .into_iter()
        .filter_map(|entry| {
            parse_tag_version(&entry.name, mode).map(|version| VersionTag { entry, version })
        })
        .collect();

    // stable: equal precedence keeps listing order
    versions.sort_by(|a, b| compare_precedence(&b.version, &a.version));
    versions
}

/// Characters that make up a comparator operator.
const OPERATOR_CHARS: &str = "<>=^~";

/// A range in npm `semver` syntax.
///
/// Alternatives are separated by `||` and match if any of them does. Each
/// alternative is a hyphen range (`1.0.0 - 1.2`) or a space-separated list
/// of comparators (`>=1.0.0 <2.0.0`), all of which must match. A bare
/// version is exact (`1.0.0`), a partial one is an X-range (`1.2`, `1.x`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    alternatives: Vec<VersionReq>,
}

impl VersionRange {
    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|req| req.matches(version))
    }
}

/// Parse a range expression.
pub fn parse_range(range: &str) -> Result<VersionRange> {
    let alternatives = range
        .split("||")
        .map(|alternative| {
            VersionReq::parse(&translate_alternative(alternative)).map_err(|e| {
                Error::InvalidRange {
                    range: range.to_string(),
                    message: e.to_string(),
                }
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(VersionRange { alternatives })
}

/// Rewrite one npm alternative as a comma-separated `VersionReq`.
fn translate_alternative(alternative: &str) -> String {
    let alternative = alternative.trim();
    let comparators: Vec<String> = match alternative.split_once(" - ") {
        Some((lower, upper)) => [lower_bound(lower.trim()), upper_bound(upper.trim())]
            .into_iter()
            .flatten()
            .collect(),
        None => join_operators(alternative.split_whitespace())
            .iter()
            .map(|comparator| translate_comparator(comparator))
            .collect(),
    };

    if comparators.is_empty() {
        "*".to_string()
    } else {
        comparators.join(", ")
    }
}

/// Glue operators written apart from their version (`>= 1.0.0`) back on.
fn join_operators<'a>(tokens: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut joined = Vec::new();
    let mut pending = String::new();
    for token in tokens {
        pending.push_str(token);
        if !token.chars().all(|c| OPERATOR_CHARS.contains(c)) {
            joined.push(std::mem::take(&mut pending));
        }
    }
    if !pending.is_empty() {
        joined.push(pending);
    }
    joined
}

fn translate_comparator(comparator: &str) -> String {
    let split = comparator
        .find(|c: char| !OPERATOR_CHARS.contains(c))
        .unwrap_or(comparator.len());
    let (operator, version) = comparator.split_at(split);
    let Some(version) = trim_wildcards(strip_v(version)) else {
        return "*".to_string();
    };
    match operator {
        // bare versions are exact, or X-ranges when partial
        "" => format!("={}", version),
        _ => format!("{}{}", operator, version),
    }
}

fn strip_v(version: &str) -> &str {
    version
        .strip_prefix(['v', 'V'])
        .unwrap_or(version)
}

/// Drop wildcard components (`1.x` becomes `1`). `None` if nothing is left.
fn trim_wildcards(version: &str) -> Option<String> {
    let core_end = version.find(['-', '+']).unwrap_or(version.len());
    let parts: Vec<&str> = version[..core_end].split('.').collect();
    match parts
        .iter()
        .position(|part| matches!(*part, "x" | "X" | "*" | ""))
    {
        Some(0) => None,
        Some(index) => Some(parts[..index].join(".")),
        None => Some(version.to_string()),
    }
}

fn lower_bound(bound: &str) -> Option<String> {
    trim_wildcards(strip_v(bound)).map(|version| format!(">={}", version))
}

/// A partial upper bound includes everything it covers: `- 1.2` is `<1.3.0`.
fn upper_bound(bound: &str) -> Option<String> {
    let version = trim_wildcards(strip_v(bound))?;
    let numbers: Option<Vec<u64>> = version.split('.').map(|part| part.parse().ok()).collect();
    Some(match numbers.as_deref() {
        Some([major]) => format!("<{}.0.0", major + 1),
        Some([major, minor]) => format!("<{}.{}.0", major, minor + 1),
        _ => format!("<={}", version),
    })
}

/// The newest of `versions` (sorted newest first) matching `range`.
pub fn max_satisfying(versions: &[VersionTag], range: &VersionRange) -> Option<ReferenceEntry> {
    versions
        .iter()
        .find(|tag| range.matches(&tag.version))
        .map(|tag| tag.entry.clone())
}
