//! Version parsing, comparison and recency queries.
//!
//! Handled format: dot-separated decimal segments, optionally followed by a
//! `-qualifier` and/or a `-SNAPSHOT` suffix (`1.2.0`, `2.0-beta`,
//! `3.1-SNAPSHOT`, `3.1-rc-SNAPSHOT`). Comparison is a partial order:
//!
//! - different segment counts or different qualifiers are **incomparable**;
//! - strings without a leading numeric part are **not handled**.
//!
//! Neither outcome is ever treated as equality.
//!
//! # Example
//!
//! ```rust
//! use modcatalog::version::{latest_version, Version};
//! use std::cmp::Ordering;
//!
//! let a = Version::parse("1.2.0").unwrap();
//! let b = Version::parse("1.3.0").unwrap();
//! assert_eq!(a.compare(&b).unwrap(), Ordering::Less);
//!
//! let versions = vec!["1.0".to_string(), "1.10".to_string(), "1.9".to_string()];
//! assert_eq!(latest_version(&versions).as_deref(), Some("1.10"));
//! ```

mod freshness;

pub use freshness::{freshness, Freshness, FreshnessFilter};

use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

/// Why two versions could not be ordered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    /// The string does not match any supported format.
    #[error("Version format not handled: '{0}'")]
    NotHandled(String),

    /// Both parsed, but their structures cannot be ordered.
    #[error("Versions '{0}' and '{1}' are not comparable")]
    Incomparable(String, String),
}

/// A parsed version string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Version {
    raw: String,
    segments: Vec<u64>,
    qualifier: Option<String>,
    snapshot: bool,
}

impl Version {
    /// Parses a version string.
    pub fn parse(raw: &str) -> Result<Self, VersionError> {
        let not_handled = || VersionError::NotHandled(raw.to_string());
        let trimmed = raw.trim();

        let (body, snapshot) = match strip_suffix_ignore_case(trimmed, SNAPSHOT_SUFFIX) {
            Some(body) => (body, true),
            None => (trimmed, false),
        };

        let (numeric, qualifier) = match body.split_once('-') {
            Some((numeric, qualifier)) => (numeric, Some(qualifier)),
            None => (body, None),
        };

        if numeric.is_empty() || qualifier.is_some_and(str::is_empty) {
            return Err(not_handled());
        }

        let segments = numeric
            .split('.')
            .map(|segment| {
                if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(not_handled());
                }
                segment.parse::<u64>().map_err(|_| not_handled())
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            raw: raw.to_string(),
            segments,
            qualifier: qualifier.map(str::to_string),
            snapshot,
        })
    }

    pub fn segments(&self) -> &[u64] {
        &self.segments
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    pub fn is_snapshot(&self) -> bool {
        self.snapshot
    }

    /// Orders two versions.
    ///
    /// Segments are compared numerically; for equal segments a snapshot is
    /// older than the release it precedes.
    pub fn compare(&self, other: &Version) -> Result<Ordering, VersionError> {
        if self.segments.len() != other.segments.len() || self.qualifier != other.qualifier {
            return Err(VersionError::Incomparable(
                self.raw.clone(),
                other.raw.clone(),
            ));
        }

        let ordering = self
            .segments
            .cmp(&other.segments)
            .then_with(|| other.snapshot.cmp(&self.snapshot));
        Ok(ordering)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

fn strip_suffix_ignore_case<'a>(value: &'a str, suffix: &str) -> Option<&'a str> {
    let split = value.len().checked_sub(suffix.len())?;
    if !value.is_char_boundary(split) {
        return None;
    }
    let (head, tail) = value.split_at(split);
    tail.eq_ignore_ascii_case(suffix).then_some(head)
}

/// Parses and compares two version strings.
pub fn compare_versions(a: &str, b: &str) -> Result<Ordering, VersionError> {
    Version::parse(a)?.compare(&Version::parse(b)?)
}

/// Finds the latest of a set of version strings.
///
/// Keeps a running maximum with [`Version::compare`]. If any comparison
/// fails, the whole run falls back to the lexicographic maximum of the full
/// candidate set. That fallback is string ordering, not semantic ordering:
/// `"1.10"` loses to `"1.9"` once it kicks in.
pub fn latest_version(versions: &[String]) -> Option<String> {
    match semantic_latest(versions) {
        Ok(latest) => latest,
        Err(err) => {
            tracing::debug!(error = %err, "falling back to lexicographic latest version");
            versions.iter().max().cloned()
        }
    }
}

/// Latest version by semantic comparison only.
fn semantic_latest(versions: &[String]) -> Result<Option<String>, VersionError> {
    let mut latest: Option<Version> = None;

    for raw in versions {
        let candidate = Version::parse(raw)?;
        latest = match latest {
            Some(current) if current.compare(&candidate)? != Ordering::Less => Some(current),
            _ => Some(candidate),
        };
    }

    Ok(latest.map(|v| v.raw))
}
