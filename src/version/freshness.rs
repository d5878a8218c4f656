//! "Is this dependency up to date" verdicts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::{latest_version, semantic_latest, Version};

/// Freshness of a pinned version against an artifact's version history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Freshness {
    UpToDate,
    Outdated { latest: String },
    /// The history is empty or nothing in it can be parsed.
    Undefined,
}

impl Freshness {
    pub fn is_up_to_date(&self) -> bool {
        matches!(self, Self::UpToDate)
    }

    pub fn is_outdated(&self) -> bool {
        matches!(self, Self::Outdated { .. })
    }
}

impl fmt::Display for Freshness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UpToDate => write!(f, "up to date"),
            Self::Outdated { latest } => write!(f, "outdated (latest {latest})"),
            Self::Undefined => write!(f, "undefined"),
        }
    }
}

/// Computes the freshness of `pinned` against the known versions.
///
/// The verdict is `Undefined` when the history is empty or when no two
/// distinct versions among the history and `pinned` can be compared. If
/// only part of the history is comparable, the latest version follows the
/// lexicographic fallback of [`latest_version`].
pub fn freshness(pinned: &str, history: &[String]) -> Freshness {
    if history.is_empty() {
        return Freshness::Undefined;
    }

    let latest = match semantic_latest(history) {
        Ok(latest) => latest,
        Err(err) if !has_comparable_pair(pinned, history) => {
            tracing::debug!(pinned, error = %err, "version history is not comparable");
            return Freshness::Undefined;
        }
        Err(_) => latest_version(history),
    };

    match latest {
        Some(latest) if latest == pinned => Freshness::UpToDate,
        Some(latest) => Freshness::Outdated { latest },
        None => Freshness::Undefined,
    }
}

/// True if at least two distinct version strings parse and compare.
fn has_comparable_pair(pinned: &str, history: &[String]) -> bool {
    let distinct: BTreeSet<&str> = std::iter::once(pinned)
        .chain(history.iter().map(String::as_str))
        .collect();
    let parsed: Vec<Version> = distinct
        .into_iter()
        .filter_map(|raw| Version::parse(raw).ok())
        .collect();

    parsed
        .iter()
        .enumerate()
        .any(|(i, a)| parsed[i + 1..].iter().any(|b| a.compare(b).is_ok()))
}

/// Tri-state selection of dependency entries by freshness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreshnessFilter {
    #[default]
    All,
    UpToDate,
    Outdated,
}

impl FreshnessFilter {
    /// Whether an entry with the given verdict is kept.
    ///
    /// Undefined verdicts are only kept by [`FreshnessFilter::All`].
    pub fn keeps(&self, freshness: &Freshness) -> bool {
        match self {
            Self::All => true,
            Self::UpToDate => freshness.is_up_to_date(),
            Self::Outdated => freshness.is_outdated(),
        }
    }
}

impl FromStr for FreshnessFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "up-to-date" | "uptodate" | "true" => Ok(Self::UpToDate),
            "outdated" | "false" => Ok(Self::Outdated),
            _ => Err(format!(
                "Unknown freshness filter: '{}'. Valid values: all, up-to-date, outdated",
                s
            )),
        }
    }
}
