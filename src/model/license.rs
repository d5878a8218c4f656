//! Licenses and organizations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A license known to the catalog, identified by its name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    pub name: String,
    #[serde(default)]
    pub long_name: String,
    #[serde(default)]
    pub url: String,
    /// `Some(true)` approved, `Some(false)` rejected, `None` not yet reviewed.
    #[serde(default)]
    pub approved: Option<bool>,
    /// Placeholder for a license name with no stored definition.
    #[serde(default)]
    pub unknown: bool,
}

impl License {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            long_name: String::new(),
            url: String::new(),
            approved: None,
            unknown: false,
        }
    }

    /// Sets the review outcome.
    pub fn with_approval(mut self, approved: bool) -> Self {
        self.approved = Some(approved);
        self
    }

    /// Builds the placeholder listed for an unresolved license name.
    pub fn unknown(name: impl Into<String>) -> Self {
        Self {
            unknown: true,
            ..Self::new(name)
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.approved == Some(false)
    }
}

impl fmt::Display for License {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unknown {
            write!(f, "{} (unknown)", self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

/// An organization and the groupId prefixes it publishes under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub name: String,
    #[serde(default)]
    pub corporate_group_id_prefixes: Vec<String>,
}

impl Organization {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            corporate_group_id_prefixes: Vec::new(),
        }
    }

    /// Adds a prefix unless already present. Returns true if it was added.
    pub fn add_corporate_group_id(&mut self, prefix: impl Into<String>) -> bool {
        let prefix = prefix.into();
        if self.corporate_group_id_prefixes.contains(&prefix) {
            return false;
        }
        self.corporate_group_id_prefixes.push(prefix);
        true
    }

    /// Removes a prefix. Returns true if it was present.
    pub fn remove_corporate_group_id(&mut self, prefix: &str) -> bool {
        let before = self.corporate_group_id_prefixes.len();
        self.corporate_group_id_prefixes.retain(|p| p != prefix);
        before != self.corporate_group_id_prefixes.len()
    }
}
