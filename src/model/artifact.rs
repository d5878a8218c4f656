//! Artifact identity (GAVC) and artifact metadata.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{CatalogError, CatalogResult};

/// Delimiter joining the fields of a GAVC string.
pub const GAVC_DELIMITER: char = ':';

/// Composite artifact identity: groupId, artifactId, version, classifier.
///
/// The canonical string form ([`ArtifactKey::gavc`]) is the primary key used
/// for every lookup. An absent or empty classifier is omitted from it.
///
/// # Example
///
/// ```
/// use modcatalog::model::ArtifactKey;
///
/// let key = ArtifactKey::new("org.acme", "core", "1.0");
/// assert_eq!(key.gavc(), "org.acme:core:1.0");
///
/// let sources = key.clone().with_classifier("sources");
/// assert_eq!(sources.gavc(), "org.acme:core:1.0:sources");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArtifactKey {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
}

impl ArtifactKey {
    /// Creates a key without classifier.
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            classifier: None,
        }
    }

    /// Sets the classifier. An empty classifier is treated as absent.
    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        let classifier = classifier.into();
        self.classifier = if classifier.is_empty() {
            None
        } else {
            Some(classifier)
        };
        self
    }

    /// Returns the canonical GAVC string.
    pub fn gavc(&self) -> String {
        let mut gavc = format!(
            "{}{d}{}{d}{}",
            self.group_id,
            self.artifact_id,
            self.version,
            d = GAVC_DELIMITER
        );
        if let Some(classifier) = self.classifier.as_deref().filter(|c| !c.is_empty()) {
            gavc.push(GAVC_DELIMITER);
            gavc.push_str(classifier);
        }
        gavc
    }

    /// Parses a GAVC string back into a key.
    ///
    /// Group, artifact and version must be present and non-empty; a fourth
    /// field, when present, is the classifier.
    pub fn parse(gavc: &str) -> CatalogResult<Self> {
        let fields: Vec<&str> = gavc.split(GAVC_DELIMITER).collect();
        let invalid = || CatalogError::InvalidGavc(gavc.to_string());

        if !(3..=4).contains(&fields.len()) || fields[..3].iter().any(|f| f.is_empty()) {
            return Err(invalid());
        }

        let key = Self::new(fields[0], fields[1], fields[2]);
        Ok(match fields.get(3) {
            Some(classifier) => key.with_classifier(*classifier),
            None => key,
        })
    }

    /// Returns true if both keys name the same artifact line
    /// (same group, artifact and classifier), ignoring the version.
    pub fn same_line(&self, other: &ArtifactKey) -> bool {
        self.group_id == other.group_id
            && self.artifact_id == other.artifact_id
            && self.classifier.as_deref().unwrap_or("") == other.classifier.as_deref().unwrap_or("")
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.gavc())
    }
}

impl FromStr for ArtifactKey {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A published artifact and its catalog metadata.
///
/// Licenses are held by name; they are resolved against the store only when
/// listed, and names without a stored license become unknown placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    #[serde(flatten)]
    pub key: ArtifactKey,

    /// Packaging type (e.g., "jar", "pom").
    #[serde(rename = "type", default)]
    pub artifact_type: String,

    /// File extension of the published file.
    #[serde(default)]
    pub extension: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,

    /// Size in bytes, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    #[serde(default)]
    pub promoted: bool,

    /// Marks the artifact as disallowed for new dependencies.
    #[serde(default)]
    pub do_not_use: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    #[serde(default)]
    pub licenses: BTreeSet<String>,
}

impl Artifact {
    /// Creates an artifact with default metadata.
    pub fn new(key: ArtifactKey) -> Self {
        Self {
            key,
            artifact_type: String::new(),
            extension: String::new(),
            download_url: None,
            size: None,
            promoted: false,
            do_not_use: false,
            provider: None,
            licenses: BTreeSet::new(),
        }
    }

    /// Sets the packaging type and extension.
    pub fn with_type(mut self, artifact_type: impl Into<String>, extension: impl Into<String>) -> Self {
        self.artifact_type = artifact_type.into();
        self.extension = extension.into();
        self
    }

    /// Returns the canonical GAVC string.
    pub fn gavc(&self) -> String {
        self.key.gavc()
    }

    pub fn group_id(&self) -> &str {
        &self.key.group_id
    }

    pub fn version(&self) -> &str {
        &self.key.version
    }

    /// Attaches a license by name.
    pub fn add_license(&mut self, name: impl Into<String>) {
        self.licenses.insert(name.into());
    }

    pub fn has_license(&self, name: &str) -> bool {
        self.licenses.contains(name)
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)
    }
}
