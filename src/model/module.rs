//! Modules, their identity and their dependency edges.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Delimiter joining a module name and version into a module ID.
pub const MODULE_ID_DELIMITER: char = ':';

/// Builds a module ID from its name and version.
///
/// ```
/// use modcatalog::model::module_id;
///
/// assert_eq!(module_id("org.acme:core", "1.0"), "org.acme:core:1.0");
/// ```
pub fn module_id(name: &str, version: &str) -> String {
    format!("{name}{MODULE_ID_DELIMITER}{version}")
}

/// Splits a module ID into (name, version).
///
/// Module names may contain the delimiter themselves, so the split happens
/// at the last one.
pub fn split_module_id(id: &str) -> Option<(&str, &str)> {
    id.rsplit_once(MODULE_ID_DELIMITER)
}

/// A directed edge from a module to an artifact it depends on.
///
/// The scope is opaque: it is carried and reported, never validated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Dependency {
    /// ID of the module declaring the dependency.
    pub source: String,
    /// GAVC of the depended-upon artifact.
    pub target: String,
    pub scope: String,
}

impl Dependency {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            scope: scope.into(),
        }
    }

    /// Name of the source module, derived from its ID.
    pub fn source_name(&self) -> &str {
        split_module_id(&self.source).map_or(self.source.as_str(), |(name, _)| name)
    }

    /// Version of the source module, derived from its ID.
    pub fn source_version(&self) -> &str {
        split_module_id(&self.source).map_or("", |(_, version)| version)
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ({})", self.source, self.target, self.scope)
    }
}

/// A releasable unit owning artifacts, dependency edges and submodules.
///
/// Submodules are owned snapshots. "All" accessors walk them recursively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    pub version: String,
    /// GAVCs of the artifacts published by this module.
    #[serde(default)]
    pub artifacts: BTreeSet<String>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    #[serde(default)]
    pub submodules: Vec<Module>,
    #[serde(default)]
    pub promoted: bool,
    #[serde(default)]
    pub submodule: bool,
}

impl Module {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            artifacts: BTreeSet::new(),
            dependencies: Vec::new(),
            submodules: Vec::new(),
            promoted: false,
            submodule: false,
        }
    }

    /// Returns the module ID (`name:version`).
    pub fn id(&self) -> String {
        module_id(&self.name, &self.version)
    }

    pub fn add_artifact(&mut self, gavc: impl Into<String>) {
        self.artifacts.insert(gavc.into());
    }

    /// Adds a dependency edge from this module. Identical edges are kept once.
    pub fn add_dependency(&mut self, target: impl Into<String>, scope: impl Into<String>) {
        let dependency = Dependency::new(self.id(), target, scope);
        if !self.dependencies.contains(&dependency) {
            self.dependencies.push(dependency);
        }
    }

    /// Attaches a submodule, flagging it as such.
    pub fn add_submodule(&mut self, mut submodule: Module) {
        submodule.submodule = true;
        self.submodules.push(submodule);
    }

    /// GAVCs of every artifact owned by this module and its submodules.
    pub fn all_artifacts(&self) -> BTreeSet<String> {
        let mut artifacts = self.artifacts.clone();
        for submodule in &self.submodules {
            artifacts.extend(submodule.all_artifacts());
        }
        artifacts
    }

    /// Dependency edges of this module and its submodules.
    pub fn all_dependencies(&self) -> Vec<Dependency> {
        let mut dependencies = self.dependencies.clone();
        for submodule in &self.submodules {
            dependencies.extend(submodule.all_dependencies());
        }
        dependencies
    }

    /// Returns true if the artifact belongs to this module or a submodule.
    pub fn owns(&self, gavc: &str) -> bool {
        self.artifacts.contains(gavc) || self.submodules.iter().any(|s| s.owns(gavc))
    }

    /// Lightweight identity used in reports.
    pub fn to_ref(&self) -> ModuleRef {
        ModuleRef {
            id: self.id(),
            name: self.name.clone(),
            version: self.version.clone(),
            promoted: self.promoted,
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Module identity and promotion state, detached from its content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleRef {
    pub id: String,
    pub name: String,
    pub version: String,
    pub promoted: bool,
}
