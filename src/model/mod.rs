//! Catalog data model.
//!
//! Defines the entities the engine reasons about: artifacts keyed by their
//! GAVC, modules keyed by `name:version`, dependency edges, licenses and
//! organizations. Identity is purely key based; nothing here touches a store.
//!
//! # Example
//!
//! ```rust
//! use modcatalog::model::{Artifact, ArtifactKey, Module};
//!
//! let artifact = Artifact::new(ArtifactKey::new("g", "a", "1.0"));
//!
//! let mut module = Module::new("a", "1.0");
//! module.add_artifact(artifact.gavc());
//! module.add_dependency("g:b:2.0", "compile");
//!
//! assert_eq!(module.id(), "a:1.0");
//! assert!(module.owns("g:a:1.0"));
//! ```

mod artifact;
mod license;
mod module;

pub use artifact::{Artifact, ArtifactKey, GAVC_DELIMITER};
pub use license::{License, Organization};
pub use module::{module_id, split_module_id, Dependency, Module, ModuleRef, MODULE_ID_DELIMITER};

/// The kinds of entity a filter can be asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Module,
    Artifact,
    License,
    Dependency,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Module => write!(f, "module"),
            Self::Artifact => write!(f, "artifact"),
            Self::License => write!(f, "license"),
            Self::Dependency => write!(f, "dependency"),
        }
    }
}
