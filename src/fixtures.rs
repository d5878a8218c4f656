//! Catalog builders shared by the unit tests.

use crate::model::{Artifact, ArtifactKey, Module};
use crate::store::{MemoryStore, RepositoryStore};

/// Builds a [`MemoryStore`] from terse module declarations.
///
/// Owned and depended-upon artifacts are stored automatically; artifacts
/// declared explicitly or flagged later keep their flags.
pub(crate) struct CatalogBuilder {
    store: MemoryStore,
}

pub(crate) fn artifact(gavc: &str) -> Artifact {
    Artifact::new(ArtifactKey::parse(gavc).expect("fixture GAVC"))
}

impl CatalogBuilder {
    pub(crate) fn new() -> Self {
        Self {
            store: MemoryStore::new(),
        }
    }

    /// Declares a module owning `owns` and depending on `(target, scope)`
    /// pairs.
    pub(crate) fn module(self, name: &str, version: &str, owns: &[&str], deps: &[(&str, &str)]) -> Self {
        let mut module = Module::new(name, version);
        for gavc in owns {
            module.add_artifact(*gavc);
        }
        for (target, scope) in deps {
            module.add_dependency(*target, *scope);
        }
        self.with_module(module)
    }

    /// Stores a prepared module, including its submodules' artifacts.
    pub(crate) fn with_module(self, module: Module) -> Self {
        for gavc in module.all_artifacts() {
            self.ensure_artifact(&gavc);
        }
        for dependency in module.all_dependencies() {
            self.ensure_artifact(&dependency.target);
        }
        self.store.store_module(module).expect("store module");
        self
    }

    pub(crate) fn artifact(self, artifact: Artifact) -> Self {
        self.store.store_artifact(artifact).expect("store artifact");
        self
    }

    pub(crate) fn do_not_use(self, gavc: &str) -> Self {
        self.ensure_artifact(gavc);
        self.store.update_do_not_use(gavc, true).expect("flag artifact");
        self
    }

    pub(crate) fn promoted(self, module_id: &str) -> Self {
        assert!(self.store.promote_module(module_id).expect("promote"));
        self
    }

    /// Declares a module with a compile dependency whose target artifact is
    /// never stored.
    pub(crate) fn module_with_dangling(self, name: &str, version: &str, target: &str) -> Self {
        let mut module = Module::new(name, version);
        module.add_dependency(target, "compile");
        self.store.store_module(module).expect("store module");
        self
    }

    pub(crate) fn build(self) -> MemoryStore {
        self.store
    }

    fn ensure_artifact(&self, gavc: &str) {
        if self.store.get_artifact(gavc).expect("read").is_none() {
            self.store.store_artifact(artifact(gavc)).expect("store artifact");
        }
    }
}
