//! In-memory repository store.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{CatalogSnapshot, RepositoryStore, StoreError, StoreResult};
use crate::filter::{fields_match, FilterSet};
use crate::model::{Artifact, ArtifactKey, EntityKind, License, Module, Organization};

/// A [`RepositoryStore`] holding everything behind one `RwLock`.
///
/// Two indexes are kept in step with the modules: artifact owner
/// (GAVC → root module ID) and dependents (GAVC → IDs of root modules with an
/// edge to it).
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    artifacts: BTreeMap<String, Artifact>,
    modules: BTreeMap<String, Module>,
    licenses: BTreeMap<String, License>,
    organizations: BTreeMap<String, Organization>,
    owners: HashMap<String, String>,
    dependents: HashMap<String, BTreeSet<String>>,
}

impl Inner {
    fn unindex(&mut self, module: &Module) {
        let id = module.id();
        for gavc in module.all_artifacts() {
            if self.owners.get(&gavc) == Some(&id) {
                self.owners.remove(&gavc);
            }
        }
        for dependency in module.all_dependencies() {
            if let Some(ids) = self.dependents.get_mut(&dependency.target) {
                ids.remove(&id);
                if ids.is_empty() {
                    self.dependents.remove(&dependency.target);
                }
            }
        }
    }

    fn index(&mut self, module: &Module) {
        let id = module.id();
        for gavc in module.all_artifacts() {
            self.owners.insert(gavc, id.clone());
        }
        for dependency in module.all_dependencies() {
            self.dependents
                .entry(dependency.target)
                .or_default()
                .insert(id.clone());
        }
    }

    fn artifact_mut(&mut self, gavc: &str) -> Option<&mut Artifact> {
        self.artifacts.get_mut(gavc)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store holding every entity of the snapshot.
    pub fn from_snapshot(snapshot: CatalogSnapshot) -> StoreResult<Self> {
        let store = Self::new();
        for license in snapshot.licenses {
            store.store_license(license)?;
        }
        for organization in snapshot.organizations {
            store.store_organization(organization)?;
        }
        for artifact in snapshot.artifacts {
            store.store_artifact(artifact)?;
        }
        for module in snapshot.modules {
            store.store_module(module)?;
        }
        Ok(store)
    }

    /// Copies the current content into a snapshot.
    pub fn snapshot(&self) -> StoreResult<CatalogSnapshot> {
        let inner = self.read()?;
        Ok(CatalogSnapshot {
            licenses: inner.licenses.values().cloned().collect(),
            organizations: inner.organizations.values().cloned().collect(),
            artifacts: inner.artifacts.values().cloned().collect(),
            modules: inner.modules.values().cloned().collect(),
        })
    }

    pub fn module_count(&self) -> StoreResult<usize> {
        Ok(self.read()?.modules.len())
    }

    pub fn artifact_count(&self) -> StoreResult<usize> {
        Ok(self.read()?.artifacts.len())
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Inner>> {
        self.inner.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Inner>> {
        self.inner.write().map_err(|_| StoreError::Poisoned)
    }

    fn update_artifact<F>(&self, gavc: &str, update: F) -> StoreResult<bool>
    where
        F: FnOnce(&mut Artifact),
    {
        let mut inner = self.write()?;
        match inner.artifact_mut(gavc) {
            Some(artifact) => {
                update(artifact);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl RepositoryStore for MemoryStore {
    fn get_artifact(&self, gavc: &str) -> StoreResult<Option<Artifact>> {
        Ok(self.read()?.artifacts.get(gavc).cloned())
    }

    fn get_module(&self, module_id: &str) -> StoreResult<Option<Module>> {
        Ok(self.read()?.modules.get(module_id).cloned())
    }

    fn get_module_of(&self, gavc: &str) -> StoreResult<Option<Module>> {
        let inner = self.read()?;
        Ok(inner
            .owners
            .get(gavc)
            .and_then(|id| inner.modules.get(id))
            .cloned())
    }

    fn get_ancestors(&self, gavc: &str, filters: &FilterSet) -> StoreResult<Vec<Module>> {
        let inner = self.read()?;
        let Some(ids) = inner.dependents.get(gavc) else {
            return Ok(Vec::new());
        };

        let fields = filters.narrowing_fields(EntityKind::Module);
        let mut ancestors = Vec::with_capacity(ids.len());
        for module in ids.iter().filter_map(|id| inner.modules.get(id)) {
            if !fields.is_empty() && !fields_match(&serde_json::to_value(module)?, &fields) {
                continue;
            }
            if filters.matches_module(module) {
                ancestors.push(module.clone());
            }
        }
        Ok(ancestors)
    }

    fn get_artifact_versions(&self, artifact: &Artifact) -> StoreResult<Vec<String>> {
        let inner = self.read()?;
        let versions: BTreeSet<String> = inner
            .artifacts
            .values()
            .filter(|candidate| candidate.key.same_line(&artifact.key))
            .map(|candidate| candidate.key.version.clone())
            .collect();
        Ok(versions.into_iter().collect())
    }

    fn get_license(&self, name: &str) -> StoreResult<Option<License>> {
        Ok(self.read()?.licenses.get(name).cloned())
    }

    fn get_organization(&self, name: &str) -> StoreResult<Option<Organization>> {
        Ok(self.read()?.organizations.get(name).cloned())
    }

    fn store_artifact(&self, mut artifact: Artifact) -> StoreResult<()> {
        if artifact.key.classifier.as_deref() == Some("") {
            artifact.key.classifier = None;
        }
        let gavc = artifact.gavc();
        // A canonical key must round-trip through its string form
        if ArtifactKey::parse(&gavc).ok().as_ref() != Some(&artifact.key) {
            return Err(StoreError::Invalid(format!(
                "artifact key '{gavc}' does not round-trip"
            )));
        }
        self.write()?.artifacts.insert(gavc, artifact);
        Ok(())
    }

    fn store_module(&self, module: Module) -> StoreResult<()> {
        let id = module.id();
        let mut inner = self.write()?;
        if let Some(previous) = inner.modules.remove(&id) {
            inner.unindex(&previous);
        }
        inner.index(&module);
        inner.modules.insert(id, module);
        Ok(())
    }

    fn store_license(&self, license: License) -> StoreResult<()> {
        self.write()?.licenses.insert(license.name.clone(), license);
        Ok(())
    }

    fn store_organization(&self, organization: Organization) -> StoreResult<()> {
        self.write()?
            .organizations
            .insert(organization.name.clone(), organization);
        Ok(())
    }

    fn promote_module(&self, module_id: &str) -> StoreResult<bool> {
        let mut inner = self.write()?;
        match inner.modules.get_mut(module_id) {
            Some(module) => {
                module.promoted = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn set_artifact_promoted(&self, gavc: &str, promoted: bool) -> StoreResult<bool> {
        self.update_artifact(gavc, |artifact| artifact.promoted = promoted)
    }

    fn update_do_not_use(&self, gavc: &str, do_not_use: bool) -> StoreResult<bool> {
        self.update_artifact(gavc, |artifact| artifact.do_not_use = do_not_use)
    }

    fn update_download_url(&self, gavc: &str, download_url: &str) -> StoreResult<bool> {
        self.update_artifact(gavc, |artifact| {
            artifact.download_url = Some(download_url.to_string());
        })
    }

    fn update_provider(&self, gavc: &str, provider: &str) -> StoreResult<bool> {
        self.update_artifact(gavc, |artifact| {
            artifact.provider = Some(provider.to_string());
        })
    }
}
