//! Catalog facade over a store and an engine configuration.
//!
//! Every query method takes an explicit [`FilterSet`]; [`Catalog::filters`]
//! returns one carrying the configured defaults to start from.

use crate::config::EngineConfig;
use crate::error::{CatalogError, CatalogResult};
use crate::filter::FilterSet;
use crate::graph::{self, AncestorEntry, DependencyGraph, Granularity, TreeNode};
use crate::ingest::{self, ModuleSubmission};
use crate::license;
use crate::model::{Artifact, License, Module, Organization};
use crate::promotion::{self, PromotionReport};
use crate::report::{self, DependencyReport};
use crate::store::RepositoryStore;
use crate::version::{latest_version, FreshnessFilter};

/// Queries and updates a catalog held by a [`RepositoryStore`].
///
/// # Example
///
/// ```rust
/// use modcatalog::catalog::Catalog;
/// use modcatalog::config::EngineConfig;
/// use modcatalog::ingest::ModuleSubmission;
/// use modcatalog::model::{Artifact, ArtifactKey};
/// use modcatalog::store::MemoryStore;
///
/// let catalog = Catalog::new(MemoryStore::new(), EngineConfig::default());
/// let submission = ModuleSubmission::new("a", "1.0")
///     .with_artifact(Artifact::new(ArtifactKey::new("g", "a", "1.0")));
/// catalog.submit(&submission).unwrap();
///
/// assert!(catalog.can_be_promoted("a:1.0", &catalog.filters()).unwrap());
/// ```
#[derive(Debug)]
pub struct Catalog<S> {
    store: S,
    config: EngineConfig,
}

impl<S: RepositoryStore> Catalog<S> {
    pub fn new(store: S, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// A filter set with the configured defaults and no predicates.
    pub fn filters(&self) -> FilterSet {
        FilterSet::from_config(&self.config)
    }

    pub fn artifact(&self, gavc: &str) -> CatalogResult<Artifact> {
        self.store
            .get_artifact(gavc)?
            .ok_or_else(|| CatalogError::ArtifactNotFound(gavc.to_string()))
    }

    pub fn module(&self, module_id: &str) -> CatalogResult<Module> {
        self.store
            .get_module(module_id)?
            .ok_or_else(|| CatalogError::ModuleNotFound(module_id.to_string()))
    }

    pub fn license(&self, name: &str) -> CatalogResult<License> {
        self.store
            .get_license(name)?
            .ok_or_else(|| CatalogError::LicenseNotFound(name.to_string()))
    }

    pub fn organization(&self, name: &str) -> CatalogResult<Organization> {
        self.store
            .get_organization(name)?
            .ok_or_else(|| CatalogError::OrganizationNotFound(name.to_string()))
    }

    /// The module owning an artifact.
    pub fn artifact_module(&self, gavc: &str) -> CatalogResult<Option<Module>> {
        self.artifact(gavc)?;
        Ok(self.store.get_module_of(gavc)?)
    }

    pub fn artifact_ancestors(&self, gavc: &str, filters: &FilterSet) -> CatalogResult<Vec<AncestorEntry>> {
        graph::artifact_ancestors(&self.store, gavc, filters)
    }

    pub fn module_ancestors(&self, module_id: &str, filters: &FilterSet) -> CatalogResult<Vec<AncestorEntry>> {
        graph::module_ancestors(&self.store, module_id, filters)
    }

    pub fn module_graph(
        &self,
        module_id: &str,
        filters: &FilterSet,
        granularity: Granularity,
    ) -> CatalogResult<DependencyGraph> {
        graph::dependency_graph(&self.store, module_id, filters, granularity)
    }

    pub fn module_tree(&self, module_id: &str, filters: &FilterSet) -> CatalogResult<TreeNode> {
        graph::dependency_tree(&self.store, module_id, filters)
    }

    pub fn promotion_report(&self, module_id: &str, filters: &FilterSet) -> CatalogResult<PromotionReport> {
        promotion::promotion_report(&self.store, module_id, filters)
    }

    pub fn can_be_promoted(&self, module_id: &str, filters: &FilterSet) -> CatalogResult<bool> {
        promotion::can_be_promoted(&self.store, module_id, filters)
    }

    /// Promotes a module without checking feasibility first.
    pub fn promote(&self, module_id: &str) -> CatalogResult<()> {
        promotion::promote(&self.store, module_id)
    }

    pub fn dependency_report(
        &self,
        module_id: &str,
        filters: &FilterSet,
        freshness: Option<FreshnessFilter>,
    ) -> CatalogResult<DependencyReport> {
        report::dependency_report(&self.store, module_id, filters, freshness)
    }

    /// Known versions of an artifact's line, sorted.
    pub fn artifact_versions(&self, gavc: &str) -> CatalogResult<Vec<String>> {
        let artifact = self.artifact(gavc)?;
        Ok(self.store.get_artifact_versions(&artifact)?)
    }

    /// Latest known version of an artifact's line.
    ///
    /// Falls back to lexicographic order when versions cannot be compared.
    pub fn latest_version(&self, gavc: &str) -> CatalogResult<Option<String>> {
        Ok(latest_version(&self.artifact_versions(gavc)?))
    }

    pub fn artifact_licenses(&self, gavc: &str, filters: &FilterSet) -> CatalogResult<Vec<License>> {
        license::artifact_licenses(&self.store, gavc, filters)
    }

    pub fn module_licenses(&self, module_id: &str, filters: &FilterSet) -> CatalogResult<Vec<License>> {
        license::module_licenses(&self.store, module_id, filters)
    }

    pub fn submit(&self, submission: &ModuleSubmission) -> CatalogResult<Module> {
        ingest::submit_module(&self.store, submission)
    }

    pub fn set_do_not_use(&self, gavc: &str, do_not_use: bool) -> CatalogResult<()> {
        if !self.store.update_do_not_use(gavc, do_not_use)? {
            return Err(CatalogError::ArtifactNotFound(gavc.to_string()));
        }
        tracing::info!(artifact = %gavc, do_not_use, "do-not-use flag updated");
        Ok(())
    }

    pub fn set_download_url(&self, gavc: &str, url: &str) -> CatalogResult<()> {
        if !self.store.update_download_url(gavc, url)? {
            return Err(CatalogError::ArtifactNotFound(gavc.to_string()));
        }
        Ok(())
    }

    pub fn set_provider(&self, gavc: &str, provider: &str) -> CatalogResult<()> {
        if !self.store.update_provider(gavc, provider)? {
            return Err(CatalogError::ArtifactNotFound(gavc.to_string()));
        }
        Ok(())
    }
}
