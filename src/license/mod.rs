//! License listings for artifacts and modules.
//!
//! Artifacts reference licenses by name. Names with no stored license are
//! listed as unknown placeholders so that gaps in the license data stay
//! visible whatever the filters say.

use std::collections::BTreeMap;

use crate::error::{CatalogError, CatalogResult};
use crate::filter::FilterSet;
use crate::model::{Artifact, License};
use crate::store::RepositoryStore;

fn licenses_of<S>(store: &S, artifact: &Artifact, filters: &FilterSet) -> CatalogResult<Vec<License>>
where
    S: RepositoryStore + ?Sized,
{
    let mut licenses = Vec::with_capacity(artifact.licenses.len());
    for name in &artifact.licenses {
        let license = match store.get_license(name)? {
            Some(license) => license,
            None => {
                tracing::debug!(artifact = %artifact.gavc(), license = %name, "license not in store");
                License::unknown(name.clone())
            }
        };
        if filters.should_be_in_report(&license) {
            licenses.push(license);
        }
    }
    Ok(licenses)
}

/// Lists the licenses of an artifact, sorted by name.
///
/// # Errors
///
/// `ArtifactNotFound` if the artifact does not exist.
pub fn artifact_licenses<S>(store: &S, gavc: &str, filters: &FilterSet) -> CatalogResult<Vec<License>>
where
    S: RepositoryStore + ?Sized,
{
    let artifact = store
        .get_artifact(gavc)?
        .ok_or_else(|| CatalogError::ArtifactNotFound(gavc.to_string()))?;
    licenses_of(store, &artifact, filters)
}

/// Lists the licenses of every artifact of a module, submodules included,
/// once per license name.
///
/// # Errors
///
/// `ModuleNotFound` if the module does not exist.
pub fn module_licenses<S>(store: &S, module_id: &str, filters: &FilterSet) -> CatalogResult<Vec<License>>
where
    S: RepositoryStore + ?Sized,
{
    let module = store
        .get_module(module_id)?
        .ok_or_else(|| CatalogError::ModuleNotFound(module_id.to_string()))?;

    let mut by_name = BTreeMap::new();
    for gavc in module.all_artifacts() {
        let Some(artifact) = store.get_artifact(&gavc)? else {
            tracing::debug!(module = %module_id, artifact = %gavc, "owned artifact not in store");
            continue;
        };
        for license in licenses_of(store, &artifact, filters)? {
            by_name.entry(license.name.clone()).or_insert(license);
        }
    }

    Ok(by_name.into_values().collect())
}
