//! Reverse lookups: which modules depend on an artifact or a module.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{CatalogError, CatalogResult};
use crate::filter::FilterSet;
use crate::model::{Artifact, Dependency, Module};
use crate::store::RepositoryStore;

/// One module depending on an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AncestorEntry {
    pub dependency: Dependency,
    pub target: Artifact,
    pub source_name: String,
    pub source_version: String,
}

/// Modules with an edge to the artifact that pass the module predicates.
///
/// The store may pre-narrow the query; the full predicate is always applied
/// here as well.
pub fn ancestors_of<S>(store: &S, gavc: &str, filters: &FilterSet) -> CatalogResult<Vec<Module>>
where
    S: RepositoryStore + ?Sized,
{
    let mut modules = store.get_ancestors(gavc, filters)?;
    modules.retain(|module| filters.matches_module(module));
    Ok(modules)
}

/// Lists the dependents of an artifact, sorted by source module and scope.
pub fn artifact_ancestors<S>(store: &S, gavc: &str, filters: &FilterSet) -> CatalogResult<Vec<AncestorEntry>>
where
    S: RepositoryStore + ?Sized,
{
    let target = store
        .get_artifact(gavc)?
        .ok_or_else(|| CatalogError::ArtifactNotFound(gavc.to_string()))?;

    let mut entries = BTreeMap::new();
    collect_entries(store, &target, None, filters, &mut entries)?;
    Ok(entries.into_values().collect())
}

/// Lists the dependents of every artifact a module owns, submodules
/// included. The module never appears as its own ancestor.
pub fn module_ancestors<S>(store: &S, module_id: &str, filters: &FilterSet) -> CatalogResult<Vec<AncestorEntry>>
where
    S: RepositoryStore + ?Sized,
{
    let module = store
        .get_module(module_id)?
        .ok_or_else(|| CatalogError::ModuleNotFound(module_id.to_string()))?;

    let mut entries = BTreeMap::new();
    for gavc in module.all_artifacts() {
        let Some(target) = store.get_artifact(&gavc)? else {
            tracing::debug!(module = %module_id, artifact = %gavc, "owned artifact not in store");
            continue;
        };
        collect_entries(store, &target, Some(module_id), filters, &mut entries)?;
    }

    Ok(entries.into_values().collect())
}

type EntryKey = (String, String, String);

fn collect_entries<S>(
    store: &S,
    target: &Artifact,
    exclude: Option<&str>,
    filters: &FilterSet,
    entries: &mut BTreeMap<EntryKey, AncestorEntry>,
) -> CatalogResult<()>
where
    S: RepositoryStore + ?Sized,
{
    let gavc = target.gavc();

    for ancestor in ancestors_of(store, &gavc, filters)? {
        if exclude == Some(ancestor.id().as_str()) {
            continue;
        }

        for dependency in ancestor.all_dependencies() {
            if dependency.target != gavc || !filters.matches_dependency(&dependency) {
                continue;
            }
            let key = (ancestor.id(), dependency.target.clone(), dependency.scope.clone());
            entries.entry(key).or_insert_with(|| AncestorEntry {
                dependency,
                target: target.clone(),
                source_name: ancestor.name.clone(),
                source_version: ancestor.version.clone(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{PromotedFilter, ScopeFilter};
    use crate::fixtures::CatalogBuilder;
    use crate::model::Module;
    use crate::store::MemoryStore;

    fn store() -> MemoryStore {
        CatalogBuilder::new()
            .module("lib", "1.0", &["g:lib:1.0", "g:lib-api:1.0"], &[("g:lib-api:1.0", "compile")])
            .module("app", "1.0", &["g:app:1.0"], &[("g:lib:1.0", "compile"), ("g:lib:1.0", "test")])
            .module("tool", "2.0", &["g:tool:2.0"], &[("g:lib-api:1.0", "runtime")])
            .promoted("tool:2.0")
            .build()
    }

    #[test]
    fn test_artifact_ancestors() {
        let entries = artifact_ancestors(&store(), "g:lib:1.0", &FilterSet::new()).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.source_name == "app" && e.source_version == "1.0"));
        assert_eq!(entries[0].dependency.scope, "compile");
        assert_eq!(entries[0].target.gavc(), "g:lib:1.0");
    }

    #[test]
    fn test_artifact_not_found() {
        let err = artifact_ancestors(&store(), "g:none:1", &FilterSet::new()).unwrap_err();
        assert!(matches!(err, CatalogError::ArtifactNotFound(_)));
    }

    #[test]
    fn test_module_ancestors_exclude_self() {
        let entries = module_ancestors(&store(), "lib:1.0", &FilterSet::new()).unwrap();
        let sources: Vec<&str> = entries.iter().map(|e| e.dependency.source.as_str()).collect();
        assert_eq!(sources, vec!["app:1.0", "app:1.0", "tool:2.0"]);
        assert!(!sources.contains(&"lib:1.0"));
    }

    #[test]
    fn test_module_ancestors_with_submodule_dependency() {
        let mut sub = Module::new("lib-impl", "1.0");
        sub.add_artifact("g:lib-impl:1.0");
        sub.add_dependency("g:lib:1.0", "compile");
        let mut lib = Module::new("lib", "1.0");
        lib.add_artifact("g:lib:1.0");
        lib.add_submodule(sub);

        let store = CatalogBuilder::new().with_module(lib).build();
        assert!(module_ancestors(&store, "lib:1.0", &FilterSet::new()).unwrap().is_empty());
    }

    #[test]
    fn test_filters_apply() {
        let promoted = FilterSet::new().with_filter(PromotedFilter::new(true));
        let entries = module_ancestors(&store(), "lib:1.0", &promoted).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].source_name, "tool");

        let tests_only = FilterSet::new().with_filter(ScopeFilter::new(["test"]).unwrap());
        let entries = artifact_ancestors(&store(), "g:lib:1.0", &tests_only).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].dependency.scope, "test");
    }

    #[test]
    fn test_module_not_found() {
        let err = module_ancestors(&store(), "ghost:1", &FilterSet::new()).unwrap_err();
        assert!(err.is_not_found());
    }
}
