//! Filtered, resolved dependency edges of a module.

use serde::Serialize;

use crate::error::CatalogResult;
use crate::filter::FilterSet;
use crate::model::{Artifact, Dependency, Module};
use crate::store::RepositoryStore;

/// A dependency edge together with its target, when the target is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedEdge {
    pub dependency: Dependency,
    pub target: Option<Artifact>,
}

impl ResolvedEdge {
    pub fn target_gavc(&self) -> &str {
        &self.dependency.target
    }

    pub fn is_resolved(&self) -> bool {
        self.target.is_some()
    }
}

/// Returns the module's edges (submodules included) that leave the module
/// and pass the filter set.
///
/// Edges to artifacts the module owns itself are dropped. An edge must pass
/// the dependency predicates; a stored target must also pass the artifact
/// predicates. Targets missing from the store are kept unresolved.
pub fn external_edges<S>(store: &S, module: &Module, filters: &FilterSet) -> CatalogResult<Vec<ResolvedEdge>>
where
    S: RepositoryStore + ?Sized,
{
    let mut edges = Vec::new();

    for dependency in module.all_dependencies() {
        if module.owns(&dependency.target) || !filters.matches_dependency(&dependency) {
            continue;
        }

        let target = store.get_artifact(&dependency.target)?;
        match &target {
            Some(artifact) if !filters.matches_artifact(artifact) => continue,
            Some(_) => {}
            None => tracing::debug!(
                module = %module.id(),
                target = %dependency.target,
                "dependency target not in store"
            ),
        }

        edges.push(ResolvedEdge { dependency, target });
    }

    Ok(edges)
}

/// Returns the module owning the edge target, if it passes the module
/// predicates.
pub(crate) fn owner_of<S>(store: &S, edge: &ResolvedEdge, filters: &FilterSet) -> CatalogResult<Option<Module>>
where
    S: RepositoryStore + ?Sized,
{
    if !edge.is_resolved() {
        return Ok(None);
    }
    Ok(store
        .get_module_of(edge.target_gavc())?
        .filter(|owner| filters.matches_module(owner)))
}
