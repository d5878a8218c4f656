//! Promotion feasibility and the promote action.
//!
//! A module can be promoted when every module it depends on is promoted and
//! none of the artifacts it depends on is flagged do-not-use. The check
//! never writes; [`promote`] is the only mutating operation and it does not
//! re-check feasibility.
//!
//! # Example
//!
//! ```rust
//! use modcatalog::filter::FilterSet;
//! use modcatalog::model::{Artifact, ArtifactKey, Module};
//! use modcatalog::promotion::{can_be_promoted, promote};
//! use modcatalog::store::{MemoryStore, RepositoryStore};
//!
//! let store = MemoryStore::new();
//! store.store_artifact(Artifact::new(ArtifactKey::new("g", "b", "2.0"))).unwrap();
//!
//! let mut b = Module::new("B", "2.0");
//! b.add_artifact("g:b:2.0");
//! store.store_module(b).unwrap();
//!
//! let mut a = Module::new("A", "1.0");
//! a.add_dependency("g:b:2.0", "compile");
//! store.store_module(a).unwrap();
//!
//! let filters = FilterSet::new();
//! assert!(!can_be_promoted(&store, "A:1.0", &filters).unwrap());
//!
//! promote(&store, "B:2.0").unwrap();
//! assert!(can_be_promoted(&store, "A:1.0", &filters).unwrap());
//! ```

mod analyzer;
mod report;

pub use analyzer::PromotionAnalyzer;
pub use report::PromotionReport;

use crate::error::{CatalogError, CatalogResult};
use crate::filter::FilterSet;
use crate::store::RepositoryStore;

/// Builds the promotion report of a module.
pub fn promotion_report<S>(store: &S, module_id: &str, filters: &FilterSet) -> CatalogResult<PromotionReport>
where
    S: RepositoryStore + ?Sized,
{
    PromotionAnalyzer::new(store, filters).report(module_id)
}

pub fn can_be_promoted<S>(store: &S, module_id: &str, filters: &FilterSet) -> CatalogResult<bool>
where
    S: RepositoryStore + ?Sized,
{
    PromotionAnalyzer::new(store, filters).can_be_promoted(module_id)
}

/// Marks every artifact of the module (submodules included) promoted, then
/// the module itself.
///
/// Each write stands alone. If this fails half way, the artifacts written
/// so far stay promoted and calling it again completes the promotion.
pub fn promote<S>(store: &S, module_id: &str) -> CatalogResult<()>
where
    S: RepositoryStore + ?Sized,
{
    let module = store
        .get_module(module_id)?
        .ok_or_else(|| CatalogError::ModuleNotFound(module_id.to_string()))?;

    let mut promoted_artifacts = 0usize;
    for gavc in module.all_artifacts() {
        if store.set_artifact_promoted(&gavc, true)? {
            promoted_artifacts += 1;
        } else {
            tracing::warn!(module = %module_id, artifact = %gavc, "owned artifact not in store, skipped");
        }
    }

    if !store.promote_module(module_id)? {
        return Err(CatalogError::ModuleNotFound(module_id.to_string()));
    }

    tracing::info!(module = %module_id, artifacts = promoted_artifacts, "module promoted");
    Ok(())
}
