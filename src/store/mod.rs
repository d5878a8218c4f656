//! Repository store interface.
//!
//! The engine reads modules, artifacts and licenses through
//! [`RepositoryStore`] and performs a handful of field-level writes
//! (promotion, flags). Every read returns an owned snapshot; absence is
//! `Ok(None)`, never an error.
//!
//! [`MemoryStore`] is the in-process implementation used by the CLI, the
//! tests and the benchmarks. It can be loaded from a JSON
//! [`CatalogSnapshot`].

mod memory;
pub mod snapshot;

pub use memory::MemoryStore;
pub use snapshot::CatalogSnapshot;

use crate::filter::FilterSet;
use crate::model::{Artifact, License, Module, Organization};

/// Errors raised by a store implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Failed to read or write a snapshot file.
    #[error("Store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to (de)serialize a snapshot.
    #[error("Failed to parse catalog snapshot: {0}")]
    Json(#[from] serde_json::Error),

    /// A writer panicked while holding the store lock.
    #[error("Store lock poisoned")]
    Poisoned,

    /// The stored data violates a catalog invariant.
    #[error("Invalid catalog data: {0}")]
    Invalid(String),
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Durable storage of catalog entities.
///
/// Implementations must be safe for concurrent reads. Writes are
/// single-entity operations with no cross-entity transaction; the `update_*`
/// and `promote_*` methods return `false` when the entity does not exist.
pub trait RepositoryStore: Send + Sync {
    fn get_artifact(&self, gavc: &str) -> StoreResult<Option<Artifact>>;

    fn get_module(&self, module_id: &str) -> StoreResult<Option<Module>>;

    /// Returns the root module owning the artifact, directly or through a
    /// submodule.
    fn get_module_of(&self, gavc: &str) -> StoreResult<Option<Module>>;

    /// Returns the root modules with a dependency edge to the artifact.
    ///
    /// Implementations may use the filter set's narrowing fields to
    /// pre-filter; callers still apply the full predicate.
    fn get_ancestors(&self, gavc: &str, filters: &FilterSet) -> StoreResult<Vec<Module>>;

    /// Every known version of the artifact's line (same group, artifact and
    /// classifier), without duplicates.
    fn get_artifact_versions(&self, artifact: &Artifact) -> StoreResult<Vec<String>>;

    fn get_license(&self, name: &str) -> StoreResult<Option<License>>;

    fn get_organization(&self, name: &str) -> StoreResult<Option<Organization>>;

    fn store_artifact(&self, artifact: Artifact) -> StoreResult<()>;

    fn store_module(&self, module: Module) -> StoreResult<()>;

    fn store_license(&self, license: License) -> StoreResult<()>;

    fn store_organization(&self, organization: Organization) -> StoreResult<()>;

    fn promote_module(&self, module_id: &str) -> StoreResult<bool>;

    fn set_artifact_promoted(&self, gavc: &str, promoted: bool) -> StoreResult<bool>;

    fn update_do_not_use(&self, gavc: &str, do_not_use: bool) -> StoreResult<bool>;

    fn update_download_url(&self, gavc: &str, download_url: &str) -> StoreResult<bool>;

    fn update_provider(&self, gavc: &str, provider: &str) -> StoreResult<bool>;
}
