//! modcatalog - Module and artifact dependency catalog
//!
//! This crate answers structural questions about a catalog of modules, the
//! artifacts they publish and the artifacts they depend on: who depends on
//! an artifact, what a module transitively requires, which dependencies are
//! stale, and whether a module can be promoted given the state of
//! everything it depends on.
//!
//! The engine reads through the [`store::RepositoryStore`] trait; the
//! in-memory [`store::MemoryStore`] can be loaded from a JSON snapshot.

pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod graph;
pub mod ingest;
pub mod license;
pub mod model;
pub mod promotion;
pub mod report;
pub mod store;
pub mod version;

#[cfg(test)]
pub(crate) mod fixtures;

pub use catalog::Catalog;
pub use error::{CatalogError, CatalogResult};
