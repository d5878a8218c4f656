//! Graph module for dependency relationship traversal.
//!
//! Walks the catalog from a module along its dependency edges and returns
//! the result as a petgraph-backed [`DependencyGraph`] or as a
//! [`TreeNode`] hierarchy. Reverse lookups (who depends on an artifact or a
//! module) live in [`ancestors`].
//!
//! # Example
//!
//! ```rust
//! use modcatalog::filter::FilterSet;
//! use modcatalog::graph::{dependency_graph, Granularity};
//! use modcatalog::model::{Artifact, ArtifactKey, Module};
//! use modcatalog::store::{MemoryStore, RepositoryStore};
//!
//! let store = MemoryStore::new();
//! store.store_artifact(Artifact::new(ArtifactKey::new("g", "b", "2.0"))).unwrap();
//!
//! let mut module = Module::new("a", "1.0");
//! module.add_dependency("g:b:2.0", "compile");
//! store.store_module(module).unwrap();
//!
//! let graph = dependency_graph(&store, "a:1.0", &FilterSet::new(), Granularity::Artifact).unwrap();
//! assert_eq!(graph.node_count(), 2);
//! assert_eq!(graph.edge_count(), 1);
//! ```

pub mod ancestors;
mod builder;
mod dependency_graph;
mod edges;
mod tree;

pub use ancestors::{ancestors_of, artifact_ancestors, module_ancestors, AncestorEntry};
pub use builder::{dependency_graph, dependency_tree, Granularity};
pub use dependency_graph::{
    CycleInfo, DependencyGraph, GraphEdge, GraphNode, GraphView, GraphViewEdge, NodeKind,
};
pub use edges::{external_edges, ResolvedEdge};
pub use tree::{FlattenedNode, TreeNode};
