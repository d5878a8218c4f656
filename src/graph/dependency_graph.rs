//! Dependency graph implementation using petgraph.
//!
//! Provides a directed graph of catalog nodes (modules and artifacts) with
//! scope-annotated edges, identity-based deduplication and cycle detection.

use petgraph::algo::{is_cyclic_directed, tarjan_scc};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::model::{Artifact, Module};

/// What a graph or tree node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Module,
    Artifact,
    /// A dependency target with no stored artifact.
    Unresolved,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Module => write!(f, "module"),
            Self::Artifact => write!(f, "artifact"),
            Self::Unresolved => write!(f, "unresolved"),
        }
    }
}

/// Represents a node in the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    /// Module ID or GAVC
    pub id: String,
    pub kind: NodeKind,
    /// Module name, or artifactId for artifacts
    pub name: String,
    pub version: String,
    /// Module hops from the root (0 = root module)
    pub depth: usize,
    pub promoted: bool,
    pub do_not_use: bool,
}

impl GraphNode {
    /// Creates a node for a module.
    pub fn module(module: &Module, depth: usize) -> Self {
        Self {
            id: module.id(),
            kind: NodeKind::Module,
            name: module.name.clone(),
            version: module.version.clone(),
            depth,
            promoted: module.promoted,
            do_not_use: false,
        }
    }

    /// Creates a node for a stored artifact.
    pub fn artifact(artifact: &Artifact, depth: usize) -> Self {
        Self {
            id: artifact.gavc(),
            kind: NodeKind::Artifact,
            name: artifact.key.artifact_id.clone(),
            version: artifact.key.version.clone(),
            depth,
            promoted: artifact.promoted,
            do_not_use: artifact.do_not_use,
        }
    }

    /// Creates a node for a GAVC with no stored artifact.
    pub fn unresolved(gavc: &str, depth: usize) -> Self {
        Self {
            id: gavc.to_string(),
            kind: NodeKind::Unresolved,
            name: gavc.to_string(),
            version: String::new(),
            depth,
            promoted: false,
            do_not_use: false,
        }
    }
}

/// Represents an edge in the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    /// Scope of the dependency that produced this edge
    pub scope: String,
}

/// A directed graph of modules and artifacts.
///
/// Edges point from the dependent node to its dependency. Nodes are unique
/// by ID; adding an existing ID returns the existing node.
///
/// # Example
///
/// ```rust
/// use modcatalog::graph::{DependencyGraph, GraphNode};
/// use modcatalog::model::Module;
///
/// let mut graph = DependencyGraph::new();
/// graph.add_node(GraphNode::module(&Module::new("app", "1.0"), 0));
/// graph.add_node(GraphNode::unresolved("g:lib:2.0", 1));
/// graph.add_edge("app:1.0", "g:lib:2.0", "compile");
///
/// assert_eq!(graph.node_count(), 2);
/// assert_eq!(graph.edge_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    /// The underlying directed graph
    graph: DiGraph<GraphNode, GraphEdge>,
    /// Maps node IDs to their indices for O(1) lookup
    node_indices: HashMap<String, NodeIndex>,
    /// ID of the module the graph was built from
    root: Option<String>,
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl DependencyGraph {
    /// Creates a new empty dependency graph.
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_indices: HashMap::new(),
            root: None,
        }
    }

    /// Creates a new graph with pre-allocated capacity.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            graph: DiGraph::with_capacity(nodes, edges),
            node_indices: HashMap::with_capacity(nodes),
            root: None,
        }
    }

    /// Adds a node and marks it as the root.
    pub fn set_root(&mut self, node: GraphNode) -> NodeIndex {
        self.root = Some(node.id.clone());
        self.add_node(node)
    }

    pub fn root(&self) -> Option<&GraphNode> {
        self.root.as_deref().and_then(|id| self.get_node(id))
    }

    /// Adds a node to the graph.
    ///
    /// If a node with the same ID already exists, returns its existing index
    /// without modification.
    pub fn add_node(&mut self, node: GraphNode) -> NodeIndex {
        if let Some(&idx) = self.node_indices.get(&node.id) {
            return idx;
        }

        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.node_indices.insert(id, idx);
        idx
    }

    /// Adds an edge between two existing nodes.
    ///
    /// An edge identical in endpoints and scope is recorded once.
    ///
    /// # Returns
    ///
    /// `true` if both nodes exist, `false` otherwise.
    pub fn add_edge(&mut self, from: &str, to: &str, scope: &str) -> bool {
        let (Some(&from_idx), Some(&to_idx)) = (self.node_indices.get(from), self.node_indices.get(to))
        else {
            return false;
        };

        let duplicate = self
            .graph
            .edges_connecting(from_idx, to_idx)
            .any(|edge| edge.weight().scope == scope);
        if !duplicate {
            self.graph.add_edge(
                from_idx,
                to_idx,
                GraphEdge {
                    scope: scope.to_string(),
                },
            );
        }
        true
    }

    /// Gets a node by ID.
    pub fn get_node(&self, id: &str) -> Option<&GraphNode> {
        self.node_indices
            .get(id)
            .and_then(|&idx| self.graph.node_weight(idx))
    }

    /// Gets the direct dependencies of a node (outgoing edges).
    pub fn get_dependencies(&self, id: &str) -> Vec<&GraphNode> {
        let Some(&idx) = self.node_indices.get(id) else {
            return Vec::new();
        };

        self.graph
            .edges_directed(idx, Direction::Outgoing)
            .filter_map(|edge| self.graph.node_weight(edge.target()))
            .collect()
    }

    /// Gets the dependents of a node (incoming edges).
    pub fn get_dependents(&self, id: &str) -> Vec<&GraphNode> {
        let Some(&idx) = self.node_indices.get(id) else {
            return Vec::new();
        };

        self.graph
            .edges_directed(idx, Direction::Incoming)
            .filter_map(|edge| self.graph.node_weight(edge.source()))
            .collect()
    }

    pub fn get_all_nodes(&self) -> Vec<&GraphNode> {
        self.graph.node_weights().collect()
    }

    /// Gets nodes of one kind.
    pub fn get_nodes_by_kind(&self, kind: NodeKind) -> Vec<&GraphNode> {
        self.graph
            .node_weights()
            .filter(|node| node.kind == kind)
            .collect()
    }

    /// Gets nodes at a specific depth.
    pub fn get_nodes_at_depth(&self, depth: usize) -> Vec<&GraphNode> {
        self.graph
            .node_weights()
            .filter(|node| node.depth == depth)
            .collect()
    }

    /// Checks if the graph contains cycles.
    pub fn has_cycles(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Detects and returns all cycles in the graph.
    ///
    /// A strongly connected component is a cycle if it has more than one
    /// node, or a single node with a self-loop.
    pub fn detect_cycles(&self) -> Vec<Vec<String>> {
        let mut cycles = Vec::new();

        for scc in tarjan_scc(&self.graph) {
            if scc.len() > 1 {
                let mut cycle: Vec<String> = scc
                    .iter()
                    .filter_map(|&idx| self.graph.node_weight(idx))
                    .map(|node| node.id.clone())
                    .collect();
                cycle.sort();
                cycles.push(cycle);
            } else if let [idx] = scc[..] {
                if self.graph.contains_edge(idx, idx) {
                    if let Some(node) = self.graph.node_weight(idx) {
                        cycles.push(vec![node.id.clone()]);
                    }
                }
            }
        }

        cycles
    }

    /// Returns the IDs of nodes that are part of any cycle.
    pub fn get_nodes_in_cycles(&self) -> HashSet<String> {
        self.detect_cycles().into_iter().flatten().collect()
    }

    /// Returns detailed cycle information.
    pub fn get_cycle_details(&self) -> Vec<CycleInfo> {
        self.detect_cycles()
            .into_iter()
            .map(|nodes| CycleInfo { nodes })
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node_indices.contains_key(id)
    }

    /// Returns a serializable node-and-edge projection, sorted by ID.
    pub fn to_view(&self) -> GraphView {
        let mut nodes: Vec<GraphNode> = self.graph.node_weights().cloned().collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));

        let mut edges: Vec<GraphViewEdge> = self
            .graph
            .edge_references()
            .filter_map(|edge| {
                let source = self.graph.node_weight(edge.source())?;
                let target = self.graph.node_weight(edge.target())?;
                Some(GraphViewEdge {
                    source: source.id.clone(),
                    target: target.id.clone(),
                    scope: edge.weight().scope.clone(),
                })
            })
            .collect();
        edges.sort();

        GraphView {
            root: self.root.clone(),
            nodes,
            edges,
            cycles: self.get_cycle_details(),
        }
    }
}

/// Information about a detected circular dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleInfo {
    /// Node IDs in the cycle
    pub nodes: Vec<String>,
}

impl CycleInfo {
    /// Returns a formatted path, e.g. "a -> b -> a".
    pub fn cycle_path(&self) -> String {
        let Some(first) = self.nodes.first() else {
            return String::new();
        };
        format!("{} -> {}", self.nodes.join(" -> "), first)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Edge of a [`GraphView`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct GraphViewEdge {
    pub source: String,
    pub target: String,
    pub scope: String,
}

/// Format-agnostic graph projection handed to exporters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphView {
    pub root: Option<String>,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphViewEdge>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cycles: Vec<CycleInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str) -> GraphNode {
        GraphNode::unresolved(id, 0)
    }

    fn graph_of(ids: &[&str]) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for id in ids {
            graph.add_node(node(id));
        }
        graph
    }

    #[test]
    fn test_create_empty_graph() {
        let graph = DependencyGraph::new();
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.is_empty());
        assert!(graph.root().is_none());
    }

    #[test]
    fn test_add_node_dedupes_by_id() {
        let mut graph = DependencyGraph::new();
        let idx = graph.add_node(node("g:a:1.0"));
        let idx2 = graph.add_node(GraphNode::unresolved("g:a:1.0", 5));

        assert_eq!(idx, idx2);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.get_node("g:a:1.0").unwrap().depth, 0);
    }

    #[test]
    fn test_add_edge() {
        let mut graph = graph_of(&["a", "b"]);

        assert!(graph.add_edge("a", "b", "compile"));
        assert!(graph.add_edge("a", "b", "compile"));
        assert_eq!(graph.edge_count(), 1);

        assert!(graph.add_edge("a", "b", "test"));
        assert_eq!(graph.edge_count(), 2);

        assert!(!graph.add_edge("nonexistent", "b", "compile"));
        assert!(!graph.add_edge("a", "nonexistent", "compile"));
    }

    #[test]
    fn test_dependencies_and_dependents() {
        let mut graph = graph_of(&["app", "lib", "util"]);
        graph.add_edge("app", "lib", "compile");
        graph.add_edge("app", "util", "compile");
        graph.add_edge("lib", "util", "runtime");

        let deps: Vec<&str> = graph
            .get_dependencies("app")
            .iter()
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(deps.len(), 2);
        assert!(deps.contains(&"lib"));

        assert_eq!(graph.get_dependents("util").len(), 2);
        assert!(graph.get_dependencies("nonexistent").is_empty());
    }

    #[test]
    fn test_nodes_by_kind_and_depth() {
        let mut graph = DependencyGraph::new();
        graph.set_root(GraphNode::module(&Module::new("app", "1.0"), 0));
        graph.add_node(GraphNode::unresolved("g:x:1", 1));

        assert_eq!(graph.root().unwrap().id, "app:1.0");
        assert_eq!(graph.get_nodes_by_kind(NodeKind::Module).len(), 1);
        assert_eq!(graph.get_nodes_by_kind(NodeKind::Unresolved).len(), 1);
        assert_eq!(graph.get_nodes_at_depth(1)[0].id, "g:x:1");
    }

    #[test]
    fn test_has_cycles() {
        let mut graph = graph_of(&["a", "b"]);
        graph.add_edge("a", "b", "compile");
        assert!(!graph.has_cycles());

        graph.add_edge("b", "a", "compile");
        assert!(graph.has_cycles());
    }

    #[test]
    fn test_detect_cycles_self_loop() {
        let mut graph = graph_of(&["a"]);
        graph.add_edge("a", "a", "compile");

        assert_eq!(graph.detect_cycles(), vec![vec!["a".to_string()]]);
    }

    #[test]
    fn test_get_nodes_in_cycles() {
        let mut graph = graph_of(&["a", "b", "c", "d"]);
        graph.add_edge("a", "b", "compile");
        graph.add_edge("b", "c", "compile");
        graph.add_edge("c", "a", "compile");
        graph.add_edge("a", "d", "compile");

        let cycle_nodes = graph.get_nodes_in_cycles();
        assert!(cycle_nodes.contains("a"));
        assert!(cycle_nodes.contains("c"));
        assert!(!cycle_nodes.contains("d"));
    }

    #[test]
    fn test_cycle_info_path() {
        let info = CycleInfo {
            nodes: vec!["a".into(), "b".into()],
        };
        assert_eq!(info.cycle_path(), "a -> b -> a");
        assert_eq!(info.len(), 2);
        assert_eq!(CycleInfo { nodes: vec![] }.cycle_path(), "");
    }

    #[test]
    fn test_to_view_is_sorted() {
        let mut graph = graph_of(&["c", "a", "b"]);
        graph.add_edge("c", "a", "test");
        graph.add_edge("a", "b", "compile");

        let view = graph.to_view();
        let ids: Vec<&str> = view.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(view.edges[0].source, "a");
        assert!(view.cycles.is_empty());

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["edges"][1]["scope"], "test");
        assert!(json.get("cycles").is_none());
    }
}
