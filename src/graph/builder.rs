//! Builds dependency graphs and trees rooted at a module.
//!
//! Both walks share the same step: take a module's filtered external edges,
//! find the module owning each target and expand it if the depth limit and
//! the visited set allow. Visited sets make both walks terminate on cyclic
//! data.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::str::FromStr;

use super::dependency_graph::{DependencyGraph, GraphNode};
use super::edges::{external_edges, owner_of, ResolvedEdge};
use super::tree::TreeNode;
use super::NodeKind;
use crate::error::{CatalogError, CatalogResult};
use crate::filter::FilterSet;
use crate::model::Module;
use crate::store::RepositoryStore;

/// What the nodes of a dependency graph stand for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// One node per artifact, plus the root module
    #[default]
    Artifact,
    /// One node per owning module; targets without an owner stay artifacts
    Module,
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "artifact" | "artifacts" => Ok(Self::Artifact),
            "module" | "modules" => Ok(Self::Module),
            _ => Err(format!(
                "Unknown granularity: '{}'. Valid values: artifact, module",
                s
            )),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Artifact => write!(f, "artifact"),
            Self::Module => write!(f, "module"),
        }
    }
}

/// Whether a dependency module reached at `depth` hops is expanded.
///
/// The root (depth 0) is always expanded.
fn may_expand(filters: &FilterSet, depth: usize) -> bool {
    depth == 0 || filters.depth_allows(depth)
}

fn get_root<S>(store: &S, module_id: &str) -> CatalogResult<Module>
where
    S: RepositoryStore + ?Sized,
{
    store
        .get_module(module_id)?
        .ok_or_else(|| CatalogError::ModuleNotFound(module_id.to_string()))
}

fn target_node(edge: &ResolvedEdge, depth: usize) -> GraphNode {
    match &edge.target {
        Some(artifact) => GraphNode::artifact(artifact, depth),
        None => GraphNode::unresolved(edge.target_gavc(), depth),
    }
}

/// Builds the dependency graph of a module.
///
/// Nodes are deduplicated by ID. A module is expanded at most once; edges
/// to nodes already in the graph are still recorded. With
/// [`Granularity::Artifact`], every artifact of an expanded module carries
/// that module's outgoing edges, wherever it was reached from.
///
/// # Errors
///
/// `ModuleNotFound` if the root module does not exist. Missing secondary
/// nodes degrade to unresolved nodes.
pub fn dependency_graph<S>(
    store: &S,
    module_id: &str,
    filters: &FilterSet,
    granularity: Granularity,
) -> CatalogResult<DependencyGraph>
where
    S: RepositoryStore + ?Sized,
{
    let root = get_root(store, module_id)?;
    let root_id = root.id();

    let mut graph = DependencyGraph::new();
    graph.set_root(GraphNode::module(&root, 0));

    let mut visited: HashSet<String> = HashSet::from([root_id.clone()]);
    // Artifact granularity: graph nodes standing for each module, and the
    // (target, scope) pairs of modules already expanded.
    let mut sources: HashMap<String, Vec<String>> = HashMap::from([(root_id.clone(), vec![root_id.clone()])]);
    let mut expanded: HashMap<String, Vec<(String, String)>> = HashMap::new();

    let mut queue = VecDeque::from([(root, 0usize)]);

    while let Some((module, depth)) = queue.pop_front() {
        let id = module.id();
        let child_depth = depth + 1;
        let mut out_edges = Vec::new();

        tracing::debug!(module = %id, depth, "expanding module");

        for edge in external_edges(store, &module, filters)? {
            let scope = edge.dependency.scope.clone();
            let owner = owner_of(store, &edge, filters)?;

            let target_id = match (&owner, granularity) {
                (Some(owner), Granularity::Module) => {
                    graph.add_node(GraphNode::module(owner, child_depth));
                    owner.id()
                }
                _ => {
                    graph.add_node(target_node(&edge, child_depth));
                    edge.target_gavc().to_string()
                }
            };
            out_edges.push((target_id, scope));

            let Some(owner) = owner else {
                continue;
            };
            let owner_id = owner.id();

            if granularity == Granularity::Artifact {
                let gavc = edge.target_gavc().to_string();
                // Owner already walked: give this artifact its edges now.
                if let Some(targets) = expanded.get(&owner_id) {
                    for (target, scope) in targets {
                        graph.add_edge(&gavc, target, scope);
                    }
                }
                let owner_sources = sources.entry(owner_id.clone()).or_default();
                if !owner_sources.contains(&gavc) {
                    owner_sources.push(gavc);
                }
            }

            if may_expand(filters, child_depth) && visited.insert(owner_id) {
                queue.push_back((owner, child_depth));
            }
        }

        let from: Vec<String> = match granularity {
            Granularity::Module => vec![id.clone()],
            Granularity::Artifact => sources.get(&id).cloned().unwrap_or_default(),
        };
        for source in &from {
            for (target, scope) in &out_edges {
                graph.add_edge(source, target, scope);
            }
        }
        expanded.insert(id, out_edges);
    }

    tracing::debug!(
        root = %root_id,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "dependency graph built"
    );
    Ok(graph)
}

/// Builds the dependency tree of a module.
///
/// Children follow the declaration order of the dependency edges and carry
/// the edge scope. The walk is breadth-first, so a module is expanded once,
/// at its shallowest occurrence, and the tree covers the same nodes as the
/// graph under the same depth limit. Later occurrences of an artifact are
/// attached as leaves marked `revisited`.
pub fn dependency_tree<S>(store: &S, module_id: &str, filters: &FilterSet) -> CatalogResult<TreeNode>
where
    S: RepositoryStore + ?Sized,
{
    let root = get_root(store, module_id)?;
    let root_node = TreeNode::new(root.id(), root.name.clone(), root.version.clone(), NodeKind::Module);

    // Every node but the root, with the slot of its parent (None: the root).
    let mut slots: Vec<(Option<usize>, TreeNode)> = Vec::new();
    let mut visited_artifacts: HashSet<String> = HashSet::new();
    let mut visited_modules: HashSet<String> = HashSet::from([root.id()]);
    let mut queue = VecDeque::from([(root, None, 0usize)]);

    while let Some((module, parent, depth)) = queue.pop_front() {
        for edge in external_edges(store, &module, filters)? {
            let gavc = edge.target_gavc().to_string();
            let graph_node = target_node(&edge, depth + 1);
            let mut child = TreeNode::new(gavc.clone(), graph_node.name, graph_node.version, graph_node.kind)
                .with_scope(edge.dependency.scope.clone());
            let slot = slots.len();

            if !visited_artifacts.insert(gavc) {
                child.revisited = true;
            } else if let Some(owner) = owner_of(store, &edge, filters)? {
                if may_expand(filters, depth + 1) && visited_modules.insert(owner.id()) {
                    queue.push_back((owner, Some(slot), depth + 1));
                }
            }
            slots.push((parent, child));
        }
    }

    Ok(assemble_tree(root_node, slots))
}

/// Attaches each slot to its parent. Parents always sit at lower slots, so
/// popping from the end completes a node before it is attached.
fn assemble_tree(mut root: TreeNode, mut slots: Vec<(Option<usize>, TreeNode)>) -> TreeNode {
    while let Some((parent, mut node)) = slots.pop() {
        node.children.reverse();
        match parent {
            Some(parent) => slots[parent].1.add_child(node),
            None => root.add_child(node),
        }
    }
    root.children.reverse();
    root
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{DoNotUseFilter, Filter};
    use crate::fixtures::CatalogBuilder;
    use crate::store::MemoryStore;
    use std::collections::BTreeSet;

    #[derive(Debug)]
    struct NoModules;

    impl Filter for NoModules {
        fn matches_module(&self, _module: &Module) -> bool {
            false
        }
    }

    /// app -> lib -> util, app -> util directly, util -> ext (no owner)
    fn layered() -> MemoryStore {
        CatalogBuilder::new()
            .module("app", "1.0", &["g:app:1.0"], &[("g:lib:1.0", "compile"), ("g:util:1.0", "test")])
            .module("lib", "1.0", &["g:lib:1.0", "g:lib-extra:1.0"], &[("g:util:1.0", "compile")])
            .module("util", "1.0", &["g:util:1.0"], &[("g:ext:3.1", "runtime")])
            .build()
    }

    /// a -> b -> a
    fn cyclic() -> MemoryStore {
        CatalogBuilder::new()
            .module("a", "1.0", &["g:a:1.0"], &[("g:b:1.0", "compile")])
            .module("b", "1.0", &["g:b:1.0"], &[("g:a:1.0", "compile")])
            .build()
    }

    fn ids(graph: &DependencyGraph) -> BTreeSet<String> {
        graph.get_all_nodes().into_iter().map(|n| n.id.clone()).collect()
    }

    fn tree_ids(tree: &TreeNode) -> BTreeSet<String> {
        tree.flatten().into_iter().map(|n| n.id).collect()
    }

    #[test]
    fn test_graph_reachable_artifacts() {
        let graph = dependency_graph(&layered(), "app:1.0", &FilterSet::new(), Granularity::Artifact).unwrap();

        let expected: BTreeSet<String> = ["app:1.0", "g:lib:1.0", "g:util:1.0", "g:ext:3.1"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(ids(&graph), expected);
        assert_eq!(graph.root().unwrap().kind, NodeKind::Module);
        assert!(!graph.has_cycles());

        let lib_deps: Vec<&str> = graph
            .get_dependencies("g:lib:1.0")
            .iter()
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(lib_deps, vec!["g:util:1.0"]);
        assert_eq!(graph.get_dependents("g:util:1.0").len(), 2);
        assert_eq!(graph.get_dependencies("g:util:1.0")[0].id, "g:ext:3.1");
    }

    #[test]
    fn test_graph_copies_edges_to_late_artifacts() {
        let store = CatalogBuilder::new()
            .module("app", "1.0", &["g:app:1.0"], &[("g:lib:1.0", "compile"), ("g:tool:1.0", "compile")])
            .module("tool", "1.0", &["g:tool:1.0"], &[("g:lib-extra:1.0", "compile")])
            .module("lib", "1.0", &["g:lib:1.0", "g:lib-extra:1.0"], &[("g:dep:1.0", "compile")])
            .build();

        let graph = dependency_graph(&store, "app:1.0", &FilterSet::new(), Granularity::Artifact).unwrap();
        assert_eq!(graph.get_dependencies("g:lib:1.0")[0].id, "g:dep:1.0");
        assert_eq!(graph.get_dependencies("g:lib-extra:1.0")[0].id, "g:dep:1.0");
    }

    #[test]
    fn test_graph_module_granularity() {
        let graph = dependency_graph(&layered(), "app:1.0", &FilterSet::new(), Granularity::Module).unwrap();

        let expected: BTreeSet<String> = ["app:1.0", "lib:1.0", "util:1.0", "g:ext:3.1"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(ids(&graph), expected);
        assert_eq!(graph.get_node("g:ext:3.1").unwrap().kind, NodeKind::Artifact);
        assert_eq!(graph.get_dependents("util:1.0").len(), 2);
    }

    #[test]
    fn test_graph_terminates_on_cycles() {
        let graph = dependency_graph(&cyclic(), "a:1.0", &FilterSet::new(), Granularity::Module).unwrap();
        assert_eq!(graph.node_count(), 2);
        assert!(graph.has_cycles());
        assert_eq!(graph.detect_cycles(), vec![vec!["a:1.0".to_string(), "b:1.0".to_string()]]);

        let artifacts = dependency_graph(&cyclic(), "a:1.0", &FilterSet::new(), Granularity::Artifact).unwrap();
        assert!(artifacts.contains("g:b:1.0"));
        assert!(artifacts.contains("g:a:1.0"));
        assert!(artifacts.has_cycles());
    }

    #[test]
    fn test_graph_max_depth() {
        let shallow = FilterSet::new().with_max_depth(Some(1));
        let graph = dependency_graph(&layered(), "app:1.0", &shallow, Granularity::Artifact).unwrap();
        assert!(graph.contains("g:lib:1.0"));
        assert!(graph.contains("g:util:1.0"));
        assert!(!graph.contains("g:ext:3.1"));

        let two = FilterSet::new().with_max_depth(Some(2));
        let graph = dependency_graph(&layered(), "app:1.0", &two, Granularity::Artifact).unwrap();
        assert!(graph.contains("g:ext:3.1"));
    }

    #[test]
    fn test_graph_filters() {
        let store = CatalogBuilder::new()
            .module("app", "1.0", &["g:app:1.0"], &[("g:lib:1.0", "compile"), ("g:bad:1.0", "compile")])
            .module("lib", "1.0", &["g:lib:1.0"], &[("g:util:1.0", "compile")])
            .do_not_use("g:bad:1.0")
            .build();

        let usable = FilterSet::new().with_filter(DoNotUseFilter::new(false));
        let graph = dependency_graph(&store, "app:1.0", &usable, Granularity::Artifact).unwrap();
        assert!(!graph.contains("g:bad:1.0"));
        assert!(graph.contains("g:util:1.0"));

        // Owners failing the module predicates are not expanded.
        let no_modules = FilterSet::new().with_filter(NoModules);
        let graph = dependency_graph(&store, "app:1.0", &no_modules, Granularity::Module).unwrap();
        assert_eq!(graph.get_node("g:lib:1.0").unwrap().kind, NodeKind::Artifact);
        assert!(!graph.contains("g:util:1.0"));
    }

    #[test]
    fn test_graph_unresolved_and_missing_root() {
        let store = CatalogBuilder::new().module_with_dangling("a", "1.0", "g:gone:1.0").build();
        let graph = dependency_graph(&store, "a:1.0", &FilterSet::new(), Granularity::Module).unwrap();
        assert_eq!(graph.get_node("g:gone:1.0").unwrap().kind, NodeKind::Unresolved);

        let err = dependency_graph(&store, "b:1.0", &FilterSet::new(), Granularity::Module).unwrap_err();
        assert!(matches!(err, CatalogError::ModuleNotFound(_)));
    }

    #[test]
    fn test_tree_shape() {
        let tree = dependency_tree(&layered(), "app:1.0", &FilterSet::new()).unwrap();

        assert_eq!(tree.id, "app:1.0");
        assert!(tree.scope.is_none());
        assert_eq!(tree.children.len(), 2);

        // util is reached directly at depth 1, so it expands there.
        let lib = &tree.children[0];
        assert_eq!(lib.id, "g:lib:1.0");
        assert_eq!(lib.scope.as_deref(), Some("compile"));
        assert_eq!(lib.children[0].id, "g:util:1.0");
        assert_eq!(lib.children[0].depth, 2);
        assert!(lib.children[0].revisited);
        assert!(lib.children[0].children.is_empty());

        let direct_util = &tree.children[1];
        assert_eq!(direct_util.scope.as_deref(), Some("test"));
        assert!(!direct_util.revisited);
        assert_eq!(direct_util.children[0].id, "g:ext:3.1");
        assert_eq!(direct_util.children[0].depth, 2);

        let expected: BTreeSet<String> = ["app:1.0", "g:lib:1.0", "g:util:1.0", "g:ext:3.1"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(tree_ids(&tree), expected);
    }

    #[test]
    fn test_tree_matches_graph_under_depth_limit() {
        for max_depth in [Some(1), Some(2), Some(3), None] {
            let filters = FilterSet::new().with_max_depth(max_depth);
            let graph = dependency_graph(&layered(), "app:1.0", &filters, Granularity::Artifact).unwrap();
            let tree = dependency_tree(&layered(), "app:1.0", &filters).unwrap();
            assert_eq!(tree_ids(&tree), ids(&graph), "max_depth {:?}", max_depth);
        }

        let two = FilterSet::new().with_max_depth(Some(2));
        let tree = dependency_tree(&layered(), "app:1.0", &two).unwrap();
        assert!(tree.find("g:ext:3.1").is_some());
    }

    #[test]
    fn test_tree_keeps_declaration_order() {
        let store = CatalogBuilder::new()
            .module("app", "1.0", &["g:app:1.0"], &[("g:z:1.0", "compile"), ("g:a:1.0", "compile")])
            .module("z", "1.0", &["g:z:1.0"], &[("g:z1:1.0", "compile"), ("g:z2:1.0", "runtime")])
            .module("a", "1.0", &["g:a:1.0"], &[("g:a1:1.0", "compile")])
            .build();

        let tree = dependency_tree(&store, "app:1.0", &FilterSet::new()).unwrap();
        let order: Vec<String> = tree.flatten().into_iter().map(|n| n.id).collect();
        assert_eq!(order, vec!["app:1.0", "g:z:1.0", "g:z1:1.0", "g:z2:1.0", "g:a:1.0", "g:a1:1.0"]);
    }

    #[test]
    fn test_tree_terminates_on_cycles() {
        let tree = dependency_tree(&cyclic(), "a:1.0", &FilterSet::new()).unwrap();
        // a -> g:b -> g:a, and b's edge back into a is not expanded again
        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.children[0].children[0].id, "g:a:1.0");
        assert!(tree.children[0].children[0].children.is_empty());
    }

    #[test]
    fn test_tree_max_depth() {
        let shallow = FilterSet::new().with_max_depth(Some(1));
        let tree = dependency_tree(&layered(), "app:1.0", &shallow).unwrap();
        assert!(tree.children.iter().all(|c| c.children.is_empty()));
        assert!(!tree.children[1].revisited);
    }

    #[test]
    fn test_granularity_from_str() {
        assert_eq!("Module".parse::<Granularity>().unwrap(), Granularity::Module);
        assert_eq!("artifacts".parse::<Granularity>().unwrap(), Granularity::Artifact);
        assert!("package".parse::<Granularity>().is_err());
        assert_eq!(Granularity::default().to_string(), "artifact");
    }
}
