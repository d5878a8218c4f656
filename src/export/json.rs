//! JSON export implementation.
//!
//! Exports query results as pretty-printed JSON for machine-readable output.

use super::{ExportData, Exporter};
use crate::graph::{GraphNode, GraphView, GraphViewEdge};
use serde::Serialize;
use std::io::{self, Write};

/// JSON exporter implementation.
pub struct JsonExporter;

/// Serializable cycle info for JSON output.
#[derive(Serialize)]
struct JsonCycle<'a> {
    nodes: &'a [String],
    path: String,
}

/// Graph with readable cycle paths for JSON output.
#[derive(Serialize)]
struct JsonGraph<'a> {
    root: Option<&'a str>,
    node_count: usize,
    edge_count: usize,
    nodes: &'a [GraphNode],
    edges: &'a [GraphViewEdge],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    circular_dependencies: Vec<JsonCycle<'a>>,
}

impl<'a> From<&'a GraphView> for JsonGraph<'a> {
    fn from(view: &'a GraphView) -> Self {
        Self {
            root: view.root.as_deref(),
            node_count: view.nodes.len(),
            edge_count: view.edges.len(),
            nodes: &view.nodes,
            edges: &view.edges,
            circular_dependencies: view
                .cycles
                .iter()
                .map(|c| JsonCycle {
                    nodes: &c.nodes,
                    path: c.cycle_path(),
                })
                .collect(),
        }
    }
}

impl Exporter for JsonExporter {
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()> {
        let json = match data {
            ExportData::Graph(view) => serde_json::to_string_pretty(&JsonGraph::from(view)),
            other => serde_json::to_string_pretty(other),
        }
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        writeln!(writer, "{}", json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::CatalogBuilder;
    use crate::filter::FilterSet;
    use crate::graph::{dependency_graph, dependency_tree, Granularity};
    use crate::promotion::promotion_report;
    use crate::store::MemoryStore;

    fn store() -> MemoryStore {
        CatalogBuilder::new()
            .module("a", "1.0", &["g:a:1.0"], &[("g:b:1.0", "compile")])
            .module("b", "1.0", &["g:b:1.0"], &[("g:a:1.0", "runtime")])
            .build()
    }

    fn export_value(data: &ExportData) -> serde_json::Value {
        let mut output = Vec::new();
        JsonExporter.export(data, &mut output).unwrap();
        let json_str = String::from_utf8(output).unwrap();
        serde_json::from_str(&json_str).unwrap()
    }

    #[test]
    fn test_json_export_graph_with_cycles() {
        let graph = dependency_graph(&store(), "a:1.0", &FilterSet::new(), Granularity::Module).unwrap();
        let parsed = export_value(&ExportData::Graph(graph.to_view()));

        assert_eq!(parsed["root"], "a:1.0");
        assert_eq!(parsed["node_count"], 2);
        assert_eq!(parsed["edges"][0]["scope"], "compile");
        assert_eq!(
            parsed["circular_dependencies"][0]["path"],
            "a:1.0 -> b:1.0 -> a:1.0"
        );
    }

    #[test]
    fn test_json_export_tree() {
        let tree = dependency_tree(&store(), "a:1.0", &FilterSet::new()).unwrap();
        let parsed = export_value(&ExportData::Tree(tree));

        assert_eq!(parsed["id"], "a:1.0");
        assert_eq!(parsed["children"][0]["id"], "g:b:1.0");
        assert_eq!(parsed["children"][0]["scope"], "compile");
    }

    #[test]
    fn test_json_export_promotion() {
        let report = promotion_report(&store(), "a:1.0", &FilterSet::new()).unwrap();
        let parsed = export_value(&ExportData::Promotion(report));

        assert_eq!(parsed["module"]["id"], "a:1.0");
        assert_eq!(parsed["can_be_promoted"], false);
        assert_eq!(parsed["unpromoted_dependencies"][0]["name"], "b");
    }

    #[test]
    fn test_json_export_versions() {
        let parsed = export_value(&ExportData::Versions {
            artifact: "g:a:1.0".to_string(),
            versions: vec!["1.0".to_string(), "1.1".to_string()],
            latest: Some("1.1".to_string()),
        });

        assert_eq!(parsed["artifact"], "g:a:1.0");
        assert_eq!(parsed["versions"].as_array().unwrap().len(), 2);
        assert_eq!(parsed["latest"], "1.1");
    }

    #[test]
    fn test_json_export_latest() {
        let parsed = export_value(&ExportData::Latest {
            artifact: "g:a:1.0".to_string(),
            latest: Some("1.1".to_string()),
        });

        assert_eq!(parsed["artifact"], "g:a:1.0");
        assert_eq!(parsed["latest"], "1.1");
        assert!(parsed.get("versions").is_none());
    }
}
