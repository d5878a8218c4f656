//! Markdown export implementation.
//!
//! Exports query results in Markdown format for documentation and CI
//! reports. Trees are rendered as fenced text with branch lines.

use super::{ExportData, Exporter};
use crate::graph::{AncestorEntry, GraphView, TreeNode};
use crate::model::License;
use crate::promotion::PromotionReport;
use crate::report::DependencyReport;
use std::io::{self, Write};

/// Markdown exporter implementation.
pub struct MarkdownExporter;

impl Exporter for MarkdownExporter {
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()> {
        match data {
            ExportData::Ancestors { subject, ancestors } => write_ancestors(writer, subject, ancestors)?,
            ExportData::Graph(view) => write_graph(writer, view)?,
            ExportData::Tree(tree) => write_tree(writer, tree)?,
            ExportData::Promotion(report) => write_promotion(writer, report)?,
            ExportData::Promotable {
                module,
                can_be_promoted,
            } => {
                writeln!(writer, "# Promotion Check")?;
                writeln!(writer)?;
                let verdict = if *can_be_promoted { "can" } else { "cannot" };
                writeln!(writer, "**{}** {} be promoted.", module, verdict)?;
                writeln!(writer)?;
            }
            ExportData::Dependencies(report) => write_dependencies(writer, report)?,
            ExportData::Versions {
                artifact,
                versions,
                latest,
            } => {
                writeln!(writer, "# Versions of {}", artifact)?;
                writeln!(writer)?;
                for version in versions {
                    writeln!(writer, "- {}", version)?;
                }
                writeln!(writer)?;
                if let Some(latest) = latest {
                    writeln!(writer, "**Latest:** {}", latest)?;
                    writeln!(writer)?;
                }
            }
            ExportData::Latest { artifact, latest } => {
                writeln!(writer, "# Latest Version of {}", artifact)?;
                writeln!(writer)?;
                match latest {
                    Some(latest) => writeln!(writer, "**Latest:** {}", latest)?,
                    None => writeln!(writer, "No version known.")?,
                }
                writeln!(writer)?;
            }
            ExportData::Licenses { subject, licenses } => write_licenses(writer, subject, licenses)?,
        }

        // Footer
        writeln!(writer, "---")?;
        writeln!(writer, "*Generated by modcatalog*")?;

        Ok(())
    }
}

fn write_ancestors<W: Write>(writer: &mut W, subject: &str, ancestors: &[AncestorEntry]) -> io::Result<()> {
    writeln!(writer, "# Ancestors of {}", subject)?;
    writeln!(writer)?;

    if ancestors.is_empty() {
        writeln!(writer, "No module depends on {}.", subject)?;
        writeln!(writer)?;
        return Ok(());
    }

    writeln!(writer, "| Module | Version | Artifact | Scope |")?;
    writeln!(writer, "|--------|---------|----------|-------|")?;
    for entry in ancestors {
        writeln!(
            writer,
            "| {} | {} | {} | {} |",
            entry.source_name, entry.source_version, entry.dependency.target, entry.dependency.scope
        )?;
    }
    writeln!(writer)
}

fn write_graph<W: Write>(writer: &mut W, view: &GraphView) -> io::Result<()> {
    writeln!(writer, "# Dependency Graph")?;
    writeln!(writer)?;
    if let Some(root) = &view.root {
        writeln!(writer, "**Root:** {}", root)?;
        writeln!(writer)?;
    }

    writeln!(writer, "| Metric | Count |")?;
    writeln!(writer, "|--------|-------|")?;
    writeln!(writer, "| Nodes | {} |", view.nodes.len())?;
    writeln!(writer, "| Edges | {} |", view.edges.len())?;
    writeln!(writer, "| Circular Dependencies | {} |", view.cycles.len())?;
    writeln!(writer)?;

    if !view.edges.is_empty() {
        writeln!(writer, "## Edges")?;
        writeln!(writer)?;
        writeln!(writer, "| From | To | Scope |")?;
        writeln!(writer, "|------|----|-------|")?;
        for edge in &view.edges {
            writeln!(writer, "| {} | {} | {} |", edge.source, edge.target, edge.scope)?;
        }
        writeln!(writer)?;
    }

    if !view.cycles.is_empty() {
        writeln!(writer, "## Circular Dependencies")?;
        writeln!(writer)?;
        writeln!(writer, "The following circular dependencies were detected:")?;
        writeln!(writer)?;
        for (i, cycle) in view.cycles.iter().enumerate() {
            writeln!(writer, "{}. `{}`", i + 1, cycle.cycle_path())?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn write_tree<W: Write>(writer: &mut W, tree: &TreeNode) -> io::Result<()> {
    writeln!(writer, "# Dependency Tree of {}", tree.id)?;
    writeln!(writer)?;
    writeln!(writer, "```text")?;
    for node in tree.flatten() {
        writeln!(writer, "{}", node.render())?;
    }
    writeln!(writer, "```")?;
    writeln!(writer)?;
    writeln!(writer, "(*) listed elsewhere in the tree")?;
    writeln!(writer)
}

fn write_promotion<W: Write>(writer: &mut W, report: &PromotionReport) -> io::Result<()> {
    writeln!(writer, "# Promotion Report")?;
    writeln!(writer)?;
    write_promotion_section(writer, report, 2)
}

fn write_promotion_section<W: Write>(writer: &mut W, report: &PromotionReport, level: usize) -> io::Result<()> {
    let heading = "#".repeat(level.min(6));
    let verdict = if report.can_be_promoted {
        "can be promoted"
    } else {
        "cannot be promoted"
    };
    writeln!(writer, "{} {} ({})", heading, report.module.id, verdict)?;
    writeln!(writer)?;

    if !report.unpromoted_dependencies.is_empty() {
        writeln!(writer, "Unpromoted dependencies:")?;
        writeln!(writer)?;
        for module in &report.unpromoted_dependencies {
            writeln!(writer, "- {}", module.id)?;
        }
        writeln!(writer)?;
    }

    if !report.do_not_use_artifacts.is_empty() {
        writeln!(writer, "Do-not-use artifacts:")?;
        writeln!(writer)?;
        for artifact in &report.do_not_use_artifacts {
            writeln!(writer, "- {}", artifact.gavc())?;
        }
        writeln!(writer)?;
    }

    for sub_report in report.dependency_reports.values() {
        write_promotion_section(writer, sub_report, level + 1)?;
    }

    Ok(())
}

fn write_dependencies<W: Write>(writer: &mut W, report: &DependencyReport) -> io::Result<()> {
    writeln!(writer, "# Dependency Report")?;
    writeln!(writer)?;
    writeln!(writer, "**Module:** {} v{}", report.module.name, report.module.version)?;
    writeln!(writer)?;

    let summary = &report.summary;
    writeln!(writer, "## Summary")?;
    writeln!(writer)?;
    writeln!(writer, "| Metric | Count |")?;
    writeln!(writer, "|--------|-------|")?;
    writeln!(writer, "| Total Dependencies | {} |", summary.total)?;
    writeln!(writer, "| Corporate | {} |", summary.corporate)?;
    writeln!(writer, "| Third-party | {} |", summary.third_party)?;
    writeln!(writer, "| Up to date | {} |", summary.up_to_date)?;
    writeln!(writer, "| Outdated | {} |", summary.outdated)?;
    writeln!(writer, "| Undefined freshness | {} |", summary.undefined)?;
    writeln!(writer, "| Do not use | {} |", summary.do_not_use)?;
    writeln!(writer, "| Unresolved | {} |", summary.unresolved)?;
    writeln!(writer)?;

    if !report.entries.is_empty() {
        writeln!(writer, "## Dependencies")?;
        writeln!(writer)?;
        writeln!(writer, "| Artifact | Scope | Declared By | Freshness |")?;
        writeln!(writer, "|----------|-------|-------------|-----------|")?;
        for entry in &report.entries {
            let freshness = entry
                .freshness
                .as_ref()
                .map_or_else(|| "-".to_string(), ToString::to_string);
            let flag = if entry.is_do_not_use() { " (do not use)" } else { "" };
            writeln!(
                writer,
                "| {}{} | {} | {} | {} |",
                entry.target_gavc(),
                flag,
                entry.dependency.scope,
                entry.dependency.source,
                freshness
            )?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn write_licenses<W: Write>(writer: &mut W, subject: &str, licenses: &[License]) -> io::Result<()> {
    writeln!(writer, "# Licenses of {}", subject)?;
    writeln!(writer)?;
    writeln!(writer, "| License | Approved | URL |")?;
    writeln!(writer, "|---------|----------|-----|")?;
    for license in licenses {
        let approved = match (license.unknown, license.approved) {
            (true, _) => "unknown",
            (false, Some(true)) => "yes",
            (false, Some(false)) => "no",
            (false, None) => "pending",
        };
        let url = if license.url.is_empty() { "-" } else { license.url.as_str() };
        writeln!(writer, "| {} | {} | {} |", license.name, approved, url)?;
    }
    writeln!(writer)
}
