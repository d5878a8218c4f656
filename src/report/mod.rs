//! Dependency reports.
//!
//! Lists what a module depends on outside itself: every filtered edge with
//! its resolved target, the declaring module and, when asked for, how fresh
//! the pinned version is against the versions known to the store.

use serde::Serialize;
use std::collections::{HashSet, VecDeque};

use crate::error::{CatalogError, CatalogResult};
use crate::filter::FilterSet;
use crate::graph::{external_edges, ResolvedEdge};
use crate::model::{Artifact, Dependency, Module, ModuleRef, GAVC_DELIMITER};
use crate::store::RepositoryStore;
use crate::version::{freshness, Freshness, FreshnessFilter};

/// One external dependency of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyEntry {
    pub dependency: Dependency,
    /// None when the target is not in the store
    pub target: Option<Artifact>,
    pub source_name: String,
    pub source_version: String,
    /// Target groupId matches a corporate prefix
    pub corporate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub freshness: Option<Freshness>,
}

impl DependencyEntry {
    pub fn target_gavc(&self) -> &str {
        &self.dependency.target
    }

    pub fn is_do_not_use(&self) -> bool {
        self.target.as_ref().is_some_and(|a| a.do_not_use)
    }
}

/// Report totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total: usize,
    pub corporate: usize,
    pub third_party: usize,
    pub up_to_date: usize,
    pub outdated: usize,
    pub undefined: usize,
    pub do_not_use: usize,
    pub unresolved: usize,
}

impl ReportSummary {
    fn record(&mut self, entry: &DependencyEntry) {
        self.total += 1;
        if entry.corporate {
            self.corporate += 1;
        } else {
            self.third_party += 1;
        }
        match &entry.freshness {
            Some(Freshness::UpToDate) => self.up_to_date += 1,
            Some(Freshness::Outdated { .. }) => self.outdated += 1,
            Some(Freshness::Undefined) => self.undefined += 1,
            None => {}
        }
        if entry.is_do_not_use() {
            self.do_not_use += 1;
        }
        if entry.target.is_none() {
            self.unresolved += 1;
        }
    }
}

/// External dependencies of a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyReport {
    pub module: ModuleRef,
    /// Sorted by source module, target and scope
    pub entries: Vec<DependencyEntry>,
    pub summary: ReportSummary,
}

impl DependencyReport {
    /// Entries whose target should be upgraded
    pub fn outdated(&self) -> Vec<&DependencyEntry> {
        self.entries
            .iter()
            .filter(|e| e.freshness.as_ref().is_some_and(Freshness::is_outdated))
            .collect()
    }

    /// Format the report as a text string suitable for CI output
    pub fn format_report(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("=== Dependencies of {} ===\n\n", self.module.id));
        output.push_str(&format!(
            "Total: {} (corporate {}, third-party {})\n",
            self.summary.total, self.summary.corporate, self.summary.third_party
        ));
        if self.summary.outdated > 0 {
            output.push_str(&format!("Outdated: {}\n", self.summary.outdated));
        }
        if self.summary.do_not_use > 0 {
            output.push_str(&format!("Do-not-use: {}\n", self.summary.do_not_use));
        }
        if self.summary.unresolved > 0 {
            output.push_str(&format!("Unresolved: {}\n", self.summary.unresolved));
        }
        output.push('\n');

        for entry in &self.entries {
            output.push_str(&format!(
                "{} -> {} ({})",
                entry.dependency.source, entry.dependency.target, entry.dependency.scope
            ));
            if let Some(freshness) = &entry.freshness {
                output.push_str(&format!(" [{freshness}]"));
            }
            if entry.is_do_not_use() {
                output.push_str(" [do not use]");
            }
            output.push('\n');
        }

        output
    }
}

/// Whether dependency modules reached at `depth` hops contribute their
/// own edges.
fn includes_depth(filters: &FilterSet, depth: usize) -> bool {
    depth == 0 || filters.full_recursion() || filters.max_depth().is_some_and(|max| depth < max)
}

fn group_of(gavc: &str) -> &str {
    gavc.split(GAVC_DELIMITER).next().unwrap_or(gavc)
}

/// Builds the dependency report of a module.
///
/// Edges to artifacts the module owns are never listed, also when they come
/// from a dependency module. With `freshness` set, each entry carries its
/// verdict and entries are kept per the filter; otherwise no verdict is
/// computed.
///
/// # Errors
///
/// `ModuleNotFound` if the module does not exist.
pub fn dependency_report<S>(
    store: &S,
    module_id: &str,
    filters: &FilterSet,
    freshness_filter: Option<FreshnessFilter>,
) -> CatalogResult<DependencyReport>
where
    S: RepositoryStore + ?Sized,
{
    let root = store
        .get_module(module_id)?
        .ok_or_else(|| CatalogError::ModuleNotFound(module_id.to_string()))?;

    let decorator = filters.decorator();
    let mut entries = Vec::new();
    let mut visited = HashSet::from([root.id()]);
    let mut queue = VecDeque::from([(root.clone(), 0usize)]);

    while let Some((module, depth)) = queue.pop_front() {
        for edge in external_edges(store, &module, filters)? {
            if root.owns(edge.target_gavc()) {
                continue;
            }

            if includes_depth(filters, depth + 1) && edge.is_resolved() {
                if let Some(owner) = store.get_module_of(edge.target_gavc())? {
                    if filters.matches_module(&owner) && visited.insert(owner.id()) {
                        queue.push_back((owner, depth + 1));
                    }
                }
            }

            let corporate = filters.is_corporate(group_of(edge.target_gavc()));
            if !decorator.keeps(corporate) {
                continue;
            }

            let verdict = match freshness_filter {
                Some(_) => Some(evaluate_freshness(store, &edge)?),
                None => None,
            };
            if let (Some(filter), Some(verdict)) = (freshness_filter, &verdict) {
                if !filter.keeps(verdict) {
                    continue;
                }
            }

            entries.push(entry_for(&module, edge, corporate, verdict));
        }
    }

    entries.sort_by(|a, b| a.dependency.cmp(&b.dependency));
    entries.dedup_by(|a, b| a.dependency == b.dependency);

    let mut summary = ReportSummary::default();
    for entry in &entries {
        summary.record(entry);
    }

    tracing::debug!(module = %module_id, entries = summary.total, "dependency report built");
    Ok(DependencyReport {
        module: root.to_ref(),
        entries,
        summary,
    })
}

fn evaluate_freshness<S>(store: &S, edge: &ResolvedEdge) -> CatalogResult<Freshness>
where
    S: RepositoryStore + ?Sized,
{
    let Some(target) = &edge.target else {
        return Ok(Freshness::Undefined);
    };
    let history = store.get_artifact_versions(target)?;
    Ok(freshness(target.version(), &history))
}

fn entry_for(source: &Module, edge: ResolvedEdge, corporate: bool, freshness: Option<Freshness>) -> DependencyEntry {
    DependencyEntry {
        dependency: edge.dependency,
        target: edge.target,
        source_name: source.name.clone(),
        source_version: source.version.clone(),
        corporate,
        freshness,
    }
}
