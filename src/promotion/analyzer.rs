//! Promotion feasibility analysis.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use super::PromotionReport;
use crate::error::{CatalogError, CatalogResult};
use crate::filter::FilterSet;
use crate::graph::external_edges;
use crate::model::{Artifact, Module};
use crate::store::RepositoryStore;

/// Checks whether modules can be promoted.
///
/// The analysis only reads from the store.
pub struct PromotionAnalyzer<'a, S: ?Sized> {
    store: &'a S,
    filters: &'a FilterSet,
}

impl<'a, S> PromotionAnalyzer<'a, S>
where
    S: RepositoryStore + ?Sized,
{
    pub fn new(store: &'a S, filters: &'a FilterSet) -> Self {
        Self { store, filters }
    }

    /// Builds the promotion report of a module.
    ///
    /// # Errors
    ///
    /// `ModuleNotFound` if the module does not exist.
    pub fn report(&self, module_id: &str) -> CatalogResult<PromotionReport> {
        let module = self.get_module(module_id)?;
        let mut reported = HashSet::from([module.id()]);
        self.report_for(&module, &mut reported)
    }

    /// Returns true if the module has no blocking dependency.
    pub fn can_be_promoted(&self, module_id: &str) -> CatalogResult<bool> {
        Ok(self.report(module_id)?.can_be_promoted)
    }

    fn get_module(&self, module_id: &str) -> CatalogResult<Module> {
        self.store
            .get_module(module_id)?
            .ok_or_else(|| CatalogError::ModuleNotFound(module_id.to_string()))
    }

    /// `reported` holds every module that already has a report in this
    /// tree, the modules above this one included. Those are listed as
    /// blocking but never nested a second time, so a report holds at most
    /// one sub-report per module.
    fn report_for(&self, module: &Module, reported: &mut HashSet<String>) -> CatalogResult<PromotionReport> {
        let mut unpromoted = Vec::new();
        let mut sub_reports = BTreeMap::new();

        for dependency in self.dependency_modules(module)?.into_values() {
            if dependency.promoted {
                continue;
            }
            let dependency_id = dependency.id();
            unpromoted.push(dependency.to_ref());

            if self.filters.full_recursion() && reported.insert(dependency_id.clone()) {
                let sub_report = self.report_for(&dependency, reported)?;
                sub_reports.insert(dependency_id, sub_report);
            }
        }

        let do_not_use = self.do_not_use_artifacts(module)?;

        Ok(PromotionReport::new(module.to_ref(), unpromoted, sub_reports, do_not_use))
    }

    /// Modules owning the artifacts the module depends on, keyed (and so
    /// sorted) by ID. The module itself is never included.
    ///
    /// With full recursion this is the transitive closure.
    fn dependency_modules(&self, module: &Module) -> CatalogResult<BTreeMap<String, Module>> {
        let root_id = module.id();
        let mut found = BTreeMap::new();
        let mut pending = vec![module.clone()];
        let mut expanded = HashSet::from([root_id.clone()]);

        while let Some(current) = pending.pop() {
            for edge in external_edges(self.store, &current, self.filters)? {
                if !edge.is_resolved() {
                    continue;
                }
                let Some(owner) = self.store.get_module_of(edge.target_gavc())? else {
                    continue;
                };
                let owner_id = owner.id();
                if owner_id == root_id || !self.filters.matches_module(&owner) {
                    continue;
                }

                if self.filters.full_recursion() && expanded.insert(owner_id.clone()) {
                    pending.push(owner.clone());
                }
                found.entry(owner_id).or_insert(owner);
            }
        }

        Ok(found)
    }

    /// Do-not-use targets of every edge of the module, submodules included,
    /// each listed once.
    fn do_not_use_artifacts(&self, module: &Module) -> CatalogResult<Vec<Artifact>> {
        let targets: BTreeSet<String> = module
            .all_dependencies()
            .into_iter()
            .map(|dependency| dependency.target)
            .collect();

        let mut artifacts = Vec::new();
        for gavc in targets {
            match self.store.get_artifact(&gavc)? {
                Some(artifact) if artifact.do_not_use => artifacts.push(artifact),
                Some(_) => {}
                None => tracing::debug!(module = %module.id(), target = %gavc, "dependency target not in store"),
            }
        }
        Ok(artifacts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::CatalogBuilder;
    use crate::store::MemoryStore;

    fn analyze(store: &MemoryStore, module_id: &str, filters: &FilterSet) -> PromotionReport {
        PromotionAnalyzer::new(store, filters).report(module_id).unwrap()
    }

    fn ids(report: &PromotionReport) -> Vec<&str> {
        report
            .unpromoted_dependencies
            .iter()
            .map(|m| m.id.as_str())
            .collect()
    }

    /// A (v1.0) owns g:a:1.0 and depends on g:b:2.0 owned by B (v2.0).
    fn a_depends_on_b() -> MemoryStore {
        CatalogBuilder::new()
            .module("A", "1.0", &["g:a:1.0"], &[("g:b:2.0", "compile")])
            .module("B", "2.0", &["g:b:2.0"], &[])
            .build()
    }

    #[test]
    fn test_no_dependencies_is_promotable() {
        let store = CatalogBuilder::new().module("solo", "1.0", &["g:solo:1.0"], &[]).build();
        let report = analyze(&store, "solo:1.0", &FilterSet::new());

        assert!(report.can_be_promoted);
        assert!(report.unpromoted_dependencies.is_empty());
        assert!(report.do_not_use_artifacts.is_empty());
    }

    #[test]
    fn test_unpromoted_dependency_blocks() {
        let store = a_depends_on_b();
        let filters = FilterSet::new();
        let analyzer = PromotionAnalyzer::new(&store, &filters);

        assert!(!analyzer.can_be_promoted("A:1.0").unwrap());
        assert_eq!(ids(&analyzer.report("A:1.0").unwrap()), vec!["B:2.0"]);

        store.promote_module("B:2.0").unwrap();
        assert!(analyzer.can_be_promoted("A:1.0").unwrap());
    }

    #[test]
    fn test_dependency_listed_once_across_edges() {
        let store = CatalogBuilder::new()
            .module("A", "1.0", &["g:a:1.0"], &[("g:b:2.0", "compile"), ("g:b:2.0", "test"), ("g:b-api:2.0", "compile")])
            .module("B", "2.0", &["g:b:2.0", "g:b-api:2.0"], &[])
            .build();

        let report = analyze(&store, "A:1.0", &FilterSet::new());
        assert_eq!(ids(&report), vec!["B:2.0"]);
    }

    #[test]
    fn test_do_not_use_listed_once() {
        let store = CatalogBuilder::new()
            .module("D", "1.0", &["g:d:1.0"], &[("g:c:1.0", "compile"), ("g:c:1.0", "test")])
            .do_not_use("g:c:1.0")
            .build();

        let report = analyze(&store, "D:1.0", &FilterSet::new());
        assert!(!report.can_be_promoted);
        assert_eq!(report.do_not_use_artifacts.len(), 1);
        assert_eq!(report.do_not_use_artifacts[0].gavc(), "g:c:1.0");
    }

    #[test]
    fn test_do_not_use_from_submodule_edges() {
        let mut sub = Module::new("D-sub", "1.0");
        sub.add_dependency("g:c:1.0", "runtime");
        let mut module = Module::new("D", "1.0");
        module.add_dependency("g:c:1.0", "compile");
        module.add_submodule(sub);

        let store = CatalogBuilder::new().with_module(module).do_not_use("g:c:1.0").build();
        let report = analyze(&store, "D:1.0", &FilterSet::new());
        assert_eq!(report.do_not_use_artifacts.len(), 1);
    }

    #[test]
    fn test_direct_only_without_full_recursion() {
        let store = CatalogBuilder::new()
            .module("A", "1.0", &["g:a:1.0"], &[("g:b:1.0", "compile")])
            .module("B", "1.0", &["g:b:1.0"], &[("g:c:1.0", "compile")])
            .module("C", "1.0", &["g:c:1.0"], &[])
            .promoted("B:1.0")
            .build();

        let direct = analyze(&store, "A:1.0", &FilterSet::new());
        assert!(direct.can_be_promoted);

        let full = analyze(&store, "A:1.0", &FilterSet::new().with_full_recursion(true));
        assert_eq!(ids(&full), vec!["C:1.0"]);
        assert!(full.dependency_reports["C:1.0"].can_be_promoted);
    }

    #[test]
    fn test_full_recursion_terminates_on_cycles() {
        let store = CatalogBuilder::new()
            .module("A", "1.0", &["g:a:1.0"], &[("g:b:1.0", "compile")])
            .module("B", "1.0", &["g:b:1.0"], &[("g:a:1.0", "compile")])
            .build();

        let report = analyze(&store, "A:1.0", &FilterSet::new().with_full_recursion(true));
        assert_eq!(ids(&report), vec!["B:1.0"]);

        let b_report = &report.dependency_reports["B:1.0"];
        assert_eq!(ids(b_report), vec!["A:1.0"]);
        assert!(b_report.dependency_reports.is_empty());
    }

    fn count_reports(report: &PromotionReport) -> usize {
        1 + report.dependency_reports.values().map(count_reports).sum::<usize>()
    }

    #[test]
    fn test_full_recursion_reports_each_module_once() {
        // m00 -> m01 -> ... -> m19, every module also depending on the one
        // two steps ahead.
        let n = 20;
        let mut builder = CatalogBuilder::new();
        for i in 0..n {
            let owned = format!("g:m{:02}:1.0", i);
            let targets: Vec<String> = [i + 1, i + 2]
                .into_iter()
                .filter(|&j| j < n)
                .map(|j| format!("g:m{:02}:1.0", j))
                .collect();
            let edges: Vec<(&str, &str)> = targets.iter().map(|t| (t.as_str(), "compile")).collect();
            builder = builder.module(&format!("m{:02}", i), "1.0", &[owned.as_str()], &edges);
        }
        let store = builder.build();

        let report = analyze(&store, "m00:1.0", &FilterSet::new().with_full_recursion(true));
        assert_eq!(report.unpromoted_dependencies.len(), n - 1);
        assert!(count_reports(&report) <= n);

        let first = &report.dependency_reports["m01:1.0"];
        assert_eq!(first.unpromoted_dependencies.len(), n - 2);
        assert!(first.dependency_reports.contains_key("m02:1.0"));
    }

    #[test]
    fn test_shared_dependency_nested_once() {
        // A -> B, A -> C, B -> D, C -> D
        let store = CatalogBuilder::new()
            .module("A", "1.0", &["g:a:1.0"], &[("g:b:1.0", "compile"), ("g:c:1.0", "compile")])
            .module("B", "1.0", &["g:b:1.0"], &[("g:d:1.0", "compile")])
            .module("C", "1.0", &["g:c:1.0"], &[("g:d:1.0", "compile")])
            .module("D", "1.0", &["g:d:1.0"], &[])
            .build();

        let report = analyze(&store, "A:1.0", &FilterSet::new().with_full_recursion(true));
        assert_eq!(ids(&report), vec!["B:1.0", "C:1.0", "D:1.0"]);
        assert_eq!(count_reports(&report), 4);

        // C still lists D as blocking.
        let c_report = &report.dependency_reports["C:1.0"];
        assert_eq!(ids(c_report), vec!["D:1.0"]);
        assert!(c_report.dependency_reports.is_empty());
    }

    #[test]
    fn test_report_is_idempotent() {
        let store = CatalogBuilder::new()
            .module("A", "1.0", &["g:a:1.0"], &[("g:z:1.0", "compile"), ("g:b:1.0", "compile"), ("g:y:1.0", "test")])
            .module("B", "1.0", &["g:b:1.0"], &[])
            .module("Z", "1.0", &["g:z:1.0"], &[])
            .do_not_use("g:y:1.0")
            .build();
        let filters = FilterSet::new().with_full_recursion(true);

        let first = analyze(&store, "A:1.0", &filters);
        let second = analyze(&store, "A:1.0", &filters);
        assert_eq!(first, second);
        assert_eq!(ids(&first), vec!["B:1.0", "Z:1.0"]);
    }

    #[test]
    fn test_missing_module() {
        let store = MemoryStore::new();
        let err = PromotionAnalyzer::new(&store, &FilterSet::new())
            .report("ghost:1.0")
            .unwrap_err();
        assert!(matches!(err, CatalogError::ModuleNotFound(_)));
    }
}
