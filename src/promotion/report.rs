//! Promotion feasibility reports.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::model::{Artifact, ModuleRef};

/// Outcome of a promotion feasibility check.
///
/// Blocking lists are sorted (modules by ID, artifacts by GAVC) so repeated
/// checks over the same data compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromotionReport {
    /// The module the report is about
    pub module: ModuleRef,
    /// Dependency modules that are not promoted yet
    pub unpromoted_dependencies: Vec<ModuleRef>,
    /// Nested reports of unpromoted dependencies, keyed by module ID
    /// (full recursion only). Each module is nested at most once per
    /// top-level report.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub dependency_reports: BTreeMap<String, PromotionReport>,
    /// Depended-upon artifacts flagged do-not-use
    pub do_not_use_artifacts: Vec<Artifact>,
    pub can_be_promoted: bool,
}

impl PromotionReport {
    /// Creates a report and derives `can_be_promoted` from the blocking
    /// lists.
    pub fn new(
        module: ModuleRef,
        unpromoted_dependencies: Vec<ModuleRef>,
        dependency_reports: BTreeMap<String, PromotionReport>,
        do_not_use_artifacts: Vec<Artifact>,
    ) -> Self {
        let can_be_promoted = unpromoted_dependencies.is_empty() && do_not_use_artifacts.is_empty();
        Self {
            module,
            unpromoted_dependencies,
            dependency_reports,
            do_not_use_artifacts,
            can_be_promoted,
        }
    }

    /// Number of blocking entries at this level
    pub fn blocking_count(&self) -> usize {
        self.unpromoted_dependencies.len() + self.do_not_use_artifacts.len()
    }

    /// Format the report as indented text suitable for CI output
    pub fn format_report(&self) -> String {
        let mut output = String::new();
        self.format_into(&mut output, 0);
        output
    }

    fn format_into(&self, output: &mut String, indent: usize) {
        let pad = "  ".repeat(indent);
        let verdict = if self.can_be_promoted {
            "can be promoted"
        } else {
            "cannot be promoted"
        };
        output.push_str(&format!("{pad}{} {verdict}\n", self.module.id));

        if !self.unpromoted_dependencies.is_empty() {
            output.push_str(&format!("{pad}  Unpromoted dependencies:\n"));
            for dependency in &self.unpromoted_dependencies {
                output.push_str(&format!("{pad}    - {}\n", dependency.id));
            }
        }

        if !self.do_not_use_artifacts.is_empty() {
            output.push_str(&format!("{pad}  Do-not-use artifacts:\n"));
            for artifact in &self.do_not_use_artifacts {
                output.push_str(&format!("{pad}    - {}\n", artifact.gavc()));
            }
        }

        for report in self.dependency_reports.values() {
            report.format_into(output, indent + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::artifact;
    use crate::model::Module;

    #[test]
    fn test_new_derives_verdict() {
        let clean = PromotionReport::new(Module::new("a", "1").to_ref(), vec![], BTreeMap::new(), vec![]);
        assert!(clean.can_be_promoted);
        assert_eq!(clean.blocking_count(), 0);

        let blocked = PromotionReport::new(
            Module::new("a", "1").to_ref(),
            vec![],
            BTreeMap::new(),
            vec![artifact("g:c:1.0")],
        );
        assert!(!blocked.can_be_promoted);
        assert_eq!(blocked.blocking_count(), 1);
    }

    #[test]
    fn test_format_report_nests_sub_reports() {
        let b = Module::new("b", "2.0").to_ref();
        let sub = PromotionReport::new(b.clone(), vec![], BTreeMap::new(), vec![artifact("g:c:1.0")]);
        let report = PromotionReport::new(
            Module::new("a", "1.0").to_ref(),
            vec![b],
            BTreeMap::from([("b:2.0".to_string(), sub)]),
            vec![],
        );

        let text = report.format_report();
        assert!(text.starts_with("a:1.0 cannot be promoted\n"));
        assert!(text.contains("    - b:2.0\n"));
        assert!(text.contains("  b:2.0 cannot be promoted\n"));
        assert!(text.contains("      - g:c:1.0\n"));
    }

    #[test]
    fn test_serialize_skips_empty_sub_reports() {
        let report = PromotionReport::new(Module::new("a", "1").to_ref(), vec![], BTreeMap::new(), vec![]);
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("dependency_reports").is_none());
        assert_eq!(json["can_be_promoted"], true);
    }
}
