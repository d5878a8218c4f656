//! Filter chain scoping which entities take part in a traversal.
//!
//! A [`FilterSet`] is an ordered AND-combination of [`Filter`]s plus the
//! traversal controls (depth, full recursion), the corporate groupId
//! allowlist and the report [`Decorator`]. Filters are asked about one
//! [`Entity`] at a time and only implement the kinds they care about; every
//! other kind passes.
//!
//! # Example
//!
//! ```rust
//! use modcatalog::filter::{CorporateFilter, Entity, FilterSet};
//! use modcatalog::model::{Artifact, ArtifactKey};
//!
//! let filters = FilterSet::new()
//!     .with_filter(CorporateFilter::new(vec!["org.acme".to_string()]).unwrap());
//!
//! let inhouse = Artifact::new(ArtifactKey::new("org.acme.core", "api", "1.0"));
//! let external = Artifact::new(ArtifactKey::new("com.google", "guava", "33.0"));
//!
//! assert!(filters.matches(Entity::Artifact(&inhouse)));
//! assert!(!filters.matches(Entity::Artifact(&external)));
//! ```

mod filters;

pub use filters::{
    is_corporate_group, ApprovedFilter, CorporateFilter, DoNotUseFilter, LicenseIdFilter,
    PromotedFilter, ScopeFilter,
};

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::config::{DecoratorConfig, EngineConfig};
use crate::model::{Artifact, Dependency, EntityKind, License, Module};

/// Field name to expected value, usable by a store to pre-filter a query.
pub type FieldMap = BTreeMap<String, Value>;

/// An entity presented to the filter chain.
#[derive(Debug, Clone, Copy)]
pub enum Entity<'a> {
    Module(&'a Module),
    Artifact(&'a Artifact),
    License(&'a License),
    Dependency(&'a Dependency),
}

impl Entity<'_> {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Module(_) => EntityKind::Module,
            Entity::Artifact(_) => EntityKind::Artifact,
            Entity::License(_) => EntityKind::License,
            Entity::Dependency(_) => EntityKind::Dependency,
        }
    }
}

/// A side-effect-free predicate over catalog entities.
///
/// Every per-kind method defaults to accepting, so a filter only overrides
/// the kinds it restricts.
pub trait Filter: fmt::Debug + Send + Sync {
    fn matches_module(&self, _module: &Module) -> bool {
        true
    }

    fn matches_artifact(&self, _artifact: &Artifact) -> bool {
        true
    }

    fn matches_license(&self, _license: &License) -> bool {
        true
    }

    fn matches_dependency(&self, _dependency: &Dependency) -> bool {
        true
    }

    /// Dispatches on the entity kind.
    fn matches(&self, entity: Entity<'_>) -> bool {
        match entity {
            Entity::Module(module) => self.matches_module(module),
            Entity::Artifact(artifact) => self.matches_artifact(artifact),
            Entity::License(license) => self.matches_license(license),
            Entity::Dependency(dependency) => self.matches_dependency(dependency),
        }
    }

    /// Fields a store query may use to narrow results of the given kind.
    ///
    /// Must never be stricter than the predicate itself.
    fn narrowing_fields(&self, _kind: EntityKind) -> FieldMap {
        FieldMap::new()
    }
}

/// Report shaping switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decorator {
    pub show_corporate: bool,
    pub show_third_party: bool,
    pub show_unapproved_licenses: bool,
}

impl Default for Decorator {
    fn default() -> Self {
        Self {
            show_corporate: true,
            show_third_party: true,
            show_unapproved_licenses: true,
        }
    }
}

impl From<&DecoratorConfig> for Decorator {
    fn from(config: &DecoratorConfig) -> Self {
        Self {
            show_corporate: config.show_corporate,
            show_third_party: config.show_third_party,
            show_unapproved_licenses: config.show_unapproved_licenses,
        }
    }
}

impl Decorator {
    /// Whether a dependency entry of the given origin is kept in reports.
    pub fn keeps(&self, is_corporate: bool) -> bool {
        if is_corporate {
            self.show_corporate
        } else {
            self.show_third_party
        }
    }
}

/// Ordered AND-combination of filters with traversal controls.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    filters: Vec<Arc<dyn Filter>>,
    max_depth: Option<usize>,
    full_recursion: bool,
    corporate_group_ids: Vec<String>,
    decorator: Decorator,
}

impl FilterSet {
    /// Creates an empty filter set: matches everything, no depth limit, no
    /// full recursion.
    ///
    /// Without a depth limit, graphs and trees are walked to the end while
    /// dependency reports list direct edges only; see [`Self::max_depth`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a filter set carrying the configured defaults.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            filters: Vec::new(),
            max_depth: config.traversal.max_depth,
            full_recursion: config.traversal.full_recursion,
            corporate_group_ids: config.corporate_group_ids.clone(),
            decorator: Decorator::from(&config.decorator),
        }
    }

    /// Appends a filter.
    pub fn with_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.add_filter(filter);
        self
    }

    pub fn add_filter(&mut self, filter: impl Filter + 'static) {
        self.filters.push(Arc::new(filter));
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_full_recursion(mut self, full_recursion: bool) -> Self {
        self.full_recursion = full_recursion;
        self
    }

    pub fn with_corporate_group_ids(mut self, prefixes: Vec<String>) -> Self {
        self.corporate_group_ids = prefixes;
        self
    }

    pub fn with_decorator(mut self, decorator: Decorator) -> Self {
        self.decorator = decorator;
        self
    }

    /// True iff every filter accepts the entity.
    pub fn matches(&self, entity: Entity<'_>) -> bool {
        self.filters.iter().all(|f| f.matches(entity))
    }

    pub fn matches_module(&self, module: &Module) -> bool {
        self.matches(Entity::Module(module))
    }

    pub fn matches_artifact(&self, artifact: &Artifact) -> bool {
        self.matches(Entity::Artifact(artifact))
    }

    pub fn matches_dependency(&self, dependency: &Dependency) -> bool {
        self.matches(Entity::Dependency(dependency))
    }

    /// Decides whether a license may appear in a licensing report.
    ///
    /// Unknown placeholders are always shown. Other licenses must pass the
    /// license predicates, and rejected ones additionally need the
    /// decorator's `show_unapproved_licenses`.
    pub fn should_be_in_report(&self, license: &License) -> bool {
        if license.unknown {
            return true;
        }
        if license.is_rejected() && !self.decorator.show_unapproved_licenses {
            return false;
        }
        self.matches(Entity::License(license))
    }

    /// Merged narrowing fields of every filter for the given kind.
    ///
    /// When two filters constrain the same field, the first one wins; the
    /// post-query predicate still applies both.
    pub fn narrowing_fields(&self, kind: EntityKind) -> FieldMap {
        let mut fields = FieldMap::new();
        for filter in &self.filters {
            for (key, value) in filter.narrowing_fields(kind) {
                fields.entry(key).or_insert(value);
            }
        }
        fields
    }

    /// Maximum number of module hops.
    ///
    /// `None` reads differently per query. Graph and tree walks take it as
    /// unbounded. Dependency reports take it as direct edges only, and go
    /// deeper only with an explicit limit or full recursion.
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    pub fn full_recursion(&self) -> bool {
        self.full_recursion
    }

    /// Returns true if expanding at `depth` module hops is allowed.
    pub fn depth_allows(&self, depth: usize) -> bool {
        self.max_depth.map_or(true, |max| depth < max)
    }

    pub fn corporate_group_ids(&self) -> &[String] {
        &self.corporate_group_ids
    }

    /// Classifies a groupId against the corporate allowlist.
    pub fn is_corporate(&self, group_id: &str) -> bool {
        is_corporate_group(group_id, &self.corporate_group_ids)
    }

    pub fn decorator(&self) -> Decorator {
        self.decorator
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

/// Checks a serialized entity against narrowing fields.
///
/// Array-valued fields match when they contain the expected value; a missing
/// field matches only an expected `null`.
pub fn fields_match(entity: &Value, fields: &FieldMap) -> bool {
    fields.iter().all(|(key, expected)| match entity.get(key) {
        Some(Value::Array(items)) => items.contains(expected),
        Some(actual) => actual == expected,
        None => expected.is_null(),
    })
}
