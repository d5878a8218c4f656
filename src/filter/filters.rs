//! Concrete filters.
//!
//! Constructors that take a required parameter validate it up front, so an
//! unusable filter is rejected before any traversal starts.

use std::collections::BTreeSet;

use serde_json::json;

use super::{FieldMap, Filter};
use crate::error::{CatalogError, CatalogResult};
use crate::model::{Artifact, Dependency, EntityKind, License, Module};

/// Returns true if the groupId starts with one of the prefixes.
pub fn is_corporate_group(group_id: &str, prefixes: &[String]) -> bool {
    prefixes
        .iter()
        .any(|prefix| !prefix.is_empty() && group_id.starts_with(prefix.as_str()))
}

fn single_field(key: &str, value: serde_json::Value) -> FieldMap {
    let mut fields = FieldMap::new();
    fields.insert(key.to_string(), value);
    fields
}

/// Keeps licenses whose approval state equals the given value.
///
/// Licenses still pending review match neither `true` nor `false`.
#[derive(Debug, Clone)]
pub struct ApprovedFilter {
    approved: bool,
}

impl ApprovedFilter {
    pub fn new(approved: bool) -> Self {
        Self { approved }
    }
}

impl Filter for ApprovedFilter {
    fn matches_license(&self, license: &License) -> bool {
        license.approved == Some(self.approved)
    }

    fn narrowing_fields(&self, kind: EntityKind) -> FieldMap {
        match kind {
            EntityKind::License => single_field("approved", json!(self.approved)),
            _ => FieldMap::new(),
        }
    }
}

/// Keeps artifacts published under one of the corporate groupId prefixes.
#[derive(Debug, Clone)]
pub struct CorporateFilter {
    prefixes: Vec<String>,
}

impl CorporateFilter {
    pub fn new(prefixes: Vec<String>) -> CatalogResult<Self> {
        let prefixes: Vec<String> = prefixes.into_iter().filter(|p| !p.is_empty()).collect();
        if prefixes.is_empty() {
            return Err(CatalogError::InvalidFilter(
                "corporate filter needs at least one groupId prefix".to_string(),
            ));
        }
        Ok(Self { prefixes })
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }
}

impl Filter for CorporateFilter {
    fn matches_artifact(&self, artifact: &Artifact) -> bool {
        is_corporate_group(artifact.group_id(), &self.prefixes)
    }
}

/// Keeps artifacts carrying a given license name.
#[derive(Debug, Clone)]
pub struct LicenseIdFilter {
    name: String,
}

impl LicenseIdFilter {
    pub fn new(name: impl Into<String>) -> CatalogResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CatalogError::InvalidFilter(
                "license filter needs a license name".to_string(),
            ));
        }
        Ok(Self { name })
    }
}

impl Filter for LicenseIdFilter {
    fn matches_artifact(&self, artifact: &Artifact) -> bool {
        artifact.has_license(&self.name)
    }

    fn narrowing_fields(&self, kind: EntityKind) -> FieldMap {
        match kind {
            EntityKind::Artifact => single_field("licenses", json!(self.name)),
            _ => FieldMap::new(),
        }
    }
}

/// Keeps modules and artifacts in the given promotion state.
#[derive(Debug, Clone)]
pub struct PromotedFilter {
    promoted: bool,
}

impl PromotedFilter {
    pub fn new(promoted: bool) -> Self {
        Self { promoted }
    }
}

impl Filter for PromotedFilter {
    fn matches_module(&self, module: &Module) -> bool {
        module.promoted == self.promoted
    }

    fn matches_artifact(&self, artifact: &Artifact) -> bool {
        artifact.promoted == self.promoted
    }

    fn narrowing_fields(&self, kind: EntityKind) -> FieldMap {
        match kind {
            EntityKind::Module | EntityKind::Artifact => {
                single_field("promoted", json!(self.promoted))
            }
            _ => FieldMap::new(),
        }
    }
}

/// Keeps artifacts with the given do-not-use flag.
#[derive(Debug, Clone)]
pub struct DoNotUseFilter {
    do_not_use: bool,
}

impl DoNotUseFilter {
    pub fn new(do_not_use: bool) -> Self {
        Self { do_not_use }
    }
}

impl Filter for DoNotUseFilter {
    fn matches_artifact(&self, artifact: &Artifact) -> bool {
        artifact.do_not_use == self.do_not_use
    }

    fn narrowing_fields(&self, kind: EntityKind) -> FieldMap {
        match kind {
            EntityKind::Artifact => single_field("do_not_use", json!(self.do_not_use)),
            _ => FieldMap::new(),
        }
    }
}

/// Keeps dependency edges whose scope is one of the given values.
///
/// Scopes are compared as opaque strings.
#[derive(Debug, Clone)]
pub struct ScopeFilter {
    scopes: BTreeSet<String>,
}

impl ScopeFilter {
    pub fn new<I, S>(scopes: I) -> CatalogResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let scopes: BTreeSet<String> = scopes.into_iter().map(Into::into).collect();
        if scopes.is_empty() {
            return Err(CatalogError::InvalidFilter(
                "scope filter needs at least one scope".to_string(),
            ));
        }
        Ok(Self { scopes })
    }
}

impl Filter for ScopeFilter {
    fn matches_dependency(&self, dependency: &Dependency) -> bool {
        self.scopes.contains(&dependency.scope)
    }
}
