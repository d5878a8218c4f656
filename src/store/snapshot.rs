//! JSON catalog snapshots.
//!
//! A snapshot is the serialized content of a store: licenses,
//! organizations, artifacts and modules (modules reference artifacts by
//! GAVC).
//!
//! ```json
//! {
//!   "artifacts": [{"group_id": "g", "artifact_id": "a", "version": "1.0"}],
//!   "modules": [{"name": "a", "version": "1.0", "artifacts": ["g:a:1.0"]}]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use super::{StoreError, StoreResult};
use crate::model::{Artifact, License, Module, Organization};

/// Serialized store content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub licenses: Vec<License>,
    #[serde(default)]
    pub organizations: Vec<Organization>,
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
    #[serde(default)]
    pub modules: Vec<Module>,
}

/// Reads and validates a snapshot file.
pub fn parse_file(path: &Path) -> StoreResult<CatalogSnapshot> {
    let content = fs::read_to_string(path)?;
    parse_str(&content)
}

/// Parses and validates a snapshot from a JSON string.
///
/// ```
/// use modcatalog::store::snapshot::parse_str;
///
/// let json = r#"{"modules": [{"name": "a", "version": "1.0"}]}"#;
/// let snapshot = parse_str(json).unwrap();
/// assert_eq!(snapshot.modules.len(), 1);
/// ```
pub fn parse_str(content: &str) -> StoreResult<CatalogSnapshot> {
    let snapshot: CatalogSnapshot = serde_json::from_str(content)?;
    validate(&snapshot)?;
    Ok(snapshot)
}

/// Writes a snapshot as pretty-printed JSON.
pub fn write_file(path: &Path, snapshot: &CatalogSnapshot) -> StoreResult<()> {
    let content = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, content)?;
    Ok(())
}

/// Checks structural invariants of a snapshot.
///
/// Rejects modules without name or version and duplicate module IDs.
/// Dependencies on artifacts absent from the snapshot are allowed; they are
/// reported as unresolved by traversals.
pub fn validate(snapshot: &CatalogSnapshot) -> StoreResult<()> {
    let mut ids = HashSet::new();
    for module in &snapshot.modules {
        if module.name.is_empty() || module.version.is_empty() {
            return Err(StoreError::Invalid(
                "module without name or version".to_string(),
            ));
        }
        if !ids.insert(module.id()) {
            return Err(StoreError::Invalid(format!(
                "duplicate module {}",
                module.id()
            )));
        }
    }

    let known: HashSet<String> = snapshot.artifacts.iter().map(Artifact::gavc).collect();
    let dangling = snapshot
        .modules
        .iter()
        .flat_map(Module::all_dependencies)
        .filter(|d| !known.contains(&d.target))
        .count();
    if dangling > 0 {
        tracing::warn!(dangling, "snapshot has dependencies on unknown artifacts");
    }

    Ok(())
}
