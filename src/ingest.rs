//! Module submissions.
//!
//! A submission is the normalized metadata of one build: the module, the
//! artifacts it publishes, the artifacts it depends on and its submodules.

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CatalogResult};
use crate::model::{Artifact, Module};
use crate::store::RepositoryStore;

/// A dependency as submitted: the full target artifact and the scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedDependency {
    pub target: Artifact,
    pub scope: String,
}

/// Build metadata for one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSubmission {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
    #[serde(default)]
    pub dependencies: Vec<SubmittedDependency>,
    #[serde(default)]
    pub submodules: Vec<ModuleSubmission>,
}

impl ModuleSubmission {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            artifacts: Vec::new(),
            dependencies: Vec::new(),
            submodules: Vec::new(),
        }
    }

    pub fn with_artifact(mut self, artifact: Artifact) -> Self {
        self.artifacts.push(artifact);
        self
    }

    pub fn with_dependency(mut self, target: Artifact, scope: impl Into<String>) -> Self {
        self.dependencies.push(SubmittedDependency {
            target,
            scope: scope.into(),
        });
        self
    }

    pub fn with_submodule(mut self, submodule: ModuleSubmission) -> Self {
        self.submodules.push(submodule);
        self
    }

    fn validate(&self) -> CatalogResult<()> {
        if self.name.trim().is_empty() || self.version.trim().is_empty() {
            return Err(CatalogError::InvalidSubmission(
                "module name and version are required".to_string(),
            ));
        }
        self.submodules.iter().try_for_each(ModuleSubmission::validate)
    }

    /// Converts to the stored module shape: artifacts become GAVC references.
    fn to_module(&self) -> Module {
        let mut module = Module::new(self.name.clone(), self.version.clone());
        for artifact in &self.artifacts {
            module.add_artifact(artifact.gavc());
        }
        for dependency in &self.dependencies {
            module.add_dependency(dependency.target.gavc(), dependency.scope.clone());
        }
        for submodule in &self.submodules {
            module.add_submodule(submodule.to_module());
        }
        module
    }

    fn owned_artifacts(&self) -> Vec<&Artifact> {
        let mut artifacts: Vec<&Artifact> = self.artifacts.iter().collect();
        for submodule in &self.submodules {
            artifacts.extend(submodule.owned_artifacts());
        }
        artifacts
    }

    fn dependency_targets(&self) -> Vec<&Artifact> {
        let mut targets: Vec<&Artifact> = self.dependencies.iter().map(|d| &d.target).collect();
        for submodule in &self.submodules {
            targets.extend(submodule.dependency_targets());
        }
        targets
    }
}

/// Stores a submitted module with its artifacts.
///
/// Owned artifacts are written as submitted, except that flags already set
/// in the store (`promoted`, `do_not_use`) stay set and metadata the
/// submission leaves out is kept. A promoted module stays promoted.
/// Dependency targets are only written when the store does not know them
/// yet, so their flags survive resubmissions of dependent modules.
///
/// # Errors
///
/// `InvalidSubmission` if the module or a submodule lacks a name or version.
pub fn submit_module<S>(store: &S, submission: &ModuleSubmission) -> CatalogResult<Module>
where
    S: RepositoryStore + ?Sized,
{
    submission.validate()?;
    let mut module = submission.to_module();
    if let Some(existing) = store.get_module(&module.id())? {
        module.promoted |= existing.promoted;
    }

    for artifact in submission.owned_artifacts() {
        let merged = match store.get_artifact(&artifact.gavc())? {
            Some(existing) => merge_stored(artifact.clone(), existing),
            None => artifact.clone(),
        };
        store.store_artifact(merged)?;
    }

    let mut created = 0usize;
    for target in submission.dependency_targets() {
        if module.owns(&target.gavc()) || store.get_artifact(&target.gavc())?.is_some() {
            continue;
        }
        store.store_artifact(target.clone())?;
        created += 1;
    }

    store.store_module(module.clone())?;
    tracing::info!(
        module = %module.id(),
        artifacts = module.all_artifacts().len(),
        new_targets = created,
        "module submitted"
    );
    Ok(module)
}

/// Carries the stored flags and metadata over to a resubmitted artifact.
fn merge_stored(mut submitted: Artifact, existing: Artifact) -> Artifact {
    submitted.promoted |= existing.promoted;
    submitted.do_not_use |= existing.do_not_use;
    if submitted.download_url.is_none() {
        submitted.download_url = existing.download_url;
    }
    if submitted.size.is_none() {
        submitted.size = existing.size;
    }
    if submitted.provider.is_none() {
        submitted.provider = existing.provider;
    }
    if submitted.licenses.is_empty() {
        submitted.licenses = existing.licenses;
    }
    submitted
}
