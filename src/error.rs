//! Error types shared across the catalog.
//!
//! Lookup failures for the entity an operation is about surface as one of the
//! `*NotFound` variants. Problems met while expanding secondary nodes are not
//! errors at all; traversals degrade to partial results instead.

use crate::store::StoreError;

/// Errors returned by catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// No module with this ID exists in the store.
    #[error("Module not found: {0}")]
    ModuleNotFound(String),

    /// No artifact with this GAVC exists in the store.
    #[error("Artifact not found: {0}")]
    ArtifactNotFound(String),

    /// No license with this name exists in the store.
    #[error("License not found: {0}")]
    LicenseNotFound(String),

    /// No organization with this name exists in the store.
    #[error("Organization not found: {0}")]
    OrganizationNotFound(String),

    /// A GAVC string could not be split into its fields.
    #[error("Invalid GAVC '{0}': expected groupId:artifactId:version[:classifier]")]
    InvalidGavc(String),

    /// A filter was constructed with unusable parameters.
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// A module submission is missing required fields.
    #[error("Invalid submission: {0}")]
    InvalidSubmission(String),

    /// The repository store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

impl CatalogError {
    /// Returns true for the not-found family of errors.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ModuleNotFound(_)
                | Self::ArtifactNotFound(_)
                | Self::LicenseNotFound(_)
                | Self::OrganizationNotFound(_)
        )
    }
}
