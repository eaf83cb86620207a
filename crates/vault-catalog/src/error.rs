//! Catalog errors
//!
//! Lookups of unknown categories or artifacts are configuration errors and
//! are reported here, distinct from the user-facing validation messages
//! produced further up the stack.

use std::path::PathBuf;

/// Errors raised while building, loading or querying an artifact catalog
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Category key is not one of the known category identifiers, or the
    /// category is absent from this catalog
    #[error("Invalid category: {0}")]
    InvalidCategory(String),

    /// Artifact is not declared in the given category
    #[error("Invalid artifact type: {artifact} is not part of {category}")]
    InvalidArtifact {
        /// Category searched
        category: String,
        /// Missing artifact id
        artifact: String,
    },

    /// Identifier declared more than once
    #[error("duplicate {kind} identifier: {id}")]
    DuplicateId {
        /// `"category"` or `"artifact"`
        kind: &'static str,
        /// Repeated identifier
        id: String,
    },

    /// Artifact record violates a structural invariant
    #[error("artifact {artifact} is invalid: {reason}")]
    InvalidDefinition {
        /// Offending artifact id
        artifact: String,
        /// Broken invariant
        reason: String,
    },

    /// Catalog document could not be parsed
    #[error("failed to parse catalog: {0}")]
    Parse(String),

    /// Catalog file could not be read
    #[error("failed to read catalog {path}: {source}")]
    Io {
        /// Catalog path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl CatalogError {
    /// Shorthand for an invariant violation on one artifact
    #[inline]
    pub(crate) fn definition(artifact: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            artifact: artifact.into(),
            reason: reason.into(),
        }
    }

    /// True for lookup failures (as opposed to malformed catalog data)
    #[inline]
    #[must_use]
    pub fn is_lookup(&self) -> bool {
        matches!(self, Self::InvalidCategory(_) | Self::InvalidArtifact { .. })
    }
}

impl From<toml::de::Error> for CatalogError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value.to_string())
    }
}
