//! Category records

use crate::artifact::Artifact;
use crate::error::CatalogError;
use crate::id::{ArtifactId, CategoryId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A themed grouping of artifacts (e.g. "Problem Proof")
///
/// Artifacts keep their declaration order; it is the tie-break for every
/// ordering the vault produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    id: CategoryId,
    name: String,
    description: String,
    artifacts: IndexMap<ArtifactId, Artifact>,
    /// Ids passed to `with_artifact` more than once; reported on build
    #[serde(skip)]
    duplicates: Vec<ArtifactId>,
}

impl Category {
    /// Create empty category
    #[must_use]
    pub fn new(id: CategoryId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            artifacts: IndexMap::new(),
            duplicates: Vec::new(),
        }
    }

    /// With description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append an artifact; validation happens when the catalog is built
    ///
    /// A repeated id keeps the first record and fails the build.
    #[must_use]
    pub fn with_artifact(mut self, artifact: Artifact) -> Self {
        let key = artifact.id().clone();
        if self.artifacts.contains_key(&key) {
            self.duplicates.push(key);
        } else {
            self.artifacts.insert(key, artifact);
        }
        self
    }

    /// Build from raw parts, validating each artifact and rejecting duplicates
    pub(crate) fn from_parts(
        id: CategoryId,
        name: String,
        description: String,
        artifacts: Vec<Artifact>,
    ) -> Result<Self, CatalogError> {
        let mut map = IndexMap::with_capacity(artifacts.len());
        for artifact in artifacts {
            let artifact = artifact.validate()?;
            let key = artifact.id().clone();
            if map.insert(key.clone(), artifact).is_some() {
                return Err(CatalogError::DuplicateId {
                    kind: "artifact",
                    id: key.to_string(),
                });
            }
        }
        Ok(Self {
            id,
            name,
            description,
            artifacts: map,
            duplicates: Vec::new(),
        })
    }

    /// Re-run artifact validation (used for builder-made categories)
    pub(crate) fn validated(self) -> Result<Self, CatalogError> {
        if let Some(id) = self.duplicates.first() {
            return Err(CatalogError::DuplicateId {
                kind: "artifact",
                id: id.to_string(),
            });
        }
        let artifacts = self.artifacts.into_values().collect();
        Self::from_parts(self.id, self.name, self.description, artifacts)
    }

    /// Identifier
    #[inline]
    #[must_use]
    pub fn id(&self) -> CategoryId {
        self.id
    }

    /// Display name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Description
    #[inline]
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Artifacts in declaration order
    pub fn artifacts(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts.values()
    }

    /// Lookup one artifact
    #[inline]
    #[must_use]
    pub fn artifact(&self, id: &ArtifactId) -> Option<&Artifact> {
        self.artifacts.get(id)
    }

    /// Number of artifacts
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// True if the category declares no artifacts
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}
