//! Pre-submission requirements
//!
//! Every uploaded evidence file carries an artifact type and a description.
//! Missing metadata blocks the submission before any file is opened; these
//! errors are resolved by the user filling in the form, so they are kept
//! apart from file violations.

use serde::{Deserialize, Serialize};
use vault_catalog::ArtifactId;

/// Default description limit in characters
pub const DEFAULT_MAX_DESCRIPTION_CHARS: usize = 500;

/// Metadata chosen for the next batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadSelection {
    /// Selected artifact
    pub artifact: Option<ArtifactId>,
    /// Free-text description
    pub description: String,
}

impl UploadSelection {
    /// Empty selection
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With artifact
    #[must_use]
    pub fn with_artifact(mut self, artifact: impl Into<ArtifactId>) -> Self {
        self.artifact = Some(artifact.into());
        self
    }

    /// With description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Forget artifact and description (batch finished)
    pub fn reset(&mut self) {
        self.artifact = None;
        self.description.clear();
    }
}

/// Missing or malformed submission metadata
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequirementError {
    /// No artifact selected
    #[error("Please select an artifact type")]
    MissingArtifact,

    /// Description empty or whitespace
    #[error("Please provide a description")]
    MissingDescription,

    /// Description longer than allowed
    #[error("Description must be {max} characters or fewer (currently {len})")]
    DescriptionTooLong {
        /// Characters entered
        len: usize,
        /// Configured limit
        max: usize,
    },
}

/// Configurable submission limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionRules {
    /// Maximum description length in characters
    pub max_description_chars: usize,
}

impl Default for SubmissionRules {
    fn default() -> Self {
        Self {
            max_description_chars: DEFAULT_MAX_DESCRIPTION_CHARS,
        }
    }
}

impl SubmissionRules {
    /// Requirement errors for `selection`; empty means the submission may proceed
    #[must_use]
    pub fn check(&self, selection: &UploadSelection) -> Vec<RequirementError> {
        let mut errors = Vec::new();
        if selection.artifact.is_none() {
            errors.push(RequirementError::MissingArtifact);
        }
        let len = selection.description.chars().count();
        if selection.description.trim().is_empty() {
            errors.push(RequirementError::MissingDescription);
        } else if len > self.max_description_chars {
            errors.push(RequirementError::DescriptionTooLong {
                len,
                max: self.max_description_chars,
            });
        }
        errors
    }
}
