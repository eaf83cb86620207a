//! File validator
//!
//! Checks one candidate file against the rules of the artifact it claims to
//! satisfy (targeted mode), or against the most permissive artifact of a
//! category that accepts its extension (bulk mode, for folder trees).
//!
//! Violations accumulate: a file that is both the wrong format and too
//! large reports both.

use crate::file::SubmittedFile;
use vault_catalog::{Artifact, ArtifactCatalog, ArtifactId, Category, CategoryId};

/// Reason a file was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FileViolation {
    /// Category is not declared by the catalog
    #[error("Invalid category")]
    UnknownCategory {
        /// Requested category
        category: CategoryId,
    },

    /// Artifact is not part of the category
    #[error("Invalid artifact type")]
    UnknownArtifact {
        /// Requested artifact
        artifact: ArtifactId,
    },

    /// Extension not accepted by the pinned artifact
    #[error("File type {} is not allowed for {artifact}. Allowed formats: {}", display_ext(.extension), .allowed.join(", "))]
    FormatNotAllowed {
        /// File extension, if any
        extension: Option<String>,
        /// Artifact display name
        artifact: String,
        /// Formats the artifact accepts
        allowed: Vec<String>,
    },

    /// Extension not accepted by any artifact of the category
    #[error("File type {} is not allowed in {category}", display_ext(.extension))]
    FormatNotAllowedInCategory {
        /// File extension, if any
        extension: Option<String>,
        /// Category display name
        category: String,
    },

    /// File larger than the artifact ceiling
    #[error("File size exceeds the {limit_mb}MB limit for {artifact}")]
    TooLarge {
        /// File size
        size_bytes: u64,
        /// Artifact ceiling in MB
        limit_mb: u64,
        /// Artifact display name
        artifact: String,
    },
}

fn display_ext(extension: &Option<String>) -> &str {
    extension.as_deref().unwrap_or("(none)")
}

/// How the artifact was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// Artifact pinned by the caller
    Targeted,
    /// Artifact inferred from the category
    Bulk,
}

/// Result of validating one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome<'a> {
    mode: ValidationMode,
    errors: Vec<FileViolation>,
    matched: Option<&'a Artifact>,
}

impl<'a> ValidationOutcome<'a> {
    fn rejected(mode: ValidationMode, violation: FileViolation) -> Self {
        Self {
            mode,
            errors: vec![violation],
            matched: None,
        }
    }

    /// No violations
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Violations, in check order
    #[inline]
    #[must_use]
    pub fn errors(&self) -> &[FileViolation] {
        &self.errors
    }

    /// Violation messages
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    /// Artifact the file was checked against, if one was resolved
    #[inline]
    #[must_use]
    pub fn matched_artifact(&self) -> Option<&'a Artifact> {
        self.matched
    }

    /// Targeted or bulk
    #[inline]
    #[must_use]
    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// Take the violations
    #[must_use]
    pub fn into_errors(self) -> Vec<FileViolation> {
        self.errors
    }
}

/// Validates candidate files against a catalog
#[derive(Debug, Clone, Copy)]
pub struct FileValidator<'a> {
    catalog: &'a ArtifactCatalog,
}

impl<'a> FileValidator<'a> {
    /// Create validator over `catalog`
    #[inline]
    #[must_use]
    pub fn new(catalog: &'a ArtifactCatalog) -> Self {
        Self { catalog }
    }

    /// Catalog in use
    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &'a ArtifactCatalog {
        self.catalog
    }

    /// Validate `file` for `category`
    ///
    /// With `artifact` set this is targeted mode; without it, bulk mode.
    #[must_use]
    pub fn validate(
        &self,
        file: &SubmittedFile,
        category: CategoryId,
        artifact: Option<&ArtifactId>,
    ) -> ValidationOutcome<'a> {
        let outcome = match artifact {
            Some(artifact) => self.validate_targeted(file, category, artifact),
            None => self.validate_bulk(file, category),
        };
        if !outcome.is_valid() {
            tracing::debug!(
                file = %file,
                category = %category,
                errors = ?outcome.messages(),
                "file rejected"
            );
        }
        outcome
    }

    fn validate_targeted(
        &self,
        file: &SubmittedFile,
        category: CategoryId,
        artifact: &ArtifactId,
    ) -> ValidationOutcome<'a> {
        let category = match self.catalog.category(category) {
            Ok(c) => c,
            Err(_) => {
                return ValidationOutcome::rejected(
                    ValidationMode::Targeted,
                    FileViolation::UnknownCategory { category },
                )
            }
        };
        let Some(found) = category.artifact(artifact) else {
            return ValidationOutcome::rejected(
                ValidationMode::Targeted,
                FileViolation::UnknownArtifact {
                    artifact: artifact.clone(),
                },
            );
        };
        ValidationOutcome {
            mode: ValidationMode::Targeted,
            errors: check_against(file, found),
            matched: Some(found),
        }
    }

    fn validate_bulk(&self, file: &SubmittedFile, category: CategoryId) -> ValidationOutcome<'a> {
        let category: &'a Category = match self.catalog.category(category) {
            Ok(c) => c,
            Err(_) => {
                return ValidationOutcome::rejected(ValidationMode::Bulk, FileViolation::UnknownCategory { category })
            }
        };
        let extension = file.extension();
        let Some(chosen) = most_permissive_match(category, extension.as_deref()) else {
            return ValidationOutcome::rejected(
                ValidationMode::Bulk,
                FileViolation::FormatNotAllowedInCategory {
                    extension,
                    category: category.name().to_string(),
                },
            );
        };
        ValidationOutcome {
            mode: ValidationMode::Bulk,
            errors: check_against(file, chosen),
            matched: Some(chosen),
        }
    }
}

/// Artifact of `category` accepting `extension` with the largest size
/// ceiling; the first declared wins a tie
#[must_use]
pub fn most_permissive_match<'a>(category: &'a Category, extension: Option<&str>) -> Option<&'a Artifact> {
    let extension = extension?;
    category
        .artifacts()
        .filter(|a| a.accepts_extension(extension))
        .fold(None, |best: Option<&'a Artifact>, candidate| match best {
            Some(current) if current.max_size_bytes() >= candidate.max_size_bytes() => Some(current),
            _ => Some(candidate),
        })
}

/// Single-artifact check: format membership and size ceiling, both reported
#[must_use]
pub fn check_against(file: &SubmittedFile, artifact: &Artifact) -> Vec<FileViolation> {
    let mut errors = Vec::new();
    let extension = file.extension();
    let format_ok = extension
        .as_deref()
        .is_some_and(|ext| artifact.accepts_extension(ext));
    if !format_ok {
        errors.push(FileViolation::FormatNotAllowed {
            extension,
            artifact: artifact.name().to_string(),
            allowed: artifact.allowed_formats().to_vec(),
        });
    }
    if file.size_bytes() > artifact.max_size_bytes() {
        errors.push(FileViolation::TooLarge {
            size_bytes: file.size_bytes(),
            limit_mb: artifact.max_size_mb(),
            artifact: artifact.name().to_string(),
        });
    }
    errors
}
