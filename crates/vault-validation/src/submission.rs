//! Whole-submission validation
//!
//! A submission is every file the picker returned for one selected artifact.
//! `File` artifacts pin each file to the selection; `Folder` artifacts hold a
//! tree whose files cannot be pre-classified, so each is checked in bulk mode
//! against the category.

use crate::file::SubmittedFile;
use crate::validator::{FileValidator, FileViolation};
use vault_catalog::{Artifact, ArtifactId, ArtifactKind, CategoryId};

/// How a submission's files are validated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionMode {
    /// Each file against the selected artifact
    Targeted,
    /// Each file against the most permissive matching artifact of the category
    Folder,
}

impl SubmissionMode {
    /// Mode implied by the artifact's kind
    #[inline]
    #[must_use]
    pub fn for_artifact(artifact: &Artifact) -> Self {
        match artifact.kind() {
            ArtifactKind::File => Self::Targeted,
            ArtifactKind::Folder => Self::Folder,
        }
    }
}

/// File that failed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedFile {
    /// The file
    pub file: SubmittedFile,
    /// Every violation found
    pub errors: Vec<FileViolation>,
}

/// Split of a submission into files to enqueue and files to report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionCheck {
    /// Mode used
    pub mode: SubmissionMode,
    /// Files that passed, in submission order
    pub accepted: Vec<SubmittedFile>,
    /// Files that failed, in submission order
    pub rejected: Vec<RejectedFile>,
}

impl SubmissionCheck {
    /// No file was rejected
    #[inline]
    #[must_use]
    pub fn all_accepted(&self) -> bool {
        self.rejected.is_empty()
    }

    /// `"<file>: <message>"` per violation
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.rejected
            .iter()
            .flat_map(|r| r.errors.iter().map(move |e| format!("{}: {e}", r.file)))
            .collect()
    }
}

impl<'a> FileValidator<'a> {
    /// Validate every file of a submission for `artifact` in `category`
    ///
    /// An artifact the category does not declare rejects every file with
    /// [`FileViolation::UnknownArtifact`].
    #[must_use]
    pub fn validate_submission(
        &self,
        files: &[SubmittedFile],
        category: CategoryId,
        artifact: &ArtifactId,
    ) -> SubmissionCheck {
        let mode = self
            .catalog()
            .artifact(category, artifact)
            .map_or(SubmissionMode::Targeted, SubmissionMode::for_artifact);

        let mut check = SubmissionCheck {
            mode,
            accepted: Vec::with_capacity(files.len()),
            rejected: Vec::new(),
        };
        for file in files {
            let outcome = match mode {
                SubmissionMode::Targeted => self.validate(file, category, Some(artifact)),
                SubmissionMode::Folder => self.validate(file, category, None),
            };
            if outcome.is_valid() {
                check.accepted.push(file.clone());
            } else {
                check.rejected.push(RejectedFile {
                    file: file.clone(),
                    errors: outcome.into_errors(),
                });
            }
        }
        tracing::debug!(
            category = %category,
            artifact = %artifact,
            accepted = check.accepted.len(),
            rejected = check.rejected.len(),
            "submission validated"
        );
        check
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vault_catalog::{ArtifactCatalog, Category, GrowthStage, BYTES_PER_MB};

    fn catalog() -> ArtifactCatalog {
        ArtifactCatalog::builder("submission-test")
            .category(
                Category::new(CategoryId::ProblemProof, "Problem Proof")
                    .with_artifact(
                        Artifact::new("problem_statement", "Problem Statement")
                            .with_formats(["pdf", "docx"])
                            .with_max_size_mb(10)
                            .with_stages([GrowthStage::Seed]),
                    )
                    .with_artifact(
                        Artifact::new("customer_interviews", "Customer Interviews")
                            .with_formats(["pdf", "mp3", "txt"])
                            .with_max_size_mb(50)
                            .with_kind(ArtifactKind::Folder)
                            .with_stages([GrowthStage::Seed]),
                    ),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn file_artifact_validates_targeted() {
        let catalog = catalog();
        let files = [
            SubmittedFile::metadata("problem.pdf", BYTES_PER_MB),
            SubmittedFile::metadata("problem.mp3", BYTES_PER_MB),
        ];
        let check = FileValidator::new(&catalog).validate_submission(
            &files,
            CategoryId::ProblemProof,
            &"problem_statement".into(),
        );
        assert_eq!(check.mode, SubmissionMode::Targeted);
        assert_eq!(check.accepted.len(), 1);
        assert_eq!(check.rejected[0].file.name(), "problem.mp3");
    }

    #[test]
    fn folder_artifact_validates_each_file_in_bulk() {
        let catalog = catalog();
        let files = [
            SubmittedFile::metadata("a.mp3", 40 * BYTES_PER_MB).with_relative_path("interviews/a.mp3"),
            SubmittedFile::metadata("b.docx", BYTES_PER_MB).with_relative_path("interviews/b.docx"),
            SubmittedFile::metadata("c.png", 1).with_relative_path("interviews/c.png"),
        ];
        let check = FileValidator::new(&catalog).validate_submission(
            &files,
            CategoryId::ProblemProof,
            &"customer_interviews".into(),
        );
        assert_eq!(check.mode, SubmissionMode::Folder);
        assert_eq!(check.accepted.len(), 2);
        assert_eq!(
            check.messages(),
            vec!["interviews/c.png: File type .png is not allowed in Problem Proof".to_string()]
        );
    }

    #[test]
    fn unknown_artifact_rejects_everything() {
        let catalog = catalog();
        let files = [SubmittedFile::metadata("a.pdf", 1)];
        let check = FileValidator::new(&catalog).validate_submission(&files, CategoryId::ProblemProof, &"nope".into());
        assert!(!check.all_accepted());
        assert_eq!(check.rejected[0].errors, vec![FileViolation::UnknownArtifact { artifact: "nope".into() }]);
    }
}
