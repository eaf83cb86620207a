//! Upload gate
//!
//! One pure function decides whether an upload may start. The submit action
//! and the UI enable-state both read it, so the two cannot disagree.

use crate::requirements::{RequirementError, SubmissionRules, UploadSelection};
use vault_catalog::{ArtifactCatalog, ArtifactId, CategoryId, CompletionTracker, GrowthStage, UploadedArtifacts};

/// Why the gate is closed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateReason {
    /// Missing or malformed metadata
    #[error(transparent)]
    Requirement(#[from] RequirementError),

    /// Category not declared by the catalog
    #[error("Invalid category: {0}")]
    UnknownCategory(CategoryId),

    /// Category has nothing applicable at this stage
    #[error("No artifacts are required for {0} at this stage")]
    NotApplicable(CategoryId),

    /// Every applicable artifact is already uploaded
    #[error("All artifacts for {0} have been uploaded")]
    CategoryComplete(CategoryId),

    /// Selected artifact does not belong to the category
    #[error("Invalid artifact type: {0}")]
    ArtifactNotInCategory(ArtifactId),

    /// Selected artifact is hidden at this stage
    #[error("{artifact} is not required at the {stage} stage")]
    ArtifactNotApplicable {
        /// Selected artifact
        artifact: ArtifactId,
        /// Current stage
        stage: GrowthStage,
    },

    /// Selected artifact already has an upload on record
    #[error("{0} has already been uploaded")]
    ArtifactAlreadyUploaded(ArtifactId),
}

impl GateReason {
    /// Requirement-channel reason (fixed by filling in the form)
    #[inline]
    #[must_use]
    pub fn is_requirement(&self) -> bool {
        matches!(self, Self::Requirement(_))
    }
}

/// Gate decision
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GateStatus {
    /// Whether the upload is blocked
    pub blocked: bool,
    /// Every reason, requirements first
    pub reasons: Vec<GateReason>,
}

impl GateStatus {
    fn from_reasons(reasons: Vec<GateReason>) -> Self {
        Self {
            blocked: !reasons.is_empty(),
            reasons,
        }
    }

    /// Requirement errors only
    #[must_use]
    pub fn requirement_errors(&self) -> Vec<&RequirementError> {
        self.reasons
            .iter()
            .filter_map(|r| match r {
                GateReason::Requirement(e) => Some(e),
                _ => None,
            })
            .collect()
    }

    /// Non-requirement blocking conditions
    #[must_use]
    pub fn conditions(&self) -> Vec<&GateReason> {
        self.reasons.iter().filter(|r| !r.is_requirement()).collect()
    }

    /// Reason messages
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.reasons.iter().map(ToString::to_string).collect()
    }
}

/// Gate bound to a catalog and submission rules
#[derive(Debug, Clone, Copy)]
pub struct UploadGate<'a> {
    catalog: &'a ArtifactCatalog,
    rules: SubmissionRules,
}

impl<'a> UploadGate<'a> {
    /// Create gate
    #[inline]
    #[must_use]
    pub fn new(catalog: &'a ArtifactCatalog, rules: SubmissionRules) -> Self {
        Self { catalog, rules }
    }

    /// Evaluate the gate for `category` at `stage`
    #[must_use]
    pub fn status(
        &self,
        category: CategoryId,
        stage: Option<GrowthStage>,
        uploaded: &UploadedArtifacts,
        selection: &UploadSelection,
    ) -> GateStatus {
        let mut reasons: Vec<GateReason> = self
            .rules
            .check(selection)
            .into_iter()
            .map(GateReason::from)
            .collect();

        let tracker = CompletionTracker::new(self.catalog, stage, uploaded);
        match tracker.has_no_artifacts_required(category) {
            Err(_) => reasons.push(GateReason::UnknownCategory(category)),
            Ok(true) => reasons.push(GateReason::NotApplicable(category)),
            Ok(false) => {
                if tracker.is_category_complete(category).unwrap_or(false) {
                    reasons.push(GateReason::CategoryComplete(category));
                } else if let Some(artifact) = &selection.artifact {
                    if let Some(reason) = self.artifact_condition(category, stage, uploaded, artifact) {
                        reasons.push(reason);
                    }
                }
            }
        }

        let status = GateStatus::from_reasons(reasons);
        if status.blocked {
            tracing::debug!(category = %category, reasons = ?status.messages(), "upload gate closed");
        }
        status
    }

    fn artifact_condition(
        &self,
        category: CategoryId,
        stage: Option<GrowthStage>,
        uploaded: &UploadedArtifacts,
        artifact: &ArtifactId,
    ) -> Option<GateReason> {
        let Ok(found) = self.catalog.artifact(category, artifact) else {
            return Some(GateReason::ArtifactNotInCategory(artifact.clone()));
        };
        if let Some(stage) = stage {
            if !found.applies_to(stage) {
                return Some(GateReason::ArtifactNotApplicable {
                    artifact: artifact.clone(),
                    stage,
                });
            }
        }
        uploaded
            .contains(artifact)
            .then(|| GateReason::ArtifactAlreadyUploaded(artifact.clone()))
    }
}

/// Shorthand for [`UploadGate::status`]
#[must_use]
pub fn upload_gate_status(
    catalog: &ArtifactCatalog,
    category: CategoryId,
    stage: Option<GrowthStage>,
    uploaded: &UploadedArtifacts,
    selection: &UploadSelection,
    rules: SubmissionRules,
) -> GateStatus {
    UploadGate::new(catalog, rules).status(category, stage, uploaded, selection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vault_catalog::{Artifact, Category};

    fn catalog() -> ArtifactCatalog {
        ArtifactCatalog::builder("gate-test")
            .category(
                Category::new(CategoryId::Overview, "Overview")
                    .with_artifact(
                        Artifact::new("pitch_deck", "Pitch Deck")
                            .with_formats(["pdf"])
                            .with_max_size_mb(25)
                            .with_stages([GrowthStage::Seed]),
                    )
                    .with_artifact(
                        Artifact::new("one_pager", "One-Pager")
                            .with_formats(["pdf"])
                            .with_max_size_mb(5)
                            .with_stages([GrowthStage::PreSeed, GrowthStage::Seed]),
                    ),
            )
            .build()
            .unwrap()
    }

    fn ready(artifact: &str) -> UploadSelection {
        UploadSelection::new().with_artifact(artifact).with_description("latest version")
    }

    #[test]
    fn open_when_everything_is_in_place() {
        let catalog = catalog();
        let status = upload_gate_status(
            &catalog,
            CategoryId::Overview,
            Some(GrowthStage::Seed),
            &UploadedArtifacts::loaded(Vec::<&str>::new()),
            &ready("pitch_deck"),
            SubmissionRules::default(),
        );
        assert!(!status.blocked);
        assert!(status.reasons.is_empty());
    }

    #[test]
    fn requirement_and_condition_channels_are_split() {
        let catalog = catalog();
        let status = upload_gate_status(
            &catalog,
            CategoryId::Team,
            Some(GrowthStage::Seed),
            &UploadedArtifacts::loaded(Vec::<&str>::new()),
            &UploadSelection::new(),
            SubmissionRules::default(),
        );
        assert!(status.blocked);
        assert_eq!(status.requirement_errors().len(), 2);
        assert_eq!(status.conditions(), vec![&GateReason::UnknownCategory(CategoryId::Team)]);
    }

    #[test]
    fn stage_hidden_artifact_blocks() {
        let catalog = catalog();
        let status = upload_gate_status(
            &catalog,
            CategoryId::Overview,
            Some(GrowthStage::PreSeed),
            &UploadedArtifacts::loaded(Vec::<&str>::new()),
            &ready("pitch_deck"),
            SubmissionRules::default(),
        );
        assert_eq!(
            status.reasons,
            vec![GateReason::ArtifactNotApplicable {
                artifact: "pitch_deck".into(),
                stage: GrowthStage::PreSeed,
            }]
        );
    }

    #[test]
    fn already_uploaded_artifact_blocks() {
        let catalog = catalog();
        let status = upload_gate_status(
            &catalog,
            CategoryId::Overview,
            Some(GrowthStage::Seed),
            &UploadedArtifacts::loaded(["one_pager"]),
            &ready("one_pager"),
            SubmissionRules::default(),
        );
        assert_eq!(status.reasons, vec![GateReason::ArtifactAlreadyUploaded("one_pager".into())]);
    }

    #[test]
    fn complete_category_blocks() {
        let catalog = catalog();
        let status = upload_gate_status(
            &catalog,
            CategoryId::Overview,
            Some(GrowthStage::Seed),
            &UploadedArtifacts::loaded(["one_pager", "pitch_deck"]),
            &ready("pitch_deck"),
            SubmissionRules::default(),
        );
        assert_eq!(status.conditions(), vec![&GateReason::CategoryComplete(CategoryId::Overview)]);
    }

    #[test]
    fn loading_set_does_not_report_complete() {
        let catalog = catalog();
        let status = upload_gate_status(
            &catalog,
            CategoryId::Overview,
            Some(GrowthStage::Seed),
            &UploadedArtifacts::loading(),
            &ready("pitch_deck"),
            SubmissionRules::default(),
        );
        assert!(!status.blocked);
    }
}
