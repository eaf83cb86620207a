//! Completion tracker
//!
//! Combines a stage view with the externally supplied set of already
//! uploaded artifacts to decide, per category, what is still missing.
//!
//! The uploaded set is read-only here and may lag one batch behind what the
//! queue has just finished; nothing in this module assumes otherwise.

use crate::artifact::Artifact;
use crate::catalog::ArtifactCatalog;
use crate::error::CatalogError;
use crate::filter::StageView;
use crate::id::{ArtifactId, CategoryId};
use crate::stage::GrowthStage;
use serde::Serialize;
use std::collections::HashSet;

/// Artifact ids already satisfied for the venture, plus the loading flag of
/// their source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadedArtifacts {
    ids: HashSet<ArtifactId>,
    loading: bool,
}

impl UploadedArtifacts {
    /// Source still loading; nothing may be reported complete yet
    #[inline]
    #[must_use]
    pub fn loading() -> Self {
        Self {
            ids: HashSet::new(),
            loading: true,
        }
    }

    /// Source finished loading with these ids
    #[must_use]
    pub fn loaded<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ArtifactId>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
            loading: false,
        }
    }

    /// Copy with additional ids
    #[must_use]
    pub fn extended<I, S>(&self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ArtifactId>,
    {
        let mut next = self.clone();
        next.ids.extend(ids.into_iter().map(Into::into));
        next
    }

    /// Whether the source is still loading
    #[inline]
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Membership test
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &ArtifactId) -> bool {
        self.ids.contains(id)
    }

    /// Number of uploaded ids
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True if nothing is recorded as uploaded
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Iterate ids (unordered)
    pub fn iter(&self) -> impl Iterator<Item = &ArtifactId> {
        self.ids.iter()
    }
}

/// Per-category progress summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryProgress {
    /// Category
    pub category: CategoryId,
    /// Stage-applicable artifacts
    pub applicable: usize,
    /// Applicable artifacts already uploaded
    pub uploaded: usize,
    /// Applicable artifacts not yet uploaded
    pub remaining: usize,
    /// Mandatory artifacts not yet uploaded
    pub mandatory_remaining: usize,
    /// Sum of score contributions of uploaded applicable artifacts
    pub score_earned: u32,
    /// Sum of score contributions of all applicable artifacts
    pub score_available: u32,
    /// Same as [`CompletionTracker::is_category_complete`]
    pub complete: bool,
}

/// Stable sort by priority rank; ties keep catalog declaration order
pub fn sort_by_priority(artifacts: &mut [&Artifact]) {
    artifacts.sort_by_key(|a| a.priority().rank());
}

/// Completion queries for one stage and one uploaded set
#[derive(Debug, Clone)]
pub struct CompletionTracker<'a> {
    catalog: &'a ArtifactCatalog,
    view: StageView<'a>,
    uploaded: &'a UploadedArtifacts,
}

impl<'a> CompletionTracker<'a> {
    /// Build a tracker; `stage = None` means no stage narrowing
    #[must_use]
    pub fn new(
        catalog: &'a ArtifactCatalog,
        stage: Option<GrowthStage>,
        uploaded: &'a UploadedArtifacts,
    ) -> Self {
        Self {
            catalog,
            view: catalog.artifacts_for_stage(stage),
            uploaded,
        }
    }

    /// Underlying stage view
    #[inline]
    #[must_use]
    pub fn stage_view(&self) -> &StageView<'a> {
        &self.view
    }

    /// Stage-applicable artifacts of `category` not yet uploaded, highest
    /// priority first
    ///
    /// # Errors
    /// Returns [`CatalogError::InvalidCategory`] if the catalog does not
    /// declare the category
    pub fn remaining_artifacts(&self, category: CategoryId) -> Result<Vec<&'a Artifact>, CatalogError> {
        self.catalog.category(category)?;
        let mut remaining: Vec<&'a Artifact> = self
            .view
            .get(category)
            .iter()
            .copied()
            .filter(|a| !self.uploaded.contains(a.id()))
            .collect();
        sort_by_priority(&mut remaining);
        Ok(remaining)
    }

    /// True iff the category has no artifact applicable to this stage
    ///
    /// # Errors
    /// Returns [`CatalogError::InvalidCategory`] for undeclared categories
    pub fn has_no_artifacts_required(&self, category: CategoryId) -> Result<bool, CatalogError> {
        self.catalog.category(category)?;
        Ok(self.view.get(category).is_empty())
    }

    /// True iff nothing is required, or the uploaded set is loaded, non-empty
    /// and covers every applicable artifact
    ///
    /// Never true for an applicable category while the uploaded set is
    /// still loading.
    ///
    /// # Errors
    /// Returns [`CatalogError::InvalidCategory`] for undeclared categories
    pub fn is_category_complete(&self, category: CategoryId) -> Result<bool, CatalogError> {
        if self.has_no_artifacts_required(category)? {
            return Ok(true);
        }
        if self.uploaded.is_loading() || self.uploaded.is_empty() {
            return Ok(false);
        }
        Ok(self.remaining_artifacts(category)?.is_empty())
    }

    /// Progress of every stage-applicable category, in catalog order
    #[must_use]
    pub fn progress(&self) -> Vec<CategoryProgress> {
        self.view
            .iter()
            .map(|(category, artifacts)| {
                let mut progress = CategoryProgress {
                    category,
                    applicable: artifacts.len(),
                    uploaded: 0,
                    remaining: 0,
                    mandatory_remaining: 0,
                    score_earned: 0,
                    score_available: 0,
                    complete: false,
                };
                for artifact in artifacts {
                    progress.score_available += artifact.score_contribution();
                    if self.uploaded.contains(artifact.id()) {
                        progress.uploaded += 1;
                        progress.score_earned += artifact.score_contribution();
                    } else {
                        progress.remaining += 1;
                        if artifact.is_mandatory() {
                            progress.mandatory_remaining += 1;
                        }
                    }
                }
                progress.complete = artifacts.is_empty()
                    || (!self.uploaded.is_loading() && !self.uploaded.is_empty() && progress.remaining == 0);
                progress
            })
            .collect()
    }
}
