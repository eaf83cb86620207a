//! Stage filter
//!
//! Projects the catalog onto one growth stage. Categories left without any
//! applicable artifact are dropped from the view: they are "not
//! applicable", which is different from "already satisfied".

use crate::artifact::Artifact;
use crate::catalog::ArtifactCatalog;
use crate::id::CategoryId;
use crate::stage::GrowthStage;
use indexmap::IndexMap;
use serde::Serialize;

/// Stage-filtered projection of a catalog
#[derive(Debug, Clone, Serialize)]
pub struct StageView<'a> {
    stage: Option<GrowthStage>,
    categories: IndexMap<CategoryId, Vec<&'a Artifact>>,
}

impl ArtifactCatalog {
    /// Artifacts relevant for `stage`, grouped by category
    ///
    /// `None` (absent or unrecognised stage) is the identity projection:
    /// every category with every artifact.
    #[must_use]
    pub fn artifacts_for_stage(&self, stage: Option<GrowthStage>) -> StageView<'_> {
        let categories = self
            .categories()
            .filter_map(|category| {
                let artifacts: Vec<&Artifact> = category
                    .artifacts()
                    .filter(|a| stage.map_or(true, |s| a.applies_to(s)))
                    .collect();
                if stage.is_some() && artifacts.is_empty() {
                    None
                } else {
                    Some((category.id(), artifacts))
                }
            })
            .collect();
        StageView { stage, categories }
    }
}

impl<'a> StageView<'a> {
    /// Stage this view was built for
    #[inline]
    #[must_use]
    pub fn stage(&self) -> Option<GrowthStage> {
        self.stage
    }

    /// Artifacts of a category; empty when the category is not applicable
    #[must_use]
    pub fn get(&self, category: CategoryId) -> &[&'a Artifact] {
        self.categories.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether the category survived the filter
    #[inline]
    #[must_use]
    pub fn contains(&self, category: CategoryId) -> bool {
        self.categories.contains_key(&category)
    }

    /// Categories in catalog order
    pub fn categories(&self) -> impl Iterator<Item = CategoryId> + '_ {
        self.categories.keys().copied()
    }

    /// `(category, artifacts)` pairs in catalog order
    pub fn iter(&self) -> impl Iterator<Item = (CategoryId, &[&'a Artifact])> {
        self.categories.iter().map(|(id, list)| (*id, list.as_slice()))
    }

    /// Number of applicable categories
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// True if nothing applies
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
