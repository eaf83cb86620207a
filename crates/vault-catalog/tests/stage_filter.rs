use pretty_assertions::assert_eq;
use proptest::prelude::*;
use vault_catalog::{ArtifactCatalog, CategoryId, CompletionTracker, GrowthStage, UploadedArtifacts};
use vault_test_utils::{arb_catalog, arb_stage, mixed_catalog, scenario_catalog};

#[test]
fn scenario_a_seed_overview_has_only_pitch_deck() {
    let catalog = scenario_catalog();
    let view = catalog.artifacts_for_stage(GrowthStage::lookup("Seed"));
    let ids: Vec<&str> = view.get(CategoryId::Overview).iter().map(|a| a.id().as_str()).collect();
    assert_eq!(ids, vec!["pitch_deck"]);

    let uploaded = UploadedArtifacts::loaded(Vec::<&str>::new());
    let tracker = CompletionTracker::new(&catalog, Some(GrowthStage::Seed), &uploaded);
    assert!(!tracker.has_no_artifacts_required(CategoryId::Overview).unwrap());
}

#[test]
fn empty_categories_are_dropped_for_a_stage() {
    let catalog = mixed_catalog();
    let view = catalog.artifacts_for_stage(Some(GrowthStage::PreSeed));
    assert!(view.contains(CategoryId::ProblemProof));
    assert!(!view.contains(CategoryId::Financials));
    assert!(view.get(CategoryId::Financials).is_empty());
}

#[test]
fn unknown_stage_shows_everything() {
    let catalog = mixed_catalog();
    let view = catalog.artifacts_for_stage(GrowthStage::lookup("Series Z"));
    assert_eq!(view.stage(), None);
    assert_eq!(view.get(CategoryId::ProblemProof).len(), 4);
    assert_eq!(view.get(CategoryId::Financials).len(), 1);
}

#[test]
fn standard_catalog_has_no_traction_at_pre_seed() {
    let catalog = ArtifactCatalog::standard().unwrap();
    let view = catalog.artifacts_for_stage(Some(GrowthStage::PreSeed));
    assert!(!view.contains(CategoryId::TractionProof));

    let uploaded = UploadedArtifacts::loading();
    let tracker = CompletionTracker::new(catalog, Some(GrowthStage::PreSeed), &uploaded);
    assert!(tracker.has_no_artifacts_required(CategoryId::TractionProof).unwrap());
    assert!(tracker.is_category_complete(CategoryId::TractionProof).unwrap());
}

proptest! {
    #[test]
    fn prop_stage_view_is_subset_of_category(catalog in arb_catalog(), stage in arb_stage()) {
        let view = catalog.artifacts_for_stage(Some(stage));
        for category in CategoryId::ALL {
            let all = catalog.artifacts_for_category(category).unwrap();
            for artifact in view.get(category) {
                prop_assert!(all.iter().any(|a| a.id() == artifact.id()));
                prop_assert!(artifact.applicable_stages().contains(&stage));
            }
        }
    }

    #[test]
    fn prop_no_stage_is_identity(catalog in arb_catalog()) {
        let view = catalog.artifacts_for_stage(None);
        for category in CategoryId::ALL {
            let all = catalog.artifacts_for_category(category).unwrap();
            prop_assert_eq!(view.get(category).len(), all.len());
        }
    }
}
