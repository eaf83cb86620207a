//! End-to-end flows through the vault facade

use pretty_assertions::assert_eq;
use std::sync::Arc;
use vault_catalog::{CategoryId, UploadedArtifacts};
use vault_core::{DocumentVault, VaultConfig, VaultError};
use vault_test_utils::{file_mb, mixed_catalog, pdf_files, scenario_catalog, ScriptedTransfer, TransferLog};
use vault_upload::{EntryStatus, QueueNotice};
use vault_validation::{GateReason, SubmissionMode, SubmittedFile};

fn seed_vault(
    catalog: vault_catalog::ArtifactCatalog,
    transfer: ScriptedTransfer,
) -> (DocumentVault<ScriptedTransfer>, Arc<ScriptedTransfer>) {
    let transfer = Arc::new(transfer);
    let mut vault = DocumentVault::new(
        Arc::new(catalog),
        Arc::clone(&transfer),
        &VaultConfig::new().with_default_stage("Seed"),
    );
    vault.set_uploaded(UploadedArtifacts::loaded(Vec::<&str>::new()));
    (vault, transfer)
}

fn select_pitch_deck(vault: &mut DocumentVault<ScriptedTransfer>) {
    vault.select_category(CategoryId::Overview).unwrap();
    vault.select_artifact("pitch_deck").unwrap();
    vault.set_description("Series of one");
}

#[tokio::test]
async fn successful_batch_resets_selection_and_completes_after_refetch() {
    let (mut vault, transfer) = seed_vault(scenario_catalog(), ScriptedTransfer::new());
    select_pitch_deck(&mut vault);

    let report = vault.submit(vec![file_mb("deck.pdf", 3)]).await.unwrap();
    assert!(report.is_enqueued());
    assert_eq!(report.mode, Some(SubmissionMode::Targeted));

    let processed = vault.process().await.unwrap();
    assert_eq!((processed.completed, processed.failed), (1, 0));
    assert_eq!(transfer.completed(), vec!["deck.pdf".to_string()]);
    assert_eq!(vault.selection().artifact, None);
    assert_eq!(vault.selection().description, "");
    assert_eq!(vault.selected_category(), Some(CategoryId::Overview));

    // the uploaded set only changes when the caller refetches it
    assert!(!vault.is_category_complete(CategoryId::Overview).unwrap());
    vault.set_uploaded(UploadedArtifacts::loaded(["pitch_deck"]));
    assert!(vault.is_category_complete(CategoryId::Overview).unwrap());
    assert!(vault.remaining_artifacts(CategoryId::Overview).unwrap().is_empty());

    let gate = vault.gate_status().unwrap();
    assert!(gate.blocked);
    assert!(gate
        .conditions()
        .iter()
        .any(|r| matches!(r, GateReason::CategoryComplete(CategoryId::Overview))));
}

#[tokio::test]
async fn failed_only_batch_keeps_selection_until_retry_succeeds() {
    let (mut vault, transfer) = seed_vault(scenario_catalog(), ScriptedTransfer::new().failing_times("deck.pdf", 1));
    select_pitch_deck(&mut vault);
    vault.submit(vec![file_mb("deck.pdf", 3)]).await.unwrap();

    let first = vault.process().await.unwrap();
    assert_eq!((first.completed, first.failed), (0, 1));
    assert!(vault.selection().artifact.is_some());
    let queue = vault.queue();
    let failed = queue.failed();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].error(), Some("Upload failed: deck.pdf rejected by storage"));

    assert_eq!(vault.retry_failed().unwrap(), 1);
    let second = vault.process().await.unwrap();
    assert_eq!((second.completed, second.failed), (1, 0));
    assert_eq!(vault.selection().artifact, None);
    assert_eq!(transfer.started(), vec!["deck.pdf".to_string(), "deck.pdf".to_string()]);
}

#[tokio::test]
async fn selection_resets_even_when_notices_lag() {
    let transfer = (1..=20).fold(ScriptedTransfer::new(), |t, i| t.failing(&format!("file{i}.pdf")));
    let mut vault = DocumentVault::new(
        Arc::new(scenario_catalog()),
        Arc::new(transfer),
        &VaultConfig::new().with_default_stage("Seed").with_notice_buffer(4),
    );
    vault.set_uploaded(UploadedArtifacts::loaded(Vec::<&str>::new()));
    select_pitch_deck(&mut vault);
    vault.submit(vec![file_mb("good.pdf", 1)]).await.unwrap();
    vault.submit(pdf_files(20)).await.unwrap();

    let report = vault.process().await.unwrap();
    assert_eq!((report.completed, report.failed), (1, 20));
    assert_eq!(report.drained.len(), 1);
    assert_eq!(vault.selection().artifact, None);
    assert_eq!(vault.selection().description, "");
}

#[tokio::test]
async fn blocked_submission_enqueues_nothing() {
    let (mut vault, transfer) = seed_vault(scenario_catalog(), ScriptedTransfer::new());
    vault.select_category(CategoryId::Overview).unwrap();
    vault.select_artifact("pitch_deck").unwrap();

    let report = vault.submit(vec![file_mb("deck.pdf", 3)]).await.unwrap();
    assert!(report.gate.blocked);
    assert_eq!(report.gate.messages(), vec!["Please provide a description".to_string()]);
    assert!(!report.is_enqueued());
    assert!(vault.queue().is_empty());
    assert!(transfer.log().is_empty());
}

#[tokio::test]
async fn oversized_deck_is_rejected_before_the_queue() {
    let (mut vault, _) = seed_vault(scenario_catalog(), ScriptedTransfer::new());
    select_pitch_deck(&mut vault);

    let report = vault.submit(vec![file_mb("deck.pdf", 30)]).await.unwrap();
    assert!(!report.is_enqueued());
    assert_eq!(
        report.file_errors(),
        vec!["deck.pdf: File size exceeds the 25MB limit for Pitch Deck".to_string()]
    );
    assert!(vault.selection().artifact.is_some());
}

#[tokio::test]
async fn folder_submission_validates_each_file_against_the_category() {
    let (mut vault, transfer) = seed_vault(mixed_catalog(), ScriptedTransfer::new());
    vault.select_category(CategoryId::ProblemProof).unwrap();
    vault.select_artifact("customer_interviews").unwrap();
    vault.set_description("Twelve interviews");

    let files = vec![
        SubmittedFile::metadata("a.mp3", 1024).with_relative_path("interviews/a.mp3"),
        SubmittedFile::metadata("b.txt", 1024).with_relative_path("interviews/b.txt"),
        SubmittedFile::metadata("setup.exe", 1024).with_relative_path("interviews/setup.exe"),
    ];
    let report = vault.submit(files).await.unwrap();
    assert_eq!(report.mode, Some(SubmissionMode::Folder));
    assert_eq!(report.accepted, 2);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].file.name(), "setup.exe");

    vault.process().await.unwrap();
    assert_eq!(transfer.completed(), vec!["a.mp3".to_string(), "b.txt".to_string()]);
    assert!(vault
        .queue()
        .entries()
        .iter()
        .all(|e| e.status() == EntryStatus::Completed));
}

#[tokio::test]
async fn missing_category_folder_is_created_before_uploads() {
    let (mut vault, transfer) = seed_vault(
        scenario_catalog(),
        ScriptedTransfer::new().missing_folder(CategoryId::Overview),
    );
    let mut notices = vault.subscribe();
    select_pitch_deck(&mut vault);
    vault.submit(vec![file_mb("deck.pdf", 1)]).await.unwrap();
    vault.process().await.unwrap();

    let log = transfer.log();
    let created = log
        .iter()
        .position(|l| *l == TransferLog::FolderCreated(CategoryId::Overview))
        .unwrap();
    let started = log
        .iter()
        .position(|l| *l == TransferLog::Started("deck.pdf".to_string()))
        .unwrap();
    assert!(created < started);

    let mut ready = false;
    while let Ok(notice) = notices.try_recv() {
        if matches!(notice, QueueNotice::FolderReady { category: CategoryId::Overview, .. }) {
            ready = true;
        }
    }
    assert!(ready);
}

#[test]
fn nothing_is_complete_while_uploaded_set_reloads() {
    let (mut vault, _) = seed_vault(scenario_catalog(), ScriptedTransfer::new());
    vault.set_uploaded(UploadedArtifacts::loaded(["pitch_deck"]));
    assert!(vault.is_category_complete(CategoryId::Overview).unwrap());
    vault.mark_uploaded_loading();
    assert!(!vault.is_category_complete(CategoryId::Overview).unwrap());
    assert_eq!(vault.remaining_artifacts(CategoryId::Overview).unwrap().len(), 1);
}

#[test]
fn stage_change_moves_categories_out_of_scope() {
    let (mut vault, _) = seed_vault(mixed_catalog(), ScriptedTransfer::new());
    assert!(vault.has_no_artifacts_required(CategoryId::Financials).unwrap());
    vault.set_stage(Some(vault_catalog::GrowthStage::SeriesA));
    assert!(!vault.has_no_artifacts_required(CategoryId::Financials).unwrap());
    vault.set_stage(None);
    assert_eq!(vault.remaining_artifacts(CategoryId::ProblemProof).unwrap().len(), 4);
}

#[test]
fn operations_need_a_category() {
    let (vault, _) = seed_vault(scenario_catalog(), ScriptedTransfer::new());
    assert!(matches!(vault.gate_status(), Err(VaultError::NoCategorySelected)));
}
