use pretty_assertions::assert_eq;
use std::sync::Arc;
use vault_catalog::CategoryId;
use vault_test_utils::{pdf_files, ScriptedTransfer, TransferLog};
use vault_upload::{EntryStatus, FolderGate, QueueNotice, UploadManager, DEFAULT_NOTICE_BUFFER};

#[tokio::test]
async fn scenario_d_failure_in_the_middle_does_not_stop_the_queue() {
    let transfer = Arc::new(ScriptedTransfer::new().failing("file2.pdf"));
    let manager = UploadManager::new(Arc::clone(&transfer), DEFAULT_NOTICE_BUFFER);
    manager
        .enqueue(CategoryId::Overview, "pitch_deck".into(), "deck".into(), pdf_files(3))
        .await
        .unwrap();

    let report = manager.process().await.unwrap();
    assert_eq!((report.completed, report.failed), (2, 1));

    let queue = manager.snapshot();
    let statuses: Vec<EntryStatus> = queue.entries().iter().map(|e| e.status()).collect();
    assert_eq!(
        statuses,
        vec![EntryStatus::Completed, EntryStatus::Failed, EntryStatus::Completed]
    );
    assert_eq!(
        queue.entries()[1].error(),
        Some("Upload failed: file2.pdf rejected by storage")
    );

    // entry 3 starts only after entry 2 finished
    let log = transfer.log();
    let failed_at = log
        .iter()
        .position(|l| matches!(l, TransferLog::Finished { file, ok: false } if file == "file2.pdf"))
        .unwrap();
    let third_started = log
        .iter()
        .position(|l| matches!(l, TransferLog::Started(file) if file == "file3.pdf"))
        .unwrap();
    assert!(failed_at < third_started);
    assert_eq!(transfer.max_concurrency(), 1);
}

#[tokio::test]
async fn retry_failed_resubmits_only_failed_entries() {
    let transfer = Arc::new(ScriptedTransfer::new().failing_times("file1.pdf", 1));
    let manager = UploadManager::new(Arc::clone(&transfer), DEFAULT_NOTICE_BUFFER);
    manager
        .enqueue(CategoryId::Overview, "pitch_deck".into(), "deck".into(), pdf_files(2))
        .await
        .unwrap();
    manager.process().await.unwrap();
    assert_eq!(manager.snapshot().failed().len(), 1);

    assert_eq!(manager.retry_failed().unwrap(), 1);
    let report = manager.process().await.unwrap();
    assert_eq!(report.completed, 1);
    assert_eq!(transfer.started(), vec!["file1.pdf", "file2.pdf", "file1.pdf"]);
    assert!(manager.snapshot().failed().is_empty());
}

#[tokio::test]
async fn drained_notice_is_published_once_per_batch() {
    let transfer = Arc::new(ScriptedTransfer::new());
    let manager = UploadManager::new(transfer, DEFAULT_NOTICE_BUFFER);
    let mut notices = manager.subscribe();

    let first = manager
        .enqueue(CategoryId::Overview, "pitch_deck".into(), "deck".into(), pdf_files(2))
        .await
        .unwrap();
    let second = manager
        .enqueue(CategoryId::Overview, "one_pager".into(), "summary".into(), pdf_files(1))
        .await
        .unwrap();
    manager.process().await.unwrap();

    let mut drained = Vec::new();
    while let Ok(notice) = notices.try_recv() {
        if let QueueNotice::BatchDrained { batch, completed, failed } = notice {
            drained.push((batch, completed, failed));
        }
    }
    assert_eq!(drained, vec![(first, 2, 0), (second, 1, 0)]);
}

#[tokio::test]
async fn missing_folder_is_created_before_first_upload() {
    let transfer = Arc::new(ScriptedTransfer::new().missing_folder(CategoryId::Team));
    let manager = UploadManager::new(Arc::clone(&transfer), DEFAULT_NOTICE_BUFFER);
    manager
        .enqueue(CategoryId::Team, "founder_bios".into(), "bios".into(), pdf_files(2))
        .await
        .unwrap();
    manager.process().await.unwrap();

    let log = transfer.log();
    assert_eq!(log[0], TransferLog::FolderChecked(CategoryId::Team));
    assert_eq!(log[1], TransferLog::FolderCreated(CategoryId::Team));
    assert_eq!(log[2], TransferLog::Started("file1.pdf".into()));
}

#[tokio::test]
async fn folder_failure_blocks_until_retried() {
    let transfer = Arc::new(
        ScriptedTransfer::new()
            .missing_folder(CategoryId::Team)
            .folder_failing_times(CategoryId::Team, 1),
    );
    let manager = UploadManager::new(Arc::clone(&transfer), DEFAULT_NOTICE_BUFFER);
    manager
        .enqueue(CategoryId::Team, "founder_bios".into(), "bios".into(), pdf_files(1))
        .await
        .unwrap();

    let report = manager.process().await.unwrap();
    assert_eq!(
        report.blocked.as_deref(),
        Some("Folder creation failed: cannot create 5_Team")
    );
    assert!(matches!(manager.snapshot().folder_gate(), FolderGate::Failed { .. }));
    assert!(transfer.started().is_empty());

    manager.retry_folder().unwrap();
    let report = manager.process().await.unwrap();
    assert_eq!(report.blocked, None);
    assert_eq!(report.completed, 1);
}
