//! Async upload manager
//!
//! Drives an [`UploadQueue`] against a [`TransferClient`]: one transfer at a
//! time, folder creation before a batch's first upload, progress and status
//! applied as ordinary queue events while the collaborator call is awaited.
//! Every notice is published on a broadcast channel.

use crate::error::QueueError;
use crate::queue::{QueueEvent, QueueNotice, UploadQueue};
use crate::transfer::{ProgressReporter, StatusReporter, TransferClient, TransferRequest};
use crate::types::{BatchId, BatchRequest, FolderGate, QueueSummary};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use vault_catalog::{ArtifactId, CategoryId};
use vault_validation::SubmittedFile;

/// Default capacity of the notice channel
pub const DEFAULT_NOTICE_BUFFER: usize = 64;

/// What one `process` run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessReport {
    /// Entries that completed during the run
    pub completed: usize,
    /// Entries that failed during the run
    pub failed: usize,
    /// Folder failure that stopped the run
    pub blocked: Option<String>,
    /// Batches that drained during the run with their completed count
    ///
    /// Unlike the notice channel this never lags.
    pub drained: Vec<(BatchId, usize)>,
}

enum Next {
    Transfer(TransferRequest),
    CreateFolder(CategoryId),
    Blocked(String),
    Idle,
}

/// Sequential upload manager
pub struct UploadManager<T: TransferClient + ?Sized> {
    transfer: Arc<T>,
    queue: Mutex<UploadQueue>,
    notices: broadcast::Sender<QueueNotice>,
}

impl<T: TransferClient + ?Sized> std::fmt::Debug for UploadManager<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadManager")
            .field("queue", &self.queue.lock().summary())
            .finish_non_exhaustive()
    }
}

impl<T: TransferClient + ?Sized> UploadManager<T> {
    /// Create manager with a notice channel of `notice_buffer` slots
    #[must_use]
    pub fn new(transfer: Arc<T>, notice_buffer: usize) -> Self {
        let (notices, _) = broadcast::channel(notice_buffer.max(1));
        Self {
            transfer,
            queue: Mutex::new(UploadQueue::new()),
            notices,
        }
    }

    /// Subscribe to queue notices
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<QueueNotice> {
        self.notices.subscribe()
    }

    /// Copy of the current queue
    #[must_use]
    pub fn snapshot(&self) -> UploadQueue {
        self.queue.lock().clone()
    }

    /// Counts per status and folder text
    #[must_use]
    pub fn summary(&self) -> QueueSummary {
        self.queue.lock().summary()
    }

    /// Apply one event and publish its notices
    ///
    /// # Errors
    /// Whatever [`UploadQueue::apply`] rejects; the queue is unchanged then.
    pub fn apply(&self, event: QueueEvent) -> Result<Vec<QueueNotice>, QueueError> {
        let mut queue = self.queue.lock();
        let step = queue.apply(event)?;
        *queue = step.queue;
        // published under the lock so subscribers see notices in queue order
        self.publish(&step.notices);
        Ok(step.notices)
    }

    /// Append accepted files as one batch
    ///
    /// Asks the collaborator whether the category folder exists; an error
    /// there is treated as "missing" so the folder step runs first.
    ///
    /// # Errors
    /// [`QueueError::EmptyBatch`] when `files` is empty
    pub async fn enqueue(
        &self,
        category: CategoryId,
        artifact: ArtifactId,
        description: String,
        files: Vec<SubmittedFile>,
    ) -> Result<BatchId, QueueError> {
        if files.is_empty() {
            return Err(QueueError::EmptyBatch);
        }
        let folder_exists = match self.transfer.folder_exists(category).await {
            Ok(exists) => exists,
            Err(error) => {
                tracing::warn!(category = %category, error = %error, "folder lookup failed, will create");
                false
            }
        };
        let request =
            BatchRequest::new(category, artifact, description, files).with_folder_exists(folder_exists);
        let batch = request.id();
        self.apply(QueueEvent::Enqueue(request))?;
        Ok(batch)
    }

    /// Run the queue until nothing is pending or a folder failure blocks it
    ///
    /// # Errors
    /// [`QueueError::TransferInFlight`] if another `process` call is running
    pub async fn process(&self) -> Result<ProcessReport, QueueError> {
        let mut report = ProcessReport::default();
        loop {
            match self.advance()? {
                Next::Transfer(request) => self.run_transfer(request, &mut report).await,
                Next::CreateFolder(category) => {
                    if let Some(message) = self.run_folder_creation(category).await {
                        report.blocked = Some(message);
                        return Ok(report);
                    }
                }
                Next::Blocked(message) => {
                    report.blocked = Some(message);
                    return Ok(report);
                }
                Next::Idle => return Ok(report),
            }
        }
    }

    /// Re-pend every failed entry; returns how many
    ///
    /// # Errors
    /// Illegal transitions, which the queue never produces for failed entries
    pub fn retry_failed(&self) -> Result<usize, QueueError> {
        let notices = self.apply(QueueEvent::RetryFailed)?;
        Ok(notices
            .iter()
            .map(|n| match n {
                QueueNotice::Retried { entries } => entries.len(),
                _ => 0,
            })
            .sum())
    }

    /// Remove every entry; returns how many
    pub fn clear(&self) -> usize {
        self.apply_settled(QueueEvent::Clear)
            .iter()
            .map(|n| match n {
                QueueNotice::Cleared { removed } => *removed,
                _ => 0,
            })
            .sum()
    }

    /// Unblock after a folder failure; the next `process` retries creation
    ///
    /// # Errors
    /// [`QueueError::FolderGate`] unless folder creation had failed
    pub fn retry_folder(&self) -> Result<(), QueueError> {
        self.apply(QueueEvent::RetryFolder).map(|_| ())
    }

    fn advance(&self) -> Result<Next, QueueError> {
        let mut queue = self.queue.lock();
        let step = queue.apply(QueueEvent::Advance)?;
        *queue = step.queue;
        self.publish(&step.notices);

        if let Some(entry) = queue.active() {
            return Ok(Next::Transfer(TransferRequest {
                entry: entry.id(),
                file: entry.file().clone(),
                category: entry.category(),
                artifact: entry.artifact().clone(),
                description: entry.description().to_string(),
            }));
        }
        Ok(match queue.folder_gate() {
            FolderGate::Creating { category, .. } => Next::CreateFolder(*category),
            FolderGate::Failed { message, .. } => Next::Blocked(message.clone()),
            FolderGate::Open => Next::Idle,
        })
    }

    async fn run_transfer(&self, request: TransferRequest, report: &mut ProcessReport) {
        let entry = request.entry;
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut upload = self.transfer.upload(request, ProgressReporter::new(tx));

        let result = loop {
            tokio::select! {
                result = &mut upload => break result,
                Some(percent) = rx.recv() => {
                    self.apply_settled(QueueEvent::Progress { entry, percent });
                }
            }
        };
        while let Ok(percent) = rx.try_recv() {
            self.apply_settled(QueueEvent::Progress { entry, percent });
        }

        let event = match result {
            Ok(()) => {
                report.completed += 1;
                QueueEvent::TransferSucceeded(entry)
            }
            Err(error) => {
                report.failed += 1;
                QueueEvent::TransferFailed {
                    entry,
                    error: error.to_string(),
                }
            }
        };
        for notice in self.apply_settled(event) {
            if let QueueNotice::BatchDrained { batch, completed, .. } = notice {
                report.drained.push((batch, completed));
            }
        }
    }

    async fn run_folder_creation(&self, category: CategoryId) -> Option<String> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut creation = self.transfer.create_folder(category, StatusReporter::new(tx));

        let result = loop {
            tokio::select! {
                result = &mut creation => break result,
                Some(status) = rx.recv() => {
                    self.apply_settled(QueueEvent::FolderStatus(status));
                }
            }
        };
        while let Ok(status) = rx.try_recv() {
            self.apply_settled(QueueEvent::FolderStatus(status));
        }

        match result {
            Ok(()) => {
                self.apply_settled(QueueEvent::FolderCreated);
                None
            }
            Err(error) => {
                let message = error.to_string();
                self.apply_settled(QueueEvent::FolderFailed(message.clone()));
                Some(message)
            }
        }
    }

    /// Apply an event whose target may have been cleared meanwhile
    fn apply_settled(&self, event: QueueEvent) -> Vec<QueueNotice> {
        self.apply(event).unwrap_or_else(|error| {
            tracing::warn!(error = %error, "queue event dropped");
            Vec::new()
        })
    }

    fn publish(&self, notices: &[QueueNotice]) {
        for notice in notices {
            log_notice(notice);
            // no subscribers is fine
            let _ = self.notices.send(notice.clone());
        }
    }
}

fn log_notice(notice: &QueueNotice) {
    match notice {
        QueueNotice::BatchEnqueued { batch, entries } => {
            tracing::info!(batch = %batch, entries, "batch enqueued");
        }
        QueueNotice::FolderRequired { batch, category } => {
            tracing::info!(batch = %batch, category = %category, "creating remote folder");
        }
        QueueNotice::FolderProgress { status, .. } => tracing::debug!(status = %status, "folder status"),
        QueueNotice::FolderReady { category, .. } => tracing::info!(category = %category, "remote folder ready"),
        QueueNotice::FolderBlocked { batch, message } => {
            tracing::warn!(batch = %batch, message = %message, "folder creation failed, queue blocked");
        }
        QueueNotice::TransferStarted { entry, position, total } => {
            tracing::info!(entry = %entry, position, total, "transfer started");
        }
        QueueNotice::EntryProgress { entry, percent } => tracing::trace!(entry = %entry, percent, "progress"),
        QueueNotice::EntryCompleted { entry } => tracing::info!(entry = %entry, "transfer completed"),
        QueueNotice::EntryFailed { entry, error } => tracing::warn!(entry = %entry, error = %error, "transfer failed"),
        QueueNotice::BatchDrained {
            batch,
            completed,
            failed,
        } => tracing::info!(batch = %batch, completed, failed, "batch drained"),
        QueueNotice::Retried { entries } => tracing::info!(count = entries.len(), "failed entries re-queued"),
        QueueNotice::Cleared { removed } => tracing::info!(removed, "queue cleared"),
    }
}
