//! Upload queue state machine
//!
//! [`UploadQueue::apply`] is a pure `(queue, event) -> queue'` transition that
//! also returns the notices the event produced. Nothing here awaits, spawns
//! or reads the clock; [`crate::UploadManager`] feeds it events.
//!
//! # Ordering
//!
//! Entries are processed in insertion order. At most one entry is
//! `uploading`, and `Advance` refuses to start another until it reaches a
//! terminal status. The cursor only moves forward, except that a retry
//! rewinds it to the first re-pended entry.

use crate::error::QueueError;
use crate::state_machine::validate_transition;
use crate::types::{BatchId, BatchRequest, EntryId, EntryStatus, FolderGate, QueueEntry, QueueSummary};
use std::collections::HashSet;
use vault_catalog::CategoryId;

/// Input to the queue state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueEvent {
    /// Append a batch of accepted files
    Enqueue(BatchRequest),
    /// Start the next pending entry, or request its batch folder
    Advance,
    /// Folder creation status text
    FolderStatus(String),
    /// Folder creation finished
    FolderCreated,
    /// Folder creation failed
    FolderFailed(String),
    /// Re-request folder creation after a failure
    RetryFolder,
    /// Transfer progress for the uploading entry
    Progress {
        /// Uploading entry
        entry: EntryId,
        /// Percent done, clamped to 100
        percent: u8,
    },
    /// Transfer finished
    TransferSucceeded(EntryId),
    /// Transfer failed with a message
    TransferFailed {
        /// Uploading entry
        entry: EntryId,
        /// Collaborator message
        error: String,
    },
    /// Re-pend every failed entry
    RetryFailed,
    /// Remove every entry
    Clear,
}

/// Output of the queue state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueNotice {
    /// Batch appended
    BatchEnqueued {
        /// New batch
        batch: BatchId,
        /// Files in it
        entries: usize,
    },
    /// Batch needs its category folder before the first upload
    FolderRequired {
        /// Waiting batch
        batch: BatchId,
        /// Folder to create
        category: CategoryId,
    },
    /// Folder status text changed
    FolderProgress {
        /// Waiting batch
        batch: BatchId,
        /// Collaborator status text
        status: String,
    },
    /// Folder created; queue unblocked
    FolderReady {
        /// Batch that asked for the folder
        batch: BatchId,
        /// Created folder
        category: CategoryId,
    },
    /// Folder creation failed; queue blocked
    FolderBlocked {
        /// Waiting batch
        batch: BatchId,
        /// Failure message
        message: String,
    },
    /// Entry started uploading
    TransferStarted {
        /// Started entry
        entry: EntryId,
        /// 1-based position in the queue
        position: usize,
        /// Queue length
        total: usize,
    },
    /// Progress update
    EntryProgress {
        /// Uploading entry
        entry: EntryId,
        /// Percent done
        percent: u8,
    },
    /// Entry completed
    EntryCompleted {
        /// Completed entry
        entry: EntryId,
    },
    /// Entry failed
    EntryFailed {
        /// Failed entry
        entry: EntryId,
        /// Failure message
        error: String,
    },
    /// Every entry of the batch is terminal and at least one completed
    BatchDrained {
        /// Drained batch
        batch: BatchId,
        /// Entries that completed
        completed: usize,
        /// Entries that failed
        failed: usize,
    },
    /// Failed entries re-pended
    Retried {
        /// Entries back to pending, in queue order
        entries: Vec<EntryId>,
    },
    /// Queue emptied
    Cleared {
        /// Entries removed
        removed: usize,
    },
}

/// Result of one transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Queue after the event
    pub queue: UploadQueue,
    /// Notices in emission order
    pub notices: Vec<QueueNotice>,
}

/// Ordered upload entries with cursor and folder gate
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadQueue {
    entries: Vec<QueueEntry>,
    cursor: usize,
    folder: FolderGate,
    folders_pending: HashSet<BatchId>,
}

impl UploadQueue {
    /// Empty queue
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `event`, returning the next queue and its notices
    ///
    /// # Errors
    /// [`QueueError`] when the event does not fit the current state (unknown
    /// entry, illegal transition, folder gate mismatch, empty batch, or an
    /// advance while another entry uploads). `self` is left untouched.
    pub fn apply(&self, event: QueueEvent) -> Result<Step, QueueError> {
        let mut queue = self.clone();
        let notices = queue.transition(event)?;
        Ok(Step { queue, notices })
    }

    fn transition(&mut self, event: QueueEvent) -> Result<Vec<QueueNotice>, QueueError> {
        match event {
            QueueEvent::Enqueue(request) => self.enqueue(request),
            QueueEvent::Advance => self.advance(),
            QueueEvent::FolderStatus(status) => self.folder_status(status),
            QueueEvent::FolderCreated => self.folder_created(),
            QueueEvent::FolderFailed(message) => self.folder_failed(message),
            QueueEvent::RetryFolder => self.retry_folder(),
            QueueEvent::Progress { entry, percent } => self.progress(entry, percent),
            QueueEvent::TransferSucceeded(entry) => self.finish(entry, None),
            QueueEvent::TransferFailed { entry, error } => self.finish(entry, Some(error)),
            QueueEvent::RetryFailed => self.retry_failed(),
            QueueEvent::Clear => Ok(self.clear()),
        }
    }

    fn enqueue(&mut self, request: BatchRequest) -> Result<Vec<QueueNotice>, QueueError> {
        if request.is_empty() {
            return Err(QueueError::EmptyBatch);
        }
        let BatchRequest {
            id,
            category,
            artifact,
            description,
            files,
            folder_exists,
            requested_at,
        } = request;
        let count = files.len();
        self.entries.extend(files.into_iter().map(|(entry, file)| QueueEntry {
            id: entry,
            batch: id,
            file,
            category,
            artifact: artifact.clone(),
            description: description.clone(),
            status: EntryStatus::Pending,
            progress: 0,
            error: None,
            enqueued_at: requested_at,
        }));
        if !folder_exists {
            self.folders_pending.insert(id);
        }
        Ok(vec![QueueNotice::BatchEnqueued { batch: id, entries: count }])
    }

    fn advance(&mut self) -> Result<Vec<QueueNotice>, QueueError> {
        if let Some(active) = self.active() {
            return Err(QueueError::TransferInFlight(active.id));
        }
        if !self.folder.is_open() {
            return Ok(Vec::new());
        }
        let Some(index) = self.next_pending() else {
            return Ok(Vec::new());
        };
        let entry = &self.entries[index];
        if self.folders_pending.contains(&entry.batch) {
            let (batch, category) = (entry.batch, entry.category);
            self.folder = FolderGate::Creating {
                batch,
                category,
                status: format!("Creating folder for {category}"),
            };
            return Ok(vec![QueueNotice::FolderRequired { batch, category }]);
        }
        self.set_status(index, EntryStatus::Uploading)?;
        self.cursor = index;
        let entry = &mut self.entries[index];
        entry.progress = 0;
        Ok(vec![QueueNotice::TransferStarted {
            entry: entry.id,
            position: index + 1,
            total: self.entries.len(),
        }])
    }

    fn folder_status(&mut self, status: String) -> Result<Vec<QueueNotice>, QueueError> {
        match &mut self.folder {
            FolderGate::Creating { batch, status: current, .. } => {
                current.clone_from(&status);
                Ok(vec![QueueNotice::FolderProgress { batch: *batch, status }])
            }
            other => Err(QueueError::FolderGate {
                state: other.state_name(),
                action: "report folder status",
            }),
        }
    }

    fn folder_created(&mut self) -> Result<Vec<QueueNotice>, QueueError> {
        let FolderGate::Creating { batch, category, .. } = self.folder else {
            return Err(QueueError::FolderGate {
                state: self.folder.state_name(),
                action: "complete folder creation",
            });
        };
        // the folder now exists for every batch targeting the same category
        let satisfied: Vec<BatchId> = self
            .entries
            .iter()
            .filter(|e| e.category == category)
            .map(|e| e.batch)
            .collect();
        for id in satisfied {
            self.folders_pending.remove(&id);
        }
        self.folder = FolderGate::Open;
        Ok(vec![QueueNotice::FolderReady { batch, category }])
    }

    fn folder_failed(&mut self, message: String) -> Result<Vec<QueueNotice>, QueueError> {
        let FolderGate::Creating { batch, category, .. } = self.folder else {
            return Err(QueueError::FolderGate {
                state: self.folder.state_name(),
                action: "fail folder creation",
            });
        };
        self.folder = FolderGate::Failed {
            batch,
            category,
            message: message.clone(),
        };
        Ok(vec![QueueNotice::FolderBlocked { batch, message }])
    }

    fn retry_folder(&mut self) -> Result<Vec<QueueNotice>, QueueError> {
        if !matches!(self.folder, FolderGate::Failed { .. }) {
            return Err(QueueError::FolderGate {
                state: self.folder.state_name(),
                action: "retry folder creation",
            });
        }
        // next Advance re-requests the folder
        self.folder = FolderGate::Open;
        Ok(Vec::new())
    }

    fn progress(&mut self, entry: EntryId, percent: u8) -> Result<Vec<QueueNotice>, QueueError> {
        let index = self.position(entry)?;
        let current = &mut self.entries[index];
        if current.status != EntryStatus::Uploading {
            return Err(QueueError::IllegalTransition {
                from: current.status,
                to: EntryStatus::Uploading,
            });
        }
        let percent = percent.min(100);
        current.progress = percent;
        Ok(vec![QueueNotice::EntryProgress { entry, percent }])
    }

    fn finish(&mut self, entry: EntryId, error: Option<String>) -> Result<Vec<QueueNotice>, QueueError> {
        let index = self.position(entry)?;
        let mut notices = Vec::with_capacity(2);
        match error {
            None => {
                self.set_status(index, EntryStatus::Completed)?;
                self.entries[index].progress = 100;
                notices.push(QueueNotice::EntryCompleted { entry });
            }
            Some(error) => {
                self.set_status(index, EntryStatus::Failed)?;
                self.entries[index].error = Some(error.clone());
                notices.push(QueueNotice::EntryFailed { entry, error });
            }
        }
        // entries re-pended behind the finished one keep the cursor
        self.cursor = self
            .entries
            .iter()
            .take(index)
            .position(|e| e.status == EntryStatus::Pending)
            .unwrap_or(index + 1);
        notices.extend(self.drained(self.entries[index].batch));
        Ok(notices)
    }

    fn drained(&self, batch: BatchId) -> Option<QueueNotice> {
        let mut completed = 0;
        let mut failed = 0;
        for entry in self.entries.iter().filter(|e| e.batch == batch) {
            match entry.status {
                EntryStatus::Completed => completed += 1,
                EntryStatus::Failed => failed += 1,
                EntryStatus::Pending | EntryStatus::Uploading => return None,
            }
        }
        (completed > 0).then_some(QueueNotice::BatchDrained {
            batch,
            completed,
            failed,
        })
    }

    fn retry_failed(&mut self) -> Result<Vec<QueueNotice>, QueueError> {
        let failed: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.status == EntryStatus::Failed)
            .map(|(i, _)| i)
            .collect();
        let Some(&first) = failed.first() else {
            return Ok(Vec::new());
        };
        for &index in &failed {
            self.set_status(index, EntryStatus::Pending)?;
            let entry = &mut self.entries[index];
            entry.error = None;
            entry.progress = 0;
        }
        self.cursor = self.cursor.min(first);
        Ok(vec![QueueNotice::Retried {
            entries: failed.iter().map(|&i| self.entries[i].id).collect(),
        }])
    }

    fn clear(&mut self) -> Vec<QueueNotice> {
        let removed = self.entries.len();
        *self = Self::default();
        vec![QueueNotice::Cleared { removed }]
    }

    fn set_status(&mut self, index: usize, to: EntryStatus) -> Result<(), QueueError> {
        let entry = &mut self.entries[index];
        validate_transition(entry.status, to)?;
        entry.status = to;
        Ok(())
    }

    fn position(&self, entry: EntryId) -> Result<usize, QueueError> {
        self.entries
            .iter()
            .position(|e| e.id == entry)
            .ok_or(QueueError::UnknownEntry(entry))
    }

    fn next_pending(&self) -> Option<usize> {
        self.entries
            .iter()
            .skip(self.cursor)
            .position(|e| e.status == EntryStatus::Pending)
            .map(|offset| self.cursor + offset)
    }

    /// Entries in insertion order
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    /// Entry by ID
    #[must_use]
    pub fn entry(&self, id: EntryId) -> Option<&QueueEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Entry currently uploading
    #[must_use]
    pub fn active(&self) -> Option<&QueueEntry> {
        self.entries.iter().find(|e| e.status == EntryStatus::Uploading)
    }

    /// Index of the uploading entry, or of the next pending one
    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.status == EntryStatus::Uploading)
            .or_else(|| self.next_pending())
    }

    /// "Uploading `n` of `m`", 1-based
    #[must_use]
    pub fn active_position(&self) -> Option<(usize, usize)> {
        self.entries
            .iter()
            .position(|e| e.status == EntryStatus::Uploading)
            .map(|i| (i + 1, self.entries.len()))
    }

    /// Failed entries, in queue order
    #[must_use]
    pub fn failed(&self) -> Vec<&QueueEntry> {
        self.entries
            .iter()
            .filter(|e| e.status == EntryStatus::Failed)
            .collect()
    }

    /// Remote-folder precondition
    #[inline]
    #[must_use]
    pub fn folder_gate(&self) -> &FolderGate {
        &self.folder
    }

    /// Counts per status and folder text
    #[must_use]
    pub fn summary(&self) -> QueueSummary {
        let mut summary = QueueSummary {
            folder: self.folder.message().map(str::to_string),
            ..QueueSummary::default()
        };
        for entry in &self.entries {
            match entry.status {
                EntryStatus::Pending => summary.pending += 1,
                EntryStatus::Uploading => summary.uploading += 1,
                EntryStatus::Completed => summary.completed += 1,
                EntryStatus::Failed => summary.failed += 1,
            }
        }
        summary
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// No entries
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Nothing pending or uploading
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.entries.iter().all(|e| e.status.is_terminal())
    }
}
