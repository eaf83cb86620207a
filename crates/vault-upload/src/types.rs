//! Queue data types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;
use vault_catalog::{ArtifactId, CategoryId};
use vault_validation::SubmittedFile;

/// Unique identifier for a queue entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId(pub Ulid);

impl EntryId {
    /// Generate new entry ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a submission batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BatchId(pub Ulid);

impl BatchId {
    /// Generate new batch ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Entry lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Waiting for its turn
    Pending,
    /// Transfer in flight
    Uploading,
    /// Transfer succeeded
    Completed,
    /// Transfer failed; see the entry error
    Failed,
}

impl EntryStatus {
    /// All statuses
    pub const ALL: [Self; 4] = [Self::Pending, Self::Uploading, Self::Completed, Self::Failed];

    /// Completed or failed
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Lower-case name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Uploading => "uploading",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One file's transfer job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    pub(crate) id: EntryId,
    pub(crate) batch: BatchId,
    pub(crate) file: SubmittedFile,
    pub(crate) category: CategoryId,
    pub(crate) artifact: ArtifactId,
    pub(crate) description: String,
    pub(crate) status: EntryStatus,
    pub(crate) progress: u8,
    pub(crate) error: Option<String>,
    pub(crate) enqueued_at: DateTime<Utc>,
}

impl QueueEntry {
    /// Entry ID
    #[inline]
    #[must_use]
    pub fn id(&self) -> EntryId {
        self.id
    }

    /// Batch the entry was submitted with
    #[inline]
    #[must_use]
    pub fn batch(&self) -> BatchId {
        self.batch
    }

    /// File to transfer
    #[inline]
    #[must_use]
    pub fn file(&self) -> &SubmittedFile {
        &self.file
    }

    /// Target category
    #[inline]
    #[must_use]
    pub fn category(&self) -> CategoryId {
        self.category
    }

    /// Target artifact
    #[inline]
    #[must_use]
    pub fn artifact(&self) -> &ArtifactId {
        &self.artifact
    }

    /// Description given at submission
    #[inline]
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Current status
    #[inline]
    #[must_use]
    pub fn status(&self) -> EntryStatus {
        self.status
    }

    /// Progress percentage (0..=100)
    #[inline]
    #[must_use]
    pub fn progress(&self) -> u8 {
        self.progress
    }

    /// Captured transfer error of a failed entry
    #[inline]
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// When the entry was enqueued
    #[inline]
    #[must_use]
    pub fn enqueued_at(&self) -> DateTime<Utc> {
        self.enqueued_at
    }
}

/// Files accepted for one artifact, ready to enqueue
///
/// Identifiers and the timestamp are fixed here so that applying the request
/// to a queue is deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    pub(crate) id: BatchId,
    pub(crate) category: CategoryId,
    pub(crate) artifact: ArtifactId,
    pub(crate) description: String,
    pub(crate) files: Vec<(EntryId, SubmittedFile)>,
    pub(crate) folder_exists: bool,
    pub(crate) requested_at: DateTime<Utc>,
}

impl BatchRequest {
    /// New request; the destination folder is assumed to exist
    #[must_use]
    pub fn new(
        category: CategoryId,
        artifact: impl Into<ArtifactId>,
        description: impl Into<String>,
        files: impl IntoIterator<Item = SubmittedFile>,
    ) -> Self {
        Self {
            id: BatchId::new(),
            category,
            artifact: artifact.into(),
            description: description.into(),
            files: files.into_iter().map(|f| (EntryId::new(), f)).collect(),
            folder_exists: true,
            requested_at: Utc::now(),
        }
    }

    /// Whether the category's remote folder is already there
    #[must_use]
    pub fn with_folder_exists(mut self, exists: bool) -> Self {
        self.folder_exists = exists;
        self
    }

    /// Batch ID
    #[inline]
    #[must_use]
    pub fn id(&self) -> BatchId {
        self.id
    }

    /// Entry IDs in submission order
    #[must_use]
    pub fn entry_ids(&self) -> Vec<EntryId> {
        self.files.iter().map(|(id, _)| *id).collect()
    }

    /// Number of files
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// No files
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Queue-wide remote-folder precondition
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FolderGate {
    /// Nothing blocking
    #[default]
    Open,
    /// Folder for `batch` is being created
    Creating {
        /// Batch waiting on the folder
        batch: BatchId,
        /// Category whose folder is created
        category: CategoryId,
        /// Latest status text from the collaborator
        status: String,
    },
    /// Folder creation failed; the queue stays blocked until retried or cleared
    Failed {
        /// Batch waiting on the folder
        batch: BatchId,
        /// Category whose folder failed
        category: CategoryId,
        /// Failure message
        message: String,
    },
}

impl FolderGate {
    /// Gate state name
    #[must_use]
    pub fn state_name(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Creating { .. } => "creating",
            Self::Failed { .. } => "failed",
        }
    }

    /// Status or failure text, if the gate is closed
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Open => None,
            Self::Creating { status, .. } => Some(status),
            Self::Failed { message, .. } => Some(message),
        }
    }

    /// Gate is open
    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }
}

/// Per-status counts plus the folder gate message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueueSummary {
    /// Entries waiting
    pub pending: usize,
    /// Entries in flight (0 or 1)
    pub uploading: usize,
    /// Entries done
    pub completed: usize,
    /// Entries failed
    pub failed: usize,
    /// Folder gate text, when blocked
    pub folder: Option<String>,
}

impl QueueSummary {
    /// Total entries
    #[inline]
    #[must_use]
    pub fn total(&self) -> usize {
        self.pending + self.uploading + self.completed + self.failed
    }
}
