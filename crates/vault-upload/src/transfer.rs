//! Transfer collaborator boundary
//!
//! The manager hands each entry to a [`TransferClient`] and waits for the
//! terminal result. Progress and folder status text come back over channels
//! while the call is in flight.

use crate::error::TransferError;
use crate::types::EntryId;
use tokio::sync::mpsc;
use vault_catalog::{ArtifactId, CategoryId};
use vault_validation::SubmittedFile;

/// One file to move to remote storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    /// Queue entry being transferred
    pub entry: EntryId,
    /// File to send
    pub file: SubmittedFile,
    /// Destination category
    pub category: CategoryId,
    /// Artifact the file satisfies
    pub artifact: ArtifactId,
    /// Description to store with the file
    pub description: String,
}

/// Sends percentage updates for the active transfer
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    sender: mpsc::UnboundedSender<u8>,
}

impl ProgressReporter {
    /// Wrap a channel sender
    #[inline]
    #[must_use]
    pub fn new(sender: mpsc::UnboundedSender<u8>) -> Self {
        Self { sender }
    }

    /// Report `percent` (values above 100 are clamped by the queue)
    pub fn report(&self, percent: u8) {
        // receiver gone means the manager stopped listening; nothing to do
        let _ = self.sender.send(percent);
    }
}

/// Sends folder-creation status text
#[derive(Debug, Clone)]
pub struct StatusReporter {
    sender: mpsc::UnboundedSender<String>,
}

impl StatusReporter {
    /// Wrap a channel sender
    #[inline]
    #[must_use]
    pub fn new(sender: mpsc::UnboundedSender<String>) -> Self {
        Self { sender }
    }

    /// Report a status line
    pub fn report(&self, status: impl Into<String>) {
        let _ = self.sender.send(status.into());
    }
}

/// Remote storage collaborator
///
/// Implementations own their own timeouts; a stalled transfer must
/// eventually resolve to an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TransferClient: Send + Sync {
    /// Whether the category's remote folder exists
    async fn folder_exists(&self, category: CategoryId) -> Result<bool, TransferError>;

    /// Create the category's remote folder
    async fn create_folder(&self, category: CategoryId, status: StatusReporter) -> Result<(), TransferError>;

    /// Upload one file
    async fn upload(&self, request: TransferRequest, progress: ProgressReporter) -> Result<(), TransferError>;
}
