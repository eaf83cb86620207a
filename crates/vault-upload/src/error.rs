//! Error types for the upload queue

use crate::types::{EntryId, EntryStatus};

/// Programming errors against the queue
///
/// Transfer and folder failures are not here: they are recorded on the queue
/// as data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    /// Entry is not (or no longer) in the queue
    #[error("Unknown queue entry: {0}")]
    UnknownEntry(EntryId),

    /// Status change not in the transition table
    #[error("Illegal status transition: {from} -> {to}")]
    IllegalTransition {
        /// Current status
        from: EntryStatus,
        /// Requested status
        to: EntryStatus,
    },

    /// Batch with no files
    #[error("Cannot enqueue an empty batch")]
    EmptyBatch,

    /// Another entry is still uploading
    #[error("Entry {0} is still uploading")]
    TransferInFlight(EntryId),

    /// Folder event that does not match the gate state
    #[error("Folder gate is {state}, cannot {action}")]
    FolderGate {
        /// Gate state name
        state: &'static str,
        /// What was attempted
        action: &'static str,
    },
}

/// Failure reported by the transfer collaborator
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    /// Upload rejected or interrupted
    #[error("Upload failed: {0}")]
    Upload(String),

    /// Remote folder could not be created
    #[error("Folder creation failed: {0}")]
    Folder(String),

    /// Collaborator gave up waiting
    #[error("Transfer timed out")]
    TimedOut,
}
