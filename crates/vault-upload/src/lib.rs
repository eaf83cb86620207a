//! Vault Upload Queue
//!
//! Ordered, strictly sequential upload of accepted evidence files.
//!
//! # Architecture
//!
//! ```text
//! QueueEvent ──► UploadQueue::apply ──► Step { queue', notices }
//!                      ▲                         │
//!                      │                         ▼
//!               UploadManager ◄──────── broadcast::Sender<QueueNotice>
//!                      │
//!                      ▼
//!               TransferClient (folder_exists / create_folder / upload)
//! ```
//!
//! - [`UploadQueue`] is a pure state machine; every change is an event.
//! - [`UploadManager`] owns the queue, awaits one collaborator call at a time
//!   and turns progress and results back into events.
//! - Transfer failures stay on their entry; folder failures block the whole
//!   queue until [`UploadManager::retry_folder`] or a clear.

#![warn(missing_docs)]

mod error;
mod manager;
mod queue;
pub mod state_machine;
mod transfer;
mod types;

pub use error::{QueueError, TransferError};
pub use manager::{ProcessReport, UploadManager, DEFAULT_NOTICE_BUFFER};
pub use queue::{QueueEvent, QueueNotice, Step, UploadQueue};
pub use transfer::{ProgressReporter, StatusReporter, TransferClient, TransferRequest};
pub use types::{BatchId, BatchRequest, EntryId, EntryStatus, FolderGate, QueueEntry, QueueSummary};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving the queue
    pub use crate::{
        EntryStatus, QueueError, QueueNotice, TransferClient, TransferError, TransferRequest, UploadManager,
        UploadQueue,
    };
}
