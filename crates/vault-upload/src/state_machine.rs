//! Entry status transitions
//!
//! `pending -> uploading -> {completed | failed}`, and `failed -> pending` on
//! explicit retry. Removal on clear is not a status change.

use crate::error::QueueError;
use crate::types::EntryStatus;

/// Validates a status transition.
pub fn validate_transition(from: EntryStatus, to: EntryStatus) -> Result<(), QueueError> {
    if allowed(from, to) {
        Ok(())
    } else {
        Err(QueueError::IllegalTransition { from, to })
    }
}

/// Statuses reachable from `from` in one step
#[must_use]
pub fn allowed_transitions(from: EntryStatus) -> Vec<EntryStatus> {
    use EntryStatus::*;
    match from {
        Pending => vec![Uploading],
        Uploading => vec![Completed, Failed],
        Completed => vec![],
        Failed => vec![Pending],
    }
}

fn allowed(from: EntryStatus, to: EntryStatus) -> bool {
    allowed_transitions(from).into_iter().any(|s| s == to)
}
