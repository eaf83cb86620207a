//! Consent collaborator
//!
//! A yes/no prompt shown before the file or folder picker opens. The vault
//! only asks and reacts; the dialog itself lives outside.

use vault_validation::GateStatus;

/// Which picker the user is about to open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerKind {
    /// Single or multiple files
    File,
    /// Whole folder tree
    Folder,
}

/// Outcome of asking to open the picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerDecision {
    /// Gate open and user consented
    Open(PickerKind),
    /// Upload gate closed; consent was not asked
    Blocked(GateStatus),
    /// User declined
    Declined,
}

/// Yes/no consent prompt
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ConsentGate: Send + Sync {
    /// Ask before opening `picker`; `true` to proceed
    async fn confirm(&self, picker: PickerKind) -> bool;
}
