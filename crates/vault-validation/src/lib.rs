//! Vault Upload Validation
//!
//! Everything that decides whether files may enter the upload queue:
//!
//! - [`FileValidator`]: per-file format and size checks, targeted or bulk
//! - [`SubmissionRules`]: required artifact and description metadata
//! - [`UploadGate`]: the single blocked/reasons decision shared by the submit
//!   action and the UI
//!
//! Requirement errors and file violations are separate types because the
//! user fixes them in different places.
//!
//! # Example
//!
//! ```rust
//! use vault_catalog::{ArtifactCatalog, CategoryId};
//! use vault_validation::{FileValidator, SubmittedFile};
//!
//! let catalog = ArtifactCatalog::standard().unwrap();
//! let file = SubmittedFile::metadata("deck.pdf", 30 * 1_048_576);
//! let outcome = FileValidator::new(catalog).validate(&file, CategoryId::Overview, Some(&"pitch_deck".into()));
//! assert!(!outcome.is_valid());
//! ```

#![warn(missing_docs)]

mod file;
mod gate;
mod requirements;
mod submission;
mod validator;

pub use file::{extension_of, SubmittedFile};
pub use gate::{upload_gate_status, GateReason, GateStatus, UploadGate};
pub use requirements::{RequirementError, SubmissionRules, UploadSelection, DEFAULT_MAX_DESCRIPTION_CHARS};
pub use submission::{RejectedFile, SubmissionCheck, SubmissionMode};
pub use validator::{check_against, most_permissive_match, FileValidator, FileViolation, ValidationMode, ValidationOutcome};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for validation
    pub use crate::{
        FileValidator, FileViolation, GateStatus, RequirementError, SubmissionRules, SubmittedFile, UploadGate,
        UploadSelection,
    };
}
