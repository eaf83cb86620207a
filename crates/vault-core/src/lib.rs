//! Document Vault Core
//!
//! Facade over the artifact catalog, upload validation and upload queue.
//!
//! # Control flow
//!
//! 1. The founder picks a stage, a category, an artifact and a description.
//! 2. [`DocumentVault::gate_status`] decides whether the picker may open;
//!    [`DocumentVault::open_picker`] then asks the [`ConsentGate`].
//! 3. [`DocumentVault::submit`] validates the returned files and enqueues
//!    the accepted ones as one batch.
//! 4. [`DocumentVault::process`] uploads them one at a time and, once the
//!    batch drains with a success, clears the artifact and description.
//! 5. The caller refetches its uploaded records and calls
//!    [`DocumentVault::set_uploaded`]; completion is recomputed from there.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vault_catalog::{CategoryId, UploadedArtifacts};
//! use vault_core::{DocumentVault, VaultConfig};
//! # use vault_upload::TransferClient;
//! # async fn run<T: TransferClient>(transfer: Arc<T>) -> Result<(), vault_core::VaultError> {
//! let config = VaultConfig::new().with_default_stage("Seed");
//! let mut vault = DocumentVault::from_config(&config, transfer)?;
//! vault.set_uploaded(UploadedArtifacts::loaded(["pitch_deck"]));
//!
//! vault.select_category(CategoryId::Financials)?;
//! for artifact in vault.remaining_artifacts(CategoryId::Financials)? {
//!     println!("{} ({})", artifact.name(), artifact.priority().as_str());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod consent;
mod error;
mod vault;

pub use config::VaultConfig;
pub use consent::{ConsentGate, PickerDecision, PickerKind};
pub use error::{ConfigError, VaultError};
pub use vault::{DocumentVault, SubmissionReport};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for vault consumers
    pub use crate::{ConsentGate, DocumentVault, PickerDecision, SubmissionReport, VaultConfig, VaultError};
    pub use vault_catalog::prelude::*;
    pub use vault_upload::{QueueNotice, TransferClient, TransferError};
    pub use vault_validation::{GateStatus, SubmittedFile, UploadSelection};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
