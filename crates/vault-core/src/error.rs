//! Error types for the vault facade
//!
//! Requirement errors, file violations and transfer failures are not here:
//! they come back as data on reports and queue entries.

use std::path::PathBuf;
use vault_catalog::CatalogError;
use vault_upload::QueueError;

/// Main vault error type
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    /// Catalog lookup or loading failed
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Queue rejected an event
    #[error("queue error: {0}")]
    Queue(#[from] QueueError),

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Operation needs a selected category
    #[error("no category selected")]
    NoCategorySelected,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// Config path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// TOML did not parse into a config
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Value out of range
    #[error("invalid value for {field}: {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// What is wrong
        reason: String,
    },
}
