//! Vault configuration
//!
//! Loaded from TOML; every field has a default so an empty file is valid.
//!
//! ```toml
//! catalog_path = "catalogs/2024.toml"
//! default_stage = "Seed"
//! notice_buffer = 64
//! log_filter = "info,vault_upload=debug"
//!
//! [submission]
//! max_description_chars = 500
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use vault_catalog::{ArtifactCatalog, CatalogError, GrowthStage};
use vault_upload::DEFAULT_NOTICE_BUFFER;
use vault_validation::SubmissionRules;

/// Vault configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VaultConfig {
    /// Catalog document; the built-in standard catalog when unset
    pub catalog_path: Option<PathBuf>,
    /// Growth stage used until one is chosen; unknown values show everything
    pub default_stage: Option<String>,
    /// Submission metadata limits
    pub submission: SubmissionRules,
    /// Capacity of the queue notice channel
    pub notice_buffer: usize,
    /// Default tracing filter (overridden by `RUST_LOG`)
    pub log_filter: String,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            catalog_path: None,
            default_stage: None,
            submission: SubmissionRules::default(),
            notice_buffer: DEFAULT_NOTICE_BUFFER,
            log_filter: "info".to_string(),
        }
    }
}

impl VaultConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// [`ConfigError`] when the file cannot be read, parsed or validated
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// [`ConfigError::Parse`] or [`ConfigError::Invalid`]
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.notice_buffer == 0 {
            return Err(ConfigError::Invalid {
                field: "notice_buffer",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.submission.max_description_chars == 0 {
            return Err(ConfigError::Invalid {
                field: "submission.max_description_chars",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(self)
    }

    /// With catalog path
    #[must_use]
    pub fn with_catalog_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.catalog_path = Some(path.into());
        self
    }

    /// With default stage
    #[must_use]
    pub fn with_default_stage(mut self, stage: impl Into<String>) -> Self {
        self.default_stage = Some(stage.into());
        self
    }

    /// With submission rules
    #[must_use]
    pub fn with_submission(mut self, rules: SubmissionRules) -> Self {
        self.submission = rules;
        self
    }

    /// With notice channel capacity
    #[must_use]
    pub fn with_notice_buffer(mut self, capacity: usize) -> Self {
        self.notice_buffer = capacity;
        self
    }

    /// With log filter
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// Default stage, parsed leniently
    #[must_use]
    pub fn stage(&self) -> Option<GrowthStage> {
        self.default_stage.as_deref().and_then(GrowthStage::lookup)
    }

    /// Configured catalog, or the standard one
    ///
    /// # Errors
    /// [`CatalogError`] when the configured catalog cannot be loaded
    pub fn catalog(&self) -> Result<Arc<ArtifactCatalog>, CatalogError> {
        match &self.catalog_path {
            Some(path) => ArtifactCatalog::load(path).map(Arc::new),
            None => ArtifactCatalog::standard().map(|c| Arc::new(c.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(VaultConfig::from_toml_str("").unwrap(), VaultConfig::default());
    }

    #[test]
    fn parses_every_field() {
        let config = VaultConfig::from_toml_str(
            r#"
catalog_path = "catalog.json"
default_stage = "series-a"
notice_buffer = 8
log_filter = "debug"

[submission]
max_description_chars = 120
"#,
        )
        .unwrap();
        assert_eq!(config.stage(), Some(GrowthStage::SeriesA));
        assert_eq!(config.submission.max_description_chars, 120);
        assert_eq!(config.notice_buffer, 8);
        assert_eq!(config.catalog_path, Some(PathBuf::from("catalog.json")));
    }

    #[test]
    fn unknown_stage_means_no_narrowing() {
        let config = VaultConfig::new().with_default_stage("Series Z");
        assert_eq!(config.stage(), None);
    }

    #[test]
    fn rejects_zero_buffer_and_unknown_keys() {
        assert!(matches!(
            VaultConfig::from_toml_str("notice_buffer = 0"),
            Err(ConfigError::Invalid { field: "notice_buffer", .. })
        ));
        assert!(matches!(
            VaultConfig::from_toml_str("colour = \"blue\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "default_stage = \"Seed\"").unwrap();
        let config = VaultConfig::load(file.path()).unwrap();
        assert_eq!(config.stage(), Some(GrowthStage::Seed));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = VaultConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn default_catalog_is_standard() {
        let catalog = VaultConfig::new().catalog().unwrap();
        assert_eq!(catalog.version(), ArtifactCatalog::standard().unwrap().version());
    }
}
