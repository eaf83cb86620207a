//! Artifact records
//!
//! An [`Artifact`] is one document requirement: its accepted formats, its
//! size ceiling, the stages it applies to and how much it weighs in the
//! readiness score.

use crate::error::CatalogError;
use crate::id::ArtifactId;
use crate::stage::GrowthStage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Bytes per megabyte used for size messages
pub const BYTES_PER_MB: u64 = 1_048_576;

/// Priority bucket, used to order the remaining-artifact picker
///
/// Unknown or missing values in catalog data become [`Priority::Low`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    /// Rank 1
    Critical,
    /// Rank 2
    High,
    /// Rank 3
    Medium,
    /// Rank 4
    #[default]
    Low,
}

impl Priority {
    /// Sort rank: `critical=1, high=2, medium=3, low=4`
    #[inline]
    #[must_use]
    pub const fn rank(&self) -> u8 {
        match self {
            Priority::Critical => 1,
            Priority::High => 2,
            Priority::Medium => 3,
            Priority::Low => 4,
        }
    }

    /// Lower-case name
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl From<&str> for Priority {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "critical" => Priority::Critical,
            "high" => Priority::High,
            "medium" => Priority::Medium,
            _ => Priority::Low,
        }
    }
}

impl From<String> for Priority {
    fn from(value: String) -> Self {
        Priority::from(value.as_str())
    }
}

impl From<Priority> for String {
    fn from(value: Priority) -> Self {
        value.as_str().to_string()
    }
}

/// Whether the artifact is satisfied by one file or by a folder tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// Single document
    #[default]
    File,
    /// Folder of documents
    Folder,
}

/// A single required or optional document type
///
/// # Invariants
/// - `max_size_bytes > 0`
/// - `allowed_formats` non-empty, each lower-case with a leading `.`
/// - `applicable_stages` non-empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    id: ArtifactId,
    name: String,
    #[serde(default)]
    description: String,
    allowed_formats: Vec<String>,
    max_size_bytes: u64,
    #[serde(default)]
    score_contribution: u32,
    #[serde(default)]
    mandatory: bool,
    #[serde(default, rename = "file_or_folder")]
    kind: ArtifactKind,
    applicable_stages: BTreeSet<GrowthStage>,
    #[serde(default)]
    priority: Priority,
}

impl Artifact {
    /// Start a new artifact record
    ///
    /// The record is not valid until formats, a size limit and at least one
    /// stage are set; [`Artifact::validate`] enforces that.
    #[must_use]
    pub fn new(id: impl Into<ArtifactId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            allowed_formats: Vec::new(),
            max_size_bytes: 0,
            score_contribution: 0,
            mandatory: false,
            kind: ArtifactKind::File,
            applicable_stages: BTreeSet::new(),
            priority: Priority::Low,
        }
    }

    /// With description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// With accepted formats (`pdf`, `.PDF` and `.pdf` are equivalent)
    #[must_use]
    pub fn with_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_formats = formats.into_iter().map(|f| normalize_format(f.as_ref())).collect();
        self
    }

    /// With size ceiling in bytes
    #[must_use]
    pub fn with_max_size_bytes(mut self, bytes: u64) -> Self {
        self.max_size_bytes = bytes;
        self
    }

    /// With size ceiling in whole megabytes
    #[must_use]
    pub fn with_max_size_mb(self, megabytes: u64) -> Self {
        self.with_max_size_bytes(megabytes * BYTES_PER_MB)
    }

    /// With score contribution
    #[must_use]
    pub fn with_score(mut self, score: u32) -> Self {
        self.score_contribution = score;
        self
    }

    /// Mark mandatory
    #[must_use]
    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    /// With file/folder kind
    #[must_use]
    pub fn with_kind(mut self, kind: ArtifactKind) -> Self {
        self.kind = kind;
        self
    }

    /// With applicable stages
    #[must_use]
    pub fn with_stages(mut self, stages: impl IntoIterator<Item = GrowthStage>) -> Self {
        self.applicable_stages = stages.into_iter().collect();
        self
    }

    /// With priority
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Check record invariants and normalise formats
    ///
    /// # Errors
    /// Returns [`CatalogError::InvalidDefinition`] if a limit, format list or
    /// stage set is empty
    pub fn validate(mut self) -> Result<Self, CatalogError> {
        if self.id.as_str().trim().is_empty() {
            return Err(CatalogError::definition("<empty>", "identifier is empty"));
        }
        if self.max_size_bytes == 0 {
            return Err(CatalogError::definition(self.id.as_str(), "max_size_bytes must be positive"));
        }
        let mut formats: Vec<String> = Vec::with_capacity(self.allowed_formats.len());
        for format in self.allowed_formats.iter().map(|f| normalize_format(f)) {
            if format.len() > 1 && !formats.contains(&format) {
                formats.push(format);
            }
        }
        self.allowed_formats = formats;
        if self.allowed_formats.is_empty() {
            return Err(CatalogError::definition(self.id.as_str(), "allowed_formats is empty"));
        }
        if self.applicable_stages.is_empty() {
            return Err(CatalogError::definition(self.id.as_str(), "applicable_stages is empty"));
        }
        Ok(self)
    }

    /// Identifier
    #[inline]
    #[must_use]
    pub fn id(&self) -> &ArtifactId {
        &self.id
    }

    /// Display name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Description
    #[inline]
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Accepted extensions, lower-case with leading `.`
    #[inline]
    #[must_use]
    pub fn allowed_formats(&self) -> &[String] {
        &self.allowed_formats
    }

    /// Size ceiling in bytes
    #[inline]
    #[must_use]
    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }

    /// Size ceiling rounded to whole megabytes
    #[inline]
    #[must_use]
    pub fn max_size_mb(&self) -> u64 {
        (self.max_size_bytes + BYTES_PER_MB / 2) / BYTES_PER_MB
    }

    /// Score contribution
    #[inline]
    #[must_use]
    pub fn score_contribution(&self) -> u32 {
        self.score_contribution
    }

    /// Whether the artifact is mandatory
    #[inline]
    #[must_use]
    pub fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    /// File or folder
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    /// Stages this artifact is visible in
    #[inline]
    #[must_use]
    pub fn applicable_stages(&self) -> &BTreeSet<GrowthStage> {
        &self.applicable_stages
    }

    /// Priority bucket
    #[inline]
    #[must_use]
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Whether the artifact applies to `stage`
    #[inline]
    #[must_use]
    pub fn applies_to(&self, stage: GrowthStage) -> bool {
        self.applicable_stages.contains(&stage)
    }

    /// Case-insensitive membership test for an extension (`.pdf` or `pdf`)
    #[must_use]
    pub fn accepts_extension(&self, extension: &str) -> bool {
        let wanted = normalize_format(extension);
        self.allowed_formats.iter().any(|f| *f == wanted)
    }
}

/// Lower-case and prefix with `.`
#[must_use]
pub fn normalize_format(raw: &str) -> String {
    let trimmed = raw.trim().trim_start_matches('.');
    format!(".{}", trimmed.to_lowercase())
}
