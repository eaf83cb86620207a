//! Candidate files
//!
//! A [`SubmittedFile`] is what the picker hands over: a name, a size and a
//! shared handle to the bytes. Cloning never copies the content.

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// File offered for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedFile {
    name: String,
    relative_path: Option<String>,
    size_bytes: u64,
    content: Arc<[u8]>,
}

impl SubmittedFile {
    /// File with in-memory content; size is the content length
    #[must_use]
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        let content: Vec<u8> = content.into();
        Self {
            name: name.into(),
            relative_path: None,
            size_bytes: content.len() as u64,
            content: Arc::from(content),
        }
    }

    /// Metadata-only handle (size known, bytes not loaded)
    #[must_use]
    pub fn metadata(name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            relative_path: None,
            size_bytes,
            content: Arc::from(Vec::<u8>::new()),
        }
    }

    /// Path inside a submitted folder tree
    #[must_use]
    pub fn with_relative_path(mut self, path: impl Into<String>) -> Self {
        self.relative_path = Some(path.into());
        self
    }

    /// File name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path inside the submitted folder, if any
    #[inline]
    #[must_use]
    pub fn relative_path(&self) -> Option<&str> {
        self.relative_path.as_deref()
    }

    /// Size in bytes
    #[inline]
    #[must_use]
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Loaded bytes (empty for metadata-only handles)
    #[inline]
    #[must_use]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Lower-case extension with leading `.`
    #[inline]
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.name)
    }
}

impl Display for SubmittedFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.relative_path {
            Some(path) => f.write_str(path),
            None => f.write_str(&self.name),
        }
    }
}

/// Everything after the last `.`, lower-cased and prefixed with `.`
///
/// `None` when the name has no `.` or ends with one.
#[must_use]
pub fn extension_of(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(format!(".{}", ext.to_lowercase()))
}
