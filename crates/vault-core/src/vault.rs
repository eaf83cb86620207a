//! Document vault facade
//!
//! Holds the selection state a founder works with (category, artifact,
//! description, stage), the externally supplied uploaded set and the upload
//! manager, and routes every operation through the single upload gate.
//!
//! The selected artifact and description are scoped to one batch: when the
//! manager reports a drained batch with at least one completed entry, they
//! are reset.

use crate::config::VaultConfig;
use crate::consent::{ConsentGate, PickerDecision, PickerKind};
use crate::error::VaultError;
use std::sync::Arc;
use tokio::sync::broadcast;
use vault_catalog::{
    Artifact, ArtifactCatalog, ArtifactId, ArtifactKind, CategoryId, CategoryProgress, CompletionTracker,
    GrowthStage, UploadedArtifacts,
};
use vault_upload::{BatchId, ProcessReport, QueueNotice, TransferClient, UploadManager, UploadQueue};
use vault_validation::{
    FileValidator, GateStatus, RejectedFile, SubmissionMode, SubmissionRules, SubmittedFile, UploadGate,
    UploadSelection,
};

/// What happened to a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReport {
    /// Gate decision at submit time
    pub gate: GateStatus,
    /// How files were validated (unset when the gate was closed)
    pub mode: Option<SubmissionMode>,
    /// Files that entered the queue
    pub accepted: usize,
    /// Files that failed validation, with their violations
    pub rejected: Vec<RejectedFile>,
    /// Batch created for the accepted files
    pub batch: Option<BatchId>,
}

impl SubmissionReport {
    fn blocked(gate: GateStatus) -> Self {
        Self {
            gate,
            mode: None,
            accepted: 0,
            rejected: Vec::new(),
            batch: None,
        }
    }

    /// At least one file was enqueued
    #[inline]
    #[must_use]
    pub fn is_enqueued(&self) -> bool {
        self.batch.is_some()
    }

    /// Every file-level message, prefixed by the file
    #[must_use]
    pub fn file_errors(&self) -> Vec<String> {
        self.rejected
            .iter()
            .flat_map(|r| r.errors.iter().map(move |e| format!("{}: {e}", r.file)))
            .collect()
    }
}

/// The document vault
pub struct DocumentVault<T: TransferClient + ?Sized> {
    catalog: Arc<ArtifactCatalog>,
    rules: SubmissionRules,
    stage: Option<GrowthStage>,
    uploaded: UploadedArtifacts,
    category: Option<CategoryId>,
    selection: UploadSelection,
    manager: UploadManager<T>,
}

impl<T: TransferClient + ?Sized> std::fmt::Debug for DocumentVault<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentVault")
            .field("catalog", &self.catalog.version())
            .field("stage", &self.stage)
            .field("category", &self.category)
            .field("selection", &self.selection)
            .field("manager", &self.manager)
            .finish_non_exhaustive()
    }
}

impl<T: TransferClient + ?Sized> DocumentVault<T> {
    /// Create vault over `catalog`
    ///
    /// The uploaded set starts as loading, so nothing reports complete until
    /// [`DocumentVault::set_uploaded`] is called.
    #[must_use]
    pub fn new(catalog: Arc<ArtifactCatalog>, transfer: Arc<T>, config: &VaultConfig) -> Self {
        let manager = UploadManager::new(transfer, config.notice_buffer);
        Self {
            catalog,
            rules: config.submission,
            stage: config.stage(),
            uploaded: UploadedArtifacts::loading(),
            category: None,
            selection: UploadSelection::new(),
            manager,
        }
    }

    /// Create vault with the catalog named by `config`
    ///
    /// # Errors
    /// [`VaultError::Catalog`] when the catalog cannot be loaded
    pub fn from_config(config: &VaultConfig, transfer: Arc<T>) -> Result<Self, VaultError> {
        let catalog = config.catalog()?;
        tracing::info!(version = catalog.version(), categories = catalog.len(), "catalog loaded");
        Ok(Self::new(catalog, transfer, config))
    }

    /// Catalog in use
    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &ArtifactCatalog {
        &self.catalog
    }

    /// Current growth stage (`None` shows everything)
    #[inline]
    #[must_use]
    pub fn stage(&self) -> Option<GrowthStage> {
        self.stage
    }

    /// Selected category
    #[inline]
    #[must_use]
    pub fn selected_category(&self) -> Option<CategoryId> {
        self.category
    }

    /// Selected artifact and description
    #[inline]
    #[must_use]
    pub fn selection(&self) -> &UploadSelection {
        &self.selection
    }

    /// Uploaded set as last supplied
    #[inline]
    #[must_use]
    pub fn uploaded(&self) -> &UploadedArtifacts {
        &self.uploaded
    }

    /// Select a category; a previously selected artifact is dropped
    ///
    /// Does not touch the queue: batches in flight keep going.
    ///
    /// # Errors
    /// [`VaultError::Catalog`] if the catalog does not declare `category`
    pub fn select_category(&mut self, category: CategoryId) -> Result<(), VaultError> {
        self.catalog.category(category)?;
        if self.category != Some(category) {
            self.selection.artifact = None;
        }
        self.category = Some(category);
        Ok(())
    }

    /// Select an artifact of the selected category
    ///
    /// # Errors
    /// [`VaultError::NoCategorySelected`], or [`VaultError::Catalog`] when the
    /// artifact is not part of the category
    pub fn select_artifact(&mut self, artifact: impl Into<ArtifactId>) -> Result<(), VaultError> {
        let category = self.category.ok_or(VaultError::NoCategorySelected)?;
        let artifact = artifact.into();
        self.catalog.artifact(category, &artifact)?;
        self.selection.artifact = Some(artifact);
        Ok(())
    }

    /// Set the description for the next batch
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.selection.description = description.into();
    }

    /// Set the growth stage
    pub fn set_stage(&mut self, stage: Option<GrowthStage>) {
        self.stage = stage;
    }

    /// Replace the uploaded set (source finished loading)
    pub fn set_uploaded(&mut self, uploaded: UploadedArtifacts) {
        self.uploaded = uploaded;
    }

    /// Mark the uploaded set as reloading
    pub fn mark_uploaded_loading(&mut self) {
        self.uploaded = UploadedArtifacts::loading();
    }

    fn tracker(&self) -> CompletionTracker<'_> {
        CompletionTracker::new(&self.catalog, self.stage, &self.uploaded)
    }

    /// Artifacts still missing in `category`, highest priority first
    ///
    /// # Errors
    /// [`VaultError::Catalog`] for undeclared categories
    pub fn remaining_artifacts(&self, category: CategoryId) -> Result<Vec<&Artifact>, VaultError> {
        Ok(self.tracker().remaining_artifacts(category)?)
    }

    /// Whether `category` needs nothing more
    ///
    /// # Errors
    /// [`VaultError::Catalog`] for undeclared categories
    pub fn is_category_complete(&self, category: CategoryId) -> Result<bool, VaultError> {
        Ok(self.tracker().is_category_complete(category)?)
    }

    /// Whether `category` has nothing applicable at the current stage
    ///
    /// # Errors
    /// [`VaultError::Catalog`] for undeclared categories
    pub fn has_no_artifacts_required(&self, category: CategoryId) -> Result<bool, VaultError> {
        Ok(self.tracker().has_no_artifacts_required(category)?)
    }

    /// Per-category progress at the current stage
    #[must_use]
    pub fn progress(&self) -> Vec<CategoryProgress> {
        self.tracker().progress()
    }

    /// Upload gate for the current selection
    ///
    /// # Errors
    /// [`VaultError::NoCategorySelected`]
    pub fn gate_status(&self) -> Result<GateStatus, VaultError> {
        let category = self.category.ok_or(VaultError::NoCategorySelected)?;
        Ok(UploadGate::new(&self.catalog, self.rules).status(
            category,
            self.stage,
            &self.uploaded,
            &self.selection,
        ))
    }

    /// Check the gate, then ask for consent to open the picker
    ///
    /// # Errors
    /// [`VaultError::NoCategorySelected`]
    pub async fn open_picker<C>(&self, consent: &C) -> Result<PickerDecision, VaultError>
    where
        C: ConsentGate + ?Sized,
    {
        let gate = self.gate_status()?;
        if gate.blocked {
            return Ok(PickerDecision::Blocked(gate));
        }
        let kind = self.picker_kind();
        if consent.confirm(kind).await {
            Ok(PickerDecision::Open(kind))
        } else {
            tracing::debug!(?kind, "picker consent declined");
            Ok(PickerDecision::Declined)
        }
    }

    fn picker_kind(&self) -> PickerKind {
        let kind = self
            .category
            .zip(self.selection.artifact.as_ref())
            .and_then(|(category, artifact)| self.catalog.artifact(category, artifact).ok())
            .map(Artifact::kind);
        match kind {
            Some(ArtifactKind::Folder) => PickerKind::Folder,
            _ => PickerKind::File,
        }
    }

    /// Gate, validate and enqueue the files the picker returned
    ///
    /// Valid files are enqueued as one batch even when some siblings are
    /// rejected; rejected files are reported and never enqueued.
    ///
    /// # Errors
    /// [`VaultError::NoCategorySelected`]
    pub async fn submit(&mut self, files: Vec<SubmittedFile>) -> Result<SubmissionReport, VaultError> {
        let gate = self.gate_status()?;
        let (Some(category), Some(artifact), false) = (self.category, self.selection.artifact.clone(), gate.blocked)
        else {
            tracing::info!(reasons = ?gate.messages(), "submission blocked");
            return Ok(SubmissionReport::blocked(gate));
        };

        let check = FileValidator::new(&self.catalog).validate_submission(&files, category, &artifact);
        let mut report = SubmissionReport {
            gate,
            mode: Some(check.mode),
            accepted: check.accepted.len(),
            rejected: check.rejected,
            batch: None,
        };
        if !check.accepted.is_empty() {
            let batch = self
                .manager
                .enqueue(category, artifact, self.selection.description.clone(), check.accepted)
                .await?;
            report.batch = Some(batch);
        }
        Ok(report)
    }

    /// Run the queue until idle or blocked, then reset the selection if a
    /// batch drained with a success
    ///
    /// # Errors
    /// [`VaultError::Queue`] if the queue is already being processed
    pub async fn process(&mut self) -> Result<ProcessReport, VaultError> {
        let report = self.manager.process().await?;
        if let Some((batch, _)) = report.drained.iter().find(|(_, completed)| *completed > 0) {
            tracing::debug!(batch = %batch, "batch drained, resetting selection");
            self.selection.reset();
        }
        Ok(report)
    }

    /// Re-pend failed entries; call [`DocumentVault::process`] to resend them
    ///
    /// # Errors
    /// [`VaultError::Queue`]
    pub fn retry_failed(&self) -> Result<usize, VaultError> {
        Ok(self.manager.retry_failed()?)
    }

    /// Remove every queue entry
    pub fn clear_queue(&self) -> usize {
        self.manager.clear()
    }

    /// Unblock after a folder failure
    ///
    /// # Errors
    /// [`VaultError::Queue`] unless folder creation had failed
    pub fn retry_folder(&self) -> Result<(), VaultError> {
        Ok(self.manager.retry_folder()?)
    }

    /// Snapshot of the queue
    #[must_use]
    pub fn queue(&self) -> UploadQueue {
        self.manager.snapshot()
    }

    /// Subscribe to queue notices
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<QueueNotice> {
        self.manager.subscribe()
    }
}
