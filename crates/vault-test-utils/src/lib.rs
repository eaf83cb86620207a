//! Testing utilities for the document vault workspace
//!
//! Shared fixtures, a scripted transfer collaborator and proptest strategies.

#![allow(missing_docs)]

use parking_lot::Mutex;
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use vault_catalog::{
    Artifact, ArtifactCatalog, ArtifactKind, Category, CategoryId, GrowthStage, Priority, UploadedArtifacts,
    BYTES_PER_MB,
};
use vault_upload::{ProgressReporter, StatusReporter, TransferClient, TransferError, TransferRequest};
use vault_validation::SubmittedFile;

/// `0_Overview` with one mandatory `pitch_deck` (`.pdf`, 25MB) for Seed
pub fn scenario_catalog() -> ArtifactCatalog {
    ArtifactCatalog::builder("scenario")
        .category(
            Category::new(CategoryId::Overview, "Overview").with_artifact(
                Artifact::new("pitch_deck", "Pitch Deck")
                    .with_formats([".pdf"])
                    .with_max_size_mb(25)
                    .with_score(15)
                    .mandatory()
                    .with_priority(Priority::Critical)
                    .with_stages([GrowthStage::Seed]),
            ),
        )
        .build()
        .unwrap()
}

/// Two categories with mixed priorities, a folder artifact and a
/// Series A-only artifact
pub fn mixed_catalog() -> ArtifactCatalog {
    ArtifactCatalog::builder("mixed")
        .category(
            Category::new(CategoryId::ProblemProof, "Problem Proof")
                .with_artifact(
                    Artifact::new("market_survey", "Market Survey")
                        .with_formats(["pdf", "xlsx"])
                        .with_max_size_mb(5)
                        .with_priority(Priority::Medium)
                        .with_stages([GrowthStage::Seed, GrowthStage::SeriesA]),
                )
                .with_artifact(
                    Artifact::new("problem_statement", "Problem Statement")
                        .with_formats(["pdf", "docx"])
                        .with_max_size_mb(10)
                        .mandatory()
                        .with_priority(Priority::Critical)
                        .with_stages([GrowthStage::PreSeed, GrowthStage::Seed]),
                )
                .with_artifact(
                    Artifact::new("customer_interviews", "Customer Interviews")
                        .with_formats(["pdf", "mp3", "txt"])
                        .with_max_size_mb(50)
                        .with_kind(ArtifactKind::Folder)
                        .with_priority(Priority::High)
                        .with_stages([GrowthStage::Seed]),
                )
                .with_artifact(
                    Artifact::new("cohort_analysis", "Cohort Analysis")
                        .with_formats(["xlsx"])
                        .with_max_size_mb(20)
                        .with_priority(Priority::High)
                        .with_stages([GrowthStage::SeriesA]),
                ),
        )
        .category(
            Category::new(CategoryId::Financials, "Financials").with_artifact(
                Artifact::new("financial_model", "Financial Model")
                    .with_formats(["xlsx"])
                    .with_max_size_mb(10)
                    .with_priority(Priority::Critical)
                    .with_stages([GrowthStage::SeriesA, GrowthStage::SeriesB]),
            ),
        )
        .build()
        .unwrap()
}

/// Metadata-only file of `megabytes` MB
pub fn file_mb(name: &str, megabytes: u64) -> SubmittedFile {
    SubmittedFile::metadata(name, megabytes * BYTES_PER_MB)
}

/// `count` small pdf files named `file1.pdf`, `file2.pdf`, ...
pub fn pdf_files(count: usize) -> Vec<SubmittedFile> {
    (1..=count)
        .map(|i| SubmittedFile::new(format!("file{i}.pdf"), vec![0u8; 64]))
        .collect()
}

/// What the scripted collaborator saw, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferLog {
    FolderChecked(CategoryId),
    FolderCreated(CategoryId),
    FolderFailed(CategoryId),
    Started(String),
    Finished { file: String, ok: bool },
}

/// Deterministic [`TransferClient`] for tests
///
/// Files succeed unless registered with [`ScriptedTransfer::failing`] or
/// [`ScriptedTransfer::failing_times`]. Folders exist unless registered as
/// missing.
#[derive(Debug, Default)]
pub struct ScriptedTransfer {
    failures: Mutex<HashMap<String, usize>>,
    missing_folders: Mutex<HashSet<CategoryId>>,
    folder_failures: Mutex<HashMap<CategoryId, usize>>,
    log: Mutex<Vec<TransferLog>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    /// `file` fails on every attempt
    pub fn failing(self, file: &str) -> Self {
        self.failing_times(file, usize::MAX)
    }

    /// `file` fails on its first `times` attempts
    pub fn failing_times(self, file: &str, times: usize) -> Self {
        self.failures.lock().insert(file.to_string(), times);
        self
    }

    /// `category` has no remote folder yet
    pub fn missing_folder(self, category: CategoryId) -> Self {
        self.missing_folders.lock().insert(category);
        self
    }

    /// Creating `category`'s folder fails `times` times
    pub fn folder_failing_times(self, category: CategoryId, times: usize) -> Self {
        self.folder_failures.lock().insert(category, times);
        self
    }

    pub fn log(&self) -> Vec<TransferLog> {
        self.log.lock().clone()
    }

    /// File names in the order their transfers started
    pub fn started(&self) -> Vec<String> {
        self.log
            .lock()
            .iter()
            .filter_map(|l| match l {
                TransferLog::Started(file) => Some(file.clone()),
                _ => None,
            })
            .collect()
    }

    /// File names in the order their transfers succeeded
    pub fn completed(&self) -> Vec<String> {
        self.log
            .lock()
            .iter()
            .filter_map(|l| match l {
                TransferLog::Finished { file, ok: true } => Some(file.clone()),
                _ => None,
            })
            .collect()
    }

    /// Highest number of simultaneous uploads observed
    pub fn max_concurrency(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn take_failure(map: &Mutex<HashMap<String, usize>>, key: &str) -> bool {
        let mut map = map.lock();
        match map.get_mut(key) {
            Some(remaining) if *remaining > 0 => {
                *remaining = remaining.saturating_sub(1);
                true
            }
            _ => false,
        }
    }
}

#[async_trait::async_trait]
impl TransferClient for ScriptedTransfer {
    async fn folder_exists(&self, category: CategoryId) -> Result<bool, TransferError> {
        self.log.lock().push(TransferLog::FolderChecked(category));
        Ok(!self.missing_folders.lock().contains(&category))
    }

    async fn create_folder(&self, category: CategoryId, status: StatusReporter) -> Result<(), TransferError> {
        status.report(format!("Creating {category}"));
        tokio::task::yield_now().await;
        let failed = {
            let mut failures = self.folder_failures.lock();
            match failures.get_mut(&category) {
                Some(remaining) if *remaining > 0 => {
                    *remaining -= 1;
                    true
                }
                _ => false,
            }
        };
        if failed {
            self.log.lock().push(TransferLog::FolderFailed(category));
            return Err(TransferError::Folder(format!("cannot create {category}")));
        }
        self.missing_folders.lock().remove(&category);
        self.log.lock().push(TransferLog::FolderCreated(category));
        Ok(())
    }

    async fn upload(&self, request: TransferRequest, progress: ProgressReporter) -> Result<(), TransferError> {
        let name = request.file.name().to_string();
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.log.lock().push(TransferLog::Started(name.clone()));

        progress.report(25);
        tokio::task::yield_now().await;
        progress.report(75);

        let fail = Self::take_failure(&self.failures, &name);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.log.lock().push(TransferLog::Finished {
            file: name.clone(),
            ok: !fail,
        });
        if fail {
            Err(TransferError::Upload(format!("{name} rejected by storage")))
        } else {
            Ok(())
        }
    }
}

pub fn arb_stage() -> impl Strategy<Value = GrowthStage> {
    prop::sample::select(GrowthStage::ALL.to_vec())
}

pub fn arb_priority() -> impl Strategy<Value = Priority> {
    prop::sample::select(vec![Priority::Critical, Priority::High, Priority::Medium, Priority::Low])
}

const FORMATS: [&str; 6] = [".pdf", ".docx", ".xlsx", ".pptx", ".mp4", ".txt"];

#[derive(Debug, Clone)]
struct ArtifactShape {
    formats: Vec<&'static str>,
    megabytes: u64,
    stages: Vec<GrowthStage>,
    priority: Priority,
    mandatory: bool,
}

fn arb_shape() -> impl Strategy<Value = ArtifactShape> {
    (
        prop::sample::subsequence(FORMATS.to_vec(), 1..=3),
        1u64..=100,
        prop::sample::subsequence(GrowthStage::ALL.to_vec(), 1..=4),
        arb_priority(),
        any::<bool>(),
    )
        .prop_map(|(formats, megabytes, stages, priority, mandatory)| ArtifactShape {
            formats,
            megabytes,
            stages,
            priority,
            mandatory,
        })
}

/// Valid catalog over every category, 0 to 5 artifacts each, ids `a{c}_{i}`
pub fn arb_catalog() -> impl Strategy<Value = ArtifactCatalog> {
    prop::collection::vec(prop::collection::vec(arb_shape(), 0..=5), CategoryId::ALL.len()).prop_map(
        |shapes| {
            let mut builder = ArtifactCatalog::builder("generated");
            for (c, (category, artifacts)) in CategoryId::ALL.iter().zip(shapes).enumerate() {
                let mut record = Category::new(*category, category.as_str());
                for (i, shape) in artifacts.into_iter().enumerate() {
                    let mut artifact = Artifact::new(format!("a{c}_{i}"), format!("Artifact {c}.{i}"))
                        .with_formats(shape.formats)
                        .with_max_size_mb(shape.megabytes)
                        .with_priority(shape.priority)
                        .with_stages(shape.stages);
                    if shape.mandatory {
                        artifact = artifact.mandatory();
                    }
                    record = record.with_artifact(artifact);
                }
                builder = builder.category(record);
            }
            builder.build().unwrap()
        },
    )
}

/// Catalog plus a loaded uploaded-set drawn from its artifact ids
pub fn arb_catalog_and_uploaded() -> impl Strategy<Value = (ArtifactCatalog, UploadedArtifacts)> {
    arb_catalog().prop_flat_map(|catalog| {
        let ids: Vec<String> = catalog
            .categories()
            .flat_map(|c| c.artifacts().map(|a| a.id().to_string()))
            .collect();
        let picked = if ids.is_empty() {
            Just(Vec::new()).boxed()
        } else {
            let len = ids.len();
            prop::sample::subsequence(ids, 0..=len).boxed()
        };
        (Just(catalog), picked.prop_map(UploadedArtifacts::loaded))
    })
}
