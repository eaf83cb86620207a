//! Vault Artifact Catalog
//!
//! Static, versioned description of what evidence a venture can put in its
//! document vault, and what is still missing.
//!
//! # Core Concepts
//!
//! - [`ArtifactCatalog`]: ordered `CategoryId -> Category` registry, loaded once
//! - [`Artifact`]: one document requirement (formats, size ceiling, stages, priority)
//! - [`StageView`]: the catalog projected onto one [`GrowthStage`]
//! - [`CompletionTracker`]: remaining artifacts and category completion for
//!   an [`UploadedArtifacts`] set
//!
//! # Example
//!
//! ```rust
//! use vault_catalog::{ArtifactCatalog, CategoryId, CompletionTracker, GrowthStage, UploadedArtifacts};
//!
//! let catalog = ArtifactCatalog::standard().unwrap();
//! let uploaded = UploadedArtifacts::loaded(["pitch_deck"]);
//! let tracker = CompletionTracker::new(catalog, GrowthStage::lookup("Seed"), &uploaded);
//!
//! let remaining = tracker.remaining_artifacts(CategoryId::Overview).unwrap();
//! assert!(remaining.iter().all(|a| a.id().as_str() != "pitch_deck"));
//! ```

#![warn(missing_docs)]

mod artifact;
mod catalog;
mod category;
mod completion;
mod error;
mod filter;
mod id;
mod stage;

pub use artifact::{normalize_format, Artifact, ArtifactKind, Priority, BYTES_PER_MB};
pub use catalog::{ArtifactCatalog, CatalogBuilder};
pub use category::Category;
pub use completion::{sort_by_priority, CategoryProgress, CompletionTracker, UploadedArtifacts};
pub use error::CatalogError;
pub use filter::StageView;
pub use id::{ArtifactId, CategoryId};
pub use stage::{GrowthStage, UnknownStage};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for catalog queries
    pub use crate::{
        Artifact, ArtifactCatalog, ArtifactId, ArtifactKind, CatalogError, Category, CategoryId,
        CompletionTracker, GrowthStage, Priority, StageView, UploadedArtifacts,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
