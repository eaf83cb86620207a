//! Artifact catalog
//!
//! Immutable registry of categories and artifacts. Built once (from a
//! document or a builder) and only read afterwards.

use crate::artifact::Artifact;
use crate::category::Category;
use crate::error::CatalogError;
use crate::id::{ArtifactId, CategoryId};
use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Catalog shipped with the crate
const STANDARD_CATALOG: &str = include_str!("../catalog/standard.toml");

static STANDARD: OnceCell<ArtifactCatalog> = OnceCell::new();

/// On-disk catalog layout
#[derive(Debug, Deserialize)]
struct CatalogDocument {
    version: String,
    #[serde(default)]
    categories: Vec<CategoryDocument>,
}

#[derive(Debug, Deserialize)]
struct CategoryDocument {
    id: CategoryId,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    artifacts: Vec<Artifact>,
}

/// Ordered mapping `CategoryId -> Category`
///
/// # Invariants
/// - category and artifact identifiers are unique across the catalog
/// - every artifact satisfies [`Artifact::validate`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactCatalog {
    version: String,
    categories: IndexMap<CategoryId, Category>,
}

impl ArtifactCatalog {
    /// Start a builder
    #[inline]
    #[must_use]
    pub fn builder(version: impl Into<String>) -> CatalogBuilder {
        CatalogBuilder {
            version: version.into(),
            categories: Vec::new(),
        }
    }

    /// Built-in catalog, parsed on first use and shared for the process lifetime
    ///
    /// # Errors
    /// Returns error only if the bundled document is malformed
    pub fn standard() -> Result<&'static ArtifactCatalog, CatalogError> {
        STANDARD.get_or_try_init(|| Self::from_toml_str(STANDARD_CATALOG))
    }

    /// Parse a TOML catalog document
    ///
    /// # Errors
    /// Returns [`CatalogError::Parse`] on malformed input, or an invariant
    /// error if a record is invalid
    pub fn from_toml_str(source: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument = toml::from_str(source)?;
        Self::from_document(document)
    }

    /// Parse a JSON catalog document
    ///
    /// # Errors
    /// Same as [`ArtifactCatalog::from_toml_str`]
    pub fn from_json_str(source: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_str(source)?;
        Self::from_document(document)
    }

    /// Load a catalog file; `.json` files are read as JSON, anything else as TOML
    ///
    /// # Errors
    /// Returns [`CatalogError::Io`] if the file cannot be read
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let catalog = if is_json {
            Self::from_json_str(&source)?
        } else {
            Self::from_toml_str(&source)?
        };
        tracing::info!(
            path = %path.display(),
            version = %catalog.version,
            categories = catalog.categories.len(),
            "loaded artifact catalog"
        );
        Ok(catalog)
    }

    fn from_document(document: CatalogDocument) -> Result<Self, CatalogError> {
        let categories = document
            .categories
            .into_iter()
            .map(|c| Category::from_parts(c.id, c.name, c.description, c.artifacts))
            .collect::<Result<Vec<_>, _>>()?;
        Self::assemble(document.version, categories)
    }

    fn assemble(version: String, categories: Vec<Category>) -> Result<Self, CatalogError> {
        let mut map = IndexMap::with_capacity(categories.len());
        let mut seen_artifacts: HashSet<ArtifactId> = HashSet::new();

        for category in categories {
            for artifact in category.artifacts() {
                if !seen_artifacts.insert(artifact.id().clone()) {
                    return Err(CatalogError::DuplicateId {
                        kind: "artifact",
                        id: artifact.id().to_string(),
                    });
                }
            }
            let id = category.id();
            if map.insert(id, category).is_some() {
                return Err(CatalogError::DuplicateId {
                    kind: "category",
                    id: id.to_string(),
                });
            }
        }

        Ok(Self {
            version,
            categories: map,
        })
    }

    /// Catalog version string
    #[inline]
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Categories in declaration order
    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.values()
    }

    /// Number of categories
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// True if the catalog declares no categories
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Lookup a category
    ///
    /// # Errors
    /// Returns [`CatalogError::InvalidCategory`] if this catalog does not declare it
    pub fn category(&self, id: CategoryId) -> Result<&Category, CatalogError> {
        self.categories
            .get(&id)
            .ok_or_else(|| CatalogError::InvalidCategory(id.to_string()))
    }

    /// Lookup an artifact within a category
    ///
    /// # Errors
    /// Returns [`CatalogError::InvalidCategory`] or [`CatalogError::InvalidArtifact`]
    pub fn artifact(&self, category: CategoryId, artifact: &ArtifactId) -> Result<&Artifact, CatalogError> {
        self.category(category)?
            .artifact(artifact)
            .ok_or_else(|| CatalogError::InvalidArtifact {
                category: category.to_string(),
                artifact: artifact.to_string(),
            })
    }

    /// Every artifact of a category, ignoring stage
    ///
    /// # Errors
    /// Returns [`CatalogError::InvalidCategory`] if the category is not declared
    pub fn artifacts_for_category(&self, category: CategoryId) -> Result<Vec<&Artifact>, CatalogError> {
        Ok(self.category(category)?.artifacts().collect())
    }

    /// Resolve an artifact id to its owning category
    #[must_use]
    pub fn find_artifact(&self, artifact: &ArtifactId) -> Option<(CategoryId, &Artifact)> {
        self.categories
            .values()
            .find_map(|c| c.artifact(artifact).map(|a| (c.id(), a)))
    }
}

/// Builder for programmatic catalogs
#[derive(Debug, Clone)]
pub struct CatalogBuilder {
    version: String,
    categories: Vec<Category>,
}

impl CatalogBuilder {
    /// Append a category
    #[must_use]
    pub fn category(mut self, category: Category) -> Self {
        self.categories.push(category);
        self
    }

    /// Validate and freeze
    ///
    /// # Errors
    /// Returns error on duplicate identifiers or invalid artifact records
    pub fn build(self) -> Result<ArtifactCatalog, CatalogError> {
        let categories = self
            .categories
            .into_iter()
            .map(Category::validated)
            .collect::<Result<Vec<_>, _>>()?;
        ArtifactCatalog::assemble(self.version, categories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{ArtifactKind, Priority};
    use crate::stage::GrowthStage;
    use pretty_assertions::assert_eq;

    const SMALL: &str = r#"
version = "test-1"

[[categories]]
id = "0_Overview"
name = "Overview"

[[categories.artifacts]]
id = "pitch_deck"
name = "Pitch Deck"
allowed_formats = ["pdf"]
max_size_bytes = 26214400
mandatory = true
applicable_stages = ["Seed", "Series A"]
priority = "critical"

[[categories.artifacts]]
id = "one_pager"
name = "One Pager"
allowed_formats = [".PDF", ".docx"]
max_size_bytes = 5242880
applicable_stages = ["pre-seed"]
priority = "someday"
"#;

    #[test]
    fn parses_toml_document() {
        let catalog = ArtifactCatalog::from_toml_str(SMALL).unwrap();
        assert_eq!(catalog.version(), "test-1");
        let overview = catalog.category(CategoryId::Overview).unwrap();
        let ids: Vec<&str> = overview.artifacts().map(|a| a.id().as_str()).collect();
        assert_eq!(ids, vec!["pitch_deck", "one_pager"]);

        let one_pager = catalog.artifact(CategoryId::Overview, &"one_pager".into()).unwrap();
        assert_eq!(one_pager.priority(), Priority::Low);
        assert_eq!(one_pager.kind(), ArtifactKind::File);
        assert_eq!(one_pager.allowed_formats(), &[".pdf".to_string(), ".docx".to_string()]);
        assert!(one_pager.applies_to(GrowthStage::PreSeed));
    }

    #[test]
    fn unknown_category_key_fails_to_parse() {
        let doc = SMALL.replace("0_Overview", "0_Intro");
        let err = ArtifactCatalog::from_toml_str(&doc).unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }

    #[test]
    fn duplicate_artifact_across_categories_is_rejected() {
        let pitch = Artifact::new("pitch_deck", "Pitch Deck")
            .with_formats(["pdf"])
            .with_max_size_mb(25)
            .with_stages([GrowthStage::Seed]);
        let err = ArtifactCatalog::builder("dup")
            .category(Category::new(CategoryId::Overview, "Overview").with_artifact(pitch.clone()))
            .category(Category::new(CategoryId::Financials, "Financials").with_artifact(pitch))
            .build()
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateId { kind: "artifact", .. }));
    }

    #[test]
    fn duplicate_artifact_within_a_category_is_rejected() {
        let pitch = Artifact::new("pitch_deck", "Pitch Deck")
            .with_formats(["pdf"])
            .with_max_size_mb(25)
            .with_stages([GrowthStage::Seed]);
        let err = ArtifactCatalog::builder("dup")
            .category(
                Category::new(CategoryId::Overview, "Overview")
                    .with_artifact(pitch.clone())
                    .with_artifact(pitch.with_max_size_mb(5)),
            )
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::DuplicateId { kind: "artifact", ref id } if id == "pitch_deck"
        ));
    }

    #[test]
    fn load_picks_format_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join("catalog.toml");
        std::fs::write(&toml_path, SMALL).unwrap();
        assert_eq!(ArtifactCatalog::load(&toml_path).unwrap().version(), "test-1");

        let json_path = dir.path().join("catalog.JSON");
        std::fs::write(
            &json_path,
            r#"{"version": "test-2", "categories": [{"id": "5_Team", "name": "Team"}]}"#,
        )
        .unwrap();
        let catalog = ArtifactCatalog::load(&json_path).unwrap();
        assert_eq!(catalog.version(), "test-2");
        assert!(catalog.category(CategoryId::Team).unwrap().is_empty());

        // TOML text behind a .json name goes to the JSON parser
        let mislabelled = dir.path().join("catalog.json");
        std::fs::write(&mislabelled, SMALL).unwrap();
        assert!(matches!(
            ArtifactCatalog::load(&mislabelled),
            Err(CatalogError::Parse(_))
        ));

        assert!(matches!(
            ArtifactCatalog::load(dir.path().join("absent.toml")),
            Err(CatalogError::Io { .. })
        ));
    }

    #[test]
    fn lookups_signal_missing_keys() {
        let catalog = ArtifactCatalog::from_toml_str(SMALL).unwrap();
        assert!(matches!(
            catalog.category(CategoryId::Team),
            Err(CatalogError::InvalidCategory(_))
        ));
        let err = catalog.artifact(CategoryId::Overview, &"cap_table".into()).unwrap_err();
        assert!(err.is_lookup());
        assert!(err.to_string().starts_with("Invalid artifact type"));
    }

    #[test]
    fn find_artifact_reports_owner() {
        let catalog = ArtifactCatalog::from_toml_str(SMALL).unwrap();
        let (category, artifact) = catalog.find_artifact(&"one_pager".into()).unwrap();
        assert_eq!(category, CategoryId::Overview);
        assert_eq!(artifact.name(), "One Pager");
        assert!(catalog.find_artifact(&"nope".into()).is_none());
    }

    #[test]
    fn standard_catalog_is_valid() {
        let catalog = ArtifactCatalog::standard().unwrap();
        assert!(!catalog.is_empty());
        let pitch = catalog.artifact(CategoryId::Overview, &"pitch_deck".into()).unwrap();
        assert!(pitch.is_mandatory());
        // Same instance on every call
        assert!(std::ptr::eq(catalog, ArtifactCatalog::standard().unwrap()));
    }

    #[test]
    fn json_document_matches_toml() {
        let json = r#"{
            "version": "test-1",
            "categories": [{
                "id": "0_Overview",
                "name": "Overview",
                "artifacts": [{
                    "id": "pitch_deck",
                    "name": "Pitch Deck",
                    "allowed_formats": ["pdf"],
                    "max_size_bytes": 26214400,
                    "applicable_stages": ["Seed"]
                }]
            }]
        }"#;
        let catalog = ArtifactCatalog::from_json_str(json).unwrap();
        assert_eq!(catalog.artifacts_for_category(CategoryId::Overview).unwrap().len(), 1);
    }
}
