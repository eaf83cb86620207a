//! Category and artifact identifiers
//!
//! Category keys form a closed set: anything outside it is rejected at the
//! parsing boundary instead of silently resolving to nothing. Artifact ids
//! are open strings, unique across the whole catalog.

use crate::error::CatalogError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Closed set of vault categories
///
/// The string form (`0_Overview`, `1_Problem_Proof`, ...) is the stable key
/// used by catalog documents and by remote storage folder names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CategoryId {
    /// Company overview: pitch deck, one-pager
    Overview,
    /// Evidence that the problem exists
    ProblemProof,
    /// Evidence that the solution works
    SolutionProof,
    /// Market sizing and competition
    MarketProof,
    /// Customers, revenue and usage
    TractionProof,
    /// Founders and hires
    Team,
    /// Statements, models and projections
    Financials,
    /// Incorporation, cap table and contracts
    LegalAndCapTable,
}

impl CategoryId {
    /// Every category, in vault display order
    pub const ALL: [CategoryId; 8] = [
        CategoryId::Overview,
        CategoryId::ProblemProof,
        CategoryId::SolutionProof,
        CategoryId::MarketProof,
        CategoryId::TractionProof,
        CategoryId::Team,
        CategoryId::Financials,
        CategoryId::LegalAndCapTable,
    ];

    /// Stable string key
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            CategoryId::Overview => "0_Overview",
            CategoryId::ProblemProof => "1_Problem_Proof",
            CategoryId::SolutionProof => "2_Solution_Proof",
            CategoryId::MarketProof => "3_Market_Proof",
            CategoryId::TractionProof => "4_Traction_Proof",
            CategoryId::Team => "5_Team",
            CategoryId::Financials => "6_Financials",
            CategoryId::LegalAndCapTable => "7_Legal_And_Cap_Table",
        }
    }
}

impl Display for CategoryId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryId {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| CatalogError::InvalidCategory(s.to_string()))
    }
}

impl TryFrom<String> for CategoryId {
    type Error = CatalogError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CategoryId> for String {
    fn from(value: CategoryId) -> Self {
        value.as_str().to_string()
    }
}

/// Artifact identifier (e.g. `pitch_deck`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactId(String);

impl ArtifactId {
    /// Wrap an identifier string
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier as a string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ArtifactId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ArtifactId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ArtifactId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for ArtifactId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
