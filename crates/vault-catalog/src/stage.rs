//! Growth stages
//!
//! Stage gates artifact visibility. Callers that hold an unrecognised stage
//! string get `None` from [`GrowthStage::lookup`] and must treat it as
//! "no narrowing".

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Coarse maturity bucket of a venture
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum GrowthStage {
    /// Pre-Seed
    PreSeed,
    /// Seed
    Seed,
    /// Series A
    SeriesA,
    /// Series B
    SeriesB,
}

impl GrowthStage {
    /// All stages, earliest first
    pub const ALL: [GrowthStage; 4] = [
        GrowthStage::PreSeed,
        GrowthStage::Seed,
        GrowthStage::SeriesA,
        GrowthStage::SeriesB,
    ];

    /// Human-readable label
    #[inline]
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            GrowthStage::PreSeed => "Pre-Seed",
            GrowthStage::Seed => "Seed",
            GrowthStage::SeriesA => "Series A",
            GrowthStage::SeriesB => "Series B",
        }
    }

    /// Lenient lookup: ignores case, spaces, `-` and `_`
    ///
    /// Returns `None` for anything unrecognised, including the empty string.
    #[must_use]
    pub fn lookup(raw: &str) -> Option<Self> {
        let folded: String = raw
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let stage = match folded.as_str() {
            "preseed" => Some(GrowthStage::PreSeed),
            "seed" => Some(GrowthStage::Seed),
            "seriesa" => Some(GrowthStage::SeriesA),
            "seriesb" => Some(GrowthStage::SeriesB),
            _ => None,
        };
        if stage.is_none() && !raw.is_empty() {
            tracing::debug!(stage = raw, "unrecognised growth stage, no stage narrowing applied");
        }
        stage
    }
}

impl Display for GrowthStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Strict parse failure for catalog data
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown growth stage: {0}")]
pub struct UnknownStage(pub String);

impl FromStr for GrowthStage {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s).ok_or_else(|| UnknownStage(s.to_string()))
    }
}

impl TryFrom<String> for GrowthStage {
    type Error = UnknownStage;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<GrowthStage> for String {
    fn from(value: GrowthStage) -> Self {
        value.label().to_string()
    }
}
