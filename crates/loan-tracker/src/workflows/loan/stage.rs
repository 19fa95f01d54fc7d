use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Lifecycle stage of a loan application, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoanStage {
    Application,
    PreFlight,
    Loi,
    Underwriting,
}

impl LoanStage {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Application,
            Self::PreFlight,
            Self::Loi,
            Self::Underwriting,
        ]
    }

    pub const fn index(self) -> usize {
        match self {
            Self::Application => 0,
            Self::PreFlight => 1,
            Self::Loi => 2,
            Self::Underwriting => 3,
        }
    }

    pub const fn identifier(self) -> &'static str {
        match self {
            Self::Application => "application",
            Self::PreFlight => "pre-flight",
            Self::Loi => "loi",
            Self::Underwriting => "underwriting",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Application => "Application",
            Self::PreFlight => "Pre-Flight",
            Self::Loi => "LOI",
            Self::Underwriting => "Underwriting",
        }
    }

    /// Stage that follows this one, or `None` for the last stage.
    pub fn next(self) -> Option<Self> {
        Self::ordered().get(self.index() + 1).copied()
    }

    /// True when `self` sits strictly before `reference`.
    pub const fn is_completed(self, reference: Self) -> bool {
        self.index() < reference.index()
    }

    pub const fn is_active(self, reference: Self) -> bool {
        self.index() == reference.index()
    }
}

impl Ord for LoanStage {
    fn cmp(&self, other: &Self) -> Ordering {
        self.index().cmp(&other.index())
    }
}

impl PartialOrd for LoanStage {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for LoanStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

impl FromStr for LoanStage {
    type Err = InvalidStageError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        Self::ordered()
            .into_iter()
            .find(|stage| stage.identifier() == trimmed)
            .ok_or_else(|| InvalidStageError {
                value: raw.to_string(),
            })
    }
}

/// Raised when a raw stage identifier falls outside the canonical set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not a loan stage (expected application, pre-flight, loi or underwriting)")]
pub struct InvalidStageError {
    pub value: String,
}

pub fn stage_index(stage: LoanStage) -> usize {
    stage.index()
}

/// Index lookup for identifiers arriving from untyped boundaries.
pub fn stage_index_of(raw: &str) -> Result<usize, InvalidStageError> {
    raw.parse::<LoanStage>().map(LoanStage::index)
}

pub fn compare_stages(a: LoanStage, b: LoanStage) -> Ordering {
    a.cmp(&b)
}
