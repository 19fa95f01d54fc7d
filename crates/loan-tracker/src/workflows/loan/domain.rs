use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::stage::LoanStage;

/// Identifier wrapper for tracked loan applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

impl ApplicationId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One loan application as the dashboard tracks it.
///
/// `amount`, `loan_type` and `name` are carried for display only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanApplication {
    pub id: ApplicationId,
    pub name: String,
    pub loan_type: String,
    pub amount: u64,
    pub submitted_date: NaiveDate,
    pub current_stage: LoanStage,
}
