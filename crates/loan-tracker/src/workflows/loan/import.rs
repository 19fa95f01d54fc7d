use chrono::NaiveDate;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

use super::domain::{ApplicationId, LoanApplication};
use super::stage::{InvalidStageError, LoanStage};

#[derive(Debug, thiserror::Error)]
pub enum ApplicationImportError {
    #[error("failed to read application roster: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid application roster CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: {source}")]
    Stage {
        row: usize,
        #[source]
        source: InvalidStageError,
    },
    #[error("row {row}: submitted_date '{value}' is not YYYY-MM-DD")]
    SubmittedDate { row: usize, value: String },
}

/// Loads loan applications from a CSV roster with the columns
/// `id,name,loan_type,amount,submitted_date,current_stage`.
pub struct ApplicationImporter;

impl ApplicationImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<Vec<LoanApplication>, ApplicationImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<LoanApplication>, ApplicationImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut applications = Vec::new();

        // header is line 1
        for (offset, record) in csv_reader.deserialize::<RosterRow>().enumerate() {
            let row = offset + 2;
            applications.push(record?.into_application(row)?);
        }

        Ok(applications)
    }
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    id: String,
    name: String,
    loan_type: String,
    amount: u64,
    submitted_date: String,
    current_stage: String,
}

impl RosterRow {
    fn into_application(self, row: usize) -> Result<LoanApplication, ApplicationImportError> {
        let submitted_date = NaiveDate::parse_from_str(&self.submitted_date, "%Y-%m-%d")
            .map_err(|_| ApplicationImportError::SubmittedDate {
                row,
                value: self.submitted_date.clone(),
            })?;
        let current_stage = self
            .current_stage
            .parse::<LoanStage>()
            .map_err(|source| ApplicationImportError::Stage { row, source })?;

        Ok(LoanApplication {
            id: ApplicationId(self.id),
            name: self.name,
            loan_type: self.loan_type,
            amount: self.amount,
            submitted_date,
            current_stage,
        })
    }
}
