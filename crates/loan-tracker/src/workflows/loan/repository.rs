use serde::Serialize;

use super::domain::{ApplicationId, LoanApplication};
use super::progress::TimelineEvent;
use super::stage::LoanStage;

/// Storage abstraction so the service can be exercised without a backing store.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, application: LoanApplication) -> Result<LoanApplication, RepositoryError>;
    fn update(&self, application: LoanApplication) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<LoanApplication>, RepositoryError>;
    fn list(&self) -> Result<Vec<LoanApplication>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("application already exists")]
    Conflict,
    #[error("application not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Dashboard card for one application: stage, percentage and timeline.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationSummaryView {
    pub application_id: ApplicationId,
    pub name: String,
    pub loan_type: String,
    pub amount: u64,
    pub current_stage: LoanStage,
    pub stage_label: &'static str,
    pub progress_percent: u8,
    pub timeline: Vec<TimelineEvent>,
}
