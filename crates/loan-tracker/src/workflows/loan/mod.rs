//! Loan application progress tracking and the document checklist that gates
//! the dashboard's upload task.

pub mod checklist;
pub mod domain;
pub mod import;
pub mod progress;
pub mod repository;
pub mod router;
pub mod service;
pub mod session;
pub mod stage;
pub mod tasks;

#[cfg(test)]
mod tests;

pub use checklist::{
    ChecklistError, DocumentChecklist, DocumentStatus, RequiredDocument, UploadedDocumentLog,
};
pub use domain::{ApplicationId, LoanApplication};
pub use import::{ApplicationImportError, ApplicationImporter};
pub use progress::{
    build_timeline, compute_progress_percent, project_date, DateStatus, ProgressError,
    StageProgressTable, TimelineEvent, TimelineMilestone,
};
pub use repository::{ApplicationRepository, ApplicationSummaryView, RepositoryError};
pub use router::dashboard_router;
pub use service::{
    ChecklistProgressView, ChecklistView, DashboardServiceError, LoanDashboardService,
};
pub use session::{DashboardSession, TaskCompletionNotice, UploadReceipt};
pub use stage::{compare_stages, stage_index, stage_index_of, InvalidStageError, LoanStage};
pub use tasks::{evaluate, Task, TaskBoard, TaskError, UploadThresholdRule};
