use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::DashboardConfig;

use super::checklist::{ChecklistError, DocumentChecklist, RequiredDocument};
use super::domain::{ApplicationId, LoanApplication};
use super::progress::{
    build_timeline, compute_progress_percent, ProgressError, StageProgressTable, TimelineEvent,
};
use super::repository::{ApplicationRepository, ApplicationSummaryView, RepositoryError};
use super::session::{DashboardSession, UploadReceipt};
use super::stage::{InvalidStageError, LoanStage};
use super::tasks::{Task, TaskBoard, TaskError, UploadThresholdRule, UPLOAD_DOCUMENTS_TASK};

/// Service composing the application repository, the configured progress
/// table, and the document/task session.
pub struct LoanDashboardService<R> {
    repository: Arc<R>,
    progress: StageProgressTable,
    session: Mutex<DashboardSession>,
    // serializes read-check-write of application stages
    stage_guard: Mutex<()>,
}

/// Checklist entries with their uploaded/total counts taken from one snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct ChecklistView {
    pub documents: Vec<RequiredDocument>,
    pub uploaded: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChecklistProgressView {
    pub uploaded: usize,
    pub total: usize,
    pub ratio: f64,
}

impl<R> LoanDashboardService<R>
where
    R: ApplicationRepository + 'static,
{
    pub fn new(repository: Arc<R>, config: &DashboardConfig) -> Self {
        let session = DashboardSession::new(
            DocumentChecklist::initialize(config.required_documents.iter().cloned()),
            TaskBoard::standard(),
            UploadThresholdRule::new(UPLOAD_DOCUMENTS_TASK, config.upload_threshold),
            config.completion_notice_delay,
        );
        Self::with_session(repository, config.stage_progress.clone(), session)
    }

    pub fn with_session(
        repository: Arc<R>,
        progress: StageProgressTable,
        session: DashboardSession,
    ) -> Self {
        Self {
            repository,
            progress,
            session: Mutex::new(session),
            stage_guard: Mutex::new(()),
        }
    }

    pub fn register(
        &self,
        application: LoanApplication,
    ) -> Result<LoanApplication, DashboardServiceError> {
        let stored = self.repository.insert(application)?;
        debug!(
            application_id = %stored.id,
            stage = %stored.current_stage,
            "application registered"
        );
        Ok(stored)
    }

    pub fn application(
        &self,
        application_id: &ApplicationId,
    ) -> Result<LoanApplication, DashboardServiceError> {
        let application = self
            .repository
            .fetch(application_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(application)
    }

    pub fn applications(&self) -> Result<Vec<LoanApplication>, DashboardServiceError> {
        Ok(self.repository.list()?)
    }

    pub fn get_timeline(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Vec<TimelineEvent>, DashboardServiceError> {
        let application = self.application(application_id)?;
        Ok(build_timeline(&application)?)
    }

    pub fn get_progress_percent(
        &self,
        application_id: &ApplicationId,
    ) -> Result<u8, DashboardServiceError> {
        let application = self.application(application_id)?;
        Ok(compute_progress_percent(
            application.current_stage,
            &self.progress,
        )?)
    }

    pub fn summary(
        &self,
        application_id: &ApplicationId,
    ) -> Result<ApplicationSummaryView, DashboardServiceError> {
        let application = self.application(application_id)?;
        let progress_percent =
            compute_progress_percent(application.current_stage, &self.progress)?;
        let timeline = build_timeline(&application)?;

        Ok(ApplicationSummaryView {
            stage_label: application.current_stage.label(),
            current_stage: application.current_stage,
            progress_percent,
            timeline,
            application_id: application.id,
            name: application.name,
            loan_type: application.loan_type,
            amount: application.amount,
        })
    }

    /// Moves an application forward. Staying put or moving back is rejected.
    pub fn advance_stage(
        &self,
        application_id: &ApplicationId,
        target: LoanStage,
    ) -> Result<LoanApplication, DashboardServiceError> {
        let _guard = self.stage_guard.lock().unwrap_or_else(PoisonError::into_inner);
        let mut application = self.application(application_id)?;
        let from = application.current_stage;

        if target <= from {
            warn!(%application_id, %from, to = %target, "rejected stage regression");
            return Err(DashboardServiceError::StageRegression {
                application_id: application_id.clone(),
                from,
                to: target,
            });
        }

        application.current_stage = target;
        self.repository.update(application.clone())?;
        info!(%application_id, %from, to = %target, "application advanced");
        Ok(application)
    }

    pub fn select_application(
        &self,
        application_id: &ApplicationId,
    ) -> Result<LoanApplication, DashboardServiceError> {
        let application = self.application(application_id)?;
        let mut session = self.lock_session();
        *session = session.select_application(application.id.clone());
        Ok(application)
    }

    pub fn selected_application(&self) -> Result<Option<LoanApplication>, DashboardServiceError> {
        let selected = self.lock_session().selected().cloned();
        match selected {
            Some(id) => Ok(self.repository.fetch(&id)?),
            None => Ok(None),
        }
    }

    pub fn get_checklist(&self) -> Vec<RequiredDocument> {
        self.lock_session().checklist().documents().to_vec()
    }

    pub fn checklist_view(&self) -> ChecklistView {
        let session = self.lock_session();
        let (uploaded, total) = session.checklist().completion_count();
        ChecklistView {
            documents: session.checklist().documents().to_vec(),
            uploaded,
            total,
        }
    }

    pub fn checklist_progress(&self) -> Result<ChecklistProgressView, DashboardServiceError> {
        let session = self.lock_session();
        let (uploaded, total) = session.checklist().completion_count();
        let ratio = session.checklist().completion_ratio()?;
        Ok(ChecklistProgressView {
            uploaded,
            total,
            ratio,
        })
    }

    pub fn uploaded_files(&self) -> Vec<String> {
        self.lock_session().log().files().to_vec()
    }

    pub fn upload_document(
        &self,
        document_id: &str,
        file_name: &str,
    ) -> Result<UploadReceipt, DashboardServiceError> {
        let mut session = self.lock_session();
        let (next, receipt) = session
            .upload_document(document_id, file_name)
            .map_err(|err| {
                warn!(document_id, file_name, "upload rejected: {err}");
                err
            })?;
        *session = next;
        debug!(
            document_id,
            file_name,
            uploads = receipt.uploaded_files.len(),
            "document uploaded"
        );
        log_completion(&receipt);
        Ok(receipt)
    }

    pub fn record_supplemental_upload(&self, file_name: &str) -> UploadReceipt {
        let mut session = self.lock_session();
        let (next, receipt) = session.upload_supplemental(file_name);
        *session = next;
        debug!(
            file_name,
            uploads = receipt.uploaded_files.len(),
            "supplemental document uploaded"
        );
        log_completion(&receipt);
        receipt
    }

    pub fn get_task_state(&self, task_id: &str) -> Result<Task, DashboardServiceError> {
        Ok(self.lock_session().task(task_id)?.clone())
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.lock_session().tasks().tasks().to_vec()
    }

    pub fn complete_task(&self, task_id: &str) -> Result<Task, DashboardServiceError> {
        let mut session = self.lock_session();
        let next = session.complete_task(task_id)?;
        let task = next.task(task_id)?.clone();
        *session = next;
        info!(task_id, "task completed");
        Ok(task)
    }

    pub fn session(&self) -> DashboardSession {
        self.lock_session().clone()
    }

    fn lock_session(&self) -> MutexGuard<'_, DashboardSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn log_completion(receipt: &UploadReceipt) {
    if let Some(notice) = &receipt.completion {
        info!(
            task_id = %notice.task.id,
            surface_after_ms = notice.surface_after_ms,
            "upload threshold reached"
        );
    }
}

/// Error raised by the dashboard service.
#[derive(Debug, thiserror::Error)]
pub enum DashboardServiceError {
    #[error(transparent)]
    InvalidStage(#[from] InvalidStageError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Checklist(#[from] ChecklistError),
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("application {application_id} cannot move from {from} to {to}; stages only advance")]
    StageRegression {
        application_id: ApplicationId,
        from: LoanStage,
        to: LoanStage,
    },
}
