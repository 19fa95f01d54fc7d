use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::checklist::ChecklistError;
use super::domain::ApplicationId;
use super::progress::ProgressError;
use super::repository::{ApplicationRepository, RepositoryError};
use super::service::{DashboardServiceError, LoanDashboardService};
use super::stage::LoanStage;
use super::tasks::TaskError;

#[derive(Debug, Deserialize)]
pub struct StageAdvanceRequest {
    pub stage: String,
}

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub file_name: String,
}

/// Router builder exposing the dashboard's progress, checklist and task endpoints.
pub fn dashboard_router<R>(service: Arc<LoanDashboardService<R>>) -> Router
where
    R: ApplicationRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/loan/applications/:application_id",
            get(summary_handler::<R>),
        )
        .route(
            "/api/v1/loan/applications/:application_id/timeline",
            get(timeline_handler::<R>),
        )
        .route(
            "/api/v1/loan/applications/:application_id/progress",
            get(progress_handler::<R>),
        )
        .route(
            "/api/v1/loan/applications/:application_id/stage",
            post(advance_stage_handler::<R>),
        )
        .route("/api/v1/loan/checklist", get(checklist_handler::<R>))
        .route(
            "/api/v1/loan/checklist/:document_id/uploads",
            post(upload_handler::<R>),
        )
        .route("/api/v1/loan/uploads", post(supplemental_upload_handler::<R>))
        .route("/api/v1/loan/tasks", get(tasks_handler::<R>))
        .route("/api/v1/loan/tasks/:task_id", get(task_handler::<R>))
        .with_state(service)
}

pub(crate) async fn summary_handler<R>(
    State(service): State<Arc<LoanDashboardService<R>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    match service.summary(&ApplicationId(application_id)) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn timeline_handler<R>(
    State(service): State<Arc<LoanDashboardService<R>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    let id = ApplicationId(application_id);
    match service.get_timeline(&id) {
        Ok(timeline) => (
            StatusCode::OK,
            Json(json!({ "application_id": id, "timeline": timeline })),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn progress_handler<R>(
    State(service): State<Arc<LoanDashboardService<R>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    let id = ApplicationId(application_id);
    match service.get_progress_percent(&id) {
        Ok(percent) => (
            StatusCode::OK,
            Json(json!({ "application_id": id, "progress_percent": percent })),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn advance_stage_handler<R>(
    State(service): State<Arc<LoanDashboardService<R>>>,
    Path(application_id): Path<String>,
    Json(request): Json<StageAdvanceRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    let target = match request.stage.parse::<LoanStage>() {
        Ok(stage) => stage,
        Err(err) => return error_response(err.into()),
    };

    match service.advance_stage(&ApplicationId(application_id), target) {
        Ok(application) => (StatusCode::OK, Json(application)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn checklist_handler<R>(
    State(service): State<Arc<LoanDashboardService<R>>>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    (StatusCode::OK, Json(service.checklist_view())).into_response()
}

pub(crate) async fn upload_handler<R>(
    State(service): State<Arc<LoanDashboardService<R>>>,
    Path(document_id): Path<String>,
    Json(request): Json<UploadRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    match service.upload_document(&document_id, &request.file_name) {
        Ok(receipt) => (StatusCode::ACCEPTED, Json(receipt)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn supplemental_upload_handler<R>(
    State(service): State<Arc<LoanDashboardService<R>>>,
    Json(request): Json<UploadRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    let receipt = service.record_supplemental_upload(&request.file_name);
    (StatusCode::ACCEPTED, Json(receipt)).into_response()
}

pub(crate) async fn tasks_handler<R>(
    State(service): State<Arc<LoanDashboardService<R>>>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    (StatusCode::OK, Json(service.tasks())).into_response()
}

pub(crate) async fn task_handler<R>(
    State(service): State<Arc<LoanDashboardService<R>>>,
    Path(task_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    match service.get_task_state(&task_id) {
        Ok(task) => (StatusCode::OK, Json(task)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) fn status_for(error: &DashboardServiceError) -> StatusCode {
    match error {
        DashboardServiceError::InvalidStage(_) | DashboardServiceError::StageRegression { .. } => {
            StatusCode::BAD_REQUEST
        }
        DashboardServiceError::Repository(RepositoryError::NotFound)
        | DashboardServiceError::Checklist(ChecklistError::UnknownDocument(_))
        | DashboardServiceError::Task(TaskError::UnknownTask(_)) => StatusCode::NOT_FOUND,
        DashboardServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        DashboardServiceError::Progress(ProgressError::UnmappedStage(_))
        | DashboardServiceError::Progress(ProgressError::PercentOutOfRange { .. })
        | DashboardServiceError::Progress(ProgressError::DateOutOfRange { .. })
        | DashboardServiceError::Checklist(ChecklistError::EmptyChecklist) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        DashboardServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub(crate) fn error_response(error: DashboardServiceError) -> Response {
    let status = status_for(&error);
    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}
