use crate::infra::AppState;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Extension;
use axum::Json;
use loan_tracker::error::AppError;
use loan_tracker::workflows::loan::{
    dashboard_router, ApplicationRepository, ApplicationSummaryView, LoanDashboardService,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub(crate) struct ApplicationListResponse {
    pub(crate) applications: Vec<ApplicationSummaryView>,
}

pub(crate) fn with_dashboard_routes<R>(service: Arc<LoanDashboardService<R>>) -> axum::Router
where
    R: ApplicationRepository + 'static,
{
    dashboard_router(service.clone())
        .route(
            "/api/v1/loan/applications",
            get(applications_endpoint::<R>).with_state(service),
        )
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Dashboard cards for every tracked application.
pub(crate) async fn applications_endpoint<R>(
    State(service): State<Arc<LoanDashboardService<R>>>,
) -> Result<Json<ApplicationListResponse>, AppError>
where
    R: ApplicationRepository + 'static,
{
    let applications = service
        .applications()?
        .iter()
        .map(|application| service.summary(&application.id))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(ApplicationListResponse { applications }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{parse_date, InMemoryApplicationRepository};
    use loan_tracker::config::DashboardConfig;
    use loan_tracker::workflows::loan::{ApplicationId, LoanApplication, LoanStage};

    fn service() -> Arc<LoanDashboardService<InMemoryApplicationRepository>> {
        let repository = Arc::new(InMemoryApplicationRepository::default());
        Arc::new(LoanDashboardService::new(
            repository,
            &DashboardConfig::default(),
        ))
    }

    fn application(id: &str, stage: LoanStage) -> LoanApplication {
        LoanApplication {
            id: ApplicationId::new(id),
            name: "Home Loan Refinance".to_string(),
            loan_type: "Conventional 30-year fixed".to_string(),
            amount: 320_000,
            submitted_date: parse_date("2023-10-12").expect("valid date"),
            current_stage: stage,
        }
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn applications_endpoint_lists_summaries() {
        let service = service();
        service
            .register(application("APP-12345", LoanStage::Application))
            .expect("register");
        service
            .register(application("APP-20001", LoanStage::Underwriting))
            .expect("register");

        let Json(body) = applications_endpoint(State(service))
            .await
            .expect("listing builds");

        assert_eq!(body.applications.len(), 2);
        assert_eq!(body.applications[0].progress_percent, 25);
        assert_eq!(body.applications[1].stage_label, "Underwriting");
        assert_eq!(body.applications[1].timeline.len(), 5);
    }

    #[tokio::test]
    async fn applications_endpoint_is_empty_without_registrations() {
        let Json(body) = applications_endpoint(State(service()))
            .await
            .expect("listing builds");
        assert!(body.applications.is_empty());
    }
}
