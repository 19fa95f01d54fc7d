use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryApplicationRepository};
use crate::routes::with_dashboard_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use loan_tracker::config::AppConfig;
use loan_tracker::error::AppError;
use loan_tracker::telemetry;
use loan_tracker::workflows::loan::{ApplicationImporter, LoanDashboardService};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryApplicationRepository::default());
    let dashboard_service = Arc::new(LoanDashboardService::new(repository, &config.dashboard));

    if let Some(path) = args.applications_csv.take() {
        let applications = ApplicationImporter::from_path(&path)?;
        let seeded = applications.len();
        for application in applications {
            dashboard_service.register(application)?;
        }
        info!(path = %path.display(), seeded, "application roster loaded");
    }

    let app = with_dashboard_routes(dashboard_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "loan tracker ready");

    axum::serve(listener, app).await?;
    Ok(())
}
