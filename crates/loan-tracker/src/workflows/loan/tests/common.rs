use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::config::DashboardConfig;
use crate::workflows::loan::domain::{ApplicationId, LoanApplication};
use crate::workflows::loan::progress::StageProgressTable;
use crate::workflows::loan::repository::{ApplicationRepository, RepositoryError};
use crate::workflows::loan::stage::LoanStage;
use crate::workflows::loan::{dashboard_router, LoanDashboardService};

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn application(id: &str, stage: LoanStage) -> LoanApplication {
    LoanApplication {
        id: ApplicationId::new(id),
        name: "Home Loan Refinance".to_string(),
        loan_type: "Conventional 30-year fixed".to_string(),
        amount: 320_000,
        submitted_date: date(2023, 11, 2),
        current_stage: stage,
    }
}

pub(super) fn dashboard_config() -> DashboardConfig {
    DashboardConfig {
        stage_progress: StageProgressTable::default(),
        required_documents: vec![
            "Income Verification".to_string(),
            "Identification".to_string(),
            "Additional Documentation".to_string(),
        ],
        upload_threshold: 3,
        completion_notice_delay: Duration::from_millis(1000),
    }
}

pub(super) fn build_service() -> (LoanDashboardService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = LoanDashboardService::new(repository.clone(), &dashboard_config());
    (service, repository)
}

pub(super) fn seeded_service(
    stage: LoanStage,
) -> (LoanDashboardService<MemoryRepository>, ApplicationId) {
    let (service, _) = build_service();
    let stored = service
        .register(application("APP-12345", stage))
        .expect("register succeeds");
    (service, stored.id)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    records: Arc<Mutex<BTreeMap<ApplicationId, LoanApplication>>>,
}

impl ApplicationRepository for MemoryRepository {
    fn insert(&self, application: LoanApplication) -> Result<LoanApplication, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&application.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn update(&self, application: LoanApplication) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(application.id.clone(), application);
        Ok(())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<LoanApplication>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<LoanApplication>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

/// Holds every read open long enough for concurrent callers to overlap.
#[derive(Default, Clone)]
pub(super) struct SlowReadRepository {
    inner: MemoryRepository,
}

impl ApplicationRepository for SlowReadRepository {
    fn insert(&self, application: LoanApplication) -> Result<LoanApplication, RepositoryError> {
        self.inner.insert(application)
    }

    fn update(&self, application: LoanApplication) -> Result<(), RepositoryError> {
        self.inner.update(application)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<LoanApplication>, RepositoryError> {
        let found = self.inner.fetch(id);
        std::thread::sleep(Duration::from_millis(50));
        found
    }

    fn list(&self) -> Result<Vec<LoanApplication>, RepositoryError> {
        self.inner.list()
    }
}

pub(super) struct UnavailableRepository;

impl ApplicationRepository for UnavailableRepository {
    fn insert(&self, _application: LoanApplication) -> Result<LoanApplication, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _application: LoanApplication) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<LoanApplication>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<LoanApplication>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(service: LoanDashboardService<MemoryRepository>) -> axum::Router {
    dashboard_router(Arc::new(service))
}
