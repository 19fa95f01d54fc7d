use chrono::NaiveDate;
use loan_tracker::workflows::loan::{
    ApplicationId, ApplicationRepository, LoanApplication, LoanStage, RepositoryError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Applications keyed by id; listing order follows the id.
#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationRepository {
    records: Arc<Mutex<BTreeMap<ApplicationId, LoanApplication>>>,
}

impl InMemoryApplicationRepository {
    fn records(
        &self,
    ) -> Result<MutexGuard<'_, BTreeMap<ApplicationId, LoanApplication>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn insert(&self, application: LoanApplication) -> Result<LoanApplication, RepositoryError> {
        let mut guard = self.records()?;
        if guard.contains_key(&application.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn update(&self, application: LoanApplication) -> Result<(), RepositoryError> {
        let mut guard = self.records()?;
        if guard.contains_key(&application.id) {
            guard.insert(application.id.clone(), application);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<LoanApplication>, RepositoryError> {
        Ok(self.records()?.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<LoanApplication>, RepositoryError> {
        Ok(self.records()?.values().cloned().collect())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_stage(raw: &str) -> Result<LoanStage, String> {
    raw.parse::<LoanStage>().map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn application(id: &str) -> LoanApplication {
        LoanApplication {
            id: ApplicationId::new(id),
            name: "Home Loan Refinance".to_string(),
            loan_type: "Conventional 30-year fixed".to_string(),
            amount: 320_000,
            submitted_date: parse_date("2023-10-12").expect("valid date"),
            current_stage: LoanStage::Application,
        }
    }

    #[test]
    fn repository_rejects_duplicates_and_unknown_updates() {
        let repository = InMemoryApplicationRepository::default();
        repository.insert(application("APP-2")).expect("insert");
        repository.insert(application("APP-1")).expect("insert");

        assert!(matches!(
            repository.insert(application("APP-1")),
            Err(RepositoryError::Conflict)
        ));
        assert!(matches!(
            repository.update(application("APP-9")),
            Err(RepositoryError::NotFound)
        ));

        let ids: Vec<String> = repository
            .list()
            .expect("list")
            .into_iter()
            .map(|application| application.id.0)
            .collect();
        assert_eq!(ids, vec!["APP-1", "APP-2"]);
    }

    #[test]
    fn cli_parsers_report_bad_input() {
        assert!(parse_date("10/12/2023").is_err());
        assert_eq!(parse_stage(" loi "), Ok(LoanStage::Loi));
        assert!(parse_stage("closing").expect_err("unknown").contains("closing"));
    }
}
