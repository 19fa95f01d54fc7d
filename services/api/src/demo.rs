use crate::infra::{parse_date, parse_stage, InMemoryApplicationRepository};
use chrono::NaiveDate;
use clap::Args;
use loan_tracker::config::{AppConfig, DashboardConfig};
use loan_tracker::error::AppError;
use loan_tracker::workflows::loan::{
    build_timeline, compute_progress_percent, ApplicationId, ApplicationImporter,
    ApplicationRepository, DashboardServiceError, LoanApplication, LoanDashboardService,
    LoanStage, StageProgressTable, TaskCompletionNotice,
};
use std::path::PathBuf;
use std::sync::Arc;

const SAMPLE_APPLICATION_ID: &str = "APP-12345";

#[derive(Args, Debug)]
pub(crate) struct TimelineArgs {
    /// Submission date (YYYY-MM-DD) of a single application
    #[arg(
        long,
        value_parser = parse_date,
        required_unless_present = "applications_csv"
    )]
    pub(crate) submitted: Option<NaiveDate>,
    /// Current stage: application, pre-flight, loi or underwriting
    #[arg(long, value_parser = parse_stage, default_value = "application")]
    pub(crate) stage: LoanStage,
    /// Application roster CSV; prints one timeline per row
    #[arg(long, conflicts_with = "submitted")]
    pub(crate) applications_csv: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Submission date of the sample application
    #[arg(long, value_parser = parse_date, default_value = "2023-10-12")]
    pub(crate) submitted: NaiveDate,
    /// Stop after printing the timeline
    #[arg(long)]
    pub(crate) skip_uploads: bool,
}

pub(crate) fn run_timeline(args: TimelineArgs) -> Result<(), AppError> {
    let TimelineArgs {
        submitted,
        stage,
        applications_csv,
    } = args;

    let config = AppConfig::load()?;
    let applications = match (applications_csv, submitted) {
        (Some(path), _) => ApplicationImporter::from_path(path)?,
        (None, Some(submitted)) => vec![LoanApplication {
            id: ApplicationId::new("CLI-1"),
            name: "Command line application".to_string(),
            loan_type: "Unspecified".to_string(),
            amount: 0,
            submitted_date: submitted,
            current_stage: stage,
        }],
        (None, None) => Vec::new(),
    };

    for application in &applications {
        render_timeline(application, &config.dashboard.stage_progress)?;
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = demo_service(&config.dashboard, args.submitted)?;
    let application = service.application(&ApplicationId::new(SAMPLE_APPLICATION_ID))?;

    println!("Loan dashboard demo");
    println!(
        "- {} | {} | ${}",
        application.name, application.loan_type, application.amount
    );
    render_timeline(&application, &config.dashboard.stage_progress)?;

    if args.skip_uploads {
        return Ok(());
    }

    println!("\nRequired documents");
    match walk_uploads(&service)? {
        Some(notice) => println!(
            "\n{} (task '{}' completed; shown after {} ms)",
            notice.message, notice.task.title, notice.surface_after_ms
        ),
        None => println!("\nUpload task still open"),
    }

    let progress = service.checklist_progress()?;
    println!(
        "Checklist: {}/{} documents uploaded ({:.0}%)",
        progress.uploaded,
        progress.total,
        progress.ratio * 100.0
    );
    for task in service.tasks() {
        let state = if task.completed { "done" } else { "open" };
        println!("  - [{state}] {}", task.title);
    }

    Ok(())
}

fn demo_service(
    config: &DashboardConfig,
    submitted: NaiveDate,
) -> Result<LoanDashboardService<InMemoryApplicationRepository>, AppError> {
    let repository = Arc::new(InMemoryApplicationRepository::default());
    let service = LoanDashboardService::new(repository, config);
    let application = service.register(LoanApplication {
        id: ApplicationId::new(SAMPLE_APPLICATION_ID),
        name: "Home Loan Refinance".to_string(),
        loan_type: "Conventional 30-year fixed".to_string(),
        amount: 320_000,
        submitted_date: submitted,
        current_stage: LoanStage::Application,
    })?;
    service.select_application(&application.id)?;
    Ok(service)
}

/// Uploads one file per checklist entry and returns the notice raised by the
/// upload that met the task threshold, if any.
fn walk_uploads<R>(
    service: &LoanDashboardService<R>,
) -> Result<Option<TaskCompletionNotice>, AppError>
where
    R: ApplicationRepository + 'static,
{
    let mut notice = None;
    for document in service.get_checklist() {
        let file_name = format!("{}.pdf", document.id);
        let receipt = service.upload_document(&document.id, &file_name)?;
        println!("  - {} <- {}", document.name, file_name);
        if receipt.completion.is_some() {
            notice = receipt.completion;
        }
    }
    Ok(notice)
}

fn render_timeline(
    application: &LoanApplication,
    table: &StageProgressTable,
) -> Result<(), AppError> {
    let timeline = build_timeline(application).map_err(DashboardServiceError::from)?;
    let percent = compute_progress_percent(application.current_stage, table)
        .map_err(DashboardServiceError::from)?;

    println!(
        "\n{} [{}] {}% complete",
        application.id,
        application.current_stage.label(),
        percent
    );
    for event in timeline {
        let marker = if event.is_active {
            ">"
        } else if event.is_complete {
            "x"
        } else {
            " "
        };
        println!(
            "  [{marker}] {:<24} {} ({})",
            event.label,
            event.date.format("%b %-d, %Y"),
            event.date_status.label()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submitted() -> NaiveDate {
        parse_date("2023-10-12").expect("valid date")
    }

    #[test]
    fn demo_service_selects_the_sample_application() {
        let service =
            demo_service(&DashboardConfig::default(), submitted()).expect("service builds");
        let selected = service
            .selected_application()
            .expect("repository available")
            .expect("application selected");
        assert_eq!(selected.id, ApplicationId::new(SAMPLE_APPLICATION_ID));
        assert_eq!(service.get_progress_percent(&selected.id).expect("percent"), 25);
    }

    #[test]
    fn walking_the_checklist_completes_the_upload_task() {
        let service =
            demo_service(&DashboardConfig::default(), submitted()).expect("service builds");
        let notice = walk_uploads(&service)
            .expect("uploads succeed")
            .expect("third upload completes task");

        assert_eq!(notice.task.id, "upload-documents");
        assert_eq!(notice.surface_after_ms, 1000);
        assert_eq!(service.uploaded_files().len(), 3);
        assert!(service
            .get_task_state("upload-documents")
            .expect("task exists")
            .completed);
    }

    #[test]
    fn sample_timeline_renders() {
        let service =
            demo_service(&DashboardConfig::default(), submitted()).expect("service builds");
        let application = service
            .application(&ApplicationId::new(SAMPLE_APPLICATION_ID))
            .expect("registered");
        assert!(render_timeline(&application, &StageProgressTable::default()).is_ok());
    }
}
