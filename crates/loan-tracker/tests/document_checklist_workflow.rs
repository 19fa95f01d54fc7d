use loan_tracker::workflows::loan::{
    evaluate, ChecklistError, DashboardSession, DocumentChecklist, DocumentStatus, Task,
    TaskBoard, UploadThresholdRule,
};
use std::time::Duration;

#[test]
fn checklist_tracks_uploads_in_display_order() {
    let checklist = DocumentChecklist::initialize([
        "Income Verification",
        "Identification",
        "Additional Documentation",
    ]);

    let checklist = checklist
        .mark_uploaded("additional-documentation")
        .expect("known document");
    let statuses: Vec<DocumentStatus> = checklist
        .documents()
        .iter()
        .map(|document| document.status)
        .collect();
    assert_eq!(
        statuses,
        vec![
            DocumentStatus::Pending,
            DocumentStatus::Pending,
            DocumentStatus::Uploaded
        ]
    );
    assert_eq!(checklist.completion_count(), (1, 3));

    assert_eq!(
        checklist.mark_uploaded("appraisal"),
        Err(ChecklistError::UnknownDocument("appraisal".to_string()))
    );
}

#[test]
fn custom_threshold_controls_task_completion() {
    let session = DashboardSession::new(
        DocumentChecklist::initialize(["Identification"]),
        TaskBoard::standard(),
        UploadThresholdRule::new("upload-documents", 2),
        Duration::from_millis(250),
    );

    let (session, receipt) = session
        .upload_document("identification", "passport.png")
        .expect("known document");
    assert!(receipt.completion.is_none());

    let (session, receipt) = session.upload_supplemental("passport-back.png");
    let notice = receipt.completion.expect("second upload meets threshold");
    assert_eq!(notice.surface_after_ms, 250);
    assert_eq!(notice.task.count, Some(0));
    assert!(session.task("upload-documents").expect("present").completed);
}

#[test]
fn evaluate_is_a_pure_copy() {
    let task = Task::new("upload-documents", "Upload Documents").with_count(3);
    let completed = evaluate(&task, 5, 3);
    assert!(!task.completed, "input task untouched");
    assert!(completed.completed);
    assert_eq!(evaluate(&completed, 0, 3), completed);
}

#[test]
fn standard_board_matches_dashboard_defaults() {
    let board = TaskBoard::standard();
    let ids: Vec<&str> = board.tasks().iter().map(|task| task.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["upload-documents", "verify-information", "sign-agreements"]
    );
    assert_eq!(board.tasks()[0].count, Some(3));
    assert!(board.tasks()[1].completed);
    assert!(!board.tasks()[2].completed);
}
