use loan_tracker::workflows::loan::{
    build_timeline, ApplicationImportError, ApplicationImporter, LoanStage,
};
use std::io::Cursor;

const ROSTER: &str = "id,name,loan_type,amount,submitted_date,current_stage
APP-12345,Home Loan Refinance,Conventional 30-year fixed,320000,2023-10-12,application
APP-20001,Riverside Duplex,Commercial bridge,850000,2023-11-02,underwriting
";

#[test]
fn imported_roster_feeds_the_timeline() {
    let applications =
        ApplicationImporter::from_reader(Cursor::new(ROSTER)).expect("roster parses");
    assert_eq!(applications.len(), 2);

    let duplex = &applications[1];
    assert_eq!(duplex.current_stage, LoanStage::Underwriting);
    let timeline = build_timeline(duplex).expect("timeline builds");
    assert_eq!(timeline.iter().filter(|event| event.is_complete).count(), 3);
}

#[test]
fn missing_roster_file_is_an_io_error() {
    match ApplicationImporter::from_path("does/not/exist.csv") {
        Err(ApplicationImportError::Io(_)) => {}
        other => panic!("expected io error, got {other:?}"),
    }
}

#[test]
fn roster_with_missing_columns_is_a_csv_error() {
    let csv = "id,name\nAPP-1,Refi\n";
    assert!(matches!(
        ApplicationImporter::from_reader(Cursor::new(csv)),
        Err(ApplicationImportError::Csv(_))
    ));
}
