use super::*;
use crate::verifier::VerificationReport;

#[test]
fn test_write_report_keys() {
    let mut report = WriteReport::started(Some("cs.txt".to_string()));
    let mut verification = VerificationReport::default();
    verification
        .tables
        .insert("departments".to_string(), TableDelta::new(0, 1));
    report.complete(
        vec![ExecutionOutcome::succeeded("INSERT INTO departments VALUES ('CS')", None)],
        verification,
    );

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["statements_executed"], 1);
    assert_eq!(json["verification"]["departments"]["inserted"], 1);
    assert_eq!(json["total_rows_inserted"], 1);
    assert_eq!(json["file"], "cs.txt");
    assert_eq!(json["outcome"], "completed");
    assert!(json.get("error").is_none());
    assert!(json["run_id"].as_str().is_some_and(|id| id.len() == 36));
}

#[test]
fn test_started_report_is_soft_failure() {
    let report = WriteReport::started(None);
    assert!(!report.success);
    assert_eq!(report.outcome, Outcome::NoActionableStatements);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["outcome"], "no_actionable_statements");
    assert!(json["execution_results"].as_array().unwrap().is_empty());
}

#[test]
fn test_failed_report_carries_error() {
    let report = WriteReport::failed(Some("empty.txt".to_string()), "No text content extracted");
    assert_eq!(report.outcome, Outcome::Failed);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["error"], "No text content extracted");
    assert_eq!(json["success"], false);
}

#[test]
fn test_complete_counts_failures() {
    let mut report = WriteReport::started(None);
    report.complete(
        vec![
            ExecutionOutcome::succeeded("a", Some(1)),
            ExecutionOutcome::failed("b", "bad"),
        ],
        VerificationReport::default(),
    );
    assert_eq!(report.failed_statements(), 1);
    assert!(!report.success);
}

#[test]
fn test_table_delta() {
    let delta = TableDelta::new(3, 5);
    assert_eq!(delta.inserted, 2);
}

#[test]
fn test_outcome_display() {
    assert_eq!(Outcome::NoActionableStatements.to_string(), "no actionable statements");
}
