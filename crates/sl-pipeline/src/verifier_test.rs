use super::*;
use sl_db::DuckDbBackend;

fn snapshot(pairs: &[(&str, i64)]) -> RowCountSnapshot {
    pairs.iter().map(|(t, n)| (*t, *n)).collect()
}

#[test]
fn test_deltas_from_counts() {
    let before = snapshot(&[("departments", 0), ("programs", 2)]);
    let after = snapshot(&[("departments", 1), ("programs", 2)]);
    let report = Verifier::compare(&before, &after, &[]);

    assert_eq!(report.tables["departments"], TableDelta::new(0, 1));
    assert_eq!(report.tables["programs"].inserted, 0);
    assert!(report.any_inserted());
    assert_eq!(report.total_inserted(), 1);
}

#[test]
fn test_counts_trump_affected() {
    let before = snapshot(&[("departments", 0)]);
    let after = snapshot(&[("departments", 1)]);
    let outcome = ExecutionOutcome::succeeded("INSERT INTO departments VALUES ('CS')", Some(0));
    let report = Verifier::compare(&before, &after, &[("departments", &outcome)]);

    assert_eq!(report.tables["departments"].inserted, 1);
    assert!(report.warnings.is_empty());
}

#[test]
fn test_success_without_growth_is_warning() {
    let before = snapshot(&[("departments", 1)]);
    let after = snapshot(&[("departments", 1)]);
    let outcome = ExecutionOutcome::succeeded("INSERT OR IGNORE INTO departments VALUES ('CS')", Some(0));
    let report = Verifier::compare(&before, &after, &[("departments", &outcome)]);

    assert!(!report.any_inserted());
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].table, "departments");
}

#[test]
fn test_failed_statement_is_not_a_mismatch() {
    let before = snapshot(&[("departments", 0)]);
    let after = snapshot(&[("departments", 0)]);
    let outcome = ExecutionOutcome::failed("INSERT INTO departments (x) VALUES (1)", "no column x");
    let report = Verifier::compare(&before, &after, &[("departments", &outcome)]);
    assert!(report.warnings.is_empty());
}

#[test]
fn test_negative_delta_not_counted_as_inserted() {
    let before = snapshot(&[("a", 5), ("b", 0)]);
    let after = snapshot(&[("a", 3), ("b", 2)]);
    let report = Verifier::compare(&before, &after, &[]);
    assert_eq!(report.tables["a"].inserted, -2);
    assert_eq!(report.total_inserted(), 2);
}

#[tokio::test]
async fn test_capture_skips_uncountable_tables() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE faqs (q VARCHAR); INSERT INTO faqs VALUES ('x')")
        .unwrap();
    let snap = RowCountSnapshot::capture(
        &db,
        &[TableName::new("faqs"), TableName::new("gone")],
    )
    .await;
    assert_eq!(snap.get("faqs"), Some(1));
    assert_eq!(snap.get("gone"), None);
    assert_eq!(snap.len(), 1);
}
