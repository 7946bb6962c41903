use super::*;
use sl_db::DuckDbBackend;

fn store() -> DuckDbBackend {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE faqs (question VARCHAR PRIMARY KEY, answer VARCHAR)")
        .unwrap();
    db
}

#[tokio::test]
async fn test_execute_success() {
    let db = store();
    let outcome = Executor::new(&db)
        .execute("INSERT INTO faqs VALUES ('Hours?', '9-5')")
        .await;
    assert!(outcome.success);
    assert_eq!(outcome.error, None);
    assert_eq!(outcome.affected, Some(1));
}

#[tokio::test]
async fn test_failure_does_not_stop_batch() {
    let db = store();
    let outcomes = Executor::new(&db)
        .execute_all([
            "INSERT INTO faqs VALUES ('a', '1')",
            "INSERT INTO faqs (nope) VALUES ('b')",
            "INSERT INTO faqs VALUES ('c', '3')",
        ])
        .await;

    let flags: Vec<bool> = outcomes.iter().map(|o| o.success).collect();
    assert_eq!(flags, vec![true, false, true]);
    assert!(outcomes[1].error.is_some());
    assert_eq!(outcomes[1].statement, "INSERT INTO faqs (nope) VALUES ('b')");
    assert_eq!(db.row_count("faqs").await.unwrap(), 2);
}

#[tokio::test]
async fn test_fetch_rows() {
    let db = store();
    db.execute_batch("INSERT INTO faqs VALUES ('Hours?', '9-5')").unwrap();
    let rows = Executor::new(&db)
        .fetch("SELECT question, answer FROM faqs")
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["answer"], "9-5");
}

#[tokio::test]
async fn test_fetch_error() {
    let db = store();
    assert!(Executor::new(&db).fetch("SELECT * FROM missing").await.is_err());
}

#[test]
fn test_outcome_serializes_all_keys() {
    let json = serde_json::to_value(ExecutionOutcome::failed("INSERT", "boom")).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "boom");
    assert!(json["affected"].is_null());
}
