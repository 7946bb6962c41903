mod common;

use common::{university, write_pipeline, RecordingStore};
use sl_db::Database;
use sl_llm::ScriptedModel;
use sl_pipeline::{Outcome, PipelineError};
use std::sync::Arc;

const CS_DEPARTMENT: &str = "INSERT INTO departments (name, office_location, contact_email) \
                             VALUES ('Computer Science', 'Building A', 'cs@uni.edu');";

#[tokio::test]
async fn test_department_from_text() {
    let db = university();
    let model = Arc::new(ScriptedModel::with_responses([CS_DEPARTMENT]));
    let pipeline = write_pipeline(db.clone(), &model);

    let report = pipeline
        .run("Computer Science dept in Building A, email cs@uni.edu", None)
        .await
        .unwrap();

    assert!(report.success);
    assert_eq!(report.statements_executed, 1);
    assert_eq!(report.verification["departments"].before, 0);
    assert_eq!(report.verification["departments"].inserted, 1);
    assert_eq!(report.total_rows_inserted, 1);
    assert_eq!(report.outcome, Outcome::Completed);
    assert_eq!(db.row_count("departments").await.unwrap(), 1);

    let prompt = &model.prompts()[0];
    assert!(prompt[0].content.contains("departments("));
    assert!(prompt[1].content.contains("Building A"));
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let db = university();
    let model = Arc::new(ScriptedModel::with_responses([CS_DEPARTMENT, CS_DEPARTMENT]));
    let pipeline = write_pipeline(db.clone(), &model);
    let text = "Computer Science dept in Building A, email cs@uni.edu";

    let first = pipeline.run(text, None).await.unwrap();
    assert_eq!(first.total_rows_inserted, 1);

    let second = pipeline.run(text, None).await.unwrap();
    assert!(!second.success);
    assert_eq!(second.total_rows_inserted, 0);
    assert!(second.execution_results[0].success);
    assert!(second.execution_results[0]
        .statement
        .starts_with("INSERT OR IGNORE INTO departments"));
    assert_eq!(second.warnings.len(), 1);
    assert_eq!(db.row_count("departments").await.unwrap(), 1);
}

#[tokio::test]
async fn test_parent_inserted_before_child() {
    let db = university();
    let model = Arc::new(ScriptedModel::with_responses([
        "INSERT INTO programs (name, department_name) VALUES ('BSc CS', 'Computer Science');
         INSERT INTO departments (name) VALUES ('Computer Science');",
    ]));
    let store = Arc::new(RecordingStore::new(db.clone()));
    let pipeline = write_pipeline(store.clone(), &model);

    let report = pipeline.run("CS offers a BSc", None).await.unwrap();

    let executed = store.executed();
    assert!(executed[0].contains("departments"));
    assert!(executed[1].contains("programs"));
    assert!(report.execution_results.iter().all(|o| o.success));
    assert_eq!(report.verification["departments"].inserted, 1);
    assert_eq!(report.verification["programs"].inserted, 1);
}

#[tokio::test]
async fn test_one_malformed_statement_does_not_block_others() {
    let db = university();
    let model = Arc::new(ScriptedModel::with_responses([
        "INSERT INTO departments (name) VALUES ('Physics');
         INSERT INTO faqs (question, no_such_column) VALUES ('Hours?', 'x');
         INSERT INTO faqs (question, answer) VALUES ('Parking?', 'Lot B');",
    ]));
    let pipeline = write_pipeline(db.clone(), &model);

    let report = pipeline.run("physics and faqs", None).await.unwrap();

    assert_eq!(report.statements_executed, 3);
    assert_eq!(report.failed_statements(), 1);
    let failed = report.execution_results.iter().find(|o| !o.success).unwrap();
    assert!(failed.statement.contains("no_such_column"));
    assert!(failed.error.is_some());
    assert_eq!(report.verification["departments"].inserted, 1);
    assert_eq!(report.verification["faqs"].inserted, 1);
    assert!(report.success);
}

#[tokio::test]
async fn test_counts_decide_not_driver() {
    let db = university();
    let model = Arc::new(ScriptedModel::with_responses([
        "INSERT INTO faqs (question, answer) VALUES ('Library hours?', '8-22')",
    ]));
    let store = Arc::new(RecordingStore::new(db.clone()).reporting_zero_affected());
    let pipeline = write_pipeline(store, &model);

    let report = pipeline.run("library hours 8 to 22", None).await.unwrap();

    assert_eq!(report.execution_results[0].affected, Some(0));
    assert_eq!(report.verification["faqs"].inserted, 1);
    assert!(report.success);
    assert!(report.warnings.is_empty());
}

#[tokio::test]
async fn test_destructive_and_unknown_statements_never_execute() {
    let db = university();
    let model = Arc::new(ScriptedModel::with_responses([
        "DROP TABLE departments;
         DELETE FROM faqs;
         UPDATE departments SET name = 'x';
         INSERT INTO users (name) VALUES ('eve');
         INSERT INTO faqs (question, answer) VALUES ('Wifi?', 'eduroam');",
    ]));
    let store = Arc::new(RecordingStore::new(db.clone()));
    let pipeline = write_pipeline(store.clone(), &model);

    let report = pipeline.run("wifi is eduroam", None).await.unwrap();

    let executed = store.executed();
    assert_eq!(executed.len(), 1);
    assert!(executed[0].contains("faqs"));
    assert_eq!(report.dropped.len(), 4);
    assert_eq!(db.existing_tables().await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_quoting_tricks_cannot_reach_other_tables() {
    let db = university();
    let model = Arc::new(ScriptedModel::with_responses([
        "INSERT INTO faqs (question) VALUES (E'\\''); DROP TABLE departments; --');
         INSERT INTO audit.departments (name) VALUES ('x');
         INSERT INTO faqs (question) VALUES ($$a; DROP TABLE courses; b$$);",
    ]));
    let store = Arc::new(RecordingStore::new(db.clone()));
    let pipeline = write_pipeline(store.clone(), &model);

    let report = pipeline.run("two faqs", None).await.unwrap();

    let executed = store.executed();
    assert_eq!(executed.len(), 2);
    assert!(executed.iter().all(|sql| sql.contains("INTO faqs")));
    assert!(executed.iter().all(|sql| !sql.contains("DROP TABLE departments")));
    assert_eq!(report.dropped.len(), 2);
    assert_eq!(db.existing_tables().await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_no_actionable_statements_is_soft_failure() {
    let db = university();
    let model = Arc::new(ScriptedModel::with_responses([
        "I could not find any structured data in this text.",
    ]));
    let store = Arc::new(RecordingStore::new(db.clone()));
    let pipeline = write_pipeline(store.clone(), &model);

    let report = pipeline.run("lorem ipsum", Some("notes.txt")).await.unwrap();

    assert!(!report.success);
    assert_eq!(report.outcome, Outcome::NoActionableStatements);
    assert_eq!(report.statements_executed, 0);
    assert!(report.verification.is_empty());
    assert_eq!(report.file.as_deref(), Some("notes.txt"));
    assert!(store.executed().is_empty());
}

#[tokio::test]
async fn test_synthesis_failure_executes_nothing() {
    let db = university();
    let model = Arc::new(ScriptedModel::new().then_fail("429 Too Many Requests"));
    let store = Arc::new(RecordingStore::new(db));
    let pipeline = write_pipeline(store.clone(), &model);

    let err = pipeline.run("anything", None).await.unwrap_err();

    assert!(matches!(err, PipelineError::Synthesis(_)));
    assert!(store.executed().is_empty());
}

#[tokio::test]
async fn test_derived_ranks_cover_unlisted_tables() {
    let db = university();
    db.execute_batch(
        "CREATE TABLE labs (name VARCHAR PRIMARY KEY);
         CREATE TABLE lab_bookings (id INTEGER PRIMARY KEY, lab_name VARCHAR REFERENCES labs(name));",
    )
    .unwrap();
    let model = Arc::new(ScriptedModel::with_responses([
        "INSERT INTO lab_bookings (id, lab_name) VALUES (1, 'Robotics');
         INSERT INTO labs (name) VALUES ('Robotics');",
    ]));
    let pipeline = write_pipeline(db.clone(), &model).with_derived_ranks(true);

    let report = pipeline.run("Robotics lab booked", None).await.unwrap();

    assert!(report.execution_results.iter().all(|o| o.success));
    assert_eq!(report.verification["lab_bookings"].inserted, 1);
}
