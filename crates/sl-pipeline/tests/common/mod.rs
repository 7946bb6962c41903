//! Shared fixtures for pipeline integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use sl_core::{ColumnInfo, ForeignKey, TableName};
use sl_db::{ConnectionManager, Database, DbResult, DuckDbBackend, Row, StoreDialect};
use sl_llm::{ScriptedModel, Synthesizer};
use sl_pipeline::{ReadPipeline, WritePipeline};
use std::sync::Arc;
use std::time::Duration;

/// University schema with natural keys so re-inserts conflict
pub const UNIVERSITY_DDL: &str = "
    CREATE TABLE departments (
        name VARCHAR PRIMARY KEY,
        office_location VARCHAR,
        contact_email VARCHAR,
        description VARCHAR
    );
    CREATE TABLE programs (
        name VARCHAR PRIMARY KEY,
        department_name VARCHAR REFERENCES departments(name),
        degree_level VARCHAR
    );
    CREATE TABLE courses (
        code VARCHAR PRIMARY KEY,
        title VARCHAR,
        program_name VARCHAR REFERENCES programs(name)
    );
    CREATE TABLE faqs (
        question VARCHAR PRIMARY KEY,
        answer VARCHAR
    );
";

pub fn university() -> Arc<DuckDbBackend> {
    let db = DuckDbBackend::in_memory().expect("in-memory store");
    db.execute_batch(UNIVERSITY_DDL).expect("schema");
    Arc::new(db)
}

pub fn synthesizer(model: &Arc<ScriptedModel>) -> Arc<Synthesizer> {
    Arc::new(Synthesizer::new(model.clone(), Duration::from_secs(5)).expect("prompts"))
}

pub fn write_pipeline(db: Arc<dyn Database>, model: &Arc<ScriptedModel>) -> WritePipeline {
    WritePipeline::new(
        Arc::new(ConnectionManager::with_database(db)),
        synthesizer(model),
    )
}

pub fn read_pipeline(db: Arc<dyn Database>, model: &Arc<ScriptedModel>) -> ReadPipeline {
    ReadPipeline::new(
        Arc::new(ConnectionManager::with_database(db)),
        synthesizer(model),
    )
}

/// Wraps a store and records every executed statement; can be told to
/// report zero affected rows regardless of what the driver says
pub struct RecordingStore {
    inner: Arc<DuckDbBackend>,
    report_zero_affected: bool,
    executed: std::sync::Mutex<Vec<String>>,
}

impl RecordingStore {
    pub fn new(inner: Arc<DuckDbBackend>) -> Self {
        Self {
            inner,
            report_zero_affected: false,
            executed: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn reporting_zero_affected(mut self) -> Self {
        self.report_zero_affected = true;
        self
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().expect("lock").clone()
    }
}

#[async_trait]
impl Database for RecordingStore {
    async fn ping(&self) -> DbResult<()> {
        self.inner.ping().await
    }
    async fn existing_tables(&self) -> DbResult<Vec<TableName>> {
        self.inner.existing_tables().await
    }
    async fn table_columns(&self, table: &str) -> DbResult<Vec<ColumnInfo>> {
        self.inner.table_columns(table).await
    }
    async fn foreign_keys(&self, table: &str) -> DbResult<Vec<ForeignKey>> {
        self.inner.foreign_keys(table).await
    }
    async fn has_unique_key(&self, table: &str) -> DbResult<bool> {
        self.inner.has_unique_key(table).await
    }
    async fn row_count(&self, table: &str) -> DbResult<i64> {
        self.inner.row_count(table).await
    }
    async fn run_statement(&self, sql: &str) -> DbResult<Option<u64>> {
        self.executed.lock().expect("lock").push(sql.to_string());
        let affected = self.inner.run_statement(sql).await?;
        Ok(if self.report_zero_affected {
            Some(0)
        } else {
            affected
        })
    }
    async fn query_rows(&self, sql: &str) -> DbResult<Vec<Row>> {
        self.executed.lock().expect("lock").push(sql.to_string());
        self.inner.query_rows(sql).await
    }
    fn dialect(&self) -> &dyn StoreDialect {
        self.inner.dialect()
    }
    fn db_type(&self) -> &'static str {
        "recording"
    }
    fn describe_target(&self) -> String {
        self.inner.describe_target()
    }
}
