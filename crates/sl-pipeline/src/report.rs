//! Outbound reports for the read and write paths

use crate::executor::ExecutionOutcome;
use crate::verifier::VerificationReport;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sl_db::Row;
use sl_sql::DroppedStatement;
use std::collections::BTreeMap;
use std::fmt;

/// How a pipeline run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Statements survived sanitization and were attempted
    Completed,
    /// Nothing survived sanitization; nothing was attempted
    NoActionableStatements,
    /// The run aborted before execution (write path file reports only)
    Failed,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Completed => write!(f, "completed"),
            Outcome::NoActionableStatements => write!(f, "no actionable statements"),
            Outcome::Failed => write!(f, "failed"),
        }
    }
}

/// Rows returned by one read statement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementRows {
    pub statement: String,
    pub rows: Vec<Row>,
    pub rowcount: usize,
}

/// A read statement the store rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementError {
    pub statement: String,
    pub error: String,
}

/// Read path result, consumed by the answer composer
#[derive(Debug, Clone, Serialize)]
pub struct ReadReport {
    /// At least one statement executed without error; others may have failed
    pub success: bool,
    /// Normalized model output
    pub generated_sql: String,
    pub results: Vec<StatementRows>,
    pub errors: Vec<StatementError>,
    pub run_id: String,
    pub dropped: Vec<DroppedStatement>,
    pub outcome: Outcome,
}

impl ReadReport {
    pub fn total_rows(&self) -> usize {
        self.results.iter().map(|r| r.rowcount).sum()
    }
}

/// Row counts of one table around a write batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableDelta {
    pub before: i64,
    pub after: i64,
    pub inserted: i64,
}

impl TableDelta {
    pub fn new(before: i64, after: i64) -> Self {
        Self {
            before,
            after,
            inserted: after - before,
        }
    }
}

/// A statement that reported success without a matching count change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationWarning {
    pub table: String,
    pub statement: String,
    pub message: String,
}

/// Write path result
#[derive(Debug, Clone, Serialize)]
pub struct WriteReport {
    /// Any table's row count increased
    pub success: bool,
    pub statements_executed: usize,
    pub execution_results: Vec<ExecutionOutcome>,
    pub verification: BTreeMap<String, TableDelta>,
    pub total_rows_inserted: i64,
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub file: Option<String>,
    pub dropped: Vec<DroppedStatement>,
    pub warnings: Vec<VerificationWarning>,
    pub outcome: Outcome,
    /// Why the run aborted, when `outcome` is `failed`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WriteReport {
    /// Empty report for a run that has not executed anything yet
    pub fn started(file: Option<String>) -> Self {
        Self {
            success: false,
            statements_executed: 0,
            execution_results: Vec::new(),
            verification: BTreeMap::new(),
            total_rows_inserted: 0,
            run_id: uuid::Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            file,
            dropped: Vec::new(),
            warnings: Vec::new(),
            outcome: Outcome::NoActionableStatements,
            error: None,
        }
    }

    /// Report for a run that aborted before execution
    pub fn failed(file: Option<String>, error: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Failed,
            error: Some(error.into()),
            ..Self::started(file)
        }
    }

    /// Fill in execution results and the verification outcome
    pub fn complete(&mut self, outcomes: Vec<ExecutionOutcome>, verification: VerificationReport) {
        self.statements_executed = outcomes.len();
        self.execution_results = outcomes;
        self.success = verification.any_inserted();
        self.total_rows_inserted = verification.total_inserted();
        self.verification = verification.tables;
        self.warnings = verification.warnings;
        self.outcome = Outcome::Completed;
    }

    pub fn failed_statements(&self) -> usize {
        self.execution_results.iter().filter(|o| !o.success).count()
    }
}

#[cfg(test)]
#[path = "report_test.rs"]
mod tests;
