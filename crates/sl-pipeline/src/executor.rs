//! Statement executor
//!
//! Statements run strictly one at a time, each as its own unit of work. A
//! failure is recorded in the statement's outcome and the next statement
//! still runs.

use serde::Serialize;
use sl_db::{Database, DbResult, Row};

/// Result of attempting one statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionOutcome {
    pub statement: String,
    pub success: bool,
    pub error: Option<String>,
    /// Driver-reported affected rows; informational only
    pub affected: Option<u64>,
}

impl ExecutionOutcome {
    pub fn succeeded(statement: impl Into<String>, affected: Option<u64>) -> Self {
        Self {
            statement: statement.into(),
            success: true,
            error: None,
            affected,
        }
    }

    pub fn failed(statement: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            statement: statement.into(),
            success: false,
            error: Some(error.into()),
            affected: None,
        }
    }
}

/// Runs statements against one store handle
pub struct Executor<'a> {
    db: &'a dyn Database,
}

impl<'a> Executor<'a> {
    pub fn new(db: &'a dyn Database) -> Self {
        Self { db }
    }

    /// Run a single mutating statement
    pub async fn execute(&self, sql: &str) -> ExecutionOutcome {
        match self.db.run_statement(sql).await {
            Ok(affected) => {
                log::debug!("Executed ({:?} affected): {}", affected, sql);
                ExecutionOutcome::succeeded(sql, affected)
            }
            Err(e) => {
                log::warn!("Statement failed: {} ({})", sql, e);
                ExecutionOutcome::failed(sql, e.to_string())
            }
        }
    }

    /// Run every statement in order; one outcome per statement
    pub async fn execute_all<I, S>(&self, statements: I) -> Vec<ExecutionOutcome>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut outcomes = Vec::new();
        for sql in statements {
            outcomes.push(self.execute(sql.as_ref()).await);
        }
        outcomes
    }

    /// Run a query and return its rows unmodified
    pub async fn fetch(&self, sql: &str) -> DbResult<Vec<Row>> {
        let result = self.db.query_rows(sql).await;
        match &result {
            Ok(rows) => log::debug!("Query returned {} rows: {}", rows.len(), sql),
            Err(e) => log::warn!("Query failed: {} ({})", sql, e),
        }
        result
    }
}

#[cfg(test)]
#[path = "executor_test.rs"]
mod tests;
