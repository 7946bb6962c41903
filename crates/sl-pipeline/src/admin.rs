//! Store maintenance: health check and clearing

use crate::error::{PipelineError, PipelineResult};
use crate::executor::Executor;
use crate::registry::SchemaRegistry;
use crate::verifier::RowCountSnapshot;
use serde::Serialize;
use sl_core::{DependencyRanks, TableName};
use sl_db::{Database, Row};
use std::collections::BTreeMap;
use std::sync::Arc;

/// One table in a health check
#[derive(Debug, Clone, Serialize)]
pub struct TableCheck {
    pub table: String,
    pub rows: Option<i64>,
    pub sample: Vec<Row>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Connectivity and contents of the store
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub target: String,
    pub dialect: String,
    pub tables: Vec<TableCheck>,
}

/// Per-table failure while clearing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableError {
    pub table: String,
    pub error: String,
}

/// Result of clearing every table
#[derive(Debug, Clone, Serialize)]
pub struct ClearReport {
    /// Every table is empty and nothing failed
    pub success: bool,
    pub tables_cleared: Vec<String>,
    pub errors: Vec<TableError>,
    pub counts_before: BTreeMap<String, i64>,
    pub counts_after: BTreeMap<String, i64>,
    pub total_rows_deleted: i64,
}

/// Result of clearing one table or deleting rows from it
#[derive(Debug, Clone, Serialize)]
pub struct TableClearReport {
    pub success: bool,
    pub table: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ids: Vec<i64>,
    pub rows_before: i64,
    pub rows_after: i64,
    pub rows_deleted: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Maintenance operations against one store
pub struct Maintenance {
    db: Arc<dyn Database>,
    ranks: DependencyRanks,
}

impl Maintenance {
    pub fn new(db: Arc<dyn Database>, ranks: DependencyRanks) -> Self {
        Self { db, ranks }
    }

    /// Row counts and up to `sample_rows` rows per table
    pub async fn check(&self, sample_rows: usize) -> CheckReport {
        let tables = SchemaRegistry::new(self.db.as_ref()).tables().await;
        let executor = Executor::new(self.db.as_ref());
        let mut checks = Vec::with_capacity(tables.len());

        for table in tables {
            let mut check = TableCheck {
                table: table.to_string(),
                rows: None,
                sample: Vec::new(),
                error: None,
            };
            match self.db.row_count(&table).await {
                Ok(n) => check.rows = Some(n),
                Err(e) => check.error = Some(e.to_string()),
            }
            if sample_rows > 0 && check.rows.unwrap_or(0) > 0 {
                let sql = format!(
                    "SELECT * FROM {} LIMIT {}",
                    self.db.dialect().quote_ident(&table),
                    sample_rows
                );
                match executor.fetch(&sql).await {
                    Ok(rows) => check.sample = rows,
                    Err(e) => check.error = Some(e.to_string()),
                }
            }
            checks.push(check);
        }

        CheckReport {
            target: self.db.describe_target(),
            dialect: self.db.dialect().name().to_string(),
            tables: checks,
        }
    }

    /// Empty every table, children first
    pub async fn clear_all(&self) -> ClearReport {
        let tables = SchemaRegistry::new(self.db.as_ref()).tables().await;
        let order = self.ranks.children_first(&tables);

        let counts_before = self.counts(&order).await;
        let executor = Executor::new(self.db.as_ref());
        let mut tables_cleared = Vec::new();
        let mut errors = Vec::new();

        for table in &order {
            let outcome = executor.execute(&self.db.dialect().clear_table_sql(table)).await;
            if outcome.success {
                log::info!("Cleared {}", table);
                tables_cleared.push(table.to_string());
            } else {
                errors.push(TableError {
                    table: table.to_string(),
                    error: outcome.error.unwrap_or_default(),
                });
            }
        }

        let counts_after = self.counts(&order).await;
        let all_empty = counts_after.len() == order.len() && counts_after.values().all(|n| *n == 0);

        ClearReport {
            success: !order.is_empty() && all_empty && errors.is_empty(),
            tables_cleared,
            errors,
            total_rows_deleted: counts_before.values().sum::<i64>()
                - counts_after.values().sum::<i64>(),
            counts_before,
            counts_after,
        }
    }

    /// Empty one whitelisted table
    pub async fn clear_table(&self, table: &str) -> PipelineResult<TableClearReport> {
        let table = self.resolve(table).await?;
        let sql = self.db.dialect().clear_table_sql(&table);
        self.delete_with(&table, &sql, Vec::new()).await
    }

    /// Delete rows of one whitelisted table by integer id
    pub async fn delete_rows(&self, table: &str, ids: &[i64]) -> PipelineResult<TableClearReport> {
        if ids.is_empty() {
            return Err(PipelineError::InvalidInput("No IDs provided".to_string()));
        }
        let table = self.resolve(table).await?;
        let id_list = ids
            .iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "DELETE FROM {} WHERE id IN ({})",
            self.db.dialect().quote_ident(&table),
            id_list
        );
        self.delete_with(&table, &sql, ids.to_vec()).await
    }

    async fn resolve(&self, table: &str) -> PipelineResult<TableName> {
        SchemaRegistry::new(self.db.as_ref())
            .tables()
            .await
            .into_iter()
            .find(|t| t.matches(table))
            .ok_or_else(|| PipelineError::UnknownTable {
                table: table.to_string(),
            })
    }

    async fn delete_with(
        &self,
        table: &TableName,
        sql: &str,
        ids: Vec<i64>,
    ) -> PipelineResult<TableClearReport> {
        let rows_before = self.db.row_count(table).await?;
        let outcome = Executor::new(self.db.as_ref()).execute(sql).await;
        let rows_after = self.db.row_count(table).await?;

        Ok(TableClearReport {
            success: outcome.success,
            table: table.to_string(),
            ids,
            rows_before,
            rows_after,
            rows_deleted: rows_before - rows_after,
            error: outcome.error,
        })
    }

    async fn counts(&self, tables: &[TableName]) -> BTreeMap<String, i64> {
        RowCountSnapshot::capture(self.db.as_ref(), tables)
            .await
            .iter()
            .map(|(t, n)| (t.to_string(), n))
            .collect()
    }
}

#[cfg(test)]
#[path = "admin_test.rs"]
mod tests;
