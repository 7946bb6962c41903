//! Database trait definition

use crate::dialect::StoreDialect;
use crate::error::DbResult;
use async_trait::async_trait;
use sl_core::{ColumnInfo, ForeignKey, TableName};

/// One result row, keyed by column name in select-list order
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Relational store abstraction used by every pipeline stage
///
/// Implementations must be Send + Sync for async operation. Each call to
/// [`run_statement`](Database::run_statement) is its own unit of work:
/// it commits or fails alone.
#[async_trait]
pub trait Database: Send + Sync {
    /// Cheap round trip proving the store is reachable
    async fn ping(&self) -> DbResult<()>;

    /// Base tables currently present, in name order
    async fn existing_tables(&self) -> DbResult<Vec<TableName>>;

    /// Columns of `table` in ordinal order
    async fn table_columns(&self, table: &str) -> DbResult<Vec<ColumnInfo>>;

    /// Foreign keys declared on `table`
    async fn foreign_keys(&self, table: &str) -> DbResult<Vec<ForeignKey>>;

    /// Whether `table` carries a PRIMARY KEY or UNIQUE constraint
    async fn has_unique_key(&self, table: &str) -> DbResult<bool>;

    /// Current number of rows in `table`
    async fn row_count(&self, table: &str) -> DbResult<i64>;

    /// Execute one statement; returns the driver-reported affected count when available
    async fn run_statement(&self, sql: &str) -> DbResult<Option<u64>>;

    /// Execute one query and return its rows
    async fn query_rows(&self, sql: &str) -> DbResult<Vec<Row>>;

    /// SQL forms specific to this store
    fn dialect(&self) -> &dyn StoreDialect;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;

    /// Human-readable target with credentials removed
    fn describe_target(&self) -> String;
}
