//! DuckDB database backend implementation (embedded store)

use crate::dialect::{EmbeddedDialect, StoreDialect};
use crate::error::{DbError, DbResult};
use crate::traits::{Database, Row};
use async_trait::async_trait;
use duckdb::types::{TimeUnit, Value as DuckValue};
use duckdb::{params, Connection};
use regex::Regex;
use serde_json::Value as JsonValue;
use sl_core::{ColumnInfo, ForeignKey, TableName};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, OnceLock};

/// DuckDB database backend
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
    path: String,
}

static FK_TEXT_RE: OnceLock<Regex> = OnceLock::new();

/// Matches DuckDB's constraint text, e.g.
/// `FOREIGN KEY (department_id) REFERENCES departments(id)`
fn fk_text_regex() -> &'static Regex {
    FK_TEXT_RE.get_or_init(|| {
        Regex::new(r#"(?i)FOREIGN KEY\s*\(([^)]+)\)\s*REFERENCES\s+("?[\w.]+"?)\s*\(([^)]+)\)"#)
            .expect("valid regex")
    })
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: ":memory:".to_string(),
        })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{}: {}", path.display(), e)))?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: path.display().to_string(),
        })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    /// Execute several `;`-separated statements at once (setup and tests)
    pub fn execute_batch(&self, sql: &str) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(sql)?;
        Ok(())
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    fn query_strings(&self, sql: &str, param: &str) -> DbResult<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| DbError::IntrospectionError(e.to_string()))?;
        let values = stmt
            .query_map(params![param], |row| row.get::<_, String>(0))
            .map_err(|e| DbError::IntrospectionError(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DbError::IntrospectionError(e.to_string()))?;
        Ok(values)
    }

    fn existing_tables_sync(&self) -> DbResult<Vec<TableName>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT table_name FROM information_schema.tables \
                 WHERE table_schema = 'main' AND table_type = 'BASE TABLE' \
                 AND table_catalog = current_database() \
                 ORDER BY table_name",
            )
            .map_err(|e| DbError::IntrospectionError(e.to_string()))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| DbError::IntrospectionError(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DbError::IntrospectionError(e.to_string()))?;
        Ok(names.into_iter().filter_map(TableName::try_new).collect())
    }

    fn table_columns_sync(&self, table: &str) -> DbResult<Vec<ColumnInfo>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT column_name, data_type FROM information_schema.columns \
                 WHERE table_schema = 'main' AND table_catalog = current_database() \
                 AND lower(table_name) = lower(?) \
                 ORDER BY ordinal_position",
            )
            .map_err(|e| DbError::IntrospectionError(e.to_string()))?;
        let columns = stmt
            .query_map(params![table], |row| {
                Ok(ColumnInfo::new(
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                ))
            })
            .map_err(|e| DbError::IntrospectionError(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DbError::IntrospectionError(e.to_string()))?;
        Ok(columns)
    }

    fn foreign_keys_sync(&self, table: &str) -> DbResult<Vec<ForeignKey>> {
        let texts = self.query_strings(
            "SELECT constraint_text FROM duckdb_constraints() \
             WHERE schema_name = 'main' AND lower(table_name) = lower(?) \
             AND constraint_type = 'FOREIGN KEY'",
            table,
        )?;
        Ok(texts
            .iter()
            .flat_map(|text| parse_foreign_key_text(text))
            .collect())
    }

    fn has_unique_key_sync(&self, table: &str) -> DbResult<bool> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM duckdb_constraints() \
                 WHERE schema_name = 'main' AND lower(table_name) = lower(?) \
                 AND constraint_type IN ('PRIMARY KEY', 'UNIQUE')",
                params![table],
                |row| row.get(0),
            )
            .map_err(|e| DbError::IntrospectionError(e.to_string()))?;
        Ok(count > 0)
    }

    fn row_count_sync(&self, table: &str) -> DbResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", EmbeddedDialect.quote_ident(table));
        let conn = self.lock()?;
        let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count)
    }

    fn run_statement_sync(&self, sql: &str) -> DbResult<Option<u64>> {
        ensure_single_statement(sql)?;
        let conn = self.lock()?;
        let affected = conn.execute(sql, [])?;
        Ok(Some(affected as u64))
    }

    fn query_rows_sync(&self, sql: &str) -> DbResult<Vec<Row>> {
        ensure_single_statement(sql)?;
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;

        // Column metadata is only valid once the statement has executed, so
        // rows are collected first.
        let raw_rows: Vec<Vec<JsonValue>> = stmt
            .query_map([], |row| {
                let col_count = row.as_ref().column_count();
                (0..col_count)
                    .map(|i| row.get::<_, DuckValue>(i).map(duck_to_json))
                    .collect::<Result<Vec<JsonValue>, _>>()
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let column_names: Vec<String> = (0..stmt.column_count())
            .map(|i| stmt.column_name(i).map_or("?".to_string(), |v| v.to_string()))
            .collect();

        Ok(raw_rows
            .into_iter()
            .map(|values| column_names.iter().cloned().zip(values).collect())
            .collect())
    }
}

/// Refuse text holding anything but exactly one statement.
///
/// The driver's `prepare` runs every statement before the last one, so the
/// count has to happen before the text reaches the connection.
fn ensure_single_statement(sql: &str) -> DbResult<()> {
    let count = sl_sql::count_statements(&sl_sql::DuckDbDialect::new(), sql)
        .map_err(|e| DbError::Rejected(e.to_string()))?;
    if count != 1 {
        return Err(DbError::Rejected(format!(
            "expected one statement, found {}",
            count
        )));
    }
    Ok(())
}

/// Parse DuckDB constraint text into foreign keys (one per column pair)
pub(crate) fn parse_foreign_key_text(text: &str) -> Vec<ForeignKey> {
    let Some(caps) = fk_text_regex().captures(text) else {
        return Vec::new();
    };
    let unquote = |s: &str| s.trim().trim_matches('"').to_string();
    let columns: Vec<String> = caps[1].split(',').map(unquote).collect();
    let parent = unquote(&caps[2]);
    let parent_columns: Vec<String> = caps[3].split(',').map(unquote).collect();

    columns
        .into_iter()
        .zip(parent_columns)
        .map(|(column, references_column)| ForeignKey {
            column,
            references_table: parent.clone(),
            references_column,
        })
        .collect()
}

/// Convert a DuckDB value into JSON, keeping numbers numeric
fn duck_to_json(value: DuckValue) -> JsonValue {
    match value {
        DuckValue::Null => JsonValue::Null,
        DuckValue::Boolean(b) => JsonValue::Bool(b),
        DuckValue::TinyInt(n) => n.into(),
        DuckValue::SmallInt(n) => n.into(),
        DuckValue::Int(n) => n.into(),
        DuckValue::BigInt(n) => n.into(),
        DuckValue::UTinyInt(n) => n.into(),
        DuckValue::USmallInt(n) => n.into(),
        DuckValue::UInt(n) => n.into(),
        DuckValue::UBigInt(n) => n.into(),
        DuckValue::HugeInt(n) => i64::try_from(n)
            .map(JsonValue::from)
            .unwrap_or_else(|_| JsonValue::String(n.to_string())),
        DuckValue::Float(f) => serde_json::Number::from_f64(f64::from(f))
            .map_or(JsonValue::Null, JsonValue::Number),
        DuckValue::Double(f) => {
            serde_json::Number::from_f64(f).map_or(JsonValue::Null, JsonValue::Number)
        }
        DuckValue::Decimal(d) => JsonValue::String(d.to_string()),
        DuckValue::Text(s) | DuckValue::Enum(s) => JsonValue::String(s),
        DuckValue::Date32(days) => chrono::NaiveDate::from_ymd_opt(1970, 1, 1)
            .and_then(|epoch| epoch.checked_add_signed(chrono::Duration::days(i64::from(days))))
            .map_or(JsonValue::Null, |d| JsonValue::String(d.to_string())),
        DuckValue::Timestamp(unit, v) => {
            let micros = match unit {
                TimeUnit::Second => v.saturating_mul(1_000_000),
                TimeUnit::Millisecond => v.saturating_mul(1_000),
                TimeUnit::Microsecond => v,
                TimeUnit::Nanosecond => v / 1_000,
            };
            chrono::DateTime::from_timestamp_micros(micros)
                .map_or(JsonValue::Null, |ts| {
                    JsonValue::String(ts.naive_utc().to_string())
                })
        }
        other => JsonValue::String(format!("{:?}", other)),
    }
}

#[async_trait]
impl Database for DuckDbBackend {
    async fn ping(&self) -> DbResult<()> {
        let conn = self.lock()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i32>(0))
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(())
    }

    async fn existing_tables(&self) -> DbResult<Vec<TableName>> {
        self.existing_tables_sync()
    }

    async fn table_columns(&self, table: &str) -> DbResult<Vec<ColumnInfo>> {
        self.table_columns_sync(table)
    }

    async fn foreign_keys(&self, table: &str) -> DbResult<Vec<ForeignKey>> {
        self.foreign_keys_sync(table)
    }

    async fn has_unique_key(&self, table: &str) -> DbResult<bool> {
        self.has_unique_key_sync(table)
    }

    async fn row_count(&self, table: &str) -> DbResult<i64> {
        self.row_count_sync(table)
    }

    async fn run_statement(&self, sql: &str) -> DbResult<Option<u64>> {
        self.run_statement_sync(sql)
    }

    async fn query_rows(&self, sql: &str) -> DbResult<Vec<Row>> {
        self.query_rows_sync(sql)
    }

    fn dialect(&self) -> &dyn StoreDialect {
        &EmbeddedDialect
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }

    fn describe_target(&self) -> String {
        format!("duckdb://{}", self.path)
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
