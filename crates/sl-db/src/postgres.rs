//! PostgreSQL database backend implementation (server store)

use crate::dialect::{ServerDialect, StoreDialect};
use crate::error::{DbError, DbResult};
use crate::target::redact_url;
use crate::tls::{make_connector, split_sslmode};
use crate::traits::{Database, Row};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sl_core::{ColumnInfo, ForeignKey, TableName};
use std::time::Duration;
use tokio_postgres::{Client, SimpleQueryMessage};

/// PostgreSQL database backend
pub struct PostgresBackend {
    client: Client,
    target: String,
}

impl PostgresBackend {
    /// Connect to `url`, giving up after `timeout`.
    ///
    /// TLS follows the `sslmode` parameter of `url` (default `prefer`). The
    /// connection task is spawned onto the current tokio runtime.
    pub async fn connect(url: &str, timeout: Duration) -> DbResult<Self> {
        let target = redact_url(url);
        let (driver_url, mode) = split_sslmode(url)?;
        let tls = make_connector(mode)?;
        log::debug!("Connecting to {} with sslmode={}", target, mode);
        let (client, connection) = tokio::time::timeout(timeout, tokio_postgres::connect(&driver_url, tls))
            .await
            .map_err(|_| {
                DbError::ConnectionError(format!(
                    "{} did not answer within {}s",
                    target,
                    timeout.as_secs()
                ))
            })?
            .map_err(|e| DbError::ConnectionError(format!("{}: {}", target, e)))?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                log::warn!("PostgreSQL connection closed: {}", e);
            }
        });

        Ok(Self { client, target })
    }

    async fn query_strings(&self, sql: &str, table: &str) -> DbResult<Vec<Vec<String>>> {
        let rows = self
            .client
            .query(sql, &[&table])
            .await
            .map_err(|e| DbError::IntrospectionError(e.to_string()))?;
        rows.iter()
            .map(|row| {
                (0..row.len())
                    .map(|i| row.try_get::<_, String>(i))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| DbError::IntrospectionError(e.to_string()))
            })
            .collect()
    }
}

/// Convert a text-protocol value into JSON, keeping integers numeric.
///
/// Only values that print back identically are converted, so `007` stays a
/// string.
pub(crate) fn text_to_json(value: Option<&str>) -> JsonValue {
    let Some(text) = value else {
        return JsonValue::Null;
    };
    if let Ok(n) = text.parse::<i64>() {
        if n.to_string() == text {
            return JsonValue::from(n);
        }
    }
    if let Ok(f) = text.parse::<f64>() {
        if f.is_finite() && f.to_string() == text {
            if let Some(num) = serde_json::Number::from_f64(f) {
                return JsonValue::Number(num);
            }
        }
    }
    JsonValue::String(text.to_string())
}

#[async_trait]
impl Database for PostgresBackend {
    async fn ping(&self) -> DbResult<()> {
        self.client
            .simple_query("SELECT 1")
            .await
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(())
    }

    async fn existing_tables(&self) -> DbResult<Vec<TableName>> {
        let rows = self
            .client
            .query(
                "SELECT table_name::text FROM information_schema.tables \
                 WHERE table_schema = 'public' AND table_type = 'BASE TABLE' \
                 ORDER BY table_name",
                &[],
            )
            .await
            .map_err(|e| DbError::IntrospectionError(e.to_string()))?;
        rows.iter()
            .map(|row| {
                row.try_get::<_, String>(0)
                    .map_err(|e| DbError::IntrospectionError(e.to_string()))
            })
            .filter_map(|name| name.map(TableName::try_new).transpose())
            .collect()
    }

    async fn table_columns(&self, table: &str) -> DbResult<Vec<ColumnInfo>> {
        let rows = self
            .query_strings(
                "SELECT column_name::text, data_type::text FROM information_schema.columns \
                 WHERE table_schema = 'public' AND table_name::text = $1 \
                 ORDER BY ordinal_position",
                table,
            )
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|mut r| {
                let data_type = r.pop()?;
                let name = r.pop()?;
                Some(ColumnInfo::new(name, data_type))
            })
            .collect())
    }

    async fn foreign_keys(&self, table: &str) -> DbResult<Vec<ForeignKey>> {
        let rows = self
            .query_strings(
                "SELECT kcu.column_name::text, ccu.table_name::text, ccu.column_name::text \
                 FROM information_schema.table_constraints tc \
                 JOIN information_schema.key_column_usage kcu \
                   ON tc.constraint_name = kcu.constraint_name AND tc.table_schema = kcu.table_schema \
                 JOIN information_schema.constraint_column_usage ccu \
                   ON ccu.constraint_name = tc.constraint_name AND ccu.table_schema = tc.table_schema \
                 WHERE tc.constraint_type = 'FOREIGN KEY' AND tc.table_schema = 'public' \
                   AND tc.table_name::text = $1",
                table,
            )
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|r| match r.as_slice() {
                [column, parent, parent_column] => Some(ForeignKey {
                    column: column.clone(),
                    references_table: parent.clone(),
                    references_column: parent_column.clone(),
                }),
                _ => None,
            })
            .collect())
    }

    async fn has_unique_key(&self, table: &str) -> DbResult<bool> {
        let row = self
            .client
            .query_one(
                "SELECT COUNT(*) FROM information_schema.table_constraints \
                 WHERE table_schema = 'public' AND table_name::text = $1 \
                 AND constraint_type IN ('PRIMARY KEY', 'UNIQUE')",
                &[&table],
            )
            .await
            .map_err(|e| DbError::IntrospectionError(e.to_string()))?;
        let count: i64 = row
            .try_get(0)
            .map_err(|e| DbError::IntrospectionError(e.to_string()))?;
        Ok(count > 0)
    }

    async fn row_count(&self, table: &str) -> DbResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", ServerDialect.quote_ident(table));
        let row = self.client.query_one(sql.as_str(), &[]).await?;
        Ok(row.try_get::<_, i64>(0)?)
    }

    // The extended protocol parses exactly one statement; the server refuses
    // text holding more.
    async fn run_statement(&self, sql: &str) -> DbResult<Option<u64>> {
        Ok(Some(self.client.execute(sql, &[]).await?))
    }

    async fn query_rows(&self, sql: &str) -> DbResult<Vec<Row>> {
        // Preparing first puts the same one-statement check in front of the
        // text-protocol read, which keeps every column type printable.
        self.client.prepare(sql).await?;
        let messages = self.client.simple_query(sql).await?;
        Ok(messages
            .iter()
            .filter_map(|m| match m {
                SimpleQueryMessage::Row(row) => Some(
                    row.columns()
                        .iter()
                        .enumerate()
                        .map(|(i, col)| (col.name().to_string(), text_to_json(row.get(i))))
                        .collect(),
                ),
                _ => None,
            })
            .collect())
    }

    fn dialect(&self) -> &dyn StoreDialect {
        &ServerDialect
    }

    fn db_type(&self) -> &'static str {
        "postgres"
    }

    fn describe_target(&self) -> String {
        self.target.clone()
    }
}
