//! Error types for sl-db

use thiserror::Error;

/// Relational store errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Statement execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Table not found (D003)
    #[error("[D003] Table not found: {0}")]
    TableNotFound(String),

    /// Introspection query failed (D004)
    #[error("[D004] Schema introspection failed: {0}")]
    IntrospectionError(String),

    /// Both the primary and the fallback store are unreachable (D005)
    #[error("[D005] No store reachable. Primary: {primary}. Fallback: {fallback}")]
    Unreachable { primary: String, fallback: String },

    /// Mutex poisoned (D006)
    #[error("[D006] Database mutex poisoned: {0}")]
    MutexPoisoned(String),

    /// Statement text refused before reaching the store (D007)
    #[error("[D007] Statement rejected: {0}")]
    Rejected(String),

    /// Connection settings that cannot be used as given (D008)
    #[error("[D008] Invalid connection settings: {0}")]
    InvalidConfig(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        // duckdb::Error carries no structured variant for missing tables.
        let msg = err.to_string();
        if msg.contains("Table with name")
            || msg.contains("Table or view with name")
            || (msg.contains("Catalog Error") && msg.contains("Table") && msg.contains("not found"))
        {
            DbError::TableNotFound(msg)
        } else {
            DbError::ExecutionError(msg)
        }
    }
}

impl From<tokio_postgres::Error> for DbError {
    fn from(err: tokio_postgres::Error) -> Self {
        use tokio_postgres::error::SqlState;

        if err.is_closed() {
            return DbError::ConnectionError(err.to_string());
        }
        // The Display impl of a server error only says "db error"; the
        // underlying DbError holds the useful message.
        let msg = err
            .as_db_error()
            .map(|db| db.message().to_string())
            .unwrap_or_else(|| err.to_string());
        match err.code() {
            Some(code) if *code == SqlState::UNDEFINED_TABLE => DbError::TableNotFound(msg),
            _ => DbError::ExecutionError(msg),
        }
    }
}
