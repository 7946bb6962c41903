//! sl-db - Relational store layer for Sluice
//!
//! This crate provides the `Database` trait, an embedded DuckDB backend, a
//! PostgreSQL server backend, the per-store `StoreDialect` capabilities, and
//! the `ConnectionManager` that lazily connects with a one-time fallback.

pub mod dialect;
pub mod duckdb;
pub mod error;
pub mod manager;
pub mod postgres;
pub mod target;
pub mod tls;
pub mod traits;

pub use dialect::{has_duplicate_handling, EmbeddedDialect, ServerDialect, StoreDialect};
pub use self::duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use manager::ConnectionManager;
pub use postgres::PostgresBackend;
pub use target::ConnectionTarget;
pub use tls::SslMode;
pub use traits::{Database, Row};
