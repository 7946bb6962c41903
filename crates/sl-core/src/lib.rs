//! sl-core - Core library for Sluice
//!
//! This crate provides the configuration model, the schema data model shared
//! by the store and sanitizer layers, and the static table dependency ranks
//! that order write statements.

pub mod config;
pub mod error;
pub mod ranks;
pub mod schema;
pub mod table_name;

pub use config::{Config, DatabaseConfig, IngestConfig, LlmConfig, RetrievalConfig};
pub use error::{CoreError, CoreResult};
pub use ranks::{DependencyRanks, RankViolation, UNRANKED};
pub use schema::{ColumnInfo, ForeignKey, Schema, SchemaTable, Whitelist};
pub use table_name::TableName;
