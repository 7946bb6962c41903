//! sl-sql - Statement sanitizer for Sluice
//!
//! Turns raw language-model output into validated statements: strips
//! formatting artifacts, splits on terminators, keeps only the pipeline's
//! verb and drops statements whose target table is not in the live schema.

pub mod clean;
pub mod dialect;
pub mod error;
pub mod extractor;
pub mod sanitizer;
pub mod split;
pub mod verb;

pub use clean::normalize_model_output;
pub use dialect::{for_store, DuckDbDialect, PostgresDialect, SqlDialect};
pub use error::{SqlError, SqlResult};
pub use extractor::{referenced_relations, target_table, RelationName};
pub use sanitizer::{DropReason, DroppedStatement, SanitizeOutcome, Sanitizer, ValidatedStatement};
pub use split::{count_statements, split_statements, CandidateStatement};
pub use verb::Verb;
