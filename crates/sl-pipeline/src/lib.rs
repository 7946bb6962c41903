//! sl-pipeline - Read and write SQL pipelines for Sluice
//!
//! Write path: synthesize, sanitize, order by dependency rank, rewrite for
//! idempotency, execute one statement at a time, verify by row counts.
//! Read path: synthesize, sanitize, execute, return rows.

pub mod admin;
pub mod document;
pub mod error;
pub mod executor;
pub mod orderer;
pub mod read;
pub mod registry;
pub mod report;
pub mod rewriter;
pub mod verifier;
pub mod write;

pub use admin::{CheckReport, ClearReport, Maintenance, TableCheck, TableClearReport};
pub use document::{collect_files, FileIngestor, PlainTextExtractor, TextExtractor};
pub use error::{PipelineError, PipelineResult};
pub use executor::{ExecutionOutcome, Executor};
pub use orderer::{DependencyOrderer, OrderedStatement};
pub use read::ReadPipeline;
pub use registry::SchemaRegistry;
pub use report::{
    Outcome, ReadReport, StatementError, StatementRows, TableDelta, VerificationWarning,
    WriteReport,
};
pub use rewriter::IdempotencyRewriter;
pub use verifier::{RowCountSnapshot, VerificationReport, Verifier};
pub use write::WritePipeline;
