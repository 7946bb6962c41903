//! Error types for sl-pipeline
//!
//! Only fatal conditions are errors. Dropped statements and per-statement
//! execution failures are values inside the reports.

use sl_core::CoreError;
use sl_db::DbError;
use sl_llm::LlmError;
use thiserror::Error;

/// Pipeline errors
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Store unreachable on both primary and fallback (P001)
    #[error("[P001] Store unavailable: {0}")]
    Connectivity(DbError),

    /// Model call failed or timed out; nothing was executed (P002)
    #[error("[P002] Statement synthesis failed: {0}")]
    Synthesis(#[from] LlmError),

    /// Configuration problem, e.g. a cyclic foreign-key graph (P003)
    #[error("[P003] {0}")]
    Config(#[from] CoreError),

    /// Table is not in the live schema (P004)
    #[error("[P004] Table '{table}' not found in the live schema")]
    UnknownTable { table: String },

    /// Document text could not be extracted (P005)
    #[error("[P005] Text extraction failed for {path}: {message}")]
    Extraction { path: String, message: String },

    /// Bad input pattern or argument (P006)
    #[error("[P006] {0}")]
    InvalidInput(String),

    /// Store operation outside statement execution failed (P007)
    #[error("[P007] Store error: {0}")]
    Store(#[from] DbError),
}

/// Result type alias for PipelineError
pub type PipelineResult<T> = Result<T, PipelineError>;
