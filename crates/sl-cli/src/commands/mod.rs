//! CLI command implementations

pub mod ask;
pub mod check;
pub mod clear;
pub(crate) mod common;
pub mod ingest;
pub mod schema;
