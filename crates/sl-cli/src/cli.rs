//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Sluice - ask questions of a database and ingest documents into it,
/// with model-written SQL kept behind a verb and table whitelist
#[derive(Parser, Debug)]
#[command(name = "sluice")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (default: sluice.yml in the working directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Connection string; overrides config and environment
    #[arg(short = 'd', long, global = true)]
    pub database_url: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON report
    Json,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer a question with generated SELECT statements
    Ask(AskArgs),

    /// Insert data extracted from documents
    Ingest(IngestArgs),

    /// Show the live schema and the dependency rank table
    Schema(SchemaArgs),

    /// Check connectivity and table contents
    Check(CheckArgs),

    /// Delete data from the store
    Clear(ClearArgs),
}

/// Arguments for the ask command
#[derive(Args, Debug)]
pub struct AskArgs {
    /// The question to answer
    pub question: String,

    /// File with extra context for the question
    #[arg(long)]
    pub context_file: Option<PathBuf>,

    /// Only accept queries whose every relation is a known table
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the ingest command
#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Files or directories to ingest
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// File extensions to accept in directories (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub ext: Vec<String>,
}

/// Arguments for the schema command
#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Derive ranks from foreign keys before applying configured ranks
    #[arg(long)]
    pub derive_ranks: bool,
}

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Sample rows to show per table
    #[arg(short, long)]
    pub samples: Option<usize>,
}

/// Arguments for the clear command
#[derive(Args, Debug)]
pub struct ClearArgs {
    /// Only clear this table
    #[arg(short, long)]
    pub table: Option<String>,

    /// Only delete rows with these ids (requires --table)
    #[arg(long, value_delimiter = ',', requires = "table")]
    pub ids: Vec<i64>,

    /// Confirm the deletion
    #[arg(short, long)]
    pub yes: bool,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
