//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; main prints nothing for it
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Print a report as pretty JSON on stdout
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize report")?;
    println!("{}", json);
    Ok(())
}

/// Render a JSON value compactly for one-line display
pub(crate) fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => "NULL".to_string(),
        other => other.to_string(),
    }
}

/// Shorten `s` to at most `max` characters
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
