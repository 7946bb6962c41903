//! Check command implementation

use anyhow::Result;
use sl_core::DependencyRanks;
use sl_pipeline::Maintenance;

use crate::cli::{CheckArgs, GlobalArgs};
use crate::commands::common::{display_value, print_json, truncate};
use crate::context::RuntimeContext;

/// Execute the check command
pub async fn execute(args: &CheckArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let db = ctx.connection().await?;
    db.ping().await?;

    let samples = args.samples.unwrap_or(ctx.config.retrieval.sample_rows);
    let report = Maintenance::new(db, DependencyRanks::empty())
        .check(samples)
        .await;

    if ctx.json() {
        return print_json(&report);
    }

    println!("\u{2713} Connected to {} ({})", report.target, report.dialect);
    if ctx.manager.is_degraded() {
        println!("  (fallback store; primary was unreachable)");
    }
    if report.tables.is_empty() {
        println!("\nNo tables found");
        return Ok(());
    }

    println!("\n{} table(s):", report.tables.len());
    for table in &report.tables {
        match (table.rows, &table.error) {
            (Some(rows), None) => println!("  {:<24} {:>8} rows", table.table, rows),
            (Some(rows), Some(error)) => {
                println!("  {:<24} {:>8} rows  ({})", table.table, rows, error)
            }
            (None, error) => println!(
                "  {:<24}        ? rows  ({})",
                table.table,
                error.as_deref().unwrap_or("unknown error")
            ),
        }
        for row in &table.sample {
            let fields: Vec<String> = row
                .iter()
                .map(|(k, v)| format!("{}={}", k, truncate(&display_value(v), 40)))
                .collect();
            println!("      {}", fields.join(", "));
        }
    }
    Ok(())
}
