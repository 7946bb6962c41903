//! Clear command implementation

use anyhow::Result;
use sl_pipeline::{Maintenance, TableClearReport};

use crate::cli::{ClearArgs, GlobalArgs};
use crate::commands::common::{print_json, ExitCode};
use crate::context::RuntimeContext;

/// Execute the clear command
pub async fn execute(args: &ClearArgs, global: &GlobalArgs) -> Result<()> {
    if !args.yes {
        eprintln!("Refusing to delete data without --yes");
        return Err(ExitCode(2).into());
    }

    let ctx = RuntimeContext::new(global)?;
    let db = ctx.connection().await?;
    let maintenance = Maintenance::new(db, ctx.config.ingest.table_ranks.clone());

    let success = match &args.table {
        None => {
            let report = maintenance.clear_all().await;
            if ctx.json() {
                print_json(&report)?;
            } else {
                for (table, before) in &report.counts_before {
                    let after = report.counts_after.get(table).copied().unwrap_or(-1);
                    println!("  {}: {} -> {}", table, before, after);
                }
                for error in &report.errors {
                    println!("  \u{2717} {}: {}", error.table, error.error);
                }
                println!(
                    "\nCleared {} table(s), {} row(s) deleted",
                    report.tables_cleared.len(),
                    report.total_rows_deleted
                );
            }
            report.success
        }
        Some(table) => {
            let report = if args.ids.is_empty() {
                maintenance.clear_table(table).await?
            } else {
                maintenance.delete_rows(table, &args.ids).await?
            };
            if ctx.json() {
                print_json(&report)?;
            } else {
                print_table_report(&report);
            }
            report.success
        }
    };

    if success {
        Ok(())
    } else {
        Err(ExitCode(1).into())
    }
}

fn print_table_report(report: &TableClearReport) {
    match &report.error {
        None => println!(
            "\u{2713} {}: {} -> {} ({} row(s) deleted)",
            report.table, report.rows_before, report.rows_after, report.rows_deleted
        ),
        Some(error) => println!("\u{2717} {}: {}", report.table, error),
    }
}
