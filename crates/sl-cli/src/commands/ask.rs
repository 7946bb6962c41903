//! Ask command implementation

use anyhow::{Context, Result};
use sl_pipeline::{Outcome, ReadPipeline, ReadReport};

use crate::cli::{AskArgs, GlobalArgs};
use crate::commands::common::{display_value, print_json, truncate, ExitCode};
use crate::context::RuntimeContext;

/// Rows printed per statement in text mode
const MAX_ROWS_SHOWN: usize = 10;

/// Execute the ask command
pub async fn execute(args: &AskArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;

    let context = match &args.context_file {
        Some(path) => Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Could not read context file {}", path.display()))?,
        ),
        None => None,
    };

    let pipeline = ReadPipeline::new(ctx.manager.clone(), ctx.synthesizer()?)
        .with_strict_relations(args.strict || ctx.config.retrieval.strict_relations);

    let report = pipeline.run(&args.question, context.as_deref()).await?;

    if ctx.json() {
        print_json(&report)?;
    } else {
        print_report(&report, global.verbose);
    }

    if report.success {
        Ok(())
    } else {
        Err(ExitCode(1).into())
    }
}

fn print_report(report: &ReadReport, verbose: bool) {
    if verbose {
        for dropped in &report.dropped {
            println!("  - dropped ({}): {}", dropped.reason, truncate(&dropped.statement, 80));
        }
    }

    if report.outcome == Outcome::NoActionableStatements {
        println!("No actionable SELECT statements were generated.");
        return;
    }

    for result in &report.results {
        println!("\n{}", result.statement);
        println!("  {} row(s)", result.rowcount);
        for row in result.rows.iter().take(MAX_ROWS_SHOWN) {
            let fields: Vec<String> = row
                .iter()
                .map(|(k, v)| format!("{}={}", k, truncate(&display_value(v), 60)))
                .collect();
            println!("  {}", fields.join(", "));
        }
        if result.rowcount > MAX_ROWS_SHOWN {
            println!("  ... {} more", result.rowcount - MAX_ROWS_SHOWN);
        }
    }

    for error in &report.errors {
        println!("\n\u{2717} {}", error.statement);
        println!("  {}", error.error);
    }

    println!();
    if report.success {
        println!("Retrieved {} row(s)", report.total_rows());
    } else {
        println!("{} statement(s) failed", report.errors.len());
    }
}
