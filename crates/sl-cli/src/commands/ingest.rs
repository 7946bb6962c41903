//! Ingest command implementation

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use sl_pipeline::{collect_files, FileIngestor, Outcome, WritePipeline, WriteReport};

use crate::cli::{GlobalArgs, IngestArgs};
use crate::commands::common::{print_json, truncate, ExitCode};
use crate::context::RuntimeContext;

/// Execute the ingest command
pub async fn execute(args: &IngestArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;

    let extensions = if args.ext.is_empty() {
        ctx.config.ingest.extensions.clone()
    } else {
        args.ext.clone()
    };
    let files = collect_files(&args.paths, &extensions)?;
    if files.is_empty() {
        println!("No files to ingest");
        return Ok(());
    }

    let pipeline = WritePipeline::new(ctx.manager.clone(), ctx.synthesizer()?)
        .with_ranks(ctx.config.ingest.table_ranks.clone())
        .with_derived_ranks(ctx.config.ingest.derive_ranks_from_schema);
    let ingestor = FileIngestor::new(&pipeline);

    let pb = if files.len() > 1 && !ctx.json() {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut reports = Vec::with_capacity(files.len());
    for file in &files {
        if let Some(pb) = &pb {
            pb.set_message(file.display().to_string());
        }
        let report = ingestor.ingest_file(file).await;
        match &pb {
            Some(pb) => {
                pb.println(summary_line(&report));
                pb.inc(1);
            }
            None if !ctx.json() => print_report(&report, global.verbose),
            None => {}
        }
        reports.push(report);
    }
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    let failed = reports.iter().filter(|r| !r.success).count();
    if ctx.json() {
        print_json(&reports)?;
    } else {
        let inserted: i64 = reports.iter().map(|r| r.total_rows_inserted).sum();
        println!(
            "\nIngested {} file(s): {} succeeded, {} failed, {} row(s) inserted",
            reports.len(),
            reports.len() - failed,
            failed,
            inserted
        );
    }

    if failed > 0 {
        return Err(ExitCode(1).into());
    }
    Ok(())
}

fn summary_line(report: &WriteReport) -> String {
    let file = report.file.as_deref().unwrap_or("<input>");
    match (&report.error, report.outcome) {
        (Some(error), _) => format!("\u{2717} {} - {}", file, error),
        (None, Outcome::NoActionableStatements) => {
            format!("- {} - no actionable statements", file)
        }
        (None, _) if report.success => format!(
            "\u{2713} {} (+{} rows, {}/{} statements ok)",
            file,
            report.total_rows_inserted,
            report.statements_executed - report.failed_statements(),
            report.statements_executed
        ),
        (None, _) => format!(
            "\u{2717} {} - no rows inserted ({} of {} statements failed)",
            file,
            report.failed_statements(),
            report.statements_executed
        ),
    }
}

fn print_report(report: &WriteReport, verbose: bool) {
    println!("{}", summary_line(report));

    if verbose {
        for dropped in &report.dropped {
            println!("  - dropped ({}): {}", dropped.reason, truncate(&dropped.statement, 80));
        }
    }
    for outcome in report.execution_results.iter().filter(|o| !o.success) {
        println!("  \u{2717} {}", truncate(&outcome.statement, 80));
        if let Some(error) = &outcome.error {
            println!("    {}", error);
        }
    }
    for (table, delta) in &report.verification {
        if delta.inserted != 0 || verbose {
            println!(
                "  {}: {} -> {} ({:+})",
                table, delta.before, delta.after, delta.inserted
            );
        }
    }
    for warning in &report.warnings {
        println!("  [warn] {}: {}", warning.table, warning.message);
    }
}
