//! Schema command implementation

use anyhow::Result;
use serde::Serialize;
use sl_core::{DependencyRanks, RankViolation, Schema};
use sl_pipeline::SchemaRegistry;

use crate::cli::{GlobalArgs, SchemaArgs};
use crate::commands::common::{print_json, ExitCode};
use crate::context::RuntimeContext;

#[derive(Serialize)]
struct SchemaReport<'a> {
    target: String,
    schema: &'a Schema,
    ranks: Vec<RankEntry<'a>>,
    violations: Vec<String>,
}

#[derive(Serialize)]
struct RankEntry<'a> {
    table: &'a str,
    rank: u32,
}

/// Execute the schema command
pub async fn execute(args: &SchemaArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let db = ctx.connection().await?;
    let schema = SchemaRegistry::new(db.as_ref()).snapshot().await;

    let configured = &ctx.config.ingest.table_ranks;
    let ranks = if args.derive_ranks || ctx.config.ingest.derive_ranks_from_schema {
        DependencyRanks::from_foreign_keys(&schema)?.merged_with(configured)
    } else {
        configured.clone()
    };
    let violations: Vec<RankViolation> = ranks.violations(&schema);

    if ctx.json() {
        print_json(&SchemaReport {
            target: db.describe_target(),
            schema: &schema,
            ranks: ranks
                .entries()
                .into_iter()
                .map(|(table, rank)| RankEntry { table, rank })
                .collect(),
            violations: violations.iter().map(ToString::to_string).collect(),
        })?;
    } else {
        println!("Store: {} ({})\n", db.describe_target(), db.dialect().name());
        print!("{}", schema.describe());

        println!("\nDEPENDENCY RANKS (lower inserts first):");
        for (table, rank) in ranks.entries() {
            let marker = if schema.contains(table) { "" } else { "  (not in store)" };
            println!("  {:>3}  {}{}", rank, table, marker);
        }
        let unranked: Vec<&str> = schema
            .tables()
            .iter()
            .filter(|t| !ranks.is_ranked(&t.name))
            .map(|t| t.name.as_str())
            .collect();
        if !unranked.is_empty() {
            println!("  unranked (inserted last): {}", unranked.join(", "));
        }

        if !violations.is_empty() {
            println!("\nRANK VIOLATIONS:");
            for violation in &violations {
                println!("  \u{2717} {}", violation);
            }
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ExitCode(1).into())
    }
}
