//! Write path: text in, verified inserts out

use crate::error::{PipelineError, PipelineResult};
use crate::executor::Executor;
use crate::orderer::DependencyOrderer;
use crate::registry::SchemaRegistry;
use crate::report::WriteReport;
use crate::rewriter::IdempotencyRewriter;
use crate::verifier::{RowCountSnapshot, Verifier};
use sl_core::{DependencyRanks, Schema};
use sl_db::ConnectionManager;
use sl_llm::{PromptProfile, SynthesisRequest, Synthesizer};
use sl_sql::{for_store, Sanitizer, Verb};
use std::sync::Arc;

/// Turns unstructured text into ordered, idempotent, verified inserts
pub struct WritePipeline {
    manager: Arc<ConnectionManager>,
    synthesizer: Arc<Synthesizer>,
    ranks: DependencyRanks,
    derive_ranks: bool,
}

impl WritePipeline {
    pub fn new(manager: Arc<ConnectionManager>, synthesizer: Arc<Synthesizer>) -> Self {
        Self {
            manager,
            synthesizer,
            ranks: DependencyRanks::default(),
            derive_ranks: false,
        }
    }

    /// Static rank table; lower ranks execute first
    pub fn with_ranks(mut self, ranks: DependencyRanks) -> Self {
        self.ranks = ranks;
        self
    }

    /// Layer the configured ranks over ranks derived from the live
    /// foreign-key graph
    pub fn with_derived_ranks(mut self, derive: bool) -> Self {
        self.derive_ranks = derive;
        self
    }

    /// Ranks in effect for `schema`
    pub fn effective_ranks(&self, schema: &Schema) -> PipelineResult<DependencyRanks> {
        let ranks = if self.derive_ranks {
            DependencyRanks::from_foreign_keys(schema)?.merged_with(&self.ranks)
        } else {
            self.ranks.clone()
        };
        for violation in ranks.violations(schema) {
            log::warn!("Rank table inconsistent with schema: {}", violation);
        }
        Ok(ranks)
    }

    /// Ingest `text`; `source` names the originating file, if any.
    pub async fn run(&self, text: &str, source: Option<&str>) -> PipelineResult<WriteReport> {
        let mut report = WriteReport::started(source.map(str::to_string));

        let db = self
            .manager
            .connection()
            .await
            .map_err(PipelineError::Connectivity)?;

        let schema = SchemaRegistry::new(db.as_ref()).snapshot().await;
        let ranks = self.effective_ranks(&schema)?;
        let whitelist = schema.whitelist();
        let description = schema.describe();

        let raw = self
            .synthesizer
            .synthesize(&SynthesisRequest {
                profile: PromptProfile::Ingestion,
                input: text,
                context: None,
                source,
                schema_description: &description,
                whitelist: whitelist.names().collect(),
                dialect: db.dialect().name(),
            })
            .await?;

        let sanitized = Sanitizer::new(Verb::Insert, whitelist.clone(), for_store(db.dialect().name()))
            .sanitize(&raw);
        report.dropped = sanitized.dropped;

        if sanitized.statements.is_empty() {
            log::info!("No actionable INSERT statements");
            return Ok(report);
        }

        let ordered = DependencyOrderer::new(&ranks).order(sanitized.statements);
        let rewritten = IdempotencyRewriter::from_schema(db.dialect(), &schema).rewrite_all(ordered);

        let tables = schema.table_names();
        let before = RowCountSnapshot::capture(db.as_ref(), &tables).await;

        let executor = Executor::new(db.as_ref());
        let outcomes = executor
            .execute_all(rewritten.iter().map(|s| s.statement.sql.as_str()))
            .await;

        let after = RowCountSnapshot::capture(db.as_ref(), &tables).await;

        let attempted: Vec<(&str, &_)> = rewritten
            .iter()
            .map(|s| s.statement.table.as_str())
            .zip(outcomes.iter())
            .collect();
        let verification = Verifier::compare(&before, &after, &attempted);

        report.complete(outcomes, verification);
        log::info!(
            "Write run {}: {} statements, {} failed, {} rows inserted",
            report.run_id,
            report.statements_executed,
            report.failed_statements(),
            report.total_rows_inserted
        );
        Ok(report)
    }
}
