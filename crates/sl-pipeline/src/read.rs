//! Read path: question in, rows out

use crate::error::{PipelineError, PipelineResult};
use crate::executor::Executor;
use crate::registry::SchemaRegistry;
use crate::report::{Outcome, ReadReport, StatementError, StatementRows};
use sl_db::ConnectionManager;
use sl_llm::{PromptProfile, SynthesisRequest, Synthesizer};
use sl_sql::{for_store, normalize_model_output, Sanitizer, Verb};
use std::sync::Arc;

/// Turns a question into whitelisted SELECTs and runs them
pub struct ReadPipeline {
    manager: Arc<ConnectionManager>,
    synthesizer: Arc<Synthesizer>,
    strict_relations: bool,
}

impl ReadPipeline {
    pub fn new(manager: Arc<ConnectionManager>, synthesizer: Arc<Synthesizer>) -> Self {
        Self {
            manager,
            synthesizer,
            strict_relations: false,
        }
    }

    /// Require every relation a query reads to be whitelisted, not just its
    /// first table
    pub fn with_strict_relations(mut self, strict: bool) -> Self {
        self.strict_relations = strict;
        self
    }

    /// Answer `question`, optionally grounded by free-text `context`.
    ///
    /// Only store unavailability and synthesis failure are errors; a
    /// rejected statement lands in `errors`.
    pub async fn run(&self, question: &str, context: Option<&str>) -> PipelineResult<ReadReport> {
        let db = self
            .manager
            .connection()
            .await
            .map_err(PipelineError::Connectivity)?;

        let schema = SchemaRegistry::new(db.as_ref()).snapshot().await;
        let whitelist = schema.whitelist();
        let description = schema.describe();

        let raw = self
            .synthesizer
            .synthesize(&SynthesisRequest {
                profile: PromptProfile::Retrieval,
                input: question,
                context,
                source: None,
                schema_description: &description,
                whitelist: whitelist.names().collect(),
                dialect: db.dialect().name(),
            })
            .await?;

        let sanitizer = Sanitizer::new(Verb::Select, whitelist.clone(), for_store(db.dialect().name()))
            .with_strict_relations(self.strict_relations);
        let sanitized = sanitizer.sanitize(&raw);

        let mut report = ReadReport {
            success: false,
            generated_sql: normalize_model_output(&raw),
            results: Vec::new(),
            errors: Vec::new(),
            run_id: uuid::Uuid::new_v4().to_string(),
            dropped: sanitized.dropped,
            outcome: Outcome::NoActionableStatements,
        };

        if sanitized.statements.is_empty() {
            log::info!("No actionable SELECT statements for question");
            return Ok(report);
        }

        let executor = Executor::new(db.as_ref());
        for statement in sanitized.statements {
            match executor.fetch(&statement.sql).await {
                Ok(rows) => report.results.push(StatementRows {
                    rowcount: rows.len(),
                    statement: statement.sql,
                    rows,
                }),
                Err(e) => report.errors.push(StatementError {
                    statement: statement.sql,
                    error: e.to_string(),
                }),
            }
        }

        report.success = !report.results.is_empty();
        report.outcome = Outcome::Completed;
        Ok(report)
    }
}
