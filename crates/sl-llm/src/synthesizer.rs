//! Statement synthesizer: prompt assembly plus one bounded model call

use crate::error::{LlmError, LlmResult};
use crate::model::LanguageModel;
use crate::prompts::{PromptInput, PromptProfile, PromptSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Everything the model sees for one request
#[derive(Debug, Clone)]
pub struct SynthesisRequest<'a> {
    pub profile: PromptProfile,
    pub input: &'a str,
    pub context: Option<&'a str>,
    pub source: Option<&'a str>,
    pub schema_description: &'a str,
    pub whitelist: Vec<&'a str>,
    /// Store dialect the statements must be written in
    pub dialect: &'a str,
}

/// Turns a natural-language request into raw candidate SQL text
pub struct Synthesizer {
    model: Arc<dyn LanguageModel>,
    prompts: PromptSet,
    timeout: Duration,
}

impl Synthesizer {
    pub fn new(model: Arc<dyn LanguageModel>, timeout: Duration) -> LlmResult<Self> {
        Ok(Self {
            model,
            prompts: PromptSet::new()?,
            timeout,
        })
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Call the model once. A call that outlives the timeout is a failure
    /// and is not retried.
    pub async fn synthesize(&self, request: &SynthesisRequest<'_>) -> LlmResult<String> {
        let messages = self.prompts.render(
            request.profile,
            &PromptInput {
                input: request.input,
                context: request.context,
                source: request.source,
                schema: request.schema_description,
                tables: request.whitelist.clone(),
                dialect: request.dialect,
            },
        )?;

        let started = Instant::now();
        let raw = tokio::time::timeout(self.timeout, self.model.complete(&messages))
            .await
            .map_err(|_| LlmError::Timeout {
                secs: self.timeout.as_secs(),
            })??;

        log::debug!(
            "{} synthesis via {} took {}ms ({} chars)",
            request.profile,
            self.model.name(),
            started.elapsed().as_millis(),
            raw.len()
        );

        Ok(raw)
    }
}

#[cfg(test)]
#[path = "synthesizer_test.rs"]
mod tests;
