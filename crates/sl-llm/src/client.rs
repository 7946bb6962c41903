//! OpenAI-compatible chat completions client
//!
//! Works against any `/chat/completions` endpoint speaking the common wire
//! format (Mistral, OpenAI, vLLM, Ollama's compatibility layer).

use crate::error::{LlmError, LlmResult};
use crate::model::{ChatMessage, LanguageModel};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sl_core::LlmConfig;
use std::time::Duration;

/// HTTP-backed language model
pub struct ChatCompletionsClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
    temperature: f32,
    timeout: Duration,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionsClient {
    /// Build a client from configuration and an already-resolved API key
    pub fn new(config: &LlmConfig, api_key: impl Into<String>) -> LlmResult<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Transport(format!("failed to build http client: {e}")))?;

        Ok(Self {
            http,
            endpoint: completions_endpoint(&config.base_url),
            model: config.model.clone(),
            api_key: api_key.into(),
            temperature: config.temperature,
            timeout,
        })
    }

    /// Build a client, resolving the API key from the process environment
    pub fn from_config(config: &LlmConfig) -> LlmResult<Self> {
        let key = config
            .resolve_api_key(|var| std::env::var(var).ok())
            .ok_or_else(|| LlmError::MissingApiKey {
                env: config.api_key_env.clone(),
            })?;
        Self::new(config, key)
    }

    /// Full URL requests are sent to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Append `/chat/completions` to a base URL unless it is already there
pub fn completions_endpoint(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if base.ends_with("/chat/completions") {
        base.to_string()
    } else {
        format!("{base}/chat/completions")
    }
}

/// Pull the assistant text out of a completion response body
pub(crate) fn parse_completion(body: &str) -> LlmResult<String> {
    let parsed: CompletionResponse = serde_json::from_str(body)
        .map_err(|e| LlmError::InvalidResponse(format!("not a completion response: {e}")))?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| LlmError::InvalidResponse("response contained no choices".to_string()))
}

#[async_trait]
impl LanguageModel for ChatCompletionsClient {
    async fn complete(&self, messages: &[ChatMessage]) -> LlmResult<String> {
        let payload = CompletionRequest {
            model: &self.model,
            temperature: self.temperature,
            messages,
        };

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout {
                        secs: self.timeout.as_secs(),
                    }
                } else {
                    LlmError::Transport(format!("failed to reach {}: {e}", self.endpoint))
                }
            })?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout {
                    secs: self.timeout.as_secs(),
                }
            } else {
                LlmError::Transport(e.to_string())
            }
        })?;

        if !status.is_success() {
            return Err(LlmError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        parse_completion(&text)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
