//! Deterministic language model for tests
//!
//! Replays queued replies in order and records every prompt it receives.

use crate::error::{LlmError, LlmResult};
use crate::model::{ChatMessage, LanguageModel};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

enum Reply {
    Text(String),
    Fail(String),
    Delay(Duration, String),
}

/// A `LanguageModel` that replays canned responses
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Reply>>,
    prompts: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Model that answers every call in order with `responses`
    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let model = Self::new();
        for r in responses {
            model.push(Reply::Text(r.into()));
        }
        model
    }

    /// Queue a successful reply
    pub fn then_respond(self, text: impl Into<String>) -> Self {
        self.push(Reply::Text(text.into()));
        self
    }

    /// Queue a transport failure
    pub fn then_fail(self, message: impl Into<String>) -> Self {
        self.push(Reply::Fail(message.into()));
        self
    }

    /// Queue a reply that arrives only after `delay`
    pub fn then_delay(self, delay: Duration, text: impl Into<String>) -> Self {
        self.push(Reply::Delay(delay, text.into()));
        self
    }

    /// Every prompt received so far, in call order
    pub fn prompts(&self) -> Vec<Vec<ChatMessage>> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// Number of completed or attempted calls
    pub fn calls(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or_default()
    }

    fn push(&self, reply: Reply) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
    }
}

impl Default for ScriptedModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, messages: &[ChatMessage]) -> LlmResult<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(messages.to_vec());
        }

        let reply = self
            .replies
            .lock()
            .ok()
            .and_then(|mut r| r.pop_front())
            .ok_or_else(|| LlmError::Transport("scripted model has no reply queued".to_string()))?;

        match reply {
            Reply::Text(text) => Ok(text),
            Reply::Fail(message) => Err(LlmError::Transport(message)),
            Reply::Delay(delay, text) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
