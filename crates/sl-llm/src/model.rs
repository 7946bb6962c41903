//! Language model boundary

use crate::error::LlmResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message of a chat-style prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Text-in, text-out language model
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Complete a chat prompt, returning the assistant's text
    async fn complete(&self, messages: &[ChatMessage]) -> LlmResult<String>;

    /// Model identifier for logs and reports
    fn name(&self) -> &str;
}
