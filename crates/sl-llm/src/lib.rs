//! sl-llm - Statement synthesis for Sluice
//!
//! This crate turns a natural-language request plus the live schema into raw
//! candidate SQL. It never executes anything.

pub mod client;
pub mod error;
pub mod model;
pub mod prompts;
#[cfg(any(test, feature = "test-support"))]
pub mod scripted;
pub mod synthesizer;

pub use client::ChatCompletionsClient;
pub use error::{LlmError, LlmResult};
pub use model::{ChatMessage, LanguageModel, Role};
pub use prompts::{PromptInput, PromptProfile, PromptSet};
#[cfg(any(test, feature = "test-support"))]
pub use scripted::ScriptedModel;
pub use synthesizer::{SynthesisRequest, Synthesizer};
