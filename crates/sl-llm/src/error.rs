//! Error types for sl-llm

use thiserror::Error;

/// Synthesis errors. Every variant is fatal for the request that hit it.
#[derive(Error, Debug)]
pub enum LlmError {
    /// Transport failure (L001)
    #[error("[L001] Language model request failed: {0}")]
    Transport(String),

    /// Call exceeded its bounded timeout (L002)
    #[error("[L002] Language model call timed out after {secs}s")]
    Timeout { secs: u64 },

    /// Non-success HTTP status (L003)
    #[error("[L003] Language model returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Response body did not have the expected shape (L004)
    #[error("[L004] Invalid language model response: {0}")]
    InvalidResponse(String),

    /// No API key configured (L005)
    #[error("[L005] No API key found. Set llm.api_key or the {env} environment variable")]
    MissingApiKey { env: String },

    /// Prompt template failed to render (L006)
    #[error("[L006] Prompt render error: {0}")]
    Template(String),
}

/// Result type alias for LlmError
pub type LlmResult<T> = Result<T, LlmError>;

impl From<minijinja::Error> for LlmError {
    fn from(err: minijinja::Error) -> Self {
        LlmError::Template(err.to_string())
    }
}
