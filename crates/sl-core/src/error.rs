//! Error types for sl-core

use thiserror::Error;

/// Core error type for Sluice
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Configuration file not found
    #[error("[C001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// C002: Invalid configuration value
    #[error("[C002] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// C003: Invalid environment override
    #[error("[C003] Invalid value for environment variable {var}: {message}")]
    EnvInvalid { var: String, message: String },

    /// C004: Foreign keys form a cycle, so no parent-before-child rank exists
    #[error("[C004] Circular foreign-key dependency detected: {cycle}")]
    CircularDependency { cycle: String },

    /// C005: IO error with file path context
    #[error("[C005] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// C006: YAML parse error
    #[error("[C006] Config parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
