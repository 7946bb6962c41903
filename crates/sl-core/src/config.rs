//! Configuration types and parsing for sluice.yml
//!
//! The file is optional. Values resolve in this order, later wins:
//! built-in defaults, the YAML file, environment variables, CLI flags
//! (applied by the binary).

use crate::error::{CoreError, CoreResult};
use crate::ranks::DependencyRanks;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Full connection string for the primary store
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
/// Discrete connection parts
pub const ENV_DB_HOST: &str = "DB_HOST";
pub const ENV_DB_USER: &str = "DB_USER";
pub const ENV_DB_PASS: &str = "DB_PASS";
pub const ENV_DB_PORT: &str = "DB_PORT";
pub const ENV_DB_NAME: &str = "DB_NAME";
pub const ENV_DB_SSLMODE: &str = "DB_SSLMODE";
/// Path of the embedded fallback store
pub const ENV_FALLBACK_DB: &str = "SLUICE_FALLBACK_DB";
pub const ENV_LLM_BASE_URL: &str = "SLUICE_LLM_BASE_URL";
pub const ENV_LLM_MODEL: &str = "SLUICE_LLM_MODEL";
/// Accepted as an alias of [`ENV_LLM_MODEL`]
pub const ENV_LLM_MODEL_ALIAS: &str = "MISTRAL_MODEL";
pub const ENV_LLM_TIMEOUT_SECS: &str = "SLUICE_LLM_TIMEOUT_SECS";

/// File names searched by [`Config::discover`]
const CONFIG_FILE_NAMES: [&str; 2] = ["sluice.yml", "sluice.yaml"];

/// Main configuration from sluice.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Relational store connection
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Language model endpoint
    #[serde(default)]
    pub llm: LlmConfig,

    /// Write path (document ingestion)
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Read path (question answering)
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

/// Relational store connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Explicit connection string; takes precedence over discrete parts
    #[serde(default)]
    pub url: Option<String>,

    /// Server host; discrete parts are only used when this is set
    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub user: Option<String>,

    #[serde(default, skip_serializing)]
    pub password: Option<String>,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Database name
    #[serde(default = "default_db_name")]
    pub name: String,

    /// libpq-style TLS mode for the server store, see [`SSL_MODES`]
    #[serde(default = "default_sslmode")]
    pub sslmode: String,

    /// Embedded store used when no server is configured or it is unreachable
    #[serde(default = "default_fallback_path")]
    pub fallback_path: String,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: None,
            user: None,
            password: None,
            port: default_port(),
            name: default_db_name(),
            sslmode: default_sslmode(),
            fallback_path: default_fallback_path(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

/// Language model endpoint settings (OpenAI-compatible chat completions)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Inline API key; prefer `api_key_env`
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Bound on a single model call
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key: None,
            api_key_env: default_api_key_env(),
            temperature: default_temperature(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

impl LlmConfig {
    /// Resolve the API key: inline value first, then the named variable
    pub fn resolve_api_key<F>(&self, lookup: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| lookup(&self.api_key_env).filter(|k| !k.is_empty()))
    }
}

/// Write path settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Parent-before-child table ranks; lower executes first
    #[serde(default)]
    pub table_ranks: DependencyRanks,

    /// Derive ranks from the live foreign-key graph, with `table_ranks` winning
    #[serde(default)]
    pub derive_ranks_from_schema: bool,

    /// File extensions accepted when ingesting directories
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            table_ranks: DependencyRanks::default(),
            derive_ranks_from_schema: false,
            extensions: default_extensions(),
        }
    }
}

/// Read path settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Drop SELECTs that reference any non-whitelisted relation
    #[serde(default)]
    pub strict_relations: bool,

    /// Sample rows per table shown by `sluice check`
    #[serde(default = "default_sample_rows")]
    pub sample_rows: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            strict_relations: false,
            sample_rows: default_sample_rows(),
        }
    }
}

fn default_port() -> u16 {
    5432
}

fn default_db_name() -> String {
    "postgres".to_string()
}

/// Accepted values of `database.sslmode`
pub const SSL_MODES: &[&str] = &[
    "disable",
    "allow",
    "prefer",
    "require",
    "verify-ca",
    "verify-full",
];

fn default_sslmode() -> String {
    "prefer".to_string()
}

fn default_fallback_path() -> String {
    "sluice.duckdb".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_base_url() -> String {
    "https://api.mistral.ai/v1".to_string()
}

fn default_model() -> String {
    "mistral-small-latest".to_string()
}

fn default_api_key_env() -> String {
    "MISTRAL_API_KEY".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_llm_timeout() -> u64 {
    30
}

fn default_extensions() -> Vec<String> {
    ["txt", "md", "csv", "json", "sql"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_sample_rows() -> usize {
    3
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load sluice.yml or sluice.yaml from `dir`, or defaults when neither exists
    pub fn discover(dir: &Path) -> CoreResult<Self> {
        for name in CONFIG_FILE_NAMES {
            let path = dir.join(name);
            if path.exists() {
                log::debug!("Loading config from {}", path.display());
                return Self::load(&path);
            }
        }
        log::debug!("No config file in {}, using defaults", dir.display());
        Ok(Self::default())
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) -> CoreResult<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup; empty values count as unset
    pub fn apply_env_with<F>(&mut self, lookup: F) -> CoreResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_DATABASE_URL) {
            self.database.url = Some(url);
        }
        if let Some(host) = get(ENV_DB_HOST) {
            self.database.host = Some(host);
        }
        if let Some(user) = get(ENV_DB_USER) {
            self.database.user = Some(user);
        }
        if let Some(pass) = get(ENV_DB_PASS) {
            self.database.password = Some(pass);
        }
        if let Some(port) = get(ENV_DB_PORT) {
            self.database.port = port.trim().parse().map_err(|_| CoreError::EnvInvalid {
                var: ENV_DB_PORT.to_string(),
                message: format!("'{}' is not a port number", port),
            })?;
        }
        if let Some(name) = get(ENV_DB_NAME) {
            self.database.name = name;
        }
        if let Some(sslmode) = get(ENV_DB_SSLMODE) {
            self.database.sslmode = sslmode;
        }
        if let Some(path) = get(ENV_FALLBACK_DB) {
            self.database.fallback_path = path;
        }
        if let Some(base_url) = get(ENV_LLM_BASE_URL) {
            self.llm.base_url = base_url;
        }
        if let Some(model) = get(ENV_LLM_MODEL).or_else(|| get(ENV_LLM_MODEL_ALIAS)) {
            self.llm.model = model;
        }
        if let Some(secs) = get(ENV_LLM_TIMEOUT_SECS) {
            self.llm.timeout_secs = secs.trim().parse().map_err(|_| CoreError::EnvInvalid {
                var: ENV_LLM_TIMEOUT_SECS.to_string(),
                message: format!("'{}' is not a number of seconds", secs),
            })?;
        }

        self.validate()
    }

    /// Validate the configuration
    pub fn validate(&self) -> CoreResult<()> {
        if self.database.fallback_path.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "database.fallback_path cannot be empty".to_string(),
            });
        }

        if !SSL_MODES
            .iter()
            .any(|mode| mode.eq_ignore_ascii_case(self.database.sslmode.trim()))
        {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "database.sslmode must be one of {}, got '{}'",
                    SSL_MODES.join(", "),
                    self.database.sslmode
                ),
            });
        }

        if self.database.connect_timeout_secs == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "database.connect_timeout_secs must be greater than 0".to_string(),
            });
        }

        if self.llm.model.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "llm.model cannot be empty".to_string(),
            });
        }

        if self.llm.timeout_secs == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "llm.timeout_secs must be greater than 0".to_string(),
            });
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "llm.temperature must be between 0 and 2, got {}",
                    self.llm.temperature
                ),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
