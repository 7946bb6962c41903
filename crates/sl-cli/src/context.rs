//! Runtime context for CLI commands

use anyhow::{Context, Result};
use sl_core::Config;
use sl_db::{ConnectionManager, Database};
use sl_llm::{ChatCompletionsClient, Synthesizer};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::cli::{GlobalArgs, OutputFormat};

/// Loaded configuration plus the lazily connecting store manager
pub struct RuntimeContext {
    pub config: Config,
    pub manager: Arc<ConnectionManager>,
    pub output: OutputFormat,
}

impl RuntimeContext {
    /// Config file, then environment, then command-line flags
    pub fn new(global: &GlobalArgs) -> Result<Self> {
        let mut config = match &global.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("Failed to load config file {}", path.display()))?,
            None => Config::discover(Path::new(".")).context("Failed to load sluice.yml")?,
        };
        config
            .apply_env()
            .context("Invalid environment configuration")?;
        if let Some(url) = &global.database_url {
            config.database.url = Some(url.clone());
        }

        let manager = Arc::new(ConnectionManager::from_config(&config.database));
        tracing::debug!("Primary store target: {}", manager.primary().redacted());

        Ok(Self {
            config,
            manager,
            output: global.output,
        })
    }

    /// Live store handle; falls back to the embedded store once if needed
    pub async fn connection(&self) -> Result<Arc<dyn Database>> {
        let db = self
            .manager
            .connection()
            .await
            .context("Could not connect to any store")?;
        if self.manager.is_degraded() {
            eprintln!(
                "[warn] Primary store unreachable, using fallback {}",
                self.manager.active_target().redacted()
            );
        }
        Ok(db)
    }

    /// Synthesizer backed by the configured chat-completions endpoint
    pub fn synthesizer(&self) -> Result<Arc<Synthesizer>> {
        let client = ChatCompletionsClient::from_config(&self.config.llm)
            .context("Failed to configure language model")?;
        let synthesizer = Synthesizer::new(
            Arc::new(client),
            Duration::from_secs(self.config.llm.timeout_secs),
        )?;
        Ok(Arc::new(synthesizer))
    }

    pub fn json(&self) -> bool {
        self.output == OutputFormat::Json
    }
}
