//! Lazily connected, single-flight store handle with one-time fallback.

use crate::duckdb::DuckDbBackend;
use crate::error::{DbError, DbResult};
use crate::postgres::PostgresBackend;
use crate::target::ConnectionTarget;
use crate::traits::Database;
use sl_core::DatabaseConfig;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

/// Owns the connection to the relational store.
///
/// The first call to [`connection`](Self::connection) connects; concurrent
/// first calls wait on the same attempt and receive the same handle. If the
/// primary target fails, the manager switches to the embedded fallback for
/// the rest of its lifetime.
pub struct ConnectionManager {
    primary: ConnectionTarget,
    fallback: ConnectionTarget,
    connect_timeout: Duration,
    cell: OnceCell<Arc<dyn Database>>,
    degraded: AtomicBool,
}

impl ConnectionManager {
    /// Build a manager from configuration; nothing connects yet
    pub fn from_config(config: &DatabaseConfig) -> Self {
        Self::new(
            ConnectionTarget::resolve(config),
            ConnectionTarget::fallback(config),
            Duration::from_secs(config.connect_timeout_secs),
        )
    }

    /// Build a manager from explicit targets
    pub fn new(
        primary: ConnectionTarget,
        fallback: ConnectionTarget,
        connect_timeout: Duration,
    ) -> Self {
        Self {
            primary,
            fallback,
            connect_timeout,
            cell: OnceCell::new(),
            degraded: AtomicBool::new(false),
        }
    }

    /// Wrap an already open store
    pub fn with_database(db: Arc<dyn Database>) -> Self {
        let target = ConnectionTarget::Embedded {
            path: db.describe_target(),
        };
        Self {
            primary: target.clone(),
            fallback: target,
            connect_timeout: Duration::from_secs(1),
            cell: OnceCell::new_with(Some(db)),
            degraded: AtomicBool::new(false),
        }
    }

    /// Live handle to the active store, connecting on first use
    pub async fn connection(&self) -> DbResult<Arc<dyn Database>> {
        let db = self.cell.get_or_try_init(|| self.establish()).await?;
        Ok(Arc::clone(db))
    }

    /// Whether the manager switched to the embedded fallback
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::SeqCst)
    }

    /// The configured primary target
    pub fn primary(&self) -> &ConnectionTarget {
        &self.primary
    }

    /// The target in use (or that will be tried first)
    pub fn active_target(&self) -> &ConnectionTarget {
        if self.is_degraded() {
            &self.fallback
        } else {
            &self.primary
        }
    }

    async fn establish(&self) -> DbResult<Arc<dyn Database>> {
        log::debug!("Connecting to {}", self.primary);
        let primary_err = match open(&self.primary, self.connect_timeout).await {
            Ok(db) => {
                log::info!("Connected to {}", self.primary);
                return Ok(db);
            }
            // Settings that can never work are reported, not papered over
            Err(e @ DbError::InvalidConfig(_)) => return Err(e),
            Err(e) => e,
        };

        if self.primary == self.fallback {
            return Err(DbError::Unreachable {
                primary: primary_err.to_string(),
                fallback: "same as primary".to_string(),
            });
        }

        log::warn!(
            "Primary store {} unreachable ({}); switching to embedded fallback {}",
            self.primary,
            primary_err,
            self.fallback
        );
        match open(&self.fallback, self.connect_timeout).await {
            Ok(db) => {
                self.degraded.store(true, Ordering::SeqCst);
                Ok(db)
            }
            Err(fallback_err) => Err(DbError::Unreachable {
                primary: primary_err.to_string(),
                fallback: fallback_err.to_string(),
            }),
        }
    }
}

async fn open(target: &ConnectionTarget, timeout: Duration) -> DbResult<Arc<dyn Database>> {
    match target {
        ConnectionTarget::Server { url } => {
            let db = PostgresBackend::connect(url, timeout).await?;
            db.ping().await?;
            Ok(Arc::new(db))
        }
        ConnectionTarget::Embedded { path } => {
            let db = DuckDbBackend::new(path)?;
            Ok(Arc::new(db))
        }
    }
}

#[cfg(test)]
#[path = "manager_test.rs"]
mod tests;
