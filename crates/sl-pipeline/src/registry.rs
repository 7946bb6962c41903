//! Schema registry: the live store's tables, read fresh on every run

use sl_core::{Schema, SchemaTable, TableName};
use sl_db::Database;

/// Introspects the live store. Holds no cache; every call asks the store.
pub struct SchemaRegistry<'a> {
    db: &'a dyn Database,
}

impl<'a> SchemaRegistry<'a> {
    pub fn new(db: &'a dyn Database) -> Self {
        Self { db }
    }

    /// Current table names. An introspection failure yields an empty list,
    /// so nothing is whitelisted.
    pub async fn tables(&self) -> Vec<TableName> {
        match self.db.existing_tables().await {
            Ok(tables) => tables,
            Err(e) => {
                log::warn!("Table introspection failed, treating schema as empty: {}", e);
                Vec::new()
            }
        }
    }

    /// Tables with columns, foreign keys and unique-key flags.
    ///
    /// A table whose details cannot be read is still listed with empty
    /// columns; names alone decide the whitelist.
    pub async fn snapshot(&self) -> Schema {
        let mut tables = Vec::new();
        for name in self.tables().await {
            let columns = self.db.table_columns(&name).await.unwrap_or_else(|e| {
                log::warn!("Could not read columns of {}: {}", name, e);
                Vec::new()
            });
            let foreign_keys = self.db.foreign_keys(&name).await.unwrap_or_else(|e| {
                log::warn!("Could not read foreign keys of {}: {}", name, e);
                Vec::new()
            });
            let unique = self.db.has_unique_key(&name).await.unwrap_or_else(|e| {
                log::warn!("Could not read constraints of {}: {}", name, e);
                false
            });
            tables.push(
                SchemaTable::new(name)
                    .with_columns(columns)
                    .with_foreign_keys(foreign_keys)
                    .with_unique_key(unique),
            );
        }
        let schema = Schema::new(tables);
        log::debug!(
            "Schema snapshot from {}: {} tables",
            self.db.describe_target(),
            schema.tables().len()
        );
        schema
    }

    /// Prompt-ready schema block
    pub async fn describe(&self) -> String {
        self.snapshot().await.describe()
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
