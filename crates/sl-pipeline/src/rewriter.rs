//! Idempotency rewriter

use crate::orderer::OrderedStatement;
use sl_core::table_name::normalize_key;
use sl_core::Schema;
use sl_db::StoreDialect;
use std::collections::HashSet;

/// Rewrites inserts into the store's ignore-on-conflict form.
///
/// Only tables with a PRIMARY KEY or UNIQUE constraint are rewritten; for
/// the rest there is no conflict to ignore.
pub struct IdempotencyRewriter<'a> {
    dialect: &'a dyn StoreDialect,
    keyed_tables: HashSet<String>,
}

impl<'a> IdempotencyRewriter<'a> {
    pub fn new<I, S>(dialect: &'a dyn StoreDialect, keyed_tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            dialect,
            keyed_tables: keyed_tables
                .into_iter()
                .map(|t| normalize_key(t.as_ref()))
                .collect(),
        }
    }

    /// Rewriter for every keyed table in `schema`
    pub fn from_schema(dialect: &'a dyn StoreDialect, schema: &Schema) -> Self {
        Self::new(
            dialect,
            schema
                .tables()
                .iter()
                .filter(|t| t.has_unique_key)
                .map(|t| t.name.as_str()),
        )
    }

    /// Rewrite one statement in place
    pub fn rewrite(&self, mut statement: OrderedStatement) -> OrderedStatement {
        if self.keyed_tables.contains(&statement.statement.table.key()) {
            statement.statement.sql = self.dialect.ignore_duplicates(&statement.statement.sql);
        } else {
            log::debug!(
                "No unique key on {}, leaving insert unchanged",
                statement.statement.table
            );
        }
        statement
    }

    pub fn rewrite_all(&self, statements: Vec<OrderedStatement>) -> Vec<OrderedStatement> {
        statements.into_iter().map(|s| self.rewrite(s)).collect()
    }
}

#[cfg(test)]
#[path = "rewriter_test.rs"]
mod tests;
