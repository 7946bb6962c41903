//! Store dialect capabilities.
//!
//! The two store families differ in how an insert ignores duplicates and how
//! a table is emptied. The backend picks its dialect once, at construction.

use regex::Regex;
use std::sync::OnceLock;

/// Store-specific SQL forms
pub trait StoreDialect: Send + Sync {
    /// Dialect identifier (`duckdb` or `postgres`)
    fn name(&self) -> &'static str;

    /// Rewrite an INSERT so that conflicting rows are skipped.
    ///
    /// The trailing terminator is dropped. Statements that already carry a
    /// duplicate-handling clause are returned unchanged.
    fn ignore_duplicates(&self, sql: &str) -> String;

    /// SQL that removes every row of `table`
    fn clear_table_sql(&self, table: &str) -> String;

    /// Quote an identifier
    fn quote_ident(&self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }
}

static DUPLICATE_CLAUSE_RE: OnceLock<Regex> = OnceLock::new();
static INSERT_INTO_RE: OnceLock<Regex> = OnceLock::new();
static RETURNING_RE: OnceLock<Regex> = OnceLock::new();

fn duplicate_clause_regex() -> &'static Regex {
    DUPLICATE_CLAUSE_RE.get_or_init(|| {
        Regex::new(r"(?i)\bON\s+CONFLICT\b|\bINSERT\s+OR\s+(IGNORE|REPLACE)\b").expect("valid regex")
    })
}

fn insert_into_regex() -> &'static Regex {
    INSERT_INTO_RE.get_or_init(|| Regex::new(r"(?i)^\s*INSERT\s+INTO\b").expect("valid regex"))
}

fn returning_regex() -> &'static Regex {
    // RETURNING followed by no quote up to the end, so a literal containing
    // the word is not mistaken for the clause.
    RETURNING_RE.get_or_init(|| Regex::new(r"(?is)\s+RETURNING\b[^']*$").expect("valid regex"))
}

/// Whether `sql` already contains an ON CONFLICT / OR IGNORE / OR REPLACE clause
pub fn has_duplicate_handling(sql: &str) -> bool {
    duplicate_clause_regex().is_match(sql)
}

fn strip_terminator(sql: &str) -> &str {
    sql.trim().trim_end_matches(';').trim_end()
}

/// Embedded file-backed store (DuckDB)
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedDialect;

impl StoreDialect for EmbeddedDialect {
    fn name(&self) -> &'static str {
        "duckdb"
    }

    fn ignore_duplicates(&self, sql: &str) -> String {
        let sql = strip_terminator(sql);
        if has_duplicate_handling(sql) {
            return sql.to_string();
        }
        insert_into_regex()
            .replace(sql, "INSERT OR IGNORE INTO")
            .into_owned()
    }

    fn clear_table_sql(&self, table: &str) -> String {
        format!("DELETE FROM {}", self.quote_ident(table))
    }
}

/// Server-backed store (PostgreSQL)
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerDialect;

impl StoreDialect for ServerDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn ignore_duplicates(&self, sql: &str) -> String {
        let sql = strip_terminator(sql);
        if has_duplicate_handling(sql) {
            return sql.to_string();
        }
        match returning_regex().find(sql) {
            Some(m) => format!(
                "{} ON CONFLICT DO NOTHING{}",
                &sql[..m.start()],
                &sql[m.start()..]
            ),
            None => format!("{} ON CONFLICT DO NOTHING", sql),
        }
    }

    fn clear_table_sql(&self, table: &str) -> String {
        format!("TRUNCATE TABLE {} CASCADE", self.quote_ident(table))
    }
}
