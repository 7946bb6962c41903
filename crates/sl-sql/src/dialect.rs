//! SQL dialect abstraction

use sqlparser::ast::Statement;
use sqlparser::dialect::{
    Dialect, DuckDbDialect as SqlParserDuckDb, PostgreSqlDialect as SqlParserPostgres,
};
use sqlparser::parser::Parser;
use sqlparser::tokenizer::{Token, TokenWithSpan, Tokenizer};

use crate::error::{SqlError, SqlResult};

/// Trait for SQL dialect implementations
pub trait SqlDialect: Send + Sync {
    /// Get the underlying sqlparser dialect
    fn parser_dialect(&self) -> &dyn Dialect;

    /// Parse SQL into AST statements
    fn parse(&self, sql: &str) -> SqlResult<Vec<Statement>> {
        if sql.trim().is_empty() {
            return Err(SqlError::EmptySql);
        }
        Parser::parse_sql(self.parser_dialect(), sql).map_err(|e| {
            let msg = e.to_string();
            let (line, column) = parse_location_from_error(&msg);
            SqlError::ParseError {
                message: msg,
                line,
                column,
            }
        })
    }

    /// Dialect whose lexical rules match the store's own lexer.
    ///
    /// Statement boundaries are decided with this dialect, so it must agree
    /// with the store on where literals, quoted identifiers and comments end.
    fn lexer_dialect(&self) -> &dyn Dialect {
        self.parser_dialect()
    }

    /// Tokenize SQL with source spans, keeping whitespace and comments
    fn lex(&self, sql: &str) -> SqlResult<Vec<TokenWithSpan>> {
        Tokenizer::new(self.lexer_dialect(), sql)
            .tokenize_with_location()
            .map_err(|e| SqlError::TokenizeError(e.to_string()))
    }

    /// Tokenize SQL, dropping whitespace and comments
    fn tokenize(&self, sql: &str) -> SqlResult<Vec<Token>> {
        Ok(self
            .lex(sql)?
            .into_iter()
            .map(|t| t.token)
            .filter(|t| !matches!(t, Token::Whitespace(_)))
            .collect())
    }

    /// Schema that holds the tables the store introspects
    fn default_schema(&self) -> &'static str;

    /// Get the dialect name
    fn name(&self) -> &'static str;
}

/// Parse line and column from a sqlparser error message.
///
/// `ParserError` is a string wrapper with no structured location, so
/// "Line: N, Column: M" is read back from the text.
fn parse_location_from_error(msg: &str) -> (usize, usize) {
    let number_after = |label: &str| -> Option<usize> {
        let start = msg.find(label)? + label.len();
        let digits: String = msg[start..]
            .chars()
            .skip_while(|c| c.is_whitespace())
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.parse().ok()
    };
    match (number_after("Line:"), number_after("Column:")) {
        (Some(line), Some(column)) => (line, column),
        _ => (0, 0),
    }
}

/// DuckDB SQL dialect (embedded store)
///
/// DuckDB's lexer is derived from PostgreSQL's: `E'...'` escape strings,
/// `$$` bodies and nested block comments all lex the PostgreSQL way, which
/// the sqlparser DuckDB dialect does not model. Lexing therefore uses the
/// PostgreSQL rules while parsing keeps the DuckDB grammar.
pub struct DuckDbDialect {
    dialect: SqlParserDuckDb,
    lexer: SqlParserPostgres,
}

impl DuckDbDialect {
    /// Create a new DuckDB dialect
    pub fn new() -> Self {
        Self {
            dialect: SqlParserDuckDb {},
            lexer: SqlParserPostgres {},
        }
    }
}

impl Default for DuckDbDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlDialect for DuckDbDialect {
    fn parser_dialect(&self) -> &dyn Dialect {
        &self.dialect
    }

    fn lexer_dialect(&self) -> &dyn Dialect {
        &self.lexer
    }

    fn default_schema(&self) -> &'static str {
        "main"
    }

    fn name(&self) -> &'static str {
        "duckdb"
    }
}

/// PostgreSQL SQL dialect (server store)
pub struct PostgresDialect {
    dialect: SqlParserPostgres,
}

impl PostgresDialect {
    /// Create a new PostgreSQL dialect
    pub fn new() -> Self {
        Self {
            dialect: SqlParserPostgres {},
        }
    }
}

impl Default for PostgresDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlDialect for PostgresDialect {
    fn parser_dialect(&self) -> &dyn Dialect {
        &self.dialect
    }

    fn default_schema(&self) -> &'static str {
        "public"
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}

/// Parser dialect matching a store dialect name (`duckdb` or `postgres`)
pub fn for_store(name: &str) -> Box<dyn SqlDialect> {
    match name {
        "postgres" | "postgresql" => Box::new(PostgresDialect::new()),
        _ => Box::new(DuckDbDialect::new()),
    }
}

#[cfg(test)]
#[path = "dialect_test.rs"]
mod tests;
