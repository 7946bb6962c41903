//! Statement splitting on `;` terminators.
//!
//! Splitting runs on the dialect's lexer, so a terminator only splits where
//! the store itself would end a statement: never inside a string literal
//! (including `E'...'` and `$$` bodies), a quoted identifier or a comment.
//! Comments are removed from the emitted text.

use crate::dialect::SqlDialect;
use crate::error::SqlResult;
use sqlparser::tokenizer::{Location, Token, Whitespace};

/// Raw statement text before any validation. Never executed directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateStatement {
    /// Trimmed statement text without the terminator
    pub text: String,

    /// Zero-based index among the non-empty fragments
    pub position: usize,
}

/// Split `sql` into trimmed, non-empty candidate statements.
///
/// Text the lexer rejects (an unterminated literal, say) comes back as one
/// candidate holding the whole input; the verb and table gates then drop it
/// as unparseable.
pub fn split_statements(dialect: &dyn SqlDialect, sql: &str) -> Vec<CandidateStatement> {
    let fragments = match lex_fragments(dialect, sql) {
        Ok(fragments) => fragments,
        Err(e) => {
            log::debug!("Could not split model output: {}", e);
            vec![sql.to_string()]
        }
    };

    fragments
        .into_iter()
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .enumerate()
        .map(|(position, text)| CandidateStatement { text, position })
        .collect()
}

/// Number of non-empty statements the store would see in `sql`
pub fn count_statements(dialect: &dyn SqlDialect, sql: &str) -> SqlResult<usize> {
    Ok(lex_fragments(dialect, sql)?
        .iter()
        .filter(|f| !f.trim().is_empty())
        .count())
}

fn lex_fragments(dialect: &dyn SqlDialect, sql: &str) -> SqlResult<Vec<String>> {
    let tokens = dialect.lex(sql)?;
    let source = SourceMap::new(sql);

    let mut fragments = Vec::new();
    let mut current = String::new();
    for token in tokens {
        match token.token {
            Token::SemiColon => fragments.push(std::mem::take(&mut current)),
            Token::Whitespace(Whitespace::SingleLineComment { .. }) => current.push('\n'),
            Token::Whitespace(Whitespace::MultiLineComment(_)) => current.push(' '),
            Token::EOF => {}
            _ => current.push_str(source.slice(token.span.start, token.span.end)),
        }
    }
    fragments.push(current);
    Ok(fragments)
}

/// Maps tokenizer locations (1-based line and character column) back to
/// byte offsets in the source text.
struct SourceMap<'a> {
    sql: &'a str,
    /// Byte offset of every char, plus one past the end
    char_offsets: Vec<usize>,
    /// Char index at which each line starts
    line_starts: Vec<usize>,
}

impl<'a> SourceMap<'a> {
    fn new(sql: &'a str) -> Self {
        let mut char_offsets = Vec::with_capacity(sql.len() + 1);
        let mut line_starts = vec![0];
        for (index, (offset, c)) in sql.char_indices().enumerate() {
            char_offsets.push(offset);
            if c == '\n' {
                line_starts.push(index + 1);
            }
        }
        char_offsets.push(sql.len());
        Self {
            sql,
            char_offsets,
            line_starts,
        }
    }

    fn offset(&self, location: Location) -> usize {
        let line = (location.line as usize).saturating_sub(1);
        let column = (location.column as usize).saturating_sub(1);
        self.line_starts
            .get(line)
            .and_then(|start| self.char_offsets.get(start + column))
            .copied()
            .unwrap_or(self.sql.len())
    }

    fn slice(&self, start: Location, end: Location) -> &'a str {
        let from = self.offset(start);
        let to = self.offset(end).max(from);
        let sql: &'a str = self.sql;
        &sql[from..to]
    }
}

#[cfg(test)]
#[path = "split_test.rs"]
mod tests;
