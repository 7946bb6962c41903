//! Target table extraction.
//!
//! The verb gate only needs the table a statement targets, so extraction
//! works on the token stream and tolerates statements the full parser would
//! reject. The strict relation gate walks the AST instead.

use crate::dialect::SqlDialect;
use crate::error::SqlResult;
use crate::verb::Verb;
use sl_core::table_name::normalize_key;
use sqlparser::ast::{visit_relations, Query, Visit, Visitor};
use sqlparser::keywords::Keyword;
use sqlparser::tokenizer::Token;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::ops::ControlFlow;

/// Possibly qualified relation name, one entry per dotted part, unquoted
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RelationName(Vec<String>);

impl RelationName {
    /// Build from its dotted parts, outermost first
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    /// The unqualified table name
    pub fn table(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or("")
    }

    /// Schema (and catalog) parts in front of the table name
    pub fn qualifier(&self) -> &[String] {
        &self.0[..self.0.len().saturating_sub(1)]
    }
}

impl fmt::Display for RelationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// Table a statement targets: the name after `INTO` for inserts, the first
/// relation after a query-level `FROM` for selects.
///
/// Returns `Ok(None)` when no table can be found (e.g. `SELECT 1`).
pub fn target_table(
    dialect: &dyn SqlDialect,
    verb: Verb,
    sql: &str,
) -> SqlResult<Option<RelationName>> {
    let tokens = dialect.tokenize(sql)?;
    Ok(match verb {
        Verb::Insert => insert_target(&tokens),
        Verb::Select => select_source(&tokens),
    })
}

fn is_keyword(token: &Token, keyword: Keyword) -> bool {
    matches!(token, Token::Word(w) if w.keyword == keyword && w.quote_style.is_none())
}

/// Read a possibly dotted object name starting at `start`
fn object_name_at(tokens: &[Token], start: usize) -> Option<RelationName> {
    let mut parts = Vec::new();
    let mut i = start;
    loop {
        match tokens.get(i) {
            Some(Token::Word(w)) => parts.push(w.value.clone()),
            _ => return None,
        }
        if matches!(tokens.get(i + 1), Some(Token::Period)) {
            i += 2;
        } else {
            break;
        }
    }
    Some(RelationName(parts))
}

fn insert_target(tokens: &[Token]) -> Option<RelationName> {
    let into = tokens.iter().position(|t| is_keyword(t, Keyword::INTO))?;
    object_name_at(tokens, into + 1)
}

fn select_source(tokens: &[Token]) -> Option<RelationName> {
    // One entry per open paren: whether it opens a subquery. A FROM inside a
    // function call such as EXTRACT(YEAR FROM d) is not a relation.
    let mut scopes: Vec<bool> = vec![true];
    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::LParen => {
                let is_query = tokens
                    .get(i + 1)
                    .is_some_and(|t| is_keyword(t, Keyword::SELECT) || is_keyword(t, Keyword::WITH));
                scopes.push(is_query);
            }
            Token::RParen => {
                if scopes.len() > 1 {
                    scopes.pop();
                }
            }
            t if is_keyword(t, Keyword::FROM) && scopes.last() == Some(&true) => {
                // `FROM (` is a derived table; keep scanning into it
                if let Some(name) = object_name_at(tokens, i + 1) {
                    return Some(name);
                }
            }
            _ => {}
        }
    }
    None
}

/// Collects CTE names so they are not mistaken for stored tables
#[derive(Default)]
struct CteNames(HashSet<String>);

impl Visitor for CteNames {
    type Break = ();

    fn pre_visit_query(&mut self, query: &Query) -> ControlFlow<Self::Break> {
        if let Some(with) = &query.with {
            for cte in &with.cte_tables {
                self.0.insert(cte.alias.name.value.to_lowercase());
            }
        }
        ControlFlow::Continue(())
    }
}

/// Every stored relation `sql` reads from, CTE names excluded, sorted
pub fn referenced_relations(
    dialect: &dyn SqlDialect,
    sql: &str,
) -> SqlResult<Vec<RelationName>> {
    let statements = dialect.parse(sql)?;

    let mut ctes = CteNames::default();
    for stmt in &statements {
        let _ = stmt.visit(&mut ctes);
    }

    let mut relations = BTreeSet::new();
    for stmt in &statements {
        let _ = visit_relations(stmt, |relation| {
            let name = RelationName::new(relation.0.iter().map(|part| match part.as_ident() {
                Some(ident) => ident.value.clone(),
                None => part.to_string(),
            }));
            let is_cte =
                name.qualifier().is_empty() && ctes.0.contains(&normalize_key(name.table()));
            if !is_cte {
                relations.insert(name);
            }
            ControlFlow::<()>::Continue(())
        });
    }

    Ok(relations.into_iter().collect())
}

#[cfg(test)]
#[path = "extractor_test.rs"]
mod tests;
