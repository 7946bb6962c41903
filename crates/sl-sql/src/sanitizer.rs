//! Statement sanitizer: the safety boundary between model output and the store.
//!
//! Every surviving statement starts with the pipeline's verb and targets a
//! whitelisted table. Anything else is dropped with a reason; dropping is
//! never an error.

use crate::clean::normalize_model_output;
use crate::dialect::SqlDialect;
use crate::extractor::{referenced_relations, target_table, RelationName};
use crate::split::split_statements;
use crate::verb::{first_keyword, Verb};
use serde::Serialize;
use sl_core::{TableName, Whitelist};
use std::fmt;

/// A statement that passed every gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedStatement {
    /// Statement text without terminator
    pub sql: String,

    pub verb: Verb,

    /// Target table, in the store's canonical spelling
    pub table: TableName,

    /// Original position among the candidate statements
    pub position: usize,
}

/// Why a candidate statement was discarded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DropReason {
    WrongVerb { expected: Verb, found: String },
    NoTargetTable,
    TableNotWhitelisted { table: String },
    SchemaNotAllowed { relation: String },
    RelationNotWhitelisted { relation: String },
    Unparseable { message: String },
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::WrongVerb { expected, found } if found.is_empty() => {
                write!(f, "expected {} statement", expected)
            }
            DropReason::WrongVerb { expected, found } => {
                write!(f, "expected {} statement, found {}", expected, found)
            }
            DropReason::NoTargetTable => f.write_str("no target table found"),
            DropReason::TableNotWhitelisted { table } => {
                write!(f, "table '{}' is not in the live schema", table)
            }
            DropReason::SchemaNotAllowed { relation } => {
                write!(f, "'{}' is outside the introspected schema", relation)
            }
            DropReason::RelationNotWhitelisted { relation } => {
                write!(f, "relation '{}' is not in the live schema", relation)
            }
            DropReason::Unparseable { message } => write!(f, "unparseable: {}", message),
        }
    }
}

/// A candidate statement that did not survive
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedStatement {
    pub statement: String,
    pub reason: DropReason,
}

/// Result of sanitizing one model response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SanitizeOutcome {
    /// Surviving statements in original order
    pub statements: Vec<ValidatedStatement>,
    pub dropped: Vec<DroppedStatement>,
}

impl SanitizeOutcome {
    /// Whether nothing survived
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

/// Verb and table gate for one pipeline direction
pub struct Sanitizer {
    verb: Verb,
    whitelist: Whitelist,
    dialect: Box<dyn SqlDialect>,
    strict_relations: bool,
}

impl Sanitizer {
    /// Create a sanitizer accepting `verb` statements on `whitelist` tables
    pub fn new(verb: Verb, whitelist: Whitelist, dialect: Box<dyn SqlDialect>) -> Self {
        Self {
            verb,
            whitelist,
            dialect,
            strict_relations: false,
        }
    }

    /// Also require every relation a statement reads to be whitelisted
    pub fn with_strict_relations(mut self, strict: bool) -> Self {
        self.strict_relations = strict;
        self
    }

    /// The verb this sanitizer accepts
    pub fn verb(&self) -> Verb {
        self.verb
    }

    /// Normalize, split and gate raw model output
    pub fn sanitize(&self, raw: &str) -> SanitizeOutcome {
        let cleaned = normalize_model_output(raw);
        let mut outcome = SanitizeOutcome::default();

        for candidate in split_statements(self.dialect.as_ref(), &cleaned) {
            match self.check(&candidate.text) {
                Ok(table) => outcome.statements.push(ValidatedStatement {
                    sql: candidate.text,
                    verb: self.verb,
                    table,
                    position: candidate.position,
                }),
                Err(reason) => {
                    log::debug!("Dropped statement ({}): {}", reason, candidate.text);
                    outcome.dropped.push(DroppedStatement {
                        statement: candidate.text,
                        reason,
                    });
                }
            }
        }

        outcome
    }

    fn check(&self, sql: &str) -> Result<TableName, DropReason> {
        if !self.verb.matches(sql) {
            return Err(DropReason::WrongVerb {
                expected: self.verb,
                found: first_keyword(sql),
            });
        }

        let table = target_table(self.dialect.as_ref(), self.verb, sql)
            .map_err(|e| DropReason::Unparseable {
                message: e.to_string(),
            })?
            .ok_or(DropReason::NoTargetTable)?;

        self.check_schema(&table)?;
        let canonical = self
            .whitelist
            .resolve(table.table())
            .ok_or_else(|| DropReason::TableNotWhitelisted {
                table: table.to_string(),
            })?;

        if self.strict_relations {
            let relations = referenced_relations(self.dialect.as_ref(), sql).map_err(|e| {
                DropReason::Unparseable {
                    message: e.to_string(),
                }
            })?;
            for relation in &relations {
                self.check_schema(relation)?;
                if !self.whitelist.contains(relation.table()) {
                    return Err(DropReason::RelationNotWhitelisted {
                        relation: relation.to_string(),
                    });
                }
            }
        }

        Ok(TableName::new(canonical))
    }

    /// The whitelist only covers the introspected schema, so a name may carry
    /// at most that schema as qualifier.
    fn check_schema(&self, name: &RelationName) -> Result<(), DropReason> {
        match name.qualifier() {
            [] => Ok(()),
            [schema] if schema.eq_ignore_ascii_case(self.dialect.default_schema()) => Ok(()),
            _ => Err(DropReason::SchemaNotAllowed {
                relation: name.to_string(),
            }),
        }
    }
}

#[cfg(test)]
#[path = "sanitizer_test.rs"]
mod tests;
