//! Statement verbs accepted by the pipelines.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The single verb a pipeline direction accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verb {
    /// Read path
    Select,
    /// Write path
    Insert,
}

impl Verb {
    /// SQL keyword for this verb
    pub fn keyword(&self) -> &'static str {
        match self {
            Verb::Select => "SELECT",
            Verb::Insert => "INSERT",
        }
    }

    /// Whether the first token of `statement` is this verb (case-insensitive)
    pub fn matches(&self, statement: &str) -> bool {
        first_keyword(statement).eq_ignore_ascii_case(self.keyword())
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Leading word of a statement, uppercased; empty when it starts with a symbol
pub fn first_keyword(statement: &str) -> String {
    statement
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect::<String>()
        .to_ascii_uppercase()
}
