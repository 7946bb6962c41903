//! Prompt profiles
//!
//! Two independent configurations: `Retrieval` steers toward forgiving,
//! case-insensitive pattern matching so misspelled terms still find rows;
//! `Ingestion` steers toward resolving foreign keys through subqueries.

use crate::error::LlmResult;
use crate::model::ChatMessage;
use minijinja::{context, Environment};
use serde::Serialize;
use std::fmt;

/// Which pipeline direction a prompt is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptProfile {
    /// SELECT generation for the read path
    Retrieval,
    /// INSERT generation for the write path
    Ingestion,
}

impl PromptProfile {
    /// The only statement verb this profile asks for
    pub fn verb(&self) -> &'static str {
        match self {
            PromptProfile::Retrieval => "SELECT",
            PromptProfile::Ingestion => "INSERT",
        }
    }

    fn system_template(&self) -> &'static str {
        match self {
            PromptProfile::Retrieval => "retrieval_system",
            PromptProfile::Ingestion => "ingestion_system",
        }
    }

    fn user_template(&self) -> &'static str {
        match self {
            PromptProfile::Retrieval => "retrieval_user",
            PromptProfile::Ingestion => "ingestion_user",
        }
    }
}

impl fmt::Display for PromptProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptProfile::Retrieval => f.write_str("retrieval"),
            PromptProfile::Ingestion => f.write_str("ingestion"),
        }
    }
}

const RETRIEVAL_SYSTEM: &str = r#"You are a {{ dialect }} expert. Generate read-only SELECT queries that answer the user's question.

{{ schema }}

CRITICAL RULES:
1. ONLY generate SELECT statements, and ONLY for the tables listed below.
2. Return ONLY SQL statements, no markdown or explanations.
3. Users misspell and abbreviate. Match text with ILIKE (or LOWER(column) LIKE LOWER(...)) and '%' wildcards around the most distinctive part of each term, never with exact equality.
4. Always add LIMIT 5 to LIMIT 10.
5. Never return raw id columns; select human-readable columns instead.
6. Prefer simple joins with explicit ON when the question spans tables.
7. Never modify data (no INSERT, UPDATE, DELETE, DROP).
8. Separate multiple queries with semicolons.

Available tables: {{ tables | join(", ") }}

Example:
Question: "math departmant"
SQL: SELECT name, description FROM departments WHERE name ILIKE '%math%' LIMIT 5;
"#;

const RETRIEVAL_USER: &str = r#"Question: {{ input }}
{%- if context %}
Context: {{ context }}
{%- endif %}

Generate SELECT queries:"#;

const INGESTION_SYSTEM: &str = r#"You are a {{ dialect }} expert. Generate INSERT queries from unstructured text.

{{ schema }}

CRITICAL RULES:
1. ONLY generate INSERT statements, and ONLY for the tables listed below.
2. Return ONLY SQL statements, no markdown or explanations.
3. Resolve foreign keys with subqueries: (SELECT id FROM table WHERE condition LIMIT 1).
4. Insert parent rows before the rows that reference them.
5. Use single quotes for strings and double them to escape ('').
6. Dates as 'YYYY-MM-DD', times as 'HH:MM:SS'.
7. Separate multiple records with semicolons.
8. Use NULL when the text has no value for a column.

Available tables: {{ tables | join(", ") }}

Example:
Text: "Computer Science dept in Building A, email cs@uni.edu"
SQL: INSERT INTO departments (name, office_location, contact_email) VALUES ('Computer Science', 'Building A', 'cs@uni.edu');
"#;

const INGESTION_USER: &str = r#"Text: {{ input }}
{%- if source %}
File: {{ source }}
{%- endif %}
{%- if context %}
Context: {{ context }}
{%- endif %}

Generate INSERT queries:"#;

/// Values substituted into a profile's templates
#[derive(Debug, Clone, Default, Serialize)]
pub struct PromptInput<'a> {
    /// Natural-language question or extracted document text
    pub input: &'a str,

    /// Optional free-text context
    pub context: Option<&'a str>,

    /// Originating file name (write path)
    pub source: Option<&'a str>,

    /// Rendered schema description
    pub schema: &'a str,

    /// Whitelisted table names
    pub tables: Vec<&'a str>,

    /// Store dialect identifier (`postgres`, `duckdb`); empty for generic SQL
    pub dialect: &'a str,
}

/// Product name of a store dialect as it appears in the prompt
fn dialect_label(dialect: &str) -> &str {
    match dialect.to_ascii_lowercase().as_str() {
        "" => "SQL",
        "postgres" | "postgresql" => "PostgreSQL",
        "duckdb" => "DuckDB",
        _ => dialect,
    }
}

/// Compiled prompt templates for both profiles
pub struct PromptSet {
    env: Environment<'static>,
}

impl PromptSet {
    pub fn new() -> LlmResult<Self> {
        let mut env = Environment::new();
        env.add_template("retrieval_system", RETRIEVAL_SYSTEM)?;
        env.add_template("retrieval_user", RETRIEVAL_USER)?;
        env.add_template("ingestion_system", INGESTION_SYSTEM)?;
        env.add_template("ingestion_user", INGESTION_USER)?;
        Ok(Self { env })
    }

    /// Render the system and user messages for `profile`
    pub fn render(&self, profile: PromptProfile, input: &PromptInput<'_>) -> LlmResult<Vec<ChatMessage>> {
        let ctx = context! {
            input => input.input.trim(),
            context => input.context.map(str::trim).filter(|c| !c.is_empty()),
            source => input.source,
            schema => input.schema,
            tables => &input.tables,
            dialect => dialect_label(input.dialect),
        };

        let system = self.env.get_template(profile.system_template())?.render(&ctx)?;
        let user = self.env.get_template(profile.user_template())?.render(&ctx)?;

        Ok(vec![ChatMessage::system(system), ChatMessage::user(user)])
    }
}

#[cfg(test)]
#[path = "prompts_test.rs"]
mod tests;
