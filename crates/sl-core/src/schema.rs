//! Schema model shared by the store introspection and the sanitizer.
//!
//! A [`Schema`] is a point-in-time snapshot of the relational store: table
//! names, their columns, and declared foreign keys. It also renders the
//! textual description embedded in synthesis prompts.

use crate::table_name::{normalize_key, TableName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// A single column of a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name
    pub name: String,

    /// Store-reported data type (e.g. `VARCHAR`, `integer`)
    pub data_type: String,
}

impl ColumnInfo {
    /// Create a new column description
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// A declared foreign-key relationship from one column to a parent table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Column on the child table
    pub column: String,

    /// Referenced (parent) table
    pub references_table: String,

    /// Referenced column on the parent table
    pub references_column: String,
}

/// One table of the schema snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaTable {
    /// Table name as reported by the store
    pub name: TableName,

    /// Columns in ordinal order
    #[serde(default)]
    pub columns: Vec<ColumnInfo>,

    /// Foreign keys declared on this table
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,

    /// Whether the table has a primary key or unique constraint.
    ///
    /// Conflict-ignoring inserts need one to be meaningful.
    #[serde(default)]
    pub has_unique_key: bool,
}

impl SchemaTable {
    /// Create a table entry with no columns or constraints
    pub fn new(name: impl Into<TableName>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            foreign_keys: Vec::new(),
            has_unique_key: false,
        }
    }

    /// Builder: attach columns
    pub fn with_columns(mut self, columns: Vec<ColumnInfo>) -> Self {
        self.columns = columns;
        self
    }

    /// Builder: attach foreign keys
    pub fn with_foreign_keys(mut self, foreign_keys: Vec<ForeignKey>) -> Self {
        self.foreign_keys = foreign_keys;
        self
    }

    /// Builder: mark the table as carrying a unique key
    pub fn with_unique_key(mut self, has_unique_key: bool) -> Self {
        self.has_unique_key = has_unique_key;
        self
    }

    /// Parent tables this table references, excluding self-references
    pub fn parents(&self) -> impl Iterator<Item = &str> {
        let own = self.name.key();
        self.foreign_keys
            .iter()
            .map(|fk| fk.references_table.as_str())
            .filter(move |parent| normalize_key(parent) != own)
    }
}

/// Snapshot of the store's tables, sorted by name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    tables: Vec<SchemaTable>,
}

impl Schema {
    /// Build a schema from a list of tables
    pub fn new(mut tables: Vec<SchemaTable>) -> Self {
        tables.sort_by_key(|a| a.name.key());
        tables.dedup_by(|a, b| a.name.key() == b.name.key());
        Self { tables }
    }

    /// A schema with no tables
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the store exposed no tables
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// All tables in name order
    pub fn tables(&self) -> &[SchemaTable] {
        &self.tables
    }

    /// Table names in name order
    pub fn table_names(&self) -> Vec<TableName> {
        self.tables.iter().map(|t| t.name.clone()).collect()
    }

    /// Look up a table case-insensitively
    pub fn get(&self, name: &str) -> Option<&SchemaTable> {
        let key = normalize_key(name);
        self.tables.iter().find(|t| t.name.key() == key)
    }

    /// Whether `name` is a table of this schema
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Build the sanitizer whitelist from the table names
    pub fn whitelist(&self) -> Whitelist {
        Whitelist::from_names(self.tables.iter().map(|t| t.name.as_str()))
    }

    /// Render the schema description embedded in synthesis prompts.
    ///
    /// Each table renders as a `name(` block listing `column TYPE` lines,
    /// followed by a `DATABASE RELATIONSHIPS:` section when any foreign key
    /// is declared.
    pub fn describe(&self) -> String {
        let mut out = String::from("Available tables in database:\n");
        if self.tables.is_empty() {
            out.push_str("(none)\n");
            return out;
        }

        for table in &self.tables {
            let _ = writeln!(out, "\n{}(", table.name);
            for col in &table.columns {
                let _ = writeln!(out, "  {} {},", col.name, col.data_type);
            }
            out.push_str(")\n");
        }

        let relationships: Vec<String> = self
            .tables
            .iter()
            .flat_map(|t| {
                t.foreign_keys.iter().map(move |fk| {
                    format!(
                        "{}.{} -> {}.{}",
                        t.name, fk.column, fk.references_table, fk.references_column
                    )
                })
            })
            .collect();

        if !relationships.is_empty() {
            out.push_str("\nDATABASE RELATIONSHIPS:\n");
            for rel in relationships {
                let _ = writeln!(out, "{}", rel);
            }
        }

        out
    }
}

/// Case-insensitive set of tables a statement may target
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Whitelist {
    /// comparison key -> canonical name as reported by the store
    names: BTreeMap<String, String>,
}

impl Whitelist {
    /// Build a whitelist from table names
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = names
            .into_iter()
            .map(|n| (normalize_key(n.as_ref()), n.as_ref().to_string()))
            .filter(|(key, _)| !key.is_empty())
            .collect();
        Self { names }
    }

    /// Whether `name` is whitelisted (case-insensitive, qualifier ignored)
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(&normalize_key(name))
    }

    /// Canonical store name for `name`, if whitelisted
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.names.get(&normalize_key(name)).map(String::as_str)
    }

    /// Number of whitelisted tables
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the whitelist admits nothing
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Canonical names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.values().map(String::as_str)
    }
}

#[cfg(test)]
#[path = "schema_test.rs"]
mod tests;
