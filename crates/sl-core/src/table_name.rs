//! Strongly-typed table name wrapper.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// Name of a table in the relational store, kept in the case the store reports.
///
/// Table identity is case-insensitive everywhere in Sluice: the whitelist,
/// the rank table and the verification snapshots all compare through
/// [`TableName::key`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableName(String);

impl TableName {
    /// Create a new `TableName`, panicking in debug builds if the name is empty.
    ///
    /// Prefer [`try_new`](Self::try_new) when handling model output.
    pub fn new(name: impl Into<String>) -> Self {
        let s = name.into();
        debug_assert!(!s.is_empty(), "TableName must not be empty");
        Self(s)
    }

    /// Try to create a new `TableName`, returning `None` if the name is blank.
    pub fn try_new(name: impl Into<String>) -> Option<Self> {
        let s = name.into();
        if s.trim().is_empty() {
            None
        } else {
            Some(Self(s))
        }
    }

    /// Return the underlying name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the inner `String`.
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Lowercased, unquoted, unqualified form used for comparisons.
    pub fn key(&self) -> String {
        normalize_key(&self.0)
    }

    /// Case-insensitive comparison against another name.
    pub fn matches(&self, other: &str) -> bool {
        self.key() == normalize_key(other)
    }
}

/// Normalize a possibly quoted or schema-qualified name to its comparison key.
///
/// `"Public"."Departments"` and `departments` share the key `departments`.
pub fn normalize_key(name: &str) -> String {
    let last = name.rsplit('.').next().unwrap_or(name);
    last.trim()
        .trim_matches(|c| c == '"' || c == '`' || c == '[' || c == ']')
        .to_lowercase()
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TableName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for TableName {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl From<String> for TableName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TableName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<str> for TableName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for TableName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_name_display() {
        let name = TableName::new("departments");
        assert_eq!(format!("{}", name), "departments");
    }

    #[test]
    fn test_try_new_rejects_blank() {
        assert!(TableName::try_new("").is_none());
        assert!(TableName::try_new("   ").is_none());
        assert!(TableName::try_new("courses").is_some());
    }

    #[test]
    fn test_key_is_case_insensitive_and_unqualified() {
        assert_eq!(TableName::new("Departments").key(), "departments");
        assert_eq!(TableName::new("public.Courses").key(), "courses");
        assert_eq!(TableName::new("\"main\".\"FAQS\"").key(), "faqs");
    }

    #[test]
    fn test_matches() {
        let name = TableName::new("faculty_members");
        assert!(name.matches("FACULTY_MEMBERS"));
        assert!(name.matches("public.faculty_members"));
        assert!(!name.matches("faculty"));
    }

    #[test]
    fn test_serde_transparent() {
        let name = TableName::new("exams");
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"exams\"");
        let back: TableName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, name);
    }
}
