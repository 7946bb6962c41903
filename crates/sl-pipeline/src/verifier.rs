//! Row-count verification
//!
//! Observed counts, not driver-reported affected rows, decide whether a
//! write batch did anything. Concurrent writers to the same store can skew
//! the deltas; no attempt is made to correct for that.

use crate::executor::ExecutionOutcome;
use crate::report::{TableDelta, VerificationWarning};
use serde::Serialize;
use sl_core::table_name::normalize_key;
use sl_core::TableName;
use sl_db::Database;
use std::collections::BTreeMap;

/// Row count per table at one moment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RowCountSnapshot {
    counts: BTreeMap<String, i64>,
}

impl RowCountSnapshot {
    /// Count every table in `tables`. Tables that cannot be counted are
    /// left out and show up as missing in the comparison.
    pub async fn capture(db: &dyn Database, tables: &[TableName]) -> Self {
        let mut counts = BTreeMap::new();
        for table in tables {
            match db.row_count(table).await {
                Ok(n) => {
                    counts.insert(table.to_string(), n);
                }
                Err(e) => log::warn!("Could not count rows of {}: {}", table, e),
            }
        }
        Self { counts }
    }

    pub fn get(&self, table: &str) -> Option<i64> {
        self.counts.get(table).copied()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<S: Into<String>> FromIterator<(S, i64)> for RowCountSnapshot {
    fn from_iter<T: IntoIterator<Item = (S, i64)>>(iter: T) -> Self {
        Self {
            counts: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Before/after comparison for one write batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    pub tables: BTreeMap<String, TableDelta>,
    pub warnings: Vec<VerificationWarning>,
}

impl VerificationReport {
    /// Whether any table grew
    pub fn any_inserted(&self) -> bool {
        self.tables.values().any(|d| d.inserted > 0)
    }

    /// Sum of positive deltas
    pub fn total_inserted(&self) -> i64 {
        self.tables.values().map(|d| d.inserted.max(0)).sum()
    }
}

/// Compares snapshots and flags statements the counts do not back up
pub struct Verifier;

impl Verifier {
    /// Build the report from two snapshots and the attempted statements,
    /// each paired with its target table.
    pub fn compare(
        before: &RowCountSnapshot,
        after: &RowCountSnapshot,
        attempted: &[(&str, &ExecutionOutcome)],
    ) -> VerificationReport {
        let mut report = VerificationReport::default();

        for (table, count_before) in before.iter() {
            let Some(count_after) = after.get(table) else {
                continue;
            };
            let delta = TableDelta::new(count_before, count_after);
            if delta.inserted > 0 {
                log::info!(
                    "{}: {} -> {} (+{})",
                    table,
                    delta.before,
                    delta.after,
                    delta.inserted
                );
            } else {
                log::debug!("{}: {} (no change)", table, delta.after);
            }
            report.tables.insert(table.to_string(), delta);
        }

        for (table, outcome) in attempted {
            if !outcome.success {
                continue;
            }
            let key = normalize_key(table);
            let grew = report
                .tables
                .iter()
                .find(|(name, _)| normalize_key(name) == key)
                .map(|(_, d)| d.inserted > 0);
            if grew != Some(true) {
                let warning = VerificationWarning {
                    table: table.to_string(),
                    statement: outcome.statement.clone(),
                    message: match grew {
                        Some(_) => "statement succeeded but the row count did not change".to_string(),
                        None => "statement succeeded but the table could not be counted".to_string(),
                    },
                };
                log::warn!("Verification mismatch on {}: {}", warning.table, warning.message);
                report.warnings.push(warning);
            }
        }

        report
    }
}

#[cfg(test)]
#[path = "verifier_test.rs"]
mod tests;
