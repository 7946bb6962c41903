//! Dependency orderer: parents before children

use serde::Serialize;
use sl_core::DependencyRanks;
use sl_sql::ValidatedStatement;

/// A validated statement with its execution rank (lower runs first)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderedStatement {
    #[serde(flatten)]
    pub statement: ValidatedStatement,
    pub rank: u32,
}

/// Sorts insert statements by the static rank table
pub struct DependencyOrderer<'a> {
    ranks: &'a DependencyRanks,
}

impl<'a> DependencyOrderer<'a> {
    pub fn new(ranks: &'a DependencyRanks) -> Self {
        Self { ranks }
    }

    /// Sort by (rank, original position). Unranked tables go last, in
    /// original order.
    pub fn order(&self, statements: Vec<ValidatedStatement>) -> Vec<OrderedStatement> {
        let mut ordered: Vec<OrderedStatement> = statements
            .into_iter()
            .map(|statement| OrderedStatement {
                rank: self.ranks.rank_of(&statement.table),
                statement,
            })
            .collect();
        ordered.sort_by_key(|o| (o.rank, o.statement.position));
        ordered
    }
}

#[cfg(test)]
#[path = "orderer_test.rs"]
mod tests;
