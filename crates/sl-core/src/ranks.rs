//! Static dependency ranks for write ordering.
//!
//! Parent tables get lower ranks than the tables that reference them, so a
//! stable sort by rank executes parents first. Tables absent from the rank
//! table receive [`UNRANKED`] and run last, in their original order.

use crate::error::{CoreError, CoreResult};
use crate::schema::Schema;
use crate::table_name::{normalize_key, TableName};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

/// Rank given to tables missing from the rank table
pub const UNRANKED: u32 = u32::MAX;

/// Table name -> rank mapping, compared case-insensitively
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, u32>", into = "BTreeMap<String, u32>")]
pub struct DependencyRanks {
    ranks: BTreeMap<String, u32>,
}

/// A foreign key whose parent does not rank strictly before its child
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankViolation {
    pub child: String,
    pub child_rank: u32,
    pub parent: String,
    pub parent_rank: u32,
}

impl fmt::Display for RankViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (rank {}) references {} (rank {}) but the parent does not rank first",
            self.child,
            display_rank(self.child_rank),
            self.parent,
            display_rank(self.parent_rank)
        )
    }
}

fn display_rank(rank: u32) -> String {
    if rank == UNRANKED {
        "unranked".to_string()
    } else {
        rank.to_string()
    }
}

impl From<BTreeMap<String, u32>> for DependencyRanks {
    fn from(map: BTreeMap<String, u32>) -> Self {
        Self::new(map)
    }
}

impl From<DependencyRanks> for BTreeMap<String, u32> {
    fn from(ranks: DependencyRanks) -> Self {
        ranks.ranks
    }
}

impl Default for DependencyRanks {
    fn default() -> Self {
        Self::university()
    }
}

impl DependencyRanks {
    /// Build a rank table from `(table, rank)` pairs
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: AsRef<str>,
    {
        let ranks = entries
            .into_iter()
            .map(|(name, rank)| (normalize_key(name.as_ref()), rank))
            .collect();
        Self { ranks }
    }

    /// A rank table with no entries; every table is unranked
    pub fn empty() -> Self {
        Self {
            ranks: BTreeMap::new(),
        }
    }

    /// The built-in rank table for the university catalog schema
    pub fn university() -> Self {
        Self::new([
            ("departments", 1),
            ("programs", 2),
            ("courses", 3),
            ("exams", 4),
            ("faculty_members", 5),
            ("admissions", 6),
            ("academic_calendar", 7),
            ("faqs", 7),
            ("campus_services", 7),
            ("student_clubs", 7),
        ])
    }

    /// Rank of `table`, or [`UNRANKED`] when absent
    pub fn rank_of(&self, table: &str) -> u32 {
        self.ranks
            .get(&normalize_key(table))
            .copied()
            .unwrap_or(UNRANKED)
    }

    /// Whether `table` has an explicit rank
    pub fn is_ranked(&self, table: &str) -> bool {
        self.ranks.contains_key(&normalize_key(table))
    }

    /// Number of ranked tables
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    /// Whether no table is ranked
    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    /// Entries ordered by rank, then name
    pub fn entries(&self) -> Vec<(&str, u32)> {
        let mut entries: Vec<(&str, u32)> =
            self.ranks.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        entries.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    /// Overlay `overrides` on top of this table; overriding entries win
    pub fn merged_with(mut self, overrides: &DependencyRanks) -> Self {
        for (name, rank) in &overrides.ranks {
            self.ranks.insert(name.clone(), *rank);
        }
        self
    }

    /// Derive ranks from the schema's foreign-key graph.
    ///
    /// Roots get rank 1; every other table gets one more than its highest
    /// ranked parent. References to tables outside the schema and
    /// self-references are ignored.
    pub fn from_foreign_keys(schema: &Schema) -> CoreResult<Self> {
        let mut graph: DiGraph<String, ()> = DiGraph::new();
        let mut nodes: HashMap<String, NodeIndex> = HashMap::new();

        for table in schema.tables() {
            let key = table.name.key();
            let idx = graph.add_node(key.clone());
            nodes.insert(key, idx);
        }

        for table in schema.tables() {
            let child = nodes[&table.name.key()];
            for parent in table.parents() {
                if let Some(&parent_idx) = nodes.get(&normalize_key(parent)) {
                    graph.update_edge(parent_idx, child, ());
                }
            }
        }

        let order = toposort(&graph, None).map_err(|cycle| CoreError::CircularDependency {
            cycle: find_cycle_path(&graph, cycle.node_id()),
        })?;

        let mut ranks: HashMap<NodeIndex, u32> = HashMap::new();
        for idx in order {
            let rank = graph
                .edges_directed(idx, petgraph::Direction::Incoming)
                .filter_map(|e| ranks.get(&e.source()).copied())
                .max()
                .map_or(1, |r| r + 1);
            ranks.insert(idx, rank);
        }

        Ok(Self {
            ranks: ranks
                .into_iter()
                .map(|(idx, rank)| (graph[idx].clone(), rank))
                .collect(),
        })
    }

    /// Foreign keys in `schema` whose parent does not rank before the child.
    ///
    /// Used as a startup consistency check between the static rank table and
    /// the live schema.
    pub fn violations(&self, schema: &Schema) -> Vec<RankViolation> {
        let mut out = Vec::new();
        for table in schema.tables() {
            let child_rank = self.rank_of(&table.name);
            for parent in table.parents() {
                if !schema.contains(parent) {
                    continue;
                }
                let parent_rank = self.rank_of(parent);
                if parent_rank >= child_rank {
                    out.push(RankViolation {
                        child: table.name.to_string(),
                        child_rank,
                        parent: parent.to_string(),
                        parent_rank,
                    });
                }
            }
        }
        out
    }

    /// Order tables children-first (highest rank first) for destructive
    /// maintenance; ties keep name order.
    pub fn children_first(&self, tables: &[TableName]) -> Vec<TableName> {
        let mut sorted = tables.to_vec();
        sorted.sort_by(|a, b| {
            self.rank_of(b)
                .cmp(&self.rank_of(a))
                .then_with(|| a.key().cmp(&b.key()))
        });
        sorted
    }
}

fn find_cycle_path(graph: &DiGraph<String, ()>, start: NodeIndex) -> String {
    let mut path = vec![graph[start].clone()];
    let mut current = start;
    let mut visited = HashSet::new();
    visited.insert(current);

    while let Some(edge) = graph.edges(current).next() {
        let target = edge.target();
        path.push(graph[target].clone());

        if target == start || visited.contains(&target) {
            break;
        }

        visited.insert(target);
        current = target;
    }

    path.join(" -> ")
}

#[cfg(test)]
#[path = "ranks_test.rs"]
mod tests;
