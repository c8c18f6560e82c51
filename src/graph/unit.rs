//! Dependency unit: one analyzed SQL file and its table facts.

use crate::scanner::{TableFacts, TableRef};

/// Index of a unit within its graph.
pub type UnitId = usize;

/// One source file with its extracted facts and computed relationships.
///
/// Relationship sets are populated by the graph during binding and never
/// change afterwards; `complete` is re-evaluated by each propagation run.
#[derive(Debug, Clone)]
pub struct DependencyUnit {
    /// Identity key: filename, unique within one graph
    pub name: String,
    /// Tables this file produces
    pub creates: Vec<String>,
    /// Tables this file reads, in reference order
    pub requires: Vec<TableRef>,
    /// Units that must run before this one
    pub depends_on: Vec<UnitId>,
    /// Units that need this one's output
    pub dependents: Vec<UnitId>,
    /// Required tables for which a producing unit was found
    pub resolved: Vec<String>,
    /// Required table names with no internal producer
    pub unresolved: Vec<String>,
    /// Tables this unit ultimately fails to obtain from anywhere,
    /// re-qualified with their schema prefix, longest name first
    pub missing: Vec<String>,
    /// Cleared by completeness propagation when a confirmed-missing table
    /// blocks this unit or anything it depends on
    pub complete: bool,
}

impl DependencyUnit {
    pub fn new(name: String, facts: TableFacts) -> Self {
        Self {
            name,
            creates: facts.creates,
            requires: facts.requires,
            depends_on: Vec::new(),
            dependents: Vec::new(),
            resolved: Vec::new(),
            unresolved: Vec::new(),
            missing: Vec::new(),
            complete: true,
        }
    }

    /// Should run first: nothing it requires is produced by another unit.
    pub fn is_base(&self) -> bool {
        self.depends_on.is_empty()
    }

    /// Should run last: no other unit requires its output.
    pub fn is_root(&self) -> bool {
        self.dependents.is_empty()
    }

    /// Single-node tree with no relationships at all.
    pub fn is_orphan(&self) -> bool {
        self.is_base() && self.is_root()
    }

    /// One drop statement per created table.
    pub fn drop_statements(&self) -> Vec<String> {
        self.creates
            .iter()
            .map(|table| format!("drop table {} ;", table))
            .collect()
    }

    /// Compute `unresolved` and `missing` once binding against every other
    /// unit has finished.
    ///
    /// `missing` is `unresolved` minus this unit's own `creates`, sorted
    /// longest name first (ties keep reference order), each entry carrying
    /// its schema prefix when the original reference had one.
    pub(crate) fn finalize_missing(&mut self) {
        self.unresolved.clear();
        for table_ref in &self.requires {
            if !self.resolved.contains(&table_ref.table)
                && !self.unresolved.contains(&table_ref.table)
            {
                self.unresolved.push(table_ref.table.clone());
            }
        }

        let mut missing: Vec<String> = self
            .unresolved
            .iter()
            .filter(|table| !self.creates.contains(table))
            .cloned()
            .collect();
        missing.sort_by(|a, b| b.len().cmp(&a.len()));

        self.missing = missing
            .into_iter()
            .map(|table| {
                self.requires
                    .iter()
                    .find(|r| r.table == table && r.schema.is_some())
                    .map(TableRef::qualified)
                    .unwrap_or(table)
            })
            .collect();
    }
}
