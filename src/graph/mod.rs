//! Dependency graph construction and queries
//!
//! Builds one [`DependencyUnit`] per analyzed file, binds pairwise
//! producer/consumer relationships, classifies roots and bases, aggregates
//! missing tables and runs completeness propagation. Duplicate producers
//! and dependency cycles are reported but never fatal: the first-seen
//! producer stays authoritative, and cycle edges are kept in both
//! directions, so every traversal guards against revisiting units.

mod unit;

pub use unit::{DependencyUnit, UnitId};

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::error::SqlDepError;
use crate::scanner::TableFacts;

/// The dependency forest over all analyzed files.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    units: Vec<DependencyUnit>,
    roots: Vec<UnitId>,
    bases: Vec<UnitId>,
    missing_tables: Vec<String>,
}

impl DependencyGraph {
    /// Build a graph from per-file facts: bind relationships, classify
    /// roots and bases, aggregate missing tables.
    pub fn from_facts(facts: Vec<(String, TableFacts)>) -> Self {
        let units = facts
            .into_iter()
            .map(|(name, facts)| DependencyUnit::new(name, facts))
            .collect();

        let mut graph = Self {
            units,
            ..Self::default()
        };
        graph.bind_relations();
        graph.classify();
        graph.aggregate_missing();
        graph
    }

    pub fn units(&self) -> &[DependencyUnit] {
        &self.units
    }

    pub fn unit(&self, id: UnitId) -> &DependencyUnit {
        &self.units[id]
    }

    pub fn unit_by_name(&self, name: &str) -> Option<&DependencyUnit> {
        self.units.iter().find(|u| u.name == name)
    }

    /// Units nothing else depends on, i.e. the last to run.
    pub fn root_ids(&self) -> &[UnitId] {
        &self.roots
    }

    /// Units with no internal dependency, i.e. safe to run first.
    pub fn base_ids(&self) -> &[UnitId] {
        &self.bases
    }

    pub fn roots(&self) -> impl Iterator<Item = &DependencyUnit> {
        self.roots.iter().map(|&id| &self.units[id])
    }

    pub fn bases(&self) -> impl Iterator<Item = &DependencyUnit> {
        self.bases.iter().map(|&id| &self.units[id])
    }

    /// Tables required somewhere but created by no analyzed file,
    /// deduplicated, longest name first.
    pub fn missing_tables(&self) -> &[String] {
        &self.missing_tables
    }

    /// Evaluate every unordered pair of units exactly once, then compute
    /// each unit's unresolved/missing sets.
    fn bind_relations(&mut self) {
        for left in 0..self.units.len() {
            for right in (left + 1)..self.units.len() {
                self.bind_pair(left, right);
            }
        }
        for unit in &mut self.units {
            unit.finalize_missing();
        }
    }

    /// Evaluate both directions of one pair and record the edges.
    ///
    /// Both directions holding at once is a dependency cycle: reported,
    /// and both edges are still recorded.
    fn bind_pair(&mut self, left: UnitId, right: UnitId) {
        debug!(
            left = %self.units[left].name,
            right = %self.units[right].name,
            "comparing units"
        );

        let left_needs_right = !self.units[left].depends_on.contains(&right)
            && self.resolve_direction(left, right);
        let right_needs_left = !self.units[right].depends_on.contains(&left)
            && self.resolve_direction(right, left);

        if left_needs_right && right_needs_left {
            warn!(
                left = %self.units[left].name,
                right = %self.units[right].name,
                "dependency cycle between units"
            );
        }

        if left_needs_right {
            self.units[left].depends_on.push(right);
            self.units[right].dependents.push(left);
        }
        if right_needs_left {
            self.units[right].depends_on.push(left);
            self.units[left].dependents.push(right);
        }
    }

    /// Does `consumer` depend on `producer`? Marks every matched table as
    /// resolved for the consumer; a table already resolved by a different
    /// producer is a duplicate-producer condition and the first producer
    /// stays authoritative.
    fn resolve_direction(&mut self, consumer: UnitId, producer: UnitId) -> bool {
        let matched: Vec<String> = self.units[producer]
            .creates
            .iter()
            .filter(|table| {
                self.units[consumer]
                    .requires
                    .iter()
                    .any(|r| &r.table == *table)
            })
            .cloned()
            .collect();

        let depends = !matched.is_empty();
        for table in matched {
            debug!(
                consumer = %self.units[consumer].name,
                producer = %self.units[producer].name,
                %table,
                "dependency found"
            );
            if self.units[consumer].resolved.contains(&table) {
                warn!(
                    %table,
                    producer = %self.units[producer].name,
                    consumer = %self.units[consumer].name,
                    "duplicate producer for table, keeping first"
                );
            } else {
                self.units[consumer].resolved.push(table);
            }
        }
        depends
    }

    fn classify(&mut self) {
        self.roots = (0..self.units.len())
            .filter(|&id| self.units[id].is_root())
            .collect();
        self.bases = (0..self.units.len())
            .filter(|&id| self.units[id].is_base())
            .collect();
    }

    fn aggregate_missing(&mut self) {
        let mut seen = HashSet::new();
        let mut missing: Vec<String> = Vec::new();
        for table in self.units.iter().flat_map(|u| &u.missing) {
            if seen.insert(table.clone()) {
                missing.push(table.clone());
            }
        }
        missing.sort_by(|a, b| b.len().cmp(&a.len()));
        self.missing_tables = missing;
    }

    /// Every unit creating `table`, discovered by walking `depends_on`
    /// edges down from each root. Safe in the presence of cycles.
    pub fn find_table(&self, table: &str) -> Vec<&DependencyUnit> {
        let mut visited = vec![false; self.units.len()];
        let mut found = Vec::new();
        let mut stack: Vec<UnitId> = self.roots.clone();

        while let Some(id) = stack.pop() {
            if visited[id] {
                continue;
            }
            visited[id] = true;
            let unit = &self.units[id];
            if unit.creates.iter().any(|t| t == table) {
                found.push(unit);
            }
            stack.extend(unit.depends_on.iter().copied());
        }
        found
    }

    /// Fixed-point completeness propagation.
    ///
    /// Given a caller-confirmed list of genuinely missing tables, clear
    /// `complete` on every unit whose own missing set names one of them,
    /// then on everything transitively depending on such a unit. The flag
    /// only ever flips true to false, so the loop is bounded by the unit
    /// count. May be re-run with a different list at any time.
    pub fn mark_incomplete(&mut self, confirmed: &[String]) {
        for _ in 0..=self.units.len() {
            let next: Vec<bool> = self
                .units
                .iter()
                .map(|unit| {
                    unit.complete
                        && !confirmed.iter().any(|c| unit.missing.contains(c))
                        && unit.depends_on.iter().all(|&dep| self.units[dep].complete)
                })
                .collect();

            let mut changed = false;
            for (unit, complete) in self.units.iter_mut().zip(next) {
                if unit.complete != complete {
                    unit.complete = complete;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
    }

    /// Reset every unit to `complete` so propagation can run fresh.
    pub fn reset_complete(&mut self) {
        for unit in &mut self.units {
            unit.complete = true;
        }
    }

    /// Bottleneck units: incomplete themselves while every direct
    /// dependency is complete. These are the files an operator should fix
    /// first to revive their subtrees.
    pub fn bottlenecks(&self) -> Vec<&DependencyUnit> {
        self.units
            .iter()
            .filter(|unit| {
                !unit.complete && unit.depends_on.iter().all(|&dep| self.units[dep].complete)
            })
            .collect()
    }

    /// Drop statements for every analyzed file.
    pub fn drop_statements_all(&self) -> Vec<String> {
        self.units
            .iter()
            .flat_map(|u| u.drop_statements())
            .collect()
    }

    /// Drop statements for every non-root file; final tables are kept.
    pub fn drop_statements_mid(&self) -> Vec<String> {
        self.units
            .iter()
            .filter(|u| !u.is_root())
            .flat_map(|u| u.drop_statements())
            .collect()
    }

    /// Drop statements for one named file.
    pub fn drop_statements_for(&self, name: &str) -> Result<Vec<String>, SqlDepError> {
        self.unit_by_name(name)
            .map(DependencyUnit::drop_statements)
            .ok_or_else(|| SqlDepError::UnknownFile {
                name: name.to_string(),
            })
    }
}
