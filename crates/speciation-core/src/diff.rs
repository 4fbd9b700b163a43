//! Differences between two consecutive lineage snapshots.
//!
//! The caller keeps the previous snapshot and passes it in explicitly;
//! nothing is cached between calls.

use serde::Serialize;
use speciation_types::{LineageCode, LineageNode};

use crate::ingest::{LineageIndex, last_occurrence_mask};

/// Population of one lineage in both snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PopulationChange {
    /// The lineage.
    pub code: LineageCode,
    /// Population in the previous snapshot.
    pub previous: u64,
    /// Population in the current snapshot.
    pub current: u64,
}

impl PopulationChange {
    /// Whether the population went up.
    pub const fn grew(&self) -> bool {
        self.current > self.previous
    }
}

/// What changed between two lineage snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LineageDiff {
    /// Codes new in the current snapshot, in current order.
    pub added: Vec<LineageCode>,
    /// Codes gone from the current snapshot, in previous order.
    pub removed: Vec<LineageCode>,
    /// Codes alive before and extinct now, in current order.
    pub went_extinct: Vec<LineageCode>,
    /// Codes whose population changed, in current order.
    pub population_changed: Vec<PopulationChange>,
}

impl LineageDiff {
    /// Whether the snapshots are equivalent for these criteria.
    pub const fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.removed.is_empty()
            && self.went_extinct.is_empty()
            && self.population_changed.is_empty()
    }
}

/// Compare two snapshots. Duplicate codes resolve last-write-wins on both
/// sides.
pub fn diff_lineage(previous: &[LineageNode], current: &[LineageNode]) -> LineageDiff {
    let before = LineageIndex::new(previous);
    let after = LineageIndex::new(current);
    let mut diff = LineageDiff::default();

    for node in distinct(current) {
        let code = &node.lineage_code;
        let Some(old) = before.get(code.as_str()) else {
            diff.added.push(code.clone());
            continue;
        };
        if old.is_alive() && !node.is_alive() {
            diff.went_extinct.push(code.clone());
        }
        if old.current_population != node.current_population {
            diff.population_changed.push(PopulationChange {
                code: code.clone(),
                previous: old.current_population,
                current: node.current_population,
            });
        }
    }

    diff.removed = distinct(previous)
        .filter(|node| !after.contains(node.lineage_code.as_str()))
        .map(|node| node.lineage_code.clone())
        .collect();

    diff
}

fn distinct(nodes: &[LineageNode]) -> impl Iterator<Item = &LineageNode> {
    let mask = last_occurrence_mask(nodes, |n| &n.lineage_code);
    nodes
        .iter()
        .zip(mask)
        .filter_map(|(node, keep)| keep.then_some(node))
}
