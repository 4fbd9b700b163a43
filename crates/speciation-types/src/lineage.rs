//! Lineage records as delivered by the simulation backend.
//!
//! A lineage snapshot is a flat array: parent/child structure is expressed
//! only through `parent_code` (and, for hybrids, `hybrid_parent_codes`)
//! weak references. Records never hold pointers to each other.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::code::LineageCode;
use crate::enums::{LineageState, TaxonomicRank};

/// A single lineage (species, subspecies, or hybrid) in the genealogy.
///
/// # Invariants (checked by the ingestor, not enforced by the type)
///
/// - `lineage_code` is unique within a snapshot.
/// - If `parent_code` resolves, the parent's `birth_turn` is `<=` this
///   record's `birth_turn`.
/// - No code is its own ancestor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LineageNode {
    /// Unique key of this lineage.
    pub lineage_code: LineageCode,
    /// Code of the direct ancestor, if any. May not resolve in partial
    /// snapshots.
    #[serde(default)]
    pub parent_code: Option<LineageCode>,
    /// Scientific name.
    pub latin_name: String,
    /// Vernacular name.
    #[serde(default)]
    pub common_name: String,
    /// Alive or extinct.
    pub state: LineageState,
    /// Free-form ecological role assigned upstream (e.g. `herbivore`).
    #[serde(default)]
    pub ecological_role: String,
    /// Optional tier label (e.g. `T2`).
    #[serde(default)]
    pub tier: Option<String>,
    /// Simulation turn the lineage appeared.
    pub birth_turn: u32,
    /// Simulation turn the lineage went extinct.
    #[serde(default)]
    pub extinction_turn: Option<u32>,
    /// Number of descendant lineages recorded upstream.
    #[serde(default)]
    pub descendant_count: u32,
    /// Population at the snapshot turn.
    #[serde(default)]
    pub current_population: u64,
    /// Highest population ever recorded.
    #[serde(default)]
    pub peak_population: u64,
    /// Species, subspecies, or hybrid.
    #[serde(default)]
    pub taxonomic_rank: TaxonomicRank,
    /// Up to two parent codes for hybrids.
    #[serde(default)]
    pub hybrid_parent_codes: Vec<LineageCode>,
    /// Genetic distance to other lineages, keyed by code.
    #[serde(default)]
    pub genetic_distances: BTreeMap<LineageCode, f64>,
}

impl LineageNode {
    /// Create a living root species with empty optional fields.
    pub fn new(
        code: impl Into<LineageCode>,
        latin_name: impl Into<String>,
        birth_turn: u32,
    ) -> Self {
        Self {
            lineage_code: code.into(),
            parent_code: None,
            latin_name: latin_name.into(),
            common_name: String::new(),
            state: LineageState::Alive,
            ecological_role: String::new(),
            tier: None,
            birth_turn,
            extinction_turn: None,
            descendant_count: 0,
            current_population: 0,
            peak_population: 0,
            taxonomic_rank: TaxonomicRank::Species,
            hybrid_parent_codes: Vec::new(),
            genetic_distances: BTreeMap::new(),
        }
    }

    /// Set the parent code.
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<LineageCode>) -> Self {
        self.parent_code = Some(parent.into());
        self
    }

    /// Set the tier label.
    #[must_use]
    pub fn with_tier(mut self, tier: impl Into<String>) -> Self {
        self.tier = Some(tier.into());
        self
    }

    /// Set the common name.
    #[must_use]
    pub fn with_common_name(mut self, name: impl Into<String>) -> Self {
        self.common_name = name.into();
        self
    }

    /// Set the ecological role.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.ecological_role = role.into();
        self
    }

    /// Mark the lineage extinct at the given turn.
    #[must_use]
    pub fn extinct_at(mut self, turn: u32) -> Self {
        self.state = LineageState::Extinct;
        self.extinction_turn = Some(turn);
        self
    }

    /// Set current and peak population.
    #[must_use]
    pub fn with_population(mut self, current: u64, peak: u64) -> Self {
        self.current_population = current;
        self.peak_population = peak;
        self
    }

    /// Mark the record as a hybrid of the given parents.
    #[must_use]
    pub fn hybrid_of(mut self, parents: impl IntoIterator<Item = LineageCode>) -> Self {
        self.taxonomic_rank = TaxonomicRank::Hybrid;
        self.hybrid_parent_codes = parents.into_iter().collect();
        self
    }

    /// Whether the lineage is still alive.
    pub const fn is_alive(&self) -> bool {
        matches!(self.state, LineageState::Alive)
    }
}

/// Lineage snapshot: `{ "nodes": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LineageSnapshot {
    /// Every lineage record, in backend order.
    #[serde(default)]
    pub nodes: Vec<LineageNode>,
}
