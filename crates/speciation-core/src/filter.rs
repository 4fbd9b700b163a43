//! Multi-predicate lineage filter.
//!
//! Predicates combine with AND. An empty set means "unconstrained", never
//! "exclude everything". Results keep the input's relative order and never
//! depend on hash iteration order.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use speciation_types::{LineageNode, LineageState};

/// Tier value that matches records whose `tier` is absent.
pub const NO_TIER: &str = "none";

/// Inclusive birth-turn window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnRange {
    /// First turn included.
    pub min: u32,
    /// Last turn included.
    pub max: u32,
}

impl TurnRange {
    /// Every turn.
    pub const UNBOUNDED: Self = Self {
        min: 0,
        max: u32::MAX,
    };

    /// Window from `min` to `max`, both included.
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Whether `turn` lies inside the window. An inverted window contains
    /// nothing.
    pub const fn contains(&self, turn: u32) -> bool {
        self.min <= turn && turn <= self.max
    }

    /// Whether the window covers every turn.
    pub const fn is_unbounded(&self) -> bool {
        self.min == 0 && self.max == u32::MAX
    }
}

impl Default for TurnRange {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

/// Active filter controls for the genealogy view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineageFilters {
    /// Accepted states; empty accepts all.
    pub states: BTreeSet<LineageState>,
    /// Accepted ecological roles; empty accepts all.
    pub ecological_roles: BTreeSet<String>,
    /// Accepted tiers, [`NO_TIER`] for records without one; empty accepts
    /// all.
    pub tiers: BTreeSet<String>,
    /// Accepted birth turns.
    pub turn_range: TurnRange,
    /// Case-insensitive substring searched in code, latin and common names.
    pub search_term: String,
}

impl LineageFilters {
    /// Whether these filters let every record through.
    pub fn is_unconstrained(&self) -> bool {
        self.states.is_empty()
            && self.ecological_roles.is_empty()
            && self.tiers.is_empty()
            && self.turn_range.is_unbounded()
            && self.search_term.trim().is_empty()
    }

    /// Test a single record.
    pub fn matches(&self, node: &LineageNode) -> bool {
        Matcher::new(self).matches(node)
    }
}

/// Filters with the search term normalised once.
struct Matcher<'f> {
    filters: &'f LineageFilters,
    needle: Option<String>,
}

impl<'f> Matcher<'f> {
    fn new(filters: &'f LineageFilters) -> Self {
        let term = filters.search_term.trim();
        Self {
            filters,
            needle: (!term.is_empty()).then(|| term.to_lowercase()),
        }
    }

    fn matches(&self, node: &LineageNode) -> bool {
        let f = self.filters;
        // A recorded tier spelled like the sentinel is not "untiered".
        let tier_ok = f.tiers.is_empty()
            || match node.tier.as_deref() {
                None => f.tiers.contains(NO_TIER),
                Some(tier) => tier != NO_TIER && f.tiers.contains(tier),
            };

        (f.states.is_empty() || f.states.contains(&node.state))
            && (f.ecological_roles.is_empty() || f.ecological_roles.contains(&node.ecological_role))
            && tier_ok
            && f.turn_range.contains(node.birth_turn)
            && self.needle.as_deref().is_none_or(|needle| {
                [
                    node.lineage_code.as_str(),
                    node.latin_name.as_str(),
                    node.common_name.as_str(),
                ]
                .iter()
                .any(|field| field.to_lowercase().contains(needle))
            })
    }
}

/// Records matching `filters`, cloned, in input order.
pub fn apply_filters(nodes: &[LineageNode], filters: &LineageFilters) -> Vec<LineageNode> {
    filter_refs(nodes, filters).into_iter().cloned().collect()
}

/// Records matching `filters`, borrowed, in input order.
pub fn filter_refs<'a>(nodes: &'a [LineageNode], filters: &LineageFilters) -> Vec<&'a LineageNode> {
    let matcher = Matcher::new(filters);
    nodes.iter().filter(|node| matcher.matches(node)).collect()
}

/// Values available to the filter controls for a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    /// Distinct states, sorted.
    pub states: Vec<LineageState>,
    /// Distinct non-empty roles, sorted.
    pub ecological_roles: Vec<String>,
    /// Distinct tiers, sorted, with [`NO_TIER`] last when any record has no
    /// tier.
    pub tiers: Vec<String>,
    /// Earliest and latest birth turn, `None` for an empty snapshot.
    pub turn_bounds: Option<TurnRange>,
}

impl FilterOptions {
    /// Collect the selectable values from a snapshot.
    pub fn from_nodes(nodes: &[LineageNode]) -> Self {
        let states: BTreeSet<LineageState> = nodes.iter().map(|n| n.state).collect();
        let roles: BTreeSet<&str> = nodes
            .iter()
            .map(|n| n.ecological_role.as_str())
            .filter(|role| !role.is_empty())
            .collect();
        let tiers: BTreeSet<&str> = nodes.iter().filter_map(|n| n.tier.as_deref()).collect();
        let untiered = nodes.iter().any(|n| n.tier.is_none());

        let mut tiers: Vec<String> = tiers
            .into_iter()
            .filter(|tier| *tier != NO_TIER)
            .map(ToOwned::to_owned)
            .collect();
        if untiered {
            tiers.push(NO_TIER.to_owned());
        }

        let min = nodes.iter().map(|n| n.birth_turn).min();
        let max = nodes.iter().map(|n| n.birth_turn).max();

        Self {
            states: states.into_iter().collect(),
            ecological_roles: roles.into_iter().map(ToOwned::to_owned).collect(),
            tiers,
            turn_bounds: min.zip(max).map(|(min, max)| TurnRange::new(min, max)),
        }
    }
}
