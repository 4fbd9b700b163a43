//! Render-ready view models handed to the dashboard.
//!
//! These are presentation-only projections recomputed from every snapshot.
//! They never alias or mutate the source records; the renderer owns its
//! copy outright.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::code::LineageCode;
use crate::enums::TrophicBand;

// ---------------------------------------------------------------------------
// Genealogy tree
// ---------------------------------------------------------------------------

/// Genealogy forest as ordered root codes plus a children-by-code map.
///
/// Children lists keep the relative order the records had in the snapshot.
/// Leaves have no entry in `children_of`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TreeViewModel {
    /// Root lineages in snapshot order.
    pub roots: Vec<LineageCode>,
    /// Direct children of each parent that has any.
    pub children_of: BTreeMap<LineageCode, Vec<LineageCode>>,
}

// ---------------------------------------------------------------------------
// Food-web graph
// ---------------------------------------------------------------------------

/// Presentation node for the force-directed food-web graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DerivedGraphNode {
    /// Species id (lineage code).
    pub id: LineageCode,
    /// Species display name.
    pub name: String,
    /// Tooltip label combining name and trophic level.
    pub label: String,
    /// Trophic level as reported upstream.
    pub trophic_level: f64,
    /// Trophic band the level falls in.
    pub band: TrophicBand,
    /// `floor(trophic_level)`, at least 1. Used for optional clustering.
    pub group: u32,
    /// Node radius.
    pub size: f64,
    /// CSS color string.
    pub color: String,
    /// Whether the backend flagged the species as keystone.
    pub is_keystone: bool,
    /// Population at the snapshot turn.
    pub population: u64,
    /// Diet classification.
    pub diet_type: String,
    /// Number of prey species recorded upstream.
    pub prey_count: u32,
    /// Number of predator species recorded upstream.
    pub predator_count: u32,
}

/// Resolved display names for both ends of a link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LinkLabels {
    /// Name of the prey species.
    pub source_name: String,
    /// Name of the predator species.
    pub target_name: String,
}

/// Presentation link for the food-web graph. Both endpoints are
/// guaranteed to exist among the graph's nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DerivedGraphLink {
    /// Prey id.
    pub source: LineageCode,
    /// Predator id.
    pub target: LineageCode,
    /// Predation weight in `[0, 1]`.
    pub value: f64,
    /// Endpoint display names.
    pub labels: LinkLabels,
}

/// Complete graph model consumed by the force-directed renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GraphViewModel {
    /// Nodes in snapshot order.
    pub nodes: Vec<DerivedGraphNode>,
    /// Links in snapshot order.
    pub links: Vec<DerivedGraphLink>,
}

/// Aggregate figures shown in the food-web panel header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FoodWebSummary {
    /// Species rendered.
    pub species: usize,
    /// Links rendered.
    pub links: usize,
    /// Rendered species flagged keystone.
    pub keystone: usize,
    /// Links dropped as malformed.
    pub dropped_links: usize,
    /// Rendered species per trophic band.
    pub by_band: BTreeMap<TrophicBand, usize>,
}

/// One row of the food-web color legend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BandLegendEntry {
    /// The band this row describes.
    pub band: TrophicBand,
    /// Display label.
    pub label: String,
    /// CSS color of the band's nodes.
    pub color: String,
    /// Rendered species in the band.
    pub count: usize,
}
