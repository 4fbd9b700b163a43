//! Food-web records: trophic nodes and predation links.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::code::LineageCode;

/// A species in the food web. `id` is the species' lineage code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FoodWebNode {
    /// Lineage code of the species.
    pub id: LineageCode,
    /// Display name.
    pub name: String,
    /// Real-valued trophic level (1 = primary producer).
    pub trophic_level: f64,
    /// Diet classification assigned upstream (e.g. `carnivore`).
    #[serde(default)]
    pub diet_type: String,
    /// Current population.
    #[serde(default)]
    pub population: u64,
    /// Number of prey species recorded upstream.
    #[serde(default)]
    pub prey_count: u32,
    /// Number of predator species recorded upstream.
    #[serde(default)]
    pub predator_count: u32,
}

impl FoodWebNode {
    /// Create a node with an empty diet and zero prey/predator counts.
    pub fn new(
        id: impl Into<LineageCode>,
        name: impl Into<String>,
        trophic_level: f64,
        population: u64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            trophic_level,
            diet_type: String::new(),
            population,
            prey_count: 0,
            predator_count: 0,
        }
    }
}

/// A predation edge: `target` eats `source`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FoodWebLink {
    /// Prey species id.
    pub source: LineageCode,
    /// Predator species id.
    pub target: LineageCode,
    /// Predation weight in `[0, 1]`.
    pub value: f64,
}

impl FoodWebLink {
    /// Create a link from prey to predator.
    pub fn new(source: impl Into<LineageCode>, target: impl Into<LineageCode>, value: f64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            value,
        }
    }
}

/// Food-web snapshot as returned by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FoodWebSnapshot {
    /// Species in the web.
    #[serde(default)]
    pub nodes: Vec<FoodWebNode>,
    /// Predation links.
    #[serde(default)]
    pub links: Vec<FoodWebLink>,
    /// Ids the backend flags as keystone species.
    #[serde(default)]
    pub keystone_species: Vec<LineageCode>,
    /// Species count declared by the backend.
    #[serde(default)]
    pub total_species: u32,
    /// Link count declared by the backend.
    #[serde(default)]
    pub total_links: u32,
}
