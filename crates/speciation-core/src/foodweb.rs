//! Food-web graph builder.
//!
//! Turns a food-web snapshot into the node/link model consumed by the
//! force-directed renderer. Layout and physics belong to the renderer; this
//! module only derives presentation attributes:
//!
//! - **color** from the trophic band, overridden for keystone species
//! - **size** as `max(min_size, log10(population + 1) * scale_factor)`
//! - **group** as `floor(trophic_level)`, at least 1
//!
//! Links whose endpoints do not resolve are dropped and reported, so the
//! renderer never receives a dangling edge.

use std::collections::{HashMap, HashSet};

use speciation_types::{
    BandLegendEntry, DerivedGraphLink, DerivedGraphNode, FoodWebLink, FoodWebNode,
    FoodWebSnapshot, FoodWebSummary, GraphViewModel, LineageCode, LinkLabels, TrophicBand,
};
use tracing::debug;

use crate::config::GraphStyle;
use crate::ingest::{IntegrityReport, sanitize_food_web};

/// Borrowed food-web arrays handed to [`build_graph`].
#[derive(Debug, Clone, Copy)]
pub struct FoodWebInput<'a> {
    /// Species nodes.
    pub nodes: &'a [FoodWebNode],
    /// Predation links (prey -> predator).
    pub links: &'a [FoodWebLink],
    /// Ids flagged as keystone species.
    pub keystone_species: &'a [LineageCode],
}

impl<'a> From<&'a FoodWebSnapshot> for FoodWebInput<'a> {
    fn from(snapshot: &'a FoodWebSnapshot) -> Self {
        Self {
            nodes: &snapshot.nodes,
            links: &snapshot.links,
            keystone_species: &snapshot.keystone_species,
        }
    }
}

/// Output of [`build_graph`].
#[derive(Debug, Clone, Default)]
pub struct FoodWebGraph {
    /// Render-ready nodes and links.
    pub view: GraphViewModel,
    /// Header figures.
    pub summary: FoodWebSummary,
    /// Color legend, one row per band in trophic order.
    pub legend: Vec<BandLegendEntry>,
    /// Records dropped or repaired while building.
    pub report: IntegrityReport,
}

/// Build the presentation graph for a food web.
pub fn build_graph(input: FoodWebInput<'_>, style: &GraphStyle) -> FoodWebGraph {
    let clean = sanitize_food_web(input);
    let keystone: HashSet<&str> = clean.keystone.iter().map(|id| id.as_str()).collect();

    let nodes: Vec<DerivedGraphNode> = clean
        .nodes
        .iter()
        .map(|node| derive_node(node, keystone.contains(node.id.as_str()), style))
        .collect();

    let links: Vec<DerivedGraphLink> = clean
        .links
        .iter()
        .map(|link| DerivedGraphLink {
            source: link.source.id.clone(),
            target: link.target.id.clone(),
            value: link.value,
            labels: LinkLabels {
                source_name: link.source.name.clone(),
                target_name: link.target.name.clone(),
            },
        })
        .collect();

    let mut summary = FoodWebSummary {
        species: nodes.len(),
        links: links.len(),
        keystone: nodes.iter().filter(|n| n.is_keystone).count(),
        dropped_links: input.links.len().saturating_sub(links.len()),
        by_band: TrophicBand::ALL.iter().map(|&band| (band, 0)).collect(),
    };
    for node in &nodes {
        if let Some(count) = summary.by_band.get_mut(&node.band) {
            *count = count.saturating_add(1);
        }
    }

    debug!(
        species = summary.species,
        links = summary.links,
        dropped_links = summary.dropped_links,
        warnings = clean.report.len(),
        "food web graph built"
    );

    FoodWebGraph {
        view: GraphViewModel { nodes, links },
        legend: legend(&summary, style),
        summary,
        report: clean.report,
    }
}

/// Legend rows for every band, including empty ones.
pub fn legend(summary: &FoodWebSummary, style: &GraphStyle) -> Vec<BandLegendEntry> {
    TrophicBand::ALL
        .iter()
        .map(|&band| BandLegendEntry {
            band,
            label: band.label().to_owned(),
            color: style.colors.for_band(band).to_owned(),
            count: summary.by_band.get(&band).copied().unwrap_or_default(),
        })
        .collect()
}

fn derive_node(node: &FoodWebNode, is_keystone: bool, style: &GraphStyle) -> DerivedGraphNode {
    let band = TrophicBand::from_level(node.trophic_level);
    let color = if is_keystone {
        style.colors.keystone.clone()
    } else {
        style.colors.for_band(band).to_owned()
    };

    DerivedGraphNode {
        id: node.id.clone(),
        name: node.name.clone(),
        label: format!("{} (TL {:.2})", node.name, node.trophic_level),
        trophic_level: node.trophic_level,
        band,
        group: trophic_group(node.trophic_level),
        size: node_size(node.population, style),
        color,
        is_keystone,
        population: node.population,
        diet_type: node.diet_type.clone(),
        prey_count: node.prey_count,
        predator_count: node.predator_count,
    }
}

/// Node radius for a population: logarithmic, never below `min_size`.
pub fn node_size(population: u64, style: &GraphStyle) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let population = population as f64;
    let scaled = (population + 1.0).log10() * style.scale_factor;
    scaled.max(style.min_size)
}

/// `floor(trophic_level)` clamped to at least 1. `NaN` maps to 1.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn trophic_group(level: f64) -> u32 {
    if level.is_nan() || level < 1.0 {
        return 1;
    }
    if level >= f64::from(u32::MAX) {
        return u32::MAX;
    }
    level.floor() as u32
}

// ---------------------------------------------------------------------------
// Neighbourhood lookup
// ---------------------------------------------------------------------------

/// Direct trophic neighbours of one species.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Neighborhood<'g> {
    /// Species the focus eats.
    pub prey: Vec<&'g DerivedGraphNode>,
    /// Species that eat the focus.
    pub predators: Vec<&'g DerivedGraphNode>,
}

/// Prey and predators of `id`, in link order. Empty for unknown ids.
pub fn neighborhood<'g>(graph: &'g GraphViewModel, id: &str) -> Neighborhood<'g> {
    let by_id: HashMap<&str, &DerivedGraphNode> =
        graph.nodes.iter().map(|n| (n.id.as_str(), n)).collect();
    let mut result = Neighborhood::default();

    for link in &graph.links {
        if link.target.as_str() == id {
            if let Some(prey) = by_id.get(link.source.as_str()) {
                result.prey.push(*prey);
            }
        } else if link.source.as_str() == id
            && let Some(predator) = by_id.get(link.target.as_str())
        {
            result.predators.push(*predator);
        }
    }

    result
}
