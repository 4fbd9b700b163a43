//! One recompute cycle over the given snapshots.
//!
//! Mirrors what the dashboard does on every snapshot update: ingest, build
//! the tree from the filtered lineage, build the food-web graph, and
//! optionally resolve one selection's detail.

use std::path::{Path, PathBuf};

use serde::Serialize;
use speciation_core::config::PresentationConfig;
use speciation_core::diff::{LineageDiff, diff_lineage};
use speciation_core::filter::{FilterOptions, LineageFilters, apply_filters};
use speciation_core::foodweb::{build_graph, neighborhood};
use speciation_core::ingest::{IntegrityReport, ingest_food_web, ingest_lineage};
use speciation_core::snapshot::{load_food_web_snapshot, load_lineage_snapshot};
use speciation_core::tree::build_tree;
use speciation_types::{
    BandLegendEntry, FoodWebSummary, GraphViewModel, LineageCode, TreeViewModel,
};
use speciation_view::client::{DetailClient, HttpDetailClient, StaticDetailClient};
use speciation_view::driver::SelectionDriver;
use speciation_view::selection::SelectionOrigin;
use tracing::info;

use crate::error::InspectError;

/// Inputs for one run, resolved from the command line.
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    /// Current lineage snapshot.
    pub lineage: Option<PathBuf>,
    /// Previous lineage snapshot to diff against.
    pub previous: Option<PathBuf>,
    /// Food-web snapshot.
    pub food_web: Option<PathBuf>,
    /// Filter definition (JSON).
    pub filters: Option<PathBuf>,
    /// Search term overriding the filter file's.
    pub search: Option<String>,
    /// Species to select.
    pub select: Option<String>,
    /// Detail fixtures (JSON object keyed by code) used instead of HTTP.
    pub details: Option<PathBuf>,
}

/// Lineage side of the report.
#[derive(Debug, Clone, Serialize)]
pub struct LineageReport {
    /// Records after ingestion.
    pub total: usize,
    /// Records passing the filters.
    pub visible: usize,
    /// Tree over the visible records.
    pub tree: TreeViewModel,
    /// Values for the filter controls.
    pub options: FilterOptions,
    /// Changes since `--previous`, when given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<LineageDiff>,
    /// Integrity problems found during ingestion.
    pub warnings: IntegrityReport,
}

/// Food-web side of the report.
#[derive(Debug, Clone, Serialize)]
pub struct FoodWebReport {
    /// Render-ready graph.
    pub graph: GraphViewModel,
    /// Header figures.
    pub summary: FoodWebSummary,
    /// Color legend.
    pub legend: Vec<BandLegendEntry>,
    /// Integrity problems found during ingestion and graph building.
    pub warnings: IntegrityReport,
}

/// Trophic neighbours of the selected species.
#[derive(Debug, Clone, Serialize)]
pub struct NeighborhoodReport {
    /// Prey ids.
    pub prey: Vec<LineageCode>,
    /// Predator ids.
    pub predators: Vec<LineageCode>,
}

/// Everything one run produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InspectReport {
    /// Genealogy results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lineage: Option<LineageReport>,
    /// Food-web results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub food_web: Option<FoodWebReport>,
    /// Detail panel state after the selection settled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<serde_json::Value>,
    /// Neighbours of the selection in the food web.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<NeighborhoodReport>,
}

/// Run the pipeline over `inputs`.
///
/// # Errors
///
/// Returns [`InspectError::Usage`] if no snapshot is given, and the
/// matching variant for unreadable inputs or a failing detail client.
pub async fn run(
    inputs: &Inputs,
    config: &PresentationConfig,
) -> Result<InspectReport, InspectError> {
    if inputs.lineage.is_none() && inputs.food_web.is_none() {
        return Err(InspectError::Usage(String::from(
            "pass --lineage and/or --food-web",
        )));
    }

    let mut report = InspectReport::default();

    if let Some(path) = &inputs.lineage {
        report.lineage = Some(lineage_report(path, inputs)?);
    }

    if let Some(path) = &inputs.food_web {
        let snapshot = load_food_web_snapshot(path)?;
        let ingest = ingest_food_web(&snapshot);
        ingest.report.log("food_web");
        let graph = build_graph(ingest.input(), &config.graph);
        info!(
            species = graph.summary.species,
            links = graph.summary.links,
            keystone = graph.summary.keystone,
            "food web built"
        );

        if let Some(code) = &inputs.select {
            let around = neighborhood(&graph.view, code);
            report.neighborhood = Some(NeighborhoodReport {
                prey: around.prey.iter().map(|n| n.id.clone()).collect(),
                predators: around.predators.iter().map(|n| n.id.clone()).collect(),
            });
        }

        let mut warnings = ingest.report;
        warnings.extend(graph.report);
        report.food_web = Some(FoodWebReport {
            graph: graph.view,
            summary: graph.summary,
            legend: graph.legend,
            warnings,
        });
    }

    if let Some(code) = &inputs.select {
        let client = detail_client(inputs.details.as_deref(), config)?;
        let origin = if inputs.lineage.is_some() {
            SelectionOrigin::Tree
        } else {
            SelectionOrigin::Graph
        };
        let mut driver = SelectionDriver::new(client);
        driver.select(LineageCode::from(code.as_str()), origin);
        let status = driver.settle().await;
        info!(code = %code, ?status, "selection settled");
        report.selection = Some(serde_json::to_value(driver.coordinator().view())?);
    }

    Ok(report)
}

fn lineage_report(path: &Path, inputs: &Inputs) -> Result<LineageReport, InspectError> {
    let ingest = ingest_lineage(load_lineage_snapshot(path)?);
    ingest.report.log("lineage");

    let mut filters = load_filters(inputs.filters.as_deref())?;
    if let Some(term) = &inputs.search {
        filters.search_term.clone_from(term);
    }

    let visible = apply_filters(&ingest.nodes, &filters);
    let tree = build_tree(&visible);
    info!(
        total = ingest.nodes.len(),
        visible = visible.len(),
        roots = tree.roots().len(),
        "lineage tree built"
    );

    let diff = match &inputs.previous {
        Some(previous) => {
            let before = ingest_lineage(load_lineage_snapshot(previous)?);
            Some(diff_lineage(&before.nodes, &ingest.nodes))
        }
        None => None,
    };

    Ok(LineageReport {
        total: ingest.nodes.len(),
        visible: visible.len(),
        tree: tree.to_view(),
        options: FilterOptions::from_nodes(&ingest.nodes),
        diff,
        warnings: ingest.report,
    })
}

fn load_filters(path: Option<&Path>) -> Result<LineageFilters, InspectError> {
    let Some(path) = path else {
        return Ok(LineageFilters::default());
    };
    let contents = read(path)?;
    serde_json::from_str(&contents).map_err(|source| InspectError::Filters {
        path: path.to_path_buf(),
        source,
    })
}

fn detail_client(
    fixtures: Option<&Path>,
    config: &PresentationConfig,
) -> Result<DetailClient, InspectError> {
    match fixtures {
        Some(path) => Ok(DetailClient::Static(StaticDetailClient::from_json(&read(
            path,
        )?)?)),
        None => Ok(DetailClient::Http(HttpDetailClient::new(&config.detail)?)),
    }
}

fn read(path: &Path) -> Result<String, InspectError> {
    std::fs::read_to_string(path).map_err(|source| InspectError::Read {
        path: path.to_path_buf(),
        source,
    })
}
