//! Structural properties of the snapshot transforms.
//!
//! Inputs come from `proptest` strategies that produce messy snapshots:
//! duplicates, orphans, cycles, dangling links, and out-of-range weights
//! included.

#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]

use std::collections::{BTreeMap, BTreeSet, HashSet};

use proptest::prelude::*;
use speciation_core::config::GraphStyle;
use speciation_core::filter::{LineageFilters, NO_TIER, TurnRange, apply_filters};
use speciation_core::foodweb::{FoodWebInput, build_graph};
use speciation_core::ingest::{ingest_food_web, ingest_lineage};
use speciation_core::snapshot::{parse_food_web_snapshot, parse_lineage_snapshot};
use speciation_core::tree::build_tree;
use speciation_types::{
    FoodWebLink, FoodWebNode, FoodWebSnapshot, LineageCode, LineageNode, LineageSnapshot,
    LineageState,
};

/// Codes are drawn from a small pool so they collide now and then.
const CODE_POOL: usize = 20;

fn parent_code() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        (0..CODE_POOL).prop_map(|p| Some(format!("L{p}"))),
        (0..CODE_POOL / 2).prop_map(|p| Some(format!("L{p}"))),
        Just(Some(String::from("MISSING"))),
    ]
}

fn lineage_node() -> impl Strategy<Value = LineageNode> {
    (
        0..CODE_POOL,
        0u32..50,
        prop::sample::select(vec!["producer", "herbivore", "carnivore"]),
        parent_code(),
        prop::option::weighted(0.3, 0u32..3),
        prop::bool::weighted(0.2),
    )
        .prop_map(|(code, birth, role, parent, tier, extinct)| {
            let mut node = LineageNode::new(format!("L{code}"), "", birth).with_role(role);
            if let Some(parent) = parent {
                node = node.with_parent(parent);
            }
            if let Some(tier) = tier {
                node = node.with_tier(format!("T{tier}"));
            }
            if extinct {
                node = node.extinct_at(60);
            }
            node
        })
}

/// Records with distinct latin names, so equal records mean equal positions.
fn messy_lineage(max_len: usize) -> impl Strategy<Value = Vec<LineageNode>> {
    prop::collection::vec(lineage_node(), 0..max_len).prop_map(|mut nodes| {
        for (i, node) in nodes.iter_mut().enumerate() {
            node.latin_name = format!("Species {i}");
        }
        nodes
    })
}

fn messy_food_web() -> impl Strategy<Value = FoodWebSnapshot> {
    (1usize..25)
        .prop_flat_map(|size| {
            let nodes = prop::collection::vec((0..size, 10u32..50, 0u64..100_000), size);
            let links = prop::collection::vec((0..size + 3, 0..size + 3, 0u32..15), 0..size * 2);
            let keystones = prop::collection::vec(0..size + 2, 0..4);
            (Just(size), nodes, links, keystones)
        })
        .prop_map(|(size, nodes, links, keystones)| {
            let nodes: Vec<FoodWebNode> = nodes
                .into_iter()
                .enumerate()
                .map(|(i, (id, level, population))| {
                    FoodWebNode::new(
                        format!("S{id}"),
                        format!("Species {i}"),
                        f64::from(level) / 10.0,
                        population,
                    )
                })
                .collect();
            let links: Vec<FoodWebLink> = links
                .into_iter()
                .map(|(source, target, weight)| {
                    FoodWebLink::new(
                        format!("S{source}"),
                        format!("S{target}"),
                        f64::from(weight) / 10.0,
                    )
                })
                .collect();
            FoodWebSnapshot {
                total_species: size as u32,
                total_links: links.len() as u32,
                nodes,
                links,
                keystone_species: keystones
                    .into_iter()
                    .map(|k| LineageCode::from(format!("S{k}")))
                    .collect(),
            }
        })
}

fn distinct_codes(nodes: &[LineageNode]) -> BTreeSet<String> {
    nodes.iter().map(|n| n.lineage_code.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Tree and filter
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn tree_partitions_the_deduplicated_input(nodes in messy_lineage(40)) {
        let view = build_tree(&nodes).to_view();

        let mut seen: Vec<String> = view.roots.iter().map(ToString::to_string).collect();
        for children in view.children_of.values() {
            seen.extend(children.iter().map(ToString::to_string));
        }
        let unique: BTreeSet<String> = seen.iter().cloned().collect();

        prop_assert_eq!(seen.len(), unique.len(), "a code appears twice");
        prop_assert_eq!(unique, distinct_codes(&nodes));
    }

    #[test]
    fn every_child_is_reachable_from_a_root(nodes in messy_lineage(40)) {
        let tree = build_tree(&nodes);
        prop_assert_eq!(tree.walk_depth_first().count(), tree.len());
    }

    #[test]
    fn tree_is_deterministic(nodes in messy_lineage(40)) {
        prop_assert_eq!(build_tree(&nodes).to_view(), build_tree(&nodes).to_view());
    }

    #[test]
    fn ingested_lineage_has_no_cycles_left(nodes in messy_lineage(40)) {
        let ingest = ingest_lineage(LineageSnapshot { nodes });
        let tree = build_tree(&ingest.nodes);
        prop_assert!(tree.broken_cycles().is_empty());
    }

    #[test]
    fn unconstrained_filter_is_identity(nodes in messy_lineage(40)) {
        let filters = LineageFilters {
            turn_range: TurnRange::UNBOUNDED,
            search_term: String::new(),
            ..LineageFilters::default()
        };
        prop_assert_eq!(apply_filters(&nodes, &filters), nodes);
    }

    #[test]
    fn filtering_is_idempotent_and_order_preserving(
        nodes in messy_lineage(60),
        min in 0u32..30,
        span in 0u32..30,
        needle in "(species )?[0-9]{0,2}",
    ) {
        let filters = LineageFilters {
            states: BTreeSet::from([LineageState::Alive]),
            tiers: BTreeSet::from([NO_TIER.to_owned(), String::from("T1")]),
            turn_range: TurnRange::new(min, min + span),
            search_term: needle,
            ..LineageFilters::default()
        };
        let once = apply_filters(&nodes, &filters);
        prop_assert_eq!(&apply_filters(&once, &filters), &once);

        let positions: Vec<usize> = once
            .iter()
            .map(|kept| nodes.iter().position(|n| n == kept).unwrap())
            .collect();
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }
}

#[test]
fn scenario_tree_then_none_tier_filter() {
    let json = r#"{"nodes": [
        {"lineage_code": "A1", "parent_code": null, "latin_name": "a", "state": "alive", "birth_turn": 0, "tier": null},
        {"lineage_code": "A2", "parent_code": "A1", "latin_name": "b", "state": "alive", "birth_turn": 5, "tier": "T2"}
    ]}"#;
    let snapshot = parse_lineage_snapshot(json).unwrap();

    let view = build_tree(&snapshot.nodes).to_view();
    assert_eq!(view.roots, vec![LineageCode::from("A1")]);
    assert_eq!(
        view.children_of,
        BTreeMap::from([(LineageCode::from("A1"), vec![LineageCode::from("A2")])])
    );

    let filters = LineageFilters {
        tiers: BTreeSet::from([NO_TIER.to_owned()]),
        ..LineageFilters::default()
    };
    let filtered = apply_filters(&snapshot.nodes, &filters);
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].lineage_code.as_str(), "A1");
}

// ---------------------------------------------------------------------------
// Food web
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn graph_has_no_dangling_links_and_respects_min_size(snapshot in messy_food_web()) {
        let style = GraphStyle::default();
        let graph = build_graph(FoodWebInput::from(&snapshot), &style);

        let ids: HashSet<&str> = graph.view.nodes.iter().map(|n| n.id.as_str()).collect();
        prop_assert_eq!(ids.len(), graph.view.nodes.len(), "duplicate node");
        for link in &graph.view.links {
            prop_assert!(ids.contains(link.source.as_str()));
            prop_assert!(ids.contains(link.target.as_str()));
            prop_assert!((0.0..=1.0).contains(&link.value));
        }
        for node in &graph.view.nodes {
            prop_assert!(node.size >= style.min_size);
            prop_assert!(node.group >= 1);
        }
        prop_assert_eq!(
            graph.summary.links + graph.summary.dropped_links,
            snapshot.links.len()
        );
    }

    #[test]
    fn keystone_color_overrides_band(snapshot in messy_food_web()) {
        let style = GraphStyle::default();
        let keystone: HashSet<&str> = snapshot
            .keystone_species
            .iter()
            .map(LineageCode::as_str)
            .collect();
        let graph = build_graph(FoodWebInput::from(&snapshot), &style);
        for node in &graph.view.nodes {
            let expected = keystone.contains(node.id.as_str());
            prop_assert_eq!(node.is_keystone, expected);
            if expected {
                prop_assert_eq!(&node.color, &style.colors.keystone);
            } else {
                prop_assert_eq!(node.color.as_str(), style.colors.for_band(node.band));
            }
        }
    }

    #[test]
    fn ingest_then_build_is_clean(snapshot in messy_food_web()) {
        let ingest = ingest_food_web(&snapshot);
        let graph = build_graph(ingest.input(), &GraphStyle::default());
        prop_assert!(graph.report.is_empty(), "{:?}", graph.report);
        prop_assert_eq!(graph.view.links.len(), ingest.links.len());
    }
}

#[test]
fn scenario_zero_population_producer() {
    let json = r#"{
        "nodes": [{"id": "X", "name": "Mat", "trophic_level": 1, "population": 0}],
        "links": []
    }"#;
    let snapshot = parse_food_web_snapshot(json).unwrap();
    let style = GraphStyle::default();
    let graph = build_graph(FoodWebInput::from(&snapshot), &style);

    let x = &graph.view.nodes[0];
    assert_eq!(x.color, style.colors.producer);
    assert!((x.size - style.min_size).abs() < f64::EPSILON);
}

#[test]
fn empty_inputs_give_empty_models() {
    let lineage = parse_lineage_snapshot("{}").unwrap();
    let web = parse_food_web_snapshot("{}").unwrap();

    assert!(build_tree(&lineage.nodes).to_view().roots.is_empty());
    assert!(apply_filters(&lineage.nodes, &LineageFilters::default()).is_empty());

    let graph = build_graph(FoodWebInput::from(&web), &GraphStyle::default());
    assert!(graph.view.nodes.is_empty());
    assert!(graph.view.links.is_empty());
}
