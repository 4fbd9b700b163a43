//! Snapshot ingestion: per-snapshot lookups and integrity checks.
//!
//! Snapshots arrive as flat arrays cross-referenced by code. Ingestion
//! never fails. Every problem is recovered locally (the offending record or
//! edge is dropped or repaired) and described by an [`IntegrityWarning`]
//! in the accompanying [`IntegrityReport`].
//!
//! # Duplicate keys
//!
//! A duplicated `lineage_code` (or food-web `id`) is resolved
//! **last write wins**: the last record with that key is kept, at the
//! position of its last occurrence, and each earlier record is dropped
//! with a warning. The same policy is applied by
//! [`build_tree`](crate::tree::build_tree) and
//! [`build_graph`](crate::foodweb::build_graph), so the lookup and the
//! rendered structure always agree on which record a key means.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use serde::Serialize;
use speciation_types::{
    FoodWebLink, FoodWebNode, FoodWebSnapshot, LineageCode, LineageNode, LineageSnapshot,
};
use tracing::warn;

use crate::foodweb::FoodWebInput;

/// Maximum number of hybrid parents a lineage may reference.
pub const MAX_HYBRID_PARENTS: usize = 2;

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

/// A non-fatal integrity problem found in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntegrityWarning {
    /// An earlier record with the same lineage code was dropped.
    DuplicateCode {
        /// The duplicated code.
        code: LineageCode,
        /// Input position of the dropped record.
        dropped_index: usize,
    },
    /// `parent_code` does not resolve; the lineage becomes a root.
    UnresolvedParent {
        /// The child lineage.
        code: LineageCode,
        /// The missing parent code.
        parent: LineageCode,
    },
    /// A lineage named itself as parent; the reference was cleared.
    SelfParent {
        /// The offending lineage.
        code: LineageCode,
    },
    /// A parent appears after its child.
    ParentBornAfterChild {
        /// The child lineage.
        code: LineageCode,
        /// The parent lineage.
        parent: LineageCode,
        /// Child birth turn.
        child_birth_turn: u32,
        /// Parent birth turn.
        parent_birth_turn: u32,
    },
    /// The `code -> parent` edge closed an ancestry cycle and was cleared.
    AncestryCycle {
        /// The lineage whose parent reference was cleared.
        code: LineageCode,
        /// The former parent.
        parent: LineageCode,
    },
    /// A hybrid parent code does not resolve.
    UnresolvedHybridParent {
        /// The hybrid lineage.
        code: LineageCode,
        /// The missing hybrid parent code.
        hybrid_parent: LineageCode,
    },
    /// More than [`MAX_HYBRID_PARENTS`] hybrid parents; the list was
    /// truncated.
    TooManyHybridParents {
        /// The hybrid lineage.
        code: LineageCode,
        /// Number of parents in the snapshot.
        count: usize,
    },
    /// An earlier food-web node with the same id was dropped.
    DuplicateSpecies {
        /// The duplicated id.
        id: LineageCode,
        /// Input position of the dropped node.
        dropped_index: usize,
    },
    /// A link from a species to itself was dropped.
    SelfLoop {
        /// The species id.
        id: LineageCode,
    },
    /// A link with an unknown endpoint was dropped.
    DanglingLink {
        /// Prey id.
        source: LineageCode,
        /// Predator id.
        target: LineageCode,
        /// The endpoint that does not resolve.
        missing: LineageCode,
    },
    /// A link with a non-finite weight was dropped.
    InvalidLinkWeight {
        /// Prey id.
        source: LineageCode,
        /// Predator id.
        target: LineageCode,
    },
    /// A link weight outside `[0, 1]` was clamped.
    ClampedLinkWeight {
        /// Prey id.
        source: LineageCode,
        /// Predator id.
        target: LineageCode,
        /// Weight as received.
        value: f64,
    },
    /// An earlier link between the same pair was dropped.
    DuplicateLink {
        /// Prey id.
        source: LineageCode,
        /// Predator id.
        target: LineageCode,
    },
    /// A keystone id matches no food-web node.
    UnknownKeystone {
        /// The unknown id.
        id: LineageCode,
    },
    /// Declared totals disagree with the arrays received.
    TotalsMismatch {
        /// `total_species` as declared.
        declared_species: u32,
        /// Nodes received.
        counted_species: usize,
        /// `total_links` as declared.
        declared_links: u32,
        /// Links received.
        counted_links: usize,
    },
}

impl fmt::Display for IntegrityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateCode {
                code,
                dropped_index,
            } => write!(f, "duplicate lineage {code}: record #{dropped_index} dropped"),
            Self::UnresolvedParent { code, parent } => {
                write!(f, "lineage {code}: parent {parent} not in snapshot")
            }
            Self::SelfParent { code } => write!(f, "lineage {code} names itself as parent"),
            Self::ParentBornAfterChild {
                code,
                parent,
                child_birth_turn,
                parent_birth_turn,
            } => write!(
                f,
                "lineage {code} (turn {child_birth_turn}) predates its parent {parent} (turn {parent_birth_turn})"
            ),
            Self::AncestryCycle { code, parent } => {
                write!(f, "ancestry cycle: edge {code} -> {parent} cleared")
            }
            Self::UnresolvedHybridParent {
                code,
                hybrid_parent,
            } => write!(f, "hybrid {code}: parent {hybrid_parent} not in snapshot"),
            Self::TooManyHybridParents { code, count } => write!(
                f,
                "hybrid {code} lists {count} parents, keeping the first {MAX_HYBRID_PARENTS}"
            ),
            Self::DuplicateSpecies { id, dropped_index } => {
                write!(f, "duplicate species {id}: node #{dropped_index} dropped")
            }
            Self::SelfLoop { id } => write!(f, "self-loop on {id} dropped"),
            Self::DanglingLink {
                source,
                target,
                missing,
            } => write!(f, "link {source} -> {target} dropped: {missing} unknown"),
            Self::InvalidLinkWeight { source, target } => {
                write!(f, "link {source} -> {target} dropped: weight is not finite")
            }
            Self::ClampedLinkWeight {
                source,
                target,
                value,
            } => write!(f, "link {source} -> {target}: weight {value} clamped into [0, 1]"),
            Self::DuplicateLink { source, target } => {
                write!(f, "duplicate link {source} -> {target}: earlier copy dropped")
            }
            Self::UnknownKeystone { id } => write!(f, "keystone {id} is not in the food web"),
            Self::TotalsMismatch {
                declared_species,
                counted_species,
                declared_links,
                counted_links,
            } => write!(
                f,
                "declared {declared_species} species / {declared_links} links, received {counted_species} / {counted_links}"
            ),
        }
    }
}

/// Ordered collection of integrity warnings for one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IntegrityReport {
    warnings: Vec<IntegrityWarning>,
}

impl IntegrityReport {
    /// Create an empty report.
    pub const fn new() -> Self {
        Self {
            warnings: Vec::new(),
        }
    }

    /// Record a warning.
    pub fn push(&mut self, warning: IntegrityWarning) {
        self.warnings.push(warning);
    }

    /// Append every warning of another report.
    pub fn extend(&mut self, other: Self) {
        self.warnings.extend(other.warnings);
    }

    /// Whether the snapshot was clean.
    pub const fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Number of warnings.
    pub const fn len(&self) -> usize {
        self.warnings.len()
    }

    /// All warnings in detection order.
    pub fn warnings(&self) -> &[IntegrityWarning] {
        &self.warnings
    }

    /// Emit every warning through `tracing` at `warn` level.
    pub fn log(&self, snapshot: &str) {
        for warning in &self.warnings {
            warn!(snapshot, %warning, "snapshot integrity problem");
        }
    }
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// One-time `code -> record` lookup for a lineage snapshot.
///
/// Later records overwrite earlier ones with the same code.
#[derive(Debug, Clone, Default)]
pub struct LineageIndex<'a> {
    by_code: HashMap<&'a str, &'a LineageNode>,
}

impl<'a> LineageIndex<'a> {
    /// Build the lookup.
    pub fn new(nodes: impl IntoIterator<Item = &'a LineageNode>) -> Self {
        let by_code = nodes
            .into_iter()
            .map(|node| (node.lineage_code.as_str(), node))
            .collect();
        Self { by_code }
    }

    /// Resolve a code.
    pub fn get(&self, code: &str) -> Option<&'a LineageNode> {
        self.by_code.get(code).copied()
    }

    /// Whether a code resolves.
    pub fn contains(&self, code: &str) -> bool {
        self.by_code.contains_key(code)
    }

    /// Resolve a record's `parent_code`.
    pub fn parent_of(&self, node: &LineageNode) -> Option<&'a LineageNode> {
        node.parent_code
            .as_ref()
            .and_then(|parent| self.get(parent.as_str()))
    }

    /// Number of distinct codes.
    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    /// Whether the lookup is empty.
    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

/// For each item, whether it is the last item carrying its key.
pub(crate) fn last_occurrence_mask<'a, T, K: Eq + Hash>(
    items: &'a [T],
    key: impl Fn(&'a T) -> K,
) -> Vec<bool> {
    let mut last: HashMap<K, usize> = HashMap::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        last.insert(key(item), i);
    }
    items
        .iter()
        .enumerate()
        .map(|(i, item)| last.get(&key(item)) == Some(&i))
        .collect()
}

// ---------------------------------------------------------------------------
// Lineage ingestion
// ---------------------------------------------------------------------------

/// A lineage snapshot after integrity checks.
#[derive(Debug, Clone, Default)]
pub struct LineageIngest {
    /// Deduplicated, repaired records in snapshot order.
    pub nodes: Vec<LineageNode>,
    /// Problems found and how they were recovered.
    pub report: IntegrityReport,
}

impl LineageIngest {
    /// Lookup over the ingested records.
    pub fn index(&self) -> LineageIndex<'_> {
        LineageIndex::new(&self.nodes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Unvisited,
    OnPath,
    Done,
}

/// Validate a lineage snapshot.
///
/// Drops duplicate codes (last wins), clears self-parent references and
/// the edges that close ancestry cycles, truncates oversized hybrid parent
/// lists, and flags unresolved references and parents born after their
/// children.
pub fn ingest_lineage(snapshot: LineageSnapshot) -> LineageIngest {
    let mut report = IntegrityReport::new();

    let mask = last_occurrence_mask(&snapshot.nodes, |n| &n.lineage_code);
    let mut nodes: Vec<LineageNode> = snapshot
        .nodes
        .into_iter()
        .zip(mask)
        .enumerate()
        .filter_map(|(i, (node, keep))| {
            if !keep {
                report.push(IntegrityWarning::DuplicateCode {
                    code: node.lineage_code.clone(),
                    dropped_index: i,
                });
            }
            keep.then_some(node)
        })
        .collect();

    let position: HashMap<LineageCode, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.lineage_code.clone(), i))
        .collect();
    let births: Vec<u32> = nodes.iter().map(|n| n.birth_turn).collect();
    let mut parents: Vec<Option<usize>> = Vec::with_capacity(nodes.len());

    for node in &mut nodes {
        if node.parent_code.as_ref() == Some(&node.lineage_code) {
            report.push(IntegrityWarning::SelfParent {
                code: node.lineage_code.clone(),
            });
            node.parent_code = None;
        }

        let parent_pos = node.parent_code.as_ref().and_then(|parent| {
            let found = position.get(parent).copied();
            match found.and_then(|p| births.get(p).copied()) {
                None => report.push(IntegrityWarning::UnresolvedParent {
                    code: node.lineage_code.clone(),
                    parent: parent.clone(),
                }),
                Some(parent_birth) if parent_birth > node.birth_turn => {
                    report.push(IntegrityWarning::ParentBornAfterChild {
                        code: node.lineage_code.clone(),
                        parent: parent.clone(),
                        child_birth_turn: node.birth_turn,
                        parent_birth_turn: parent_birth,
                    });
                }
                Some(_) => {}
            }
            found
        });
        parents.push(parent_pos);

        let hybrid_count = node.hybrid_parent_codes.len();
        if hybrid_count > MAX_HYBRID_PARENTS {
            report.push(IntegrityWarning::TooManyHybridParents {
                code: node.lineage_code.clone(),
                count: hybrid_count,
            });
            node.hybrid_parent_codes.truncate(MAX_HYBRID_PARENTS);
        }
        for hybrid_parent in &node.hybrid_parent_codes {
            if !position.contains_key(hybrid_parent) {
                report.push(IntegrityWarning::UnresolvedHybridParent {
                    code: node.lineage_code.clone(),
                    hybrid_parent: hybrid_parent.clone(),
                });
            }
        }
    }

    for child in cycle_closing_edges(&parents) {
        if let Some(node) = nodes.get_mut(child)
            && let Some(parent) = node.parent_code.take()
        {
            report.push(IntegrityWarning::AncestryCycle {
                code: node.lineage_code.clone(),
                parent,
            });
        }
    }

    LineageIngest { nodes, report }
}

/// Positions whose parent edge closes an ancestry cycle.
///
/// Each record has at most one parent, so walking parent pointers from
/// every unvisited record visits each record once. Cycles are detected in
/// input order; the edge cut is the one leading back onto the current walk.
fn cycle_closing_edges(parents: &[Option<usize>]) -> Vec<usize> {
    let mut visit = vec![Visit::Unvisited; parents.len()];
    let mut path: Vec<usize> = Vec::new();
    let mut cut = Vec::new();

    for start in 0..parents.len() {
        path.clear();
        let mut current = Some(start);
        while let Some(i) = current {
            match visit.get(i).copied() {
                Some(Visit::Unvisited) => {
                    if let Some(v) = visit.get_mut(i) {
                        *v = Visit::OnPath;
                    }
                    path.push(i);
                    current = parents.get(i).copied().flatten();
                }
                Some(Visit::OnPath) => {
                    if let Some(&child) = path.last() {
                        cut.push(child);
                    }
                    current = None;
                }
                Some(Visit::Done) | None => current = None,
            }
        }
        for &i in &path {
            if let Some(v) = visit.get_mut(i) {
                *v = Visit::Done;
            }
        }
    }

    cut
}

// ---------------------------------------------------------------------------
// Food-web ingestion
// ---------------------------------------------------------------------------

/// A link whose endpoints both resolve.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ResolvedLink<'a> {
    pub(crate) source: &'a FoodWebNode,
    pub(crate) target: &'a FoodWebNode,
    pub(crate) value: f64,
}

/// Borrowed, cleaned view of a food web.
#[derive(Debug, Clone, Default)]
pub(crate) struct SanitizedFoodWeb<'a> {
    pub(crate) nodes: Vec<&'a FoodWebNode>,
    pub(crate) links: Vec<ResolvedLink<'a>>,
    pub(crate) keystone: Vec<&'a LineageCode>,
    pub(crate) report: IntegrityReport,
}

/// Resolve a food web: dedupe nodes and links (last wins), drop
/// self-loops, dangling and non-finite links, clamp weights into `[0, 1]`,
/// and keep only keystone ids that resolve.
pub(crate) fn sanitize_food_web(input: FoodWebInput<'_>) -> SanitizedFoodWeb<'_> {
    let mut report = IntegrityReport::new();

    let node_mask = last_occurrence_mask(input.nodes, |n| &n.id);
    let nodes: Vec<&FoodWebNode> = input
        .nodes
        .iter()
        .zip(node_mask)
        .enumerate()
        .filter_map(|(i, (node, keep))| {
            if !keep {
                report.push(IntegrityWarning::DuplicateSpecies {
                    id: node.id.clone(),
                    dropped_index: i,
                });
            }
            keep.then_some(node)
        })
        .collect();
    let by_id: HashMap<&str, &FoodWebNode> = nodes.iter().map(|n| (n.id.as_str(), *n)).collect();

    let mut candidates: Vec<ResolvedLink<'_>> = Vec::with_capacity(input.links.len());
    for link in input.links {
        if let Some(resolved) = resolve_link(link, &by_id, &mut report) {
            candidates.push(resolved);
        }
    }

    let link_mask =
        last_occurrence_mask(&candidates, |l| (l.source.id.as_str(), l.target.id.as_str()));
    let links: Vec<ResolvedLink<'_>> = candidates
        .iter()
        .zip(link_mask)
        .filter_map(|(link, keep)| {
            if !keep {
                report.push(IntegrityWarning::DuplicateLink {
                    source: link.source.id.clone(),
                    target: link.target.id.clone(),
                });
            }
            keep.then_some(*link)
        })
        .collect();

    let mut seen: HashSet<&str> = HashSet::new();
    let mut keystone = Vec::new();
    for id in input.keystone_species {
        if !by_id.contains_key(id.as_str()) {
            report.push(IntegrityWarning::UnknownKeystone { id: id.clone() });
        } else if seen.insert(id.as_str()) {
            keystone.push(id);
        }
    }

    SanitizedFoodWeb {
        nodes,
        links,
        keystone,
        report,
    }
}

fn resolve_link<'a>(
    link: &FoodWebLink,
    by_id: &HashMap<&str, &'a FoodWebNode>,
    report: &mut IntegrityReport,
) -> Option<ResolvedLink<'a>> {
    if link.source == link.target {
        report.push(IntegrityWarning::SelfLoop {
            id: link.source.clone(),
        });
        return None;
    }

    let dangling = |missing: &LineageCode| IntegrityWarning::DanglingLink {
        source: link.source.clone(),
        target: link.target.clone(),
        missing: missing.clone(),
    };
    let Some(source) = by_id.get(link.source.as_str()).copied() else {
        report.push(dangling(&link.source));
        return None;
    };
    let Some(target) = by_id.get(link.target.as_str()).copied() else {
        report.push(dangling(&link.target));
        return None;
    };

    if !link.value.is_finite() {
        report.push(IntegrityWarning::InvalidLinkWeight {
            source: link.source.clone(),
            target: link.target.clone(),
        });
        return None;
    }
    let value = if (0.0..=1.0).contains(&link.value) {
        link.value
    } else {
        report.push(IntegrityWarning::ClampedLinkWeight {
            source: link.source.clone(),
            target: link.target.clone(),
            value: link.value,
        });
        link.value.clamp(0.0, 1.0)
    };

    Some(ResolvedLink {
        source,
        target,
        value,
    })
}

/// A food-web snapshot after integrity checks.
#[derive(Debug, Clone, Default)]
pub struct FoodWebIngest {
    /// Deduplicated nodes in snapshot order.
    pub nodes: Vec<FoodWebNode>,
    /// Links whose endpoints resolve, weights within `[0, 1]`.
    pub links: Vec<FoodWebLink>,
    /// Keystone ids that resolve, without repeats.
    pub keystone_species: Vec<LineageCode>,
    /// Problems found and how they were recovered.
    pub report: IntegrityReport,
}

impl FoodWebIngest {
    /// Borrow the cleaned web as graph-builder input.
    pub fn input(&self) -> FoodWebInput<'_> {
        FoodWebInput {
            nodes: &self.nodes,
            links: &self.links,
            keystone_species: &self.keystone_species,
        }
    }
}

/// Validate a food-web snapshot.
pub fn ingest_food_web(snapshot: &FoodWebSnapshot) -> FoodWebIngest {
    let clean = sanitize_food_web(FoodWebInput::from(snapshot));
    let mut report = clean.report;

    let declared_species = usize::try_from(snapshot.total_species).ok();
    let declared_links = usize::try_from(snapshot.total_links).ok();
    if declared_species != Some(snapshot.nodes.len())
        || declared_links != Some(snapshot.links.len())
    {
        report.push(IntegrityWarning::TotalsMismatch {
            declared_species: snapshot.total_species,
            counted_species: snapshot.nodes.len(),
            declared_links: snapshot.total_links,
            counted_links: snapshot.links.len(),
        });
    }

    FoodWebIngest {
        nodes: clean.nodes.into_iter().cloned().collect(),
        links: clean
            .links
            .iter()
            .map(|l| FoodWebLink {
                source: l.source.id.clone(),
                target: l.target.id.clone(),
                value: l.value,
            })
            .collect(),
        keystone_species: clean.keystone.into_iter().cloned().collect(),
        report,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lineage(nodes: Vec<LineageNode>) -> LineageSnapshot {
        LineageSnapshot { nodes }
    }

    fn codes(nodes: &[LineageNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.lineage_code.as_str()).collect()
    }

    // -----------------------------------------------------------------------
    // Lineage
    // -----------------------------------------------------------------------

    #[test]
    fn clean_snapshot_has_no_warnings() {
        let ingest = ingest_lineage(lineage(vec![
            LineageNode::new("A1", "Protocella prima", 0),
            LineageNode::new("A2", "Protocella secunda", 5).with_parent("A1"),
        ]));
        assert!(ingest.report.is_empty());
        assert_eq!(codes(&ingest.nodes), vec!["A1", "A2"]);
    }

    #[test]
    fn duplicate_code_last_write_wins() {
        let ingest = ingest_lineage(lineage(vec![
            LineageNode::new("A1", "Old name", 0),
            LineageNode::new("B1", "Other", 1),
            LineageNode::new("A1", "New name", 0),
        ]));

        assert_eq!(codes(&ingest.nodes), vec!["B1", "A1"]);
        let index = ingest.index();
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("A1").map(|n| n.latin_name.as_str()), Some("New name"));
        assert_eq!(
            ingest.report.warnings(),
            &[IntegrityWarning::DuplicateCode {
                code: LineageCode::from("A1"),
                dropped_index: 0,
            }]
        );
    }

    #[test]
    fn unresolved_parent_is_flagged_but_kept() {
        let ingest = ingest_lineage(lineage(vec![
            LineageNode::new("C3", "Orphan", 4).with_parent("GONE"),
        ]));
        assert_eq!(ingest.nodes.len(), 1);
        assert_eq!(
            ingest.nodes.first().and_then(|n| n.parent_code.clone()),
            Some(LineageCode::from("GONE"))
        );
        assert!(matches!(
            ingest.report.warnings().first(),
            Some(IntegrityWarning::UnresolvedParent { .. })
        ));
    }

    #[test]
    fn parent_born_after_child_is_flagged() {
        let ingest = ingest_lineage(lineage(vec![
            LineageNode::new("P", "Parent", 10),
            LineageNode::new("C", "Child", 3).with_parent("P"),
        ]));
        assert_eq!(
            ingest.report.warnings(),
            &[IntegrityWarning::ParentBornAfterChild {
                code: LineageCode::from("C"),
                parent: LineageCode::from("P"),
                child_birth_turn: 3,
                parent_birth_turn: 10,
            }]
        );
    }

    #[test]
    fn self_parent_is_cleared() {
        let ingest = ingest_lineage(lineage(vec![
            LineageNode::new("S", "Selfish", 0).with_parent("S"),
        ]));
        assert!(ingest.nodes.first().is_some_and(|n| n.parent_code.is_none()));
        assert_eq!(
            ingest.report.warnings(),
            &[IntegrityWarning::SelfParent {
                code: LineageCode::from("S")
            }]
        );
    }

    #[test]
    fn ancestry_cycle_edge_is_cleared() {
        // X -> Y -> Z -> X, plus a clean tail W -> X.
        let ingest = ingest_lineage(lineage(vec![
            LineageNode::new("X", "x", 0).with_parent("Z"),
            LineageNode::new("Y", "y", 0).with_parent("X"),
            LineageNode::new("Z", "z", 0).with_parent("Y"),
            LineageNode::new("W", "w", 1).with_parent("X"),
        ]));

        let cycle_warnings: Vec<_> = ingest
            .report
            .warnings()
            .iter()
            .filter(|w| matches!(w, IntegrityWarning::AncestryCycle { .. }))
            .collect();
        assert_eq!(cycle_warnings.len(), 1);

        // Walk from X: X -> Z -> Y -> back to X; the edge Y -> X is cut.
        let index = ingest.index();
        assert!(index.get("Y").is_some_and(|n| n.parent_code.is_none()));
        assert!(index.get("X").is_some_and(|n| n.parent_code.is_some()));
        assert!(index.get("W").is_some_and(|n| n.parent_code.is_some()));
    }

    #[test]
    fn hybrid_parents_are_checked() {
        let ingest = ingest_lineage(lineage(vec![
            LineageNode::new("A", "a", 0),
            LineageNode::new("B", "b", 0),
            LineageNode::new("H", "hybrid", 4).hybrid_of([
                LineageCode::from("A"),
                LineageCode::from("MISSING"),
                LineageCode::from("B"),
            ]),
        ]));

        let hybrid = ingest.index().get("H").map(|n| n.hybrid_parent_codes.len());
        assert_eq!(hybrid, Some(MAX_HYBRID_PARENTS));
        assert_eq!(
            ingest.report.warnings(),
            &[
                IntegrityWarning::TooManyHybridParents {
                    code: LineageCode::from("H"),
                    count: 3,
                },
                IntegrityWarning::UnresolvedHybridParent {
                    code: LineageCode::from("H"),
                    hybrid_parent: LineageCode::from("MISSING"),
                },
            ]
        );
    }

    #[test]
    fn empty_snapshot_is_not_an_error() {
        let ingest = ingest_lineage(LineageSnapshot::default());
        assert!(ingest.nodes.is_empty());
        assert!(ingest.report.is_empty());
        assert!(ingest.index().is_empty());
    }

    // -----------------------------------------------------------------------
    // Food web
    // -----------------------------------------------------------------------

    fn web() -> FoodWebSnapshot {
        FoodWebSnapshot {
            nodes: vec![
                FoodWebNode::new("P", "Algae", 1.0, 5000),
                FoodWebNode::new("H", "Grazer", 2.2, 300),
                FoodWebNode::new("C", "Hunter", 3.4, 20),
            ],
            links: vec![
                FoodWebLink::new("P", "H", 0.7),
                FoodWebLink::new("H", "C", 0.4),
            ],
            keystone_species: vec![LineageCode::from("H")],
            total_species: 3,
            total_links: 2,
        }
    }

    #[test]
    fn clean_food_web_passes_through() {
        let ingest = ingest_food_web(&web());
        assert!(ingest.report.is_empty());
        assert_eq!(ingest.nodes.len(), 3);
        assert_eq!(ingest.links.len(), 2);
        assert_eq!(ingest.keystone_species, vec![LineageCode::from("H")]);
    }

    #[test]
    fn malformed_links_are_dropped() {
        let mut snapshot = web();
        snapshot.links.push(FoodWebLink::new("C", "C", 0.5));
        snapshot.links.push(FoodWebLink::new("P", "GHOST", 0.5));
        snapshot.links.push(FoodWebLink::new("P", "C", f64::NAN));
        snapshot.links.push(FoodWebLink::new("H", "C", 1.5));
        snapshot.total_links = 6;

        let ingest = ingest_food_web(&snapshot);

        // P->H kept; first H->C superseded by the clamped duplicate.
        assert_eq!(ingest.links.len(), 2);
        let last = ingest.links.last();
        assert!(last.is_some_and(|l| l.source.as_str() == "H" && l.value <= 1.0));

        let kinds: Vec<&str> = ingest
            .report
            .warnings()
            .iter()
            .map(|w| match w {
                IntegrityWarning::SelfLoop { .. } => "self_loop",
                IntegrityWarning::DanglingLink { .. } => "dangling",
                IntegrityWarning::InvalidLinkWeight { .. } => "invalid",
                IntegrityWarning::ClampedLinkWeight { .. } => "clamped",
                IntegrityWarning::DuplicateLink { .. } => "duplicate",
                _ => "other",
            })
            .collect();
        assert_eq!(kinds, vec!["self_loop", "dangling", "invalid", "clamped", "duplicate"]);
    }

    #[test]
    fn unknown_and_repeated_keystones() {
        let mut snapshot = web();
        snapshot.keystone_species = vec![
            LineageCode::from("H"),
            LineageCode::from("NOPE"),
            LineageCode::from("H"),
        ];
        let ingest = ingest_food_web(&snapshot);
        assert_eq!(ingest.keystone_species, vec![LineageCode::from("H")]);
        assert_eq!(
            ingest.report.warnings(),
            &[IntegrityWarning::UnknownKeystone {
                id: LineageCode::from("NOPE")
            }]
        );
    }

    #[test]
    fn totals_mismatch_is_informational() {
        let mut snapshot = web();
        snapshot.total_species = 10;
        let ingest = ingest_food_web(&snapshot);
        assert_eq!(ingest.nodes.len(), 3);
        assert!(matches!(
            ingest.report.warnings().first(),
            Some(IntegrityWarning::TotalsMismatch {
                declared_species: 10,
                counted_species: 3,
                ..
            })
        ));
    }

    #[test]
    fn reports_merge_in_detection_order() {
        let mut report = ingest_lineage(lineage(vec![
            LineageNode::new("S", "Selfish", 0).with_parent("S"),
        ]))
        .report;
        let mut later = IntegrityReport::new();
        later.push(IntegrityWarning::SelfLoop {
            id: LineageCode::from("X"),
        });
        report.extend(later);
        report.extend(IntegrityReport::new());

        assert_eq!(report.len(), 2);
        assert!(matches!(
            report.warnings(),
            [
                IntegrityWarning::SelfParent { .. },
                IntegrityWarning::SelfLoop { .. }
            ]
        ));
    }

    #[test]
    fn warnings_render_readably() {
        let warning = IntegrityWarning::DanglingLink {
            source: LineageCode::from("P"),
            target: LineageCode::from("X"),
            missing: LineageCode::from("X"),
        };
        assert_eq!(warning.to_string(), "link P -> X dropped: X unknown");
    }
}
