//! Genealogy forest built from a flat lineage snapshot.
//!
//! Each record becomes a root when its `parent_code` is absent or does not
//! resolve, and otherwise a child of its parent. Children keep the relative
//! order their records had in the input. Every distinct code appears
//! exactly once: either among the roots or in exactly one children list.
//!
//! Ancestry cycles cannot be rendered as a forest. A cycle is broken by
//! promoting the member that comes first in the input to a root; the
//! promoted codes are exposed through [`LineageTree::broken_cycles`].

use std::collections::{BTreeMap, HashMap, HashSet};

use speciation_types::{LineageCode, LineageNode, TreeViewModel};
use tracing::debug;

use crate::ingest::{LineageIndex, last_occurrence_mask};

/// Parent/child structure over borrowed lineage records.
#[derive(Debug, Clone, Default)]
pub struct LineageTree<'a> {
    index: LineageIndex<'a>,
    position: HashMap<&'a str, usize>,
    roots: Vec<&'a LineageNode>,
    root_codes: HashSet<&'a str>,
    children_of: BTreeMap<&'a str, Vec<&'a LineageNode>>,
    broken_cycles: Vec<&'a LineageCode>,
}

/// Build the genealogy forest for a snapshot.
///
/// Duplicate codes are resolved last-write-wins, matching
/// [`ingest_lineage`](crate::ingest::ingest_lineage).
pub fn build_tree(nodes: &[LineageNode]) -> LineageTree<'_> {
    let mask = last_occurrence_mask(nodes, |n| &n.lineage_code);
    let kept: Vec<&LineageNode> = nodes
        .iter()
        .zip(mask)
        .filter_map(|(node, keep)| keep.then_some(node))
        .collect();

    let mut tree = LineageTree {
        index: LineageIndex::new(kept.iter().copied()),
        position: kept
            .iter()
            .enumerate()
            .map(|(i, n)| (n.lineage_code.as_str(), i))
            .collect(),
        ..LineageTree::default()
    };

    for &node in &kept {
        match tree.index.parent_of(node) {
            Some(parent) => tree
                .children_of
                .entry(parent.lineage_code.as_str())
                .or_default()
                .push(node),
            None => {
                tree.roots.push(node);
                tree.root_codes.insert(node.lineage_code.as_str());
            }
        }
    }

    let mut reached: HashSet<&str> = HashSet::with_capacity(kept.len());
    for &root in &tree.roots {
        tree.mark_reachable(root, &mut reached);
    }

    for &node in &kept {
        if reached.contains(node.lineage_code.as_str()) {
            continue;
        }
        if let Some(promoted) = tree.earliest_cycle_member(node) {
            tree.promote(promoted);
            tree.mark_reachable(promoted, &mut reached);
        }
    }

    if !tree.broken_cycles.is_empty() {
        debug!(
            cycles = tree.broken_cycles.len(),
            "ancestry cycles broken by promoting members to roots"
        );
    }

    tree
}

impl<'a> LineageTree<'a> {
    /// Root lineages: input-order roots first, then promoted cycle members.
    pub fn roots(&self) -> &[&'a LineageNode] {
        &self.roots
    }

    /// Direct children of `code`, in input order. Empty for leaves and
    /// unknown codes.
    pub fn children(&self, code: &str) -> &[&'a LineageNode] {
        self.children_of
            .get(code)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Resolve a code.
    pub fn get(&self, code: &str) -> Option<&'a LineageNode> {
        self.index.get(code)
    }

    /// Number of distinct lineages in the tree.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the tree has no lineages.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Codes promoted to roots to break ancestry cycles.
    pub fn broken_cycles(&self) -> &[&'a LineageCode] {
        &self.broken_cycles
    }

    /// Tree parent of a lineage (`None` for roots).
    pub fn parent(&self, code: &str) -> Option<&'a LineageNode> {
        if self.root_codes.contains(code) {
            return None;
        }
        self.index.get(code).and_then(|node| self.index.parent_of(node))
    }

    /// Ancestors of `code`, nearest first, ending at its root.
    pub fn ancestors_of(&self, code: &str) -> Vec<&'a LineageNode> {
        let mut ancestors = Vec::new();
        let mut current = self.parent(code);
        while let Some(node) = current {
            if ancestors.len() >= self.len() {
                break;
            }
            ancestors.push(node);
            current = self.parent(node.lineage_code.as_str());
        }
        ancestors
    }

    /// Number of lineages in the subtree rooted at `code`, itself included.
    /// Zero for unknown codes.
    pub fn subtree_size(&self, code: &str) -> usize {
        self.get(code).map_or(0, |node| self.walk_from(node).count())
    }

    /// Pre-order walk of the whole forest yielding `(depth, node)`.
    pub fn walk_depth_first(&self) -> DepthFirst<'_, 'a> {
        DepthFirst {
            tree: self,
            stack: self.roots.iter().rev().map(|&root| (0, root)).collect(),
        }
    }

    fn walk_from(&self, node: &'a LineageNode) -> DepthFirst<'_, 'a> {
        DepthFirst {
            tree: self,
            stack: vec![(0, node)],
        }
    }

    /// Owned projection for the renderer. Leaves have no `children_of`
    /// entry.
    pub fn to_view(&self) -> TreeViewModel {
        TreeViewModel {
            roots: self.roots.iter().map(|n| n.lineage_code.clone()).collect(),
            children_of: self
                .children_of
                .iter()
                .filter(|(_, children)| !children.is_empty())
                .map(|(&parent, children)| {
                    (
                        LineageCode::from(parent),
                        children.iter().map(|c| c.lineage_code.clone()).collect(),
                    )
                })
                .collect(),
        }
    }

    // -----------------------------------------------------------------------
    // Construction helpers
    // -----------------------------------------------------------------------

    fn mark_reachable(&self, from: &'a LineageNode, reached: &mut HashSet<&'a str>) {
        for (_, node) in self.walk_from(from) {
            reached.insert(node.lineage_code.as_str());
        }
    }

    /// Follow parent links from an unreachable record until they loop, and
    /// return the loop member that comes first in the input.
    fn earliest_cycle_member(&self, start: &'a LineageNode) -> Option<&'a LineageNode> {
        let mut path: Vec<&'a LineageNode> = Vec::new();
        let mut on_path: HashMap<&'a str, usize> = HashMap::new();
        let mut current = Some(start);
        while let Some(node) = current {
            if let Some(&at) = on_path.get(node.lineage_code.as_str()) {
                return path.get(at..)?.iter().copied().min_by_key(|member| {
                    self.position
                        .get(member.lineage_code.as_str())
                        .copied()
                        .unwrap_or(usize::MAX)
                });
            }
            on_path.insert(node.lineage_code.as_str(), path.len());
            path.push(node);
            current = self.index.parent_of(node);
        }
        None
    }

    fn promote(&mut self, node: &'a LineageNode) {
        if let Some(parent) = self.index.parent_of(node) {
            let key = parent.lineage_code.as_str();
            if let Some(group) = self.children_of.get_mut(key) {
                group.retain(|child| child.lineage_code != node.lineage_code);
                if group.is_empty() {
                    self.children_of.remove(key);
                }
            }
        }
        self.roots.push(node);
        self.root_codes.insert(node.lineage_code.as_str());
        self.broken_cycles.push(&node.lineage_code);
    }
}

/// Pre-order iterator over a [`LineageTree`].
#[derive(Debug, Clone)]
pub struct DepthFirst<'t, 'a> {
    tree: &'t LineageTree<'a>,
    stack: Vec<(usize, &'a LineageNode)>,
}

impl<'a> Iterator for DepthFirst<'_, 'a> {
    type Item = (usize, &'a LineageNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        let child_depth = depth.saturating_add(1);
        self.stack.extend(
            self.tree
                .children(node.lineage_code.as_str())
                .iter()
                .rev()
                .map(|&child| (child_depth, child)),
        );
        Some((depth, node))
    }
}
