//! Snapshot transforms for the Speciation dashboard.
//!
//! Every transform here is synchronous, pure, and near-linear in the size of
//! its input so it can rerun on each snapshot update. Data flows:
//!
//! ```text
//! snapshot -> ingest -> { tree, foodweb } -> filter (lineage side) -> view model
//! ```
//!
//! # Modules
//!
//! - [`config`] -- Presentation configuration from `speciation-config.yaml`.
//! - [`diff`] -- Changes between two consecutive lineage snapshots.
//! - [`error`] -- Errors at the snapshot I/O boundary.
//! - [`filter`] -- Multi-predicate lineage filter and filter control values.
//! - [`foodweb`] -- Food-web graph builder with derived colors and sizes.
//! - [`ingest`] -- Per-snapshot lookup and integrity warnings.
//! - [`snapshot`] -- JSON decoding of snapshot documents.
//! - [`tree`] -- Genealogy forest with iterative traversal helpers.

pub mod config;
pub mod diff;
pub mod error;
pub mod filter;
pub mod foodweb;
pub mod ingest;
pub mod snapshot;
pub mod tree;

pub use config::{GraphStyle, PresentationConfig};
pub use diff::{LineageDiff, diff_lineage};
pub use error::SnapshotError;
pub use filter::{FilterOptions, LineageFilters, TurnRange, apply_filters, filter_refs};
pub use foodweb::{FoodWebGraph, FoodWebInput, build_graph, neighborhood};
pub use ingest::{
    IntegrityReport, IntegrityWarning, LineageIndex, ingest_food_web, ingest_lineage,
};
pub use tree::{LineageTree, build_tree};
