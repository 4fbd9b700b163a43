//! Shared type definitions for the Speciation dashboard.
//!
//! This crate is the single source of truth for the records received from
//! the simulation backend and the view models produced for the dashboard.
//! Types defined here flow downstream to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`code`] -- [`LineageCode`], the string key behind every cross-reference
//! - [`enums`] -- Lineage state, taxonomic rank, trophic band
//! - [`lineage`] -- Lineage records and the lineage snapshot
//! - [`foodweb`] -- Food-web nodes, predation links, and the food-web snapshot
//! - [`detail`] -- Checked species detail payload
//! - [`view`] -- Tree and graph view models for the renderer

pub mod code;
pub mod detail;
pub mod enums;
pub mod foodweb;
pub mod lineage;
pub mod view;

// Re-export all public types at crate root for convenience.
pub use code::LineageCode;
pub use detail::{DetailError, SpeciesDetail};
pub use enums::{LineageState, TaxonomicRank, TrophicBand};
pub use foodweb::{FoodWebLink, FoodWebNode, FoodWebSnapshot};
pub use lineage::{LineageNode, LineageSnapshot};
pub use view::{
    BandLegendEntry, DerivedGraphLink, DerivedGraphNode, FoodWebSummary, GraphViewModel,
    LinkLabels, TreeViewModel,
};
