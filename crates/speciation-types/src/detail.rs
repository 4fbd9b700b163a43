//! Species detail payload, validated at the fetch boundary.
//!
//! The backend returns a loosely-typed JSON document per species. It is
//! checked here once, so everything past the fetch layer only ever sees a
//! [`SpeciesDetail`], never a raw `serde_json::Value`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::code::LineageCode;
use crate::enums::LineageState;

/// Errors raised while validating a detail payload.
#[derive(Debug, thiserror::Error)]
pub enum DetailError {
    /// The payload is not a JSON object of the expected shape.
    #[error("malformed detail payload: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A required field is absent or empty.
    #[error("detail payload missing required field `{0}`")]
    MissingField(&'static str),

    /// The payload describes a different lineage than the one requested.
    #[error("detail payload is for {actual}, expected {expected}")]
    CodeMismatch {
        /// Code the caller asked for.
        expected: LineageCode,
        /// Code found in the payload.
        actual: LineageCode,
    },
}

/// Checked species detail shown in the side panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SpeciesDetail {
    /// Lineage code of the species.
    pub lineage_code: LineageCode,
    /// Scientific name.
    pub latin_name: String,
    /// Vernacular name (empty when unknown).
    pub common_name: String,
    /// Free-text description (empty when unknown).
    pub description: String,
    /// Alive or extinct, when reported.
    pub state: Option<LineageState>,
    /// Trophic level, when the species is part of the food web.
    pub trophic_level: Option<f64>,
    /// Current population.
    pub population: u64,
    /// Numeric morphology statistics (body size, speed, ...).
    pub morphology: BTreeMap<String, f64>,
    /// Numeric abstract traits (aggression, fertility, ...).
    pub traits: BTreeMap<String, f64>,
    /// Named capabilities (e.g. `photosynthesis`).
    pub capabilities: Vec<String>,
}

/// Wire shape accepted from the backend. Everything is optional so that a
/// single missing field produces a precise [`DetailError`] instead of a
/// generic parse failure.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDetail {
    lineage_code: Option<LineageCode>,
    latin_name: Option<String>,
    common_name: Option<String>,
    description: Option<String>,
    state: Option<LineageState>,
    trophic_level: Option<f64>,
    population: Option<u64>,
    morphology_stats: BTreeMap<String, serde_json::Value>,
    abstract_traits: BTreeMap<String, serde_json::Value>,
    capabilities: Vec<serde_json::Value>,
}

impl SpeciesDetail {
    /// Validate a raw backend payload for the lineage `expected`.
    ///
    /// Non-numeric morphology/trait entries and non-string capabilities are
    /// discarded; they are display-only and a single odd entry must not
    /// hide the whole panel.
    ///
    /// # Errors
    ///
    /// Returns [`DetailError::Malformed`] if the payload has the wrong
    /// shape, [`DetailError::MissingField`] if `lineage_code` or
    /// `latin_name` is absent, and [`DetailError::CodeMismatch`] if the
    /// payload describes another lineage.
    pub fn from_payload(
        expected: &LineageCode,
        payload: serde_json::Value,
    ) -> Result<Self, DetailError> {
        let raw: RawDetail = serde_json::from_value(payload)?;

        let lineage_code = raw
            .lineage_code
            .filter(|c| !c.as_str().is_empty())
            .ok_or(DetailError::MissingField("lineage_code"))?;
        if &lineage_code != expected {
            return Err(DetailError::CodeMismatch {
                expected: expected.clone(),
                actual: lineage_code,
            });
        }

        let latin_name = raw
            .latin_name
            .filter(|n| !n.trim().is_empty())
            .ok_or(DetailError::MissingField("latin_name"))?;

        Ok(Self {
            lineage_code,
            latin_name,
            common_name: raw.common_name.unwrap_or_default(),
            description: raw.description.unwrap_or_default(),
            state: raw.state,
            trophic_level: raw.trophic_level.filter(|level| level.is_finite()),
            population: raw.population.unwrap_or(0),
            morphology: numeric_entries(raw.morphology_stats),
            traits: numeric_entries(raw.abstract_traits),
            capabilities: raw
                .capabilities
                .into_iter()
                .filter_map(|v| v.as_str().map(ToOwned::to_owned))
                .collect(),
        })
    }
}

/// Keep only the entries whose value is a finite JSON number.
fn numeric_entries(map: BTreeMap<String, serde_json::Value>) -> BTreeMap<String, f64> {
    map.into_iter()
        .filter_map(|(k, v)| v.as_f64().filter(|n| n.is_finite()).map(|n| (k, n)))
        .collect()
}
