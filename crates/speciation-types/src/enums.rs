//! Enumeration types shared by lineage records, the food web, and the
//! dashboard view models.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Lineage state
// ---------------------------------------------------------------------------

/// Whether a lineage still has living members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum LineageState {
    /// At least one living population remains.
    Alive,
    /// The lineage died out at `extinction_turn`.
    Extinct,
}

impl LineageState {
    /// Wire name used by the backend and the filter controls.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Alive => "alive",
            Self::Extinct => "extinct",
        }
    }
}

// ---------------------------------------------------------------------------
// Taxonomic rank
// ---------------------------------------------------------------------------

/// Taxonomic rank of a lineage record.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum TaxonomicRank {
    /// A full species.
    #[default]
    Species,
    /// A subspecies of its parent lineage.
    Subspecies,
    /// A hybrid of up to two parent lineages.
    Hybrid,
}

// ---------------------------------------------------------------------------
// Trophic band
// ---------------------------------------------------------------------------

/// Coarse trophic band derived from a real-valued trophic level.
///
/// Bands are half-open: `[1,2)` producer, `[2,3)` primary consumer,
/// `[3,4)` secondary consumer, `[4,inf)` apex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum TrophicBand {
    /// Primary producers (trophic level below 2).
    Producer,
    /// Herbivores and other first-order consumers.
    PrimaryConsumer,
    /// Consumers of primary consumers.
    SecondaryConsumer,
    /// Top predators (trophic level 4 and above).
    Apex,
}

impl TrophicBand {
    /// All bands in ascending trophic order.
    pub const ALL: [Self; 4] = [
        Self::Producer,
        Self::PrimaryConsumer,
        Self::SecondaryConsumer,
        Self::Apex,
    ];

    /// Classify a trophic level.
    ///
    /// Levels below 1 and `NaN` fall into [`TrophicBand::Producer`]; upstream
    /// guarantees levels `>= 1`, so these only appear in malformed snapshots.
    pub fn from_level(level: f64) -> Self {
        if level >= 4.0 {
            Self::Apex
        } else if level >= 3.0 {
            Self::SecondaryConsumer
        } else if level >= 2.0 {
            Self::PrimaryConsumer
        } else {
            Self::Producer
        }
    }

    /// Human-readable label for legends.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Producer => "Producer",
            Self::PrimaryConsumer => "Primary consumer",
            Self::SecondaryConsumer => "Secondary consumer",
            Self::Apex => "Apex predator",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_boundaries_are_half_open() {
        assert_eq!(TrophicBand::from_level(1.0), TrophicBand::Producer);
        assert_eq!(TrophicBand::from_level(1.999), TrophicBand::Producer);
        assert_eq!(TrophicBand::from_level(2.0), TrophicBand::PrimaryConsumer);
        assert_eq!(TrophicBand::from_level(2.5), TrophicBand::PrimaryConsumer);
        assert_eq!(TrophicBand::from_level(3.0), TrophicBand::SecondaryConsumer);
        assert_eq!(TrophicBand::from_level(4.0), TrophicBand::Apex);
        assert_eq!(TrophicBand::from_level(7.25), TrophicBand::Apex);
    }

    #[test]
    fn malformed_levels_are_producers() {
        assert_eq!(TrophicBand::from_level(0.0), TrophicBand::Producer);
        assert_eq!(TrophicBand::from_level(-3.0), TrophicBand::Producer);
        assert_eq!(TrophicBand::from_level(f64::NAN), TrophicBand::Producer);
        assert_eq!(TrophicBand::from_level(f64::INFINITY), TrophicBand::Apex);
    }

    #[test]
    fn state_wire_names() {
        let json = serde_json::to_string(&LineageState::Extinct).unwrap_or_default();
        assert_eq!(json, "\"extinct\"");
        assert_eq!(LineageState::Alive.as_str(), "alive");

        let rank: Result<TaxonomicRank, _> = serde_json::from_str("\"subspecies\"");
        assert_eq!(rank.ok(), Some(TaxonomicRank::Subspecies));
    }
}
