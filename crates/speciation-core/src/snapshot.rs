//! Decoding of lineage and food-web snapshot documents.
//!
//! This is the only place the core touches raw bytes. Decoded snapshots go
//! straight to [`crate::ingest`] for integrity checks.

use std::path::Path;

use serde::de::DeserializeOwned;
use speciation_types::{FoodWebSnapshot, LineageSnapshot};

use crate::error::SnapshotError;

/// Decode a lineage snapshot from JSON text.
///
/// # Errors
///
/// Returns [`SnapshotError::Json`] if the text is not a lineage snapshot.
pub fn parse_lineage_snapshot(json: &str) -> Result<LineageSnapshot, SnapshotError> {
    Ok(serde_json::from_str(json)?)
}

/// Decode a food-web snapshot from JSON text.
///
/// # Errors
///
/// Returns [`SnapshotError::Json`] if the text is not a food-web snapshot.
pub fn parse_food_web_snapshot(json: &str) -> Result<FoodWebSnapshot, SnapshotError> {
    Ok(serde_json::from_str(json)?)
}

/// Read and decode a lineage snapshot file.
///
/// # Errors
///
/// Returns [`SnapshotError::Io`] if the file cannot be read, or
/// [`SnapshotError::Json`] if it cannot be decoded.
pub fn load_lineage_snapshot(path: &Path) -> Result<LineageSnapshot, SnapshotError> {
    load(path)
}

/// Read and decode a food-web snapshot file.
///
/// # Errors
///
/// Returns [`SnapshotError::Io`] if the file cannot be read, or
/// [`SnapshotError::Json`] if it cannot be decoded.
pub fn load_food_web_snapshot(path: &Path) -> Result<FoodWebSnapshot, SnapshotError> {
    load(path)
}

fn load<T: DeserializeOwned>(path: &Path) -> Result<T, SnapshotError> {
    let contents = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lineage_document() {
        let json = r#"{"nodes": [
            {"lineage_code": "A1", "latin_name": "Protocella prima", "state": "alive", "birth_turn": 0},
            {"lineage_code": "A2", "parent_code": "A1", "latin_name": "Protocella secunda", "state": "alive", "birth_turn": 5, "tier": "T2"}
        ]}"#;
        let snapshot = parse_lineage_snapshot(json);
        assert!(snapshot.is_ok());
        assert_eq!(snapshot.map(|s| s.nodes.len()).unwrap_or(0), 2);
    }

    #[test]
    fn rejects_wrong_shape() {
        let snapshot = parse_food_web_snapshot(r#"{"nodes": 3}"#);
        assert!(matches!(snapshot, Err(SnapshotError::Json(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let snapshot = load_lineage_snapshot(Path::new("/definitely/not/here.json"));
        assert!(matches!(snapshot, Err(SnapshotError::Io { .. })));
    }
}
