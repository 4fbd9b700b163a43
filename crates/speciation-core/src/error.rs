//! Error types for the speciation-core crate.
//!
//! The transforms in this crate are total and never fail; integrity
//! problems in a snapshot are reported as
//! [`IntegrityWarning`](crate::ingest::IntegrityWarning) values instead.
//! Errors only arise at the I/O boundary where snapshot documents are read
//! and decoded.

use std::path::PathBuf;

/// Errors that can occur while reading a snapshot document.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The snapshot file could not be read.
    #[error("failed to read snapshot {path}: {source}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The document is not valid JSON or does not match the snapshot shape.
    #[error("failed to decode snapshot: {0}")]
    Json(#[from] serde_json::Error),
}
