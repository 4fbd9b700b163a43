//! Error types for the inspector binary.
//!
//! [`InspectError`] wraps every failure mode of a run so `main` can
//! propagate with `?`.

use std::path::PathBuf;

/// Top-level error for the inspector.
#[derive(Debug, thiserror::Error)]
pub enum InspectError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: speciation_core::config::ConfigError,
    },

    /// A snapshot file could not be read or decoded.
    #[error("snapshot error: {source}")]
    Snapshot {
        /// The underlying snapshot error.
        #[from]
        source: speciation_core::SnapshotError,
    },

    /// An auxiliary input file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Path that was being read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The filter file is not a valid filter definition.
    #[error("invalid filters in {path}: {source}")]
    Filters {
        /// Path of the filter file.
        path: PathBuf,
        /// The underlying decode error.
        source: serde_json::Error,
    },

    /// Setting up or running the detail fetch failed.
    #[error("detail error: {source}")]
    Detail {
        /// The underlying fetch error.
        #[from]
        source: speciation_view::error::FetchError,
    },

    /// The report could not be encoded.
    #[error("output error: {source}")]
    Output {
        /// The underlying encode error.
        #[from]
        source: serde_json::Error,
    },

    /// The command line asked for nothing to do.
    #[error("nothing to inspect: {0}")]
    Usage(String),
}
