//! String identifiers for lineage records.
//!
//! Lineage codes are assigned by the upstream simulation and double as
//! food-web node ids. Every cross-reference between records
//! (`parent_code`, `hybrid_parent_codes`, link endpoints) is a weak
//! reference by code and must be resolved through a per-snapshot lookup.

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Unique key of a lineage within a snapshot (e.g. `A1`, `B2a`).
///
/// Hashes and orders exactly like the wrapped string, so maps keyed by
/// `LineageCode` can be queried with a plain `&str`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct LineageCode(String);

impl LineageCode {
    /// Wrap a code string.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Borrow the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl core::fmt::Display for LineageCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LineageCode {
    fn from(code: &str) -> Self {
        Self(code.to_owned())
    }
}

impl From<String> for LineageCode {
    fn from(code: String) -> Self {
        Self(code)
    }
}

impl AsRef<str> for LineageCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for LineageCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}
