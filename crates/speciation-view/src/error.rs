//! Error types for species detail fetching.

use speciation_types::{DetailError, LineageCode};

/// Errors that can occur while fetching a species detail.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The request could not be sent or the response body not read.
    #[error("detail request failed: {0}")]
    Transport(String),

    /// The endpoint answered with a non-success status.
    #[error("detail endpoint returned HTTP {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// The backend has no detail for this lineage.
    #[error("no detail available for lineage {0}")]
    NotFound(LineageCode),

    /// The payload failed validation.
    #[error("invalid detail payload: {0}")]
    Invalid(#[from] DetailError),

    /// The request exceeded the configured timeout.
    #[error("detail request timed out")]
    Timeout,

    /// The configured base URL cannot carry a species path.
    #[error("invalid detail base URL {url}: {reason}")]
    BaseUrl {
        /// The configured value.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The code cannot be expressed as a single path segment.
    #[error("lineage code '{0}' cannot be addressed")]
    Unaddressable(LineageCode),
}

impl FetchError {
    /// Whether retrying the same request may succeed.
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout => true,
            Self::Status { status } => *status >= 500,
            Self::NotFound(_)
            | Self::Invalid(_)
            | Self::BaseUrl { .. }
            | Self::Unaddressable(_) => false,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(err.to_string())
        }
    }
}
