//! Species detail sources.
//!
//! Uses enum dispatch rather than a trait object since async methods are
//! not dyn-compatible. [`HttpDetailClient`] talks to the backend over
//! `reqwest`; [`StaticDetailClient`] answers from in-memory payloads and is
//! used for offline inspection and tests.
//!
//! Both validate the raw payload into a [`SpeciesDetail`] before returning,
//! so callers never see unchecked JSON.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use speciation_core::config::DetailConfig;
use speciation_types::{DetailError, LineageCode, SpeciesDetail};
use tracing::debug;

use crate::error::FetchError;

/// A source of species details.
#[derive(Debug, Clone)]
pub enum DetailClient {
    /// The backend's `GET {base_url}/species/{code}` endpoint.
    Http(HttpDetailClient),
    /// Fixed payloads keyed by lineage code.
    Static(StaticDetailClient),
}

impl DetailClient {
    /// Fetch and validate the detail for `code`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::NotFound`] if the source has no entry for
    /// `code`, [`FetchError::Invalid`] if the payload fails validation, and
    /// transport-level variants for HTTP problems.
    pub async fn fetch(&self, code: &LineageCode) -> Result<SpeciesDetail, FetchError> {
        match self {
            Self::Http(client) => client.fetch(code).await,
            Self::Static(client) => client.fetch(code).await,
        }
    }

    /// Human-readable name for logging.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Http(_) => "http",
            Self::Static(_) => "static",
        }
    }
}

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

/// Client for the backend species detail endpoint.
#[derive(Debug, Clone)]
pub struct HttpDetailClient {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpDetailClient {
    /// Create a client with the configured base URL and timeout.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::BaseUrl`] if the base URL does not parse or
    /// cannot take path segments, and [`FetchError::Transport`] if the HTTP
    /// client cannot be built.
    pub fn new(config: &DetailConfig) -> Result<Self, FetchError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| FetchError::BaseUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::BaseUrl {
                url: config.base_url.clone(),
                reason: String::from("not a hierarchical URL"),
            });
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| FetchError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, base_url })
    }

    /// URL the detail for `code` is fetched from.
    ///
    /// The code is percent-encoded as one path segment, so `/`, `?` and `#`
    /// inside it never leave the species resource.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Unaddressable`] for an empty code or one that is
    /// a dot segment.
    pub fn endpoint(&self, code: &LineageCode) -> Result<Url, FetchError> {
        if matches!(code.as_str(), "" | "." | "..") {
            return Err(FetchError::Unaddressable(code.clone()));
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| FetchError::BaseUrl {
                url: self.base_url.to_string(),
                reason: String::from("not a hierarchical URL"),
            })?
            .pop_if_empty()
            .push("species")
            .push(code.as_str());
        Ok(url)
    }

    async fn fetch(&self, code: &LineageCode) -> Result<SpeciesDetail, FetchError> {
        let url = self.endpoint(code)?;
        debug!(url = %url, "fetching species detail");

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(code.clone()));
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let payload: serde_json::Value = response.json().await?;
        Ok(SpeciesDetail::from_payload(code, payload)?)
    }
}

// ---------------------------------------------------------------------------
// Static
// ---------------------------------------------------------------------------

/// In-memory detail source with optional per-code latency.
#[derive(Debug, Clone, Default)]
pub struct StaticDetailClient {
    payloads: Arc<BTreeMap<LineageCode, serde_json::Value>>,
    delays: Arc<BTreeMap<LineageCode, Duration>>,
}

impl StaticDetailClient {
    /// Serve the given raw payloads.
    pub fn new(payloads: impl IntoIterator<Item = (LineageCode, serde_json::Value)>) -> Self {
        Self {
            payloads: Arc::new(payloads.into_iter().collect()),
            delays: Arc::default(),
        }
    }

    /// Parse a JSON object mapping lineage codes to raw payloads.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Invalid`] if the text is not such an object.
    pub fn from_json(json: &str) -> Result<Self, FetchError> {
        let payloads: BTreeMap<LineageCode, serde_json::Value> =
            serde_json::from_str(json).map_err(DetailError::from)?;
        Ok(Self::new(payloads))
    }

    /// Delay every answer for `code` by `delay`.
    #[must_use]
    pub fn with_delay(mut self, code: impl Into<LineageCode>, delay: Duration) -> Self {
        Arc::make_mut(&mut self.delays).insert(code.into(), delay);
        self
    }

    /// Number of payloads served.
    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    /// Whether no payloads are served.
    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }

    async fn fetch(&self, code: &LineageCode) -> Result<SpeciesDetail, FetchError> {
        if let Some(delay) = self.delays.get(code) {
            tokio::time::sleep(*delay).await;
        }
        let payload = self
            .payloads
            .get(code)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(code.clone()))?;
        Ok(SpeciesDetail::from_payload(code, payload)?)
    }
}
