//! Configuration loading and typed config structures for the dashboard
//! core.
//!
//! The canonical configuration lives in `speciation-config.yaml`. Every
//! section and field has a default, so an empty file (or no file at all)
//! yields a working configuration.

use std::path::Path;

use serde::Deserialize;

use speciation_types::TrophicBand;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is out of range.
    #[error("invalid config value: {0}")]
    Invalid(String),
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level presentation configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PresentationConfig {
    /// Food-web graph styling.
    #[serde(default)]
    pub graph: GraphStyle,

    /// Species detail endpoint.
    #[serde(default)]
    pub detail: DetailConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PresentationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values for the detail endpoint:
    /// - `SPECIATION_DETAIL_URL` overrides `detail.base_url`
    /// - `SPECIATION_DETAIL_TIMEOUT_MS` overrides `detail.timeout_ms`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.detail.apply_env_overrides()?;
        config.graph.validate()?;
        Ok(config)
    }
}

/// Food-web graph styling: node sizing and band colors.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GraphStyle {
    /// Smallest node radius, used for zero or tiny populations.
    #[serde(default = "default_min_size")]
    pub min_size: f64,

    /// Radius per order of magnitude of population.
    #[serde(default = "default_scale_factor")]
    pub scale_factor: f64,

    /// Colors per trophic band plus the keystone override.
    #[serde(default)]
    pub colors: BandPalette,
}

impl GraphStyle {
    /// Reject sizes that would break the `size >= min_size` guarantee.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `min_size` is negative or not
    /// finite, or if `scale_factor` is not finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.min_size.is_finite() || self.min_size < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "graph.min_size must be a finite non-negative number, got {}",
                self.min_size
            )));
        }
        if !self.scale_factor.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "graph.scale_factor must be finite, got {}",
                self.scale_factor
            )));
        }
        Ok(())
    }
}

impl Default for GraphStyle {
    fn default() -> Self {
        Self {
            min_size: default_min_size(),
            scale_factor: default_scale_factor(),
            colors: BandPalette::default(),
        }
    }
}

/// CSS colors used by the food-web graph.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BandPalette {
    /// Trophic level `[1,2)`.
    #[serde(default = "default_producer_color")]
    pub producer: String,
    /// Trophic level `[2,3)`.
    #[serde(default = "default_primary_consumer_color")]
    pub primary_consumer: String,
    /// Trophic level `[3,4)`.
    #[serde(default = "default_secondary_consumer_color")]
    pub secondary_consumer: String,
    /// Trophic level `[4,inf)`.
    #[serde(default = "default_apex_color")]
    pub apex: String,
    /// Keystone species, regardless of trophic level.
    #[serde(default = "default_keystone_color")]
    pub keystone: String,
}

impl BandPalette {
    /// Color for a trophic band (ignores the keystone override).
    pub fn for_band(&self, band: TrophicBand) -> &str {
        match band {
            TrophicBand::Producer => &self.producer,
            TrophicBand::PrimaryConsumer => &self.primary_consumer,
            TrophicBand::SecondaryConsumer => &self.secondary_consumer,
            TrophicBand::Apex => &self.apex,
        }
    }
}

impl Default for BandPalette {
    fn default() -> Self {
        Self {
            producer: default_producer_color(),
            primary_consumer: default_primary_consumer_color(),
            secondary_consumer: default_secondary_consumer_color(),
            apex: default_apex_color(),
            keystone: default_keystone_color(),
        }
    }
}

/// Species detail endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DetailConfig {
    /// Base URL of the backend API; details are fetched from
    /// `{base_url}/species/{code}`.
    #[serde(default = "default_detail_base_url")]
    pub base_url: String,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_detail_timeout_ms")]
    pub timeout_ms: u64,
}

impl DetailConfig {
    /// Apply `SPECIATION_DETAIL_URL` and `SPECIATION_DETAIL_TIMEOUT_MS`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the timeout variable is not an
    /// integer.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("SPECIATION_DETAIL_URL") {
            self.base_url = val;
        }
        if let Ok(val) = std::env::var("SPECIATION_DETAIL_TIMEOUT_MS") {
            self.timeout_ms = val.parse().map_err(|e| {
                ConfigError::Invalid(format!("invalid SPECIATION_DETAIL_TIMEOUT_MS: {e}"))
            })?;
        }
        Ok(())
    }
}

impl Default for DetailConfig {
    fn default() -> Self {
        Self {
            base_url: default_detail_base_url(),
            timeout_ms: default_detail_timeout_ms(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_min_size() -> f64 {
    4.0
}

const fn default_scale_factor() -> f64 {
    3.0
}

fn default_producer_color() -> String {
    "#22c55e".to_owned()
}

fn default_primary_consumer_color() -> String {
    "#eab308".to_owned()
}

fn default_secondary_consumer_color() -> String {
    "#f97316".to_owned()
}

fn default_apex_color() -> String {
    "#ef4444".to_owned()
}

fn default_keystone_color() -> String {
    "#a855f7".to_owned()
}

fn default_detail_base_url() -> String {
    "http://localhost:8000/api".to_owned()
}

const fn default_detail_timeout_ms() -> u64 {
    5_000
}

fn default_log_level() -> String {
    "info".to_owned()
}
