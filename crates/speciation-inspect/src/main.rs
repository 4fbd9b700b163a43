//! Snapshot inspector for the Speciation dashboard.
//!
//! Runs lineage and food-web snapshot files through the same pipeline the
//! dashboard uses and prints the resulting view models as JSON on stdout.
//! Logs go to stderr.
//!
//! # Startup Sequence
//!
//! 1. Parse the command line
//! 2. Load configuration from `speciation-config.yaml` (or `--config`)
//! 3. Initialize structured logging (tracing)
//! 4. Run the pipeline
//! 5. Print the report

mod error;
mod pipeline;

use std::path::{Path, PathBuf};

use clap::Parser;
use speciation_core::config::{LoggingConfig, PresentationConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::InspectError;
use crate::pipeline::Inputs;

/// Command line of the inspector.
#[derive(Debug, Parser)]
#[command(name = "speciation-inspect")]
#[command(
    about = "Build genealogy and food-web view models from snapshot files",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Lineage snapshot (`{"nodes": [...]}`).
    #[arg(long)]
    lineage: Option<PathBuf>,

    /// Previous lineage snapshot to diff against.
    #[arg(long, requires = "lineage")]
    previous: Option<PathBuf>,

    /// Food-web snapshot.
    #[arg(long)]
    food_web: Option<PathBuf>,

    /// Lineage filter definition (JSON).
    #[arg(long)]
    filters: Option<PathBuf>,

    /// Search term applied to code, latin and common name.
    #[arg(long)]
    search: Option<String>,

    /// Lineage code to select and fetch details for.
    #[arg(long)]
    select: Option<String>,

    /// Detail fixtures keyed by code, used instead of the HTTP endpoint.
    #[arg(long)]
    details: Option<PathBuf>,

    /// Configuration file.
    #[arg(long, env = "SPECIATION_CONFIG", default_value = "speciation-config.yaml")]
    config: PathBuf,

    /// Pretty-print the report.
    #[arg(long)]
    pretty: bool,
}

impl Cli {
    fn inputs(&self) -> Inputs {
        Inputs {
            lineage: self.lineage.clone(),
            previous: self.previous.clone(),
            food_web: self.food_web.clone(),
            filters: self.filters.clone(),
            search: self.search.clone(),
            select: self.select.clone(),
            details: self.details.clone(),
        }
    }
}

/// Application entry point for the inspector.
///
/// # Errors
///
/// Returns an error if the configuration, an input file, or the detail
/// fetch setup fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    init_logging(&config.logging);
    info!(
        config = %cli.config.display(),
        detail_url = config.detail.base_url,
        "speciation-inspect starting"
    );

    let report = pipeline::run(&cli.inputs(), &config).await?;

    let json = if cli.pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .map_err(InspectError::from)?;
    println!("{json}");

    Ok(())
}

/// Load configuration, falling back to defaults when the file is absent.
fn load_config(path: &Path) -> Result<PresentationConfig, InspectError> {
    if path.exists() {
        Ok(PresentationConfig::from_file(path)?)
    } else {
        let mut config = PresentationConfig::default();
        config.detail.apply_env_overrides()?;
        Ok(config)
    }
}

/// `RUST_LOG` wins over the configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
