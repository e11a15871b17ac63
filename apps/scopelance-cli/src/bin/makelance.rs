//! Convert a scope to a LanceDB table.
//!
//! ```text
//! makelance --directory ~/latent-scope-data --dataset squad --scope_id scopes-001 --metric cosine
//! ```
//!
//! Creates table `<scope_id>_<metric>` in `<directory>/<dataset>/lancedb` and
//! writes `<output-dir>/<scope_id>_<metric>.json` describing it.
use std::env;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use scopelance_core::config::{resolve_with_base, Settings};
use scopelance_core::error::Error;
use scopelance_core::types::ScopeRequest;
use scopelance_vector::pipeline::{prepare, publish};
use scopelance_vector::PublishOptions;

#[derive(Parser, Debug)]
#[command(name = "makelance", version, about = "Convert a scope to a LanceDB database")]
struct Cli {
    /// Directory containing the datasets [default: ~/latent-scope-data]
    #[arg(long)]
    directory: Option<String>,

    /// Name of the dataset
    #[arg(long)]
    dataset: String,

    /// ID of the scope to convert
    #[arg(long = "scope_id")]
    scope_id: String,

    /// Metric to use for the index [default: cosine]
    #[arg(long)]
    metric: Option<String>,

    /// Where to write the metadata JSON [default: scopes]
    #[arg(long = "output-dir")]
    output_dir: Option<String>,

    /// Publish the table without training an IVF_PQ index
    #[arg(long = "skip-index", default_value_t = false)]
    skip_index: bool,
}

impl Cli {
    /// Flags win over configuration.
    fn resolve(&self, mut settings: Settings) -> Result<(ScopeRequest, Settings)> {
        if let Some(directory) = &self.directory {
            settings.directory.clone_from(directory);
        }
        if let Some(metric) = &self.metric {
            settings.metric.clone_from(metric);
        }
        if let Some(output_dir) = &self.output_dir {
            settings.output_dir.clone_from(output_dir);
        }
        let cwd = env::current_dir()?;
        settings.output_dir =
            resolve_with_base(&cwd, &settings.output_dir).to_string_lossy().to_string();
        settings.validate()?;

        let request = ScopeRequest {
            directory: settings.directory.clone(),
            dataset: self.dataset.clone(),
            scope_id: self.scope_id.clone(),
            metric: settings.metric.clone(),
        };
        Ok((request, settings))
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(err) = run(Cli::parse()).await {
        error!(error = %err, "makelance failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    let (request, settings) = cli.resolve(settings)?;

    let prepared = match prepare(&request) {
        Ok(prepared) => prepared,
        // A missing data directory is reported but is not a failed run.
        Err(err) if matches!(err.downcast_ref::<Error>(), Some(Error::InvalidDirectory(_))) => {
            error!("Error: {}", err);
            return Ok(());
        }
        Err(err) => return Err(err),
    };

    let options = PublishOptions { build_index: !cli.skip_index, ..PublishOptions::default() };
    let report = publish(&request, prepared, &settings, options).await?;
    info!(
        table = %report.table_name,
        rows = report.rows,
        dim = report.dim,
        indexed = report.index.is_some(),
        "Published to {}",
        report.db_uri
    );
    Ok(())
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(env_filter).with_target(false).init();
}
