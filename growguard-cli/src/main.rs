//! GrowGuard command-line interface
//!
//! - `train`: fit a detector on a historical CSV and persist its artifacts
//! - `check`: score a single reading against the persisted detector
//! - `batch`: score every row of a CSV and write the results as CSV
//! - `report`: write a text warning report for a CSV
//! - `send`: post a reading to a running server
//! - `serve`: run the HTTP API

use std::{net::SocketAddr, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use growguard_ml::Sensitivity;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

/// GrowGuard CLI arguments
#[derive(Debug, Parser)]
#[clap(name = "growguard", version, about = "Hydroponic sensor anomaly detection")]
struct Cli {
    /// Directory holding the detector artifacts
    #[clap(long, env = "GROWGUARD_ARTIFACTS", default_value = ".", global = true)]
    artifacts: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[clap(long, env = "GROWGUARD_LOG_LEVEL", default_value = "info", global = true)]
    log_level: String,

    #[clap(subcommand)]
    command: Commands,
}

/// Available subcommands
#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to listen on
        #[clap(long, env = "GROWGUARD_BIND", default_value = "0.0.0.0:5000")]
        bind: SocketAddr,
    },
    /// Train a detector on historical readings and persist it
    Train {
        /// Historical readings CSV
        #[clap(long)]
        data: PathBuf,

        /// Contamination preset
        #[clap(long, default_value = "medium")]
        sensitivity: Sensitivity,

        /// Explicit contamination fraction, overrides --sensitivity
        #[clap(long, conflicts_with = "sensitivity")]
        contamination: Option<f64>,

        /// Number of trees
        #[clap(long, default_value_t = growguard_ml::DEFAULT_NUM_TREES)]
        trees: usize,

        /// Random seed
        #[clap(long, default_value_t = growguard_ml::DEFAULT_SEED)]
        seed: u64,
    },
    /// Score a single reading
    Check {
        /// Temperature in °C
        #[clap(allow_negative_numbers = true)]
        temperature: f64,
        /// Relative humidity in %
        humidity: f64,
        /// pH level
        ph: f64,

        /// Plant identifier shown in the analysis
        #[clap(long)]
        plant_id: Option<String>,

        /// Date shown in the analysis
        #[clap(long)]
        date: Option<String>,
    },
    /// Score every row of a CSV and write the results as CSV
    Batch {
        /// Readings CSV
        #[clap(long)]
        input: PathBuf,

        /// Output CSV [default: anomaly_results_<timestamp>.csv]
        #[clap(long)]
        output: Option<PathBuf>,
    },
    /// Write a warning report for a CSV
    Report {
        /// Readings CSV
        #[clap(long)]
        data: PathBuf,

        /// Output file [default: anomaly_report_<timestamp>.txt]
        #[clap(long)]
        output: Option<PathBuf>,
    },
    /// Post a reading to a running server
    Send {
        /// Temperature in °C
        #[clap(allow_negative_numbers = true)]
        temperature: f64,
        /// Relative humidity in %
        humidity: f64,
        /// pH level
        ph: f64,

        /// Server base URL
        #[clap(long, env = "GROWGUARD_SERVER")]
        server: String,

        /// Plant identifier
        #[clap(long, default_value = growguard_connectors::DEFAULT_PLANT_ID)]
        plant_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;
    debug!("GrowGuard v{}", env!("CARGO_PKG_VERSION"));

    let artifacts = cli.artifacts;
    match cli.command {
        Commands::Serve { bind } => commands::serve(artifacts, bind).await,
        Commands::Train {
            data,
            sensitivity,
            contamination,
            trees,
            seed,
        } => {
            let contamination = contamination.unwrap_or_else(|| sensitivity.contamination());
            commands::train(&artifacts, &data, contamination, trees, seed)
        }
        Commands::Check {
            temperature,
            humidity,
            ph,
            plant_id,
            date,
        } => commands::check(&artifacts, temperature, humidity, ph, plant_id, date),
        Commands::Batch { input, output } => commands::batch(&artifacts, &input, output),
        Commands::Report { data, output } => commands::report(&artifacts, &data, output),
        Commands::Send {
            temperature,
            humidity,
            ph,
            server,
            plant_id,
        } => commands::send(&server, temperature, humidity, ph, plant_id),
    }
}

/// Install the tracing subscriber; `log` records from the libraries are
/// bridged into it
fn init_logging(cli: &Cli) -> Result<()> {
    let log_level = cli
        .log_level
        .parse::<tracing::Level>()
        .context("Invalid log level")?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(log_level.into()))
        .try_init()
        .context("Failed to install logger")?;

    Ok(())
}
