//! CLI entry point for the energy resampler.
//!
//! Loads a raw reading export from a file or URL, regularizes it onto an
//! hourly grid and aggregates it to the requested time section.

use anyhow::Result;
use clap::{Parser, Subcommand};
use energy_resampler::fetch::{BasicClient, load_source};
use energy_resampler::output::{print_json, print_pretty};
use energy_resampler::parser::parse_readings;
use energy_resampler::resample::regularize::EdgePolicy;
use energy_resampler::{Engine, EngineConfig, TimeSection};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "energy_resampler")]
#[command(about = "Regularize and aggregate energy-source readings", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the table for one time section from a CSV file or URL
    Generate {
        /// Path or URL of the raw readings CSV (optionally gzipped)
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// original, hour, day, week, month or year
        #[arg(short, long, default_value = "hour")]
        time_section: String,

        /// CSV file to write the result to (`.gz` to compress)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON engine config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Native sampling interval of the source, in minutes
        #[arg(long)]
        sampling_minutes: Option<u32>,

        /// What to do with missing values at the ends of the series
        #[arg(long, value_enum)]
        edge_policy: Option<EdgePolicy>,

        /// Log each pipeline stage
        #[arg(short, long, default_value_t = false)]
        verbose: bool,

        /// Print the resulting table as JSON on stdout
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// List the accepted time sections
    Sections,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/energy_resampler.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("energy_resampler.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            source,
            time_section,
            output,
            config,
            sampling_minutes,
            edge_policy,
            verbose,
            json,
        } => {
            // Reject a bad section before downloading anything.
            let section: TimeSection = time_section.parse()?;

            let mut engine_config = match config {
                Some(path) => EngineConfig::load(path)?,
                None => EngineConfig::default(),
            };
            if let Some(minutes) = sampling_minutes {
                engine_config.sampling_interval_minutes = minutes;
            }
            if let Some(policy) = edge_policy {
                engine_config.edge_policy = policy;
            }

            let bytes = load_source(&BasicClient::new(), &source).await?;
            let dataset = parse_readings(&bytes, engine_config.delimiter_byte()?)?;
            info!(
                source = %source,
                readings = dataset.readings.len(),
                fields = dataset.fields.len(),
                "Source parsed"
            );

            let engine = Engine::new(engine_config);
            let table = engine.generate(
                &dataset,
                &section.to_string(),
                output.as_deref(),
                verbose,
            )?;

            if json {
                print_json(&table)?;
            } else {
                print_pretty(&table);
            }
            info!(section = %section, rows = table.len(), "Done");
        }
        Commands::Sections => {
            for name in TimeSection::names() {
                println!("{name}");
            }
        }
    }

    Ok(())
}
