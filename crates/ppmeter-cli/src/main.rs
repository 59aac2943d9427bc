//! # ppmeter
//!
//! Measures how fast or slow a clock runs against the host's monotonic timer,
//! in parts per million.
//!
//! ## Usage
//!
//! ```bash
//! # Estimate drift from recorded trials
//! ppmeter analyze trial_5s.csv trial_20s.csv
//!
//! # Band between two trials over the first hour
//! ppmeter compare trial_5s.csv trial_20s.csv --to 3600
//!
//! # Follow a device printing its time once per second
//! ppmeter live /dev/ttyUSB0 --record trial.csv
//! ```

mod config;
mod live;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ppmeter_source::{read_samples, CsvOptions};
use ppmeter_time::{BandReport, EngineConfig, TrialReport};

use config::{Config, Overrides};

/// ppmeter - clock drift meter
#[derive(Parser)]
#[command(name = "ppmeter")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbosity level (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// TOML configuration file
    #[arg(long, value_name = "TOML", global = true)]
    config: Option<PathBuf>,

    /// EMA smoothing constant in (0, 1]; 1 disables smoothing
    #[arg(long, global = true)]
    alpha: Option<f64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate drift for each trial file
    Analyze {
        /// Trial CSV files (actual;measured)
        #[arg(value_name = "CSV", required = true)]
        files: Vec<PathBuf>,

        /// Emit full reports as JSON
        #[arg(long)]
        json: bool,
    },

    /// Band between two trials of the same clock
    Compare {
        #[arg(value_name = "CSV_A")]
        first: PathBuf,

        #[arg(value_name = "CSV_B")]
        second: PathBuf,

        /// Band title (defaults to the first file's name)
        #[arg(short, long)]
        label: Option<String>,

        /// Domain start in seconds
        #[arg(long)]
        from: Option<f64>,

        /// Domain end in seconds
        #[arg(long)]
        to: Option<f64>,

        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Follow a device feed until end of input or Ctrl-C
    Live {
        /// Device path, or - for stdin
        #[arg(value_name = "DEVICE")]
        device: PathBuf,

        /// Record samples to a trial CSV
        #[arg(short, long, value_name = "CSV")]
        record: Option<PathBuf>,

        /// Emit the final report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: u8) {
    // Device chatter is logged at info by the source crate
    let level = match verbose {
        0 => "warn,ppmeter_source=info",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    block_on_detached(run(cli))
}

/// Run `future` on a fresh runtime and return without waiting for
/// blocking-pool work still in flight
///
/// A device or stdin read may still be parked on the blocking pool after
/// Ctrl-C; the process must not wait for the next line to exit.
fn block_on_detached<T>(future: impl std::future::Future<Output = Result<T>>) -> Result<T> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let result = runtime.block_on(future);
    runtime.shutdown_background();
    result
}

async fn run(cli: Cli) -> Result<()> {
    let file = Config::load(cli.config.as_deref())?;
    let csv = file.csv_options()?;
    let mut overrides = Overrides {
        alpha: cli.alpha,
        ..Overrides::default()
    };

    match cli.command {
        Commands::Analyze { files, json } => {
            let engine = file.engine_config(&overrides)?;
            run_analyze(&files, &engine, &csv, json)
        }
        Commands::Compare {
            first,
            second,
            label,
            from,
            to,
            json,
        } => {
            overrides.from = from;
            overrides.to = to;
            let engine = file.engine_config(&overrides)?;
            run_compare(&first, &second, label, &engine, &csv, json)
        }
        Commands::Live {
            device,
            record,
            json,
        } => {
            let engine = file.engine_config(&overrides)?;
            run_live(device, record, &engine, &csv, json).await
        }
    }
}

fn label_for(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Load one trial file and report on it
fn load_report(path: &Path, engine: &EngineConfig, csv: &CsvOptions) -> Result<TrialReport> {
    let samples = read_samples(path, csv)
        .with_context(|| format!("Failed to read trial file: {}", path.display()))?;
    let total = samples.len();

    let mut trial = engine.trial()?;
    let accepted = trial.observe_all(samples);
    if accepted < total {
        warn!(
            file = %path.display(),
            rejected = total - accepted,
            "samples out of order or invalid were skipped"
        );
    }
    info!("{}: {} samples", path.display(), accepted);

    Ok(TrialReport::new(label_for(path), &trial, engine))
}

/// Drift estimate per trial file
fn run_analyze(files: &[PathBuf], engine: &EngineConfig, csv: &CsvOptions, json: bool) -> Result<()> {
    let reports = files
        .iter()
        .map(|path| load_report(path, engine, csv))
        .collect::<Result<Vec<_>>>()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            print!("{}", output::trial_summary(report));
        }
    }
    Ok(())
}

/// Band between two trial files
fn run_compare(
    first: &Path,
    second: &Path,
    label: Option<String>,
    engine: &EngineConfig,
    csv: &CsvOptions,
    json: bool,
) -> Result<()> {
    let a = load_report(first, engine, csv)?;
    let b = load_report(second, engine, csv)?;
    let label = label.unwrap_or_else(|| a.label.clone());

    let report = BandReport::new(label, a, b, engine);
    if report.band.is_none() {
        warn!("both trials need at least two samples with distinct times for a band");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", output::band_summary(&report));
    }
    Ok(())
}

/// Follow a device and print the final estimate
async fn run_live(
    device: PathBuf,
    record: Option<PathBuf>,
    engine: &EngineConfig,
    csv: &CsvOptions,
    json: bool,
) -> Result<()> {
    // The table would interleave with the JSON document
    let table: Box<dyn Write> = if json {
        Box::new(std::io::sink())
    } else {
        Box::new(std::io::stdout())
    };

    let label = label_for(&device);
    let (trial, summary) = live::run(device, record, csv.delimiter, engine, table).await?;
    info!(
        "{} lines, {} samples, {} duplicates",
        summary.lines, summary.samples, summary.duplicates
    );

    if json {
        let report = TrialReport::new(label, &trial, engine);
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    match trial.fit() {
        Ok(estimate) => println!("{}", output::drift_lines(&estimate)),
        Err(err) => println!("No estimate: {err}"),
    }
    Ok(())
}
