//! CLI entry point for the bike-share analytics pipeline.

use citybike_analytics::error::Result;
use citybike_analytics::pipeline::{AnalyticsPipeline, PipelineOutcome};
use citybike_analytics::report::render_summary;
use citybike_analytics::PipelineConfig;
use clap::Parser;
use dotenv::dotenv;
use std::env;
use std::path::PathBuf;
use tracing::error;

#[derive(Parser, Debug)]
#[command(
    author = "CityBike Analytics Team",
    version,
    about = "Bike-share system analytics pipeline",
    long_about = "A batch analytics pipeline for bike-share CSV exports.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  CITYBIKE_DATA_DIR    Directory holding the three CSV files\n\n\
                  EXAMPLES:\n  \
                  # Analyze the datasets in ./data\n  \
                  citybike-analytics\n\n  \
                  # Custom locations\n  \
                  citybike-analytics --data-dir /srv/citybike -o reports\n\n  \
                  # Machine-readable stats on stdout\n  \
                  citybike-analytics --json | jq .total_trips\n\n  \
                  # Print the summary without writing any files\n  \
                  citybike-analytics --no-report --no-export"
)]
struct Args {
    /// Directory holding stations.csv, trips.csv and maintenance.csv
    ///
    /// Falls back to the CITYBIKE_DATA_DIR environment variable, then "data"
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Explicit path to the stations CSV (overrides --data-dir)
    #[arg(long)]
    stations: Option<PathBuf>,

    /// Explicit path to the trips CSV (overrides --data-dir)
    #[arg(long)]
    trips: Option<PathBuf>,

    /// Explicit path to the maintenance CSV (overrides --data-dir)
    #[arg(long)]
    maintenance: Option<PathBuf>,

    /// Output directory for reports and exports
    #[arg(short, long, default_value = "output")]
    output: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress the stdout summary (logs still follow --log-level)
    #[arg(short, long)]
    quiet: bool,

    /// Print business stats as JSON to stdout instead of the summary
    ///
    /// Disables all progress logs; only outputs the final JSON document.
    /// Useful for piping to other tools: `... --json | jq .peak_hour`
    #[arg(long)]
    json: bool,

    /// Skip exporting the cleaned tables as CSV
    #[arg(long)]
    no_export: bool,

    /// Skip writing summary_report.txt and business_stats.json
    #[arg(long)]
    no_report: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() {
    let args = Args::parse();

    // Initialize logging (disabled if --json is set)
    init_logging(&args.log_level, args.quiet, args.json);

    // Load environment variables from .env file
    dotenv().ok();

    if let Err(e) = run(&args) {
        if args.json {
            // Keep stdout machine-readable even on failure
            match serde_json::to_string_pretty(&e) {
                Ok(doc) => println!("{}", doc),
                Err(_) => eprintln!("{}", e),
            }
        } else {
            error!("{}", e);
        }
        let code = if e.is_recoverable() { 2 } else { 1 };
        std::process::exit(code);
    }
}

fn run(args: &Args) -> Result<()> {
    let config = build_config(args)?;
    let outcome = AnalyticsPipeline::new(config).run()?;
    handle_output(&outcome, args)
}

fn build_config(args: &Args) -> Result<PipelineConfig> {
    let mut builder = PipelineConfig::builder()
        .output_dir(&args.output)
        .export_cleaned(!args.no_export)
        .write_summary(!args.no_report)
        .write_json_stats(!args.no_report);

    let data_dir = args
        .data_dir
        .clone()
        .or_else(|| env::var("CITYBIKE_DATA_DIR").ok().map(PathBuf::from));
    if let Some(dir) = data_dir {
        builder = builder.data_dir(dir);
    }

    if let Some(ref path) = args.stations {
        builder = builder.stations_path(path);
    }
    if let Some(ref path) = args.trips {
        builder = builder.trips_path(path);
    }
    if let Some(ref path) = args.maintenance {
        builder = builder.maintenance_path(path);
    }

    Ok(builder.build()?)
}

/// Handle output based on CLI flags.
///
/// Output behavior:
/// - Default: Print the human-readable summary to stdout
/// - `--json`: Print the business stats JSON to stdout only (no logs)
/// - `--quiet`: Write files without the stdout summary
fn handle_output(outcome: &PipelineOutcome, args: &Args) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome.stats)?);
        return Ok(());
    }

    if !args.quiet {
        print_summary(outcome);
    }

    Ok(())
}

/// Print the run summary to stdout.
///
/// Note: This function uses `println!` intentionally for user-facing CLI
/// output. Unlike logging (`info!`, `debug!`), this output should always be
/// visible regardless of log level settings since it is the primary purpose
/// of the command.
fn print_summary(outcome: &PipelineOutcome) {
    println!();
    println!("{}", render_summary(&outcome.stats, &outcome.cleaning));

    if outcome.artifacts.is_empty() {
        println!("No files written (reports and exports disabled)");
    } else {
        println!("Files written:");
        for path in &outcome.artifacts {
            println!("  - {}", path.display());
        }
    }
    println!();
    println!("Use --json for machine-readable output");
    println!("{}", "=".repeat(80));
}
