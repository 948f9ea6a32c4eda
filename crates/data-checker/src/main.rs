//! CLI entry point for the data checker.

use anyhow::{Context, Result};
use clap::Parser;
use data_checker::{CheckConfig, DEFAULT_OUTLIER_THRESHOLD, DataChecker};
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(
    author = "Data Checker Team",
    version,
    about = "Column-wise data quality checks for CSV and spreadsheet files",
    long_about = "Checks every column of a CSV file or of every sheet in a workbook for\n\
                  missing values, duplicate values and Z-score outliers, and writes the\n\
                  results as a JSON report.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  RUST_LOG    Overrides --log-level (e.g. RUST_LOG=debug)\n\n\
                  EXAMPLES:\n  \
                  # Report written to data_check_result.json next to the input\n  \
                  data-checker data.csv\n\n  \
                  # Custom output path and threshold\n  \
                  data-checker data.xlsx output.json 2.5\n\n  \
                  # Print the report to stdout\n  \
                  data-checker data.csv -"
)]
struct Args {
    /// Path to the CSV or spreadsheet file to check
    input: PathBuf,

    /// Where to write the JSON report ("-" for standard output)
    ///
    /// Defaults to <input dir>/<input name>_check_result.json
    output: Option<PathBuf>,

    /// Z-score threshold above which a value is an outlier
    #[arg(default_value_t = DEFAULT_OUTLIER_THRESHOLD)]
    threshold: f64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings and errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr so a report written to stdout stays valid JSON.
fn init_logging(level: &str, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet);

    let mut builder = CheckConfig::builder().outlier_threshold(args.threshold);
    builder = match args.output.as_deref() {
        Some(path) if path.as_os_str() == "-" => builder.stdout(),
        Some(path) => builder.output_path(path),
        None => builder,
    };
    let config = builder.build().context("Invalid arguments")?;
    debug!("Configuration: {:?}", config);

    let (report, _) = DataChecker::new(config)
        .run(&args.input)
        .with_context(|| format!("Failed to check '{}'", args.input.display()))?;
    info!("Checked {} table(s)", report.len());

    Ok(())
}
