//! CLI entry point for the automatic cleaning pipeline.

use anyhow::{Context, Result, anyhow};
use autoclean::{
    CleaningConfig, Diagnostic, DiagnosticLevel, Pipeline, PipelineSummary, QualityEvaluator,
    QualityReport, find_dataset, load_csv, write_csv,
};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

const DEFAULT_RAW_DIR: &str = "data/raw";
const DEFAULT_OUTPUT: &str = "data/output/cleaned_data.csv";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Automatic data cleaning pipeline",
    long_about = "Cleans a raw CSV dataset, encodes and scales it, and scores its quality.\n\n\
                  EXAMPLES:\n  \
                  # Clean the first CSV found in data/raw\n  \
                  autoclean clean\n\n  \
                  # Clean a specific file without scaling\n  \
                  autoclean clean -i data.csv -o out/cleaned.csv --no-scale\n\n  \
                  # Score the cleaned output as JSON\n  \
                  autoclean evaluate --json"
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Only show warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Clean a raw dataset and write the result as CSV
    Clean(CleanArgs),
    /// Print the quality report of a dataset
    Evaluate(EvaluateArgs),
}

#[derive(Args, Debug)]
struct CleanArgs {
    /// CSV file to clean (defaults to the first CSV in --raw-dir)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Directory searched for a CSV file when --input is not given
    #[arg(long, default_value = DEFAULT_RAW_DIR)]
    raw_dir: PathBuf,

    /// Where the cleaned dataset is written
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Drop columns whose null ratio is above this value (0.0 - 1.0)
    #[arg(long, default_value_t = 0.7)]
    null_drop_threshold: f64,

    /// Convert text columns when more than this share of values parse as numbers
    #[arg(long, default_value_t = 0.8)]
    numeric_coercion_threshold: f64,

    /// IQR multiplier for outlier bounds
    #[arg(long, default_value_t = 1.5)]
    iqr_multiplier: f64,

    /// Log-transform numeric columns whose |skewness| is above this value
    #[arg(long, default_value_t = 1.0)]
    skew_threshold: f64,

    /// One-hot encode text columns with at most this many categories
    #[arg(long, default_value_t = 15)]
    one_hot_max_cardinality: usize,

    /// Store text as categorical when distinct/rows is below this value
    #[arg(long, default_value_t = 0.5)]
    categorical_ratio: f64,

    /// Relative error accepted when narrowing floats to 32 bits
    #[arg(long, default_value_t = 1e-6)]
    float_tolerance: f64,

    /// Placeholder for missing text values
    #[arg(long, default_value = "missing")]
    missing_placeholder: String,

    /// Skip categorical encoding
    #[arg(long)]
    no_encode: bool,

    /// Skip standardization
    #[arg(long)]
    no_scale: bool,

    /// Print the summary and quality report as JSON (disables logging)
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct EvaluateArgs {
    /// CSV file to evaluate
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    input: PathBuf,

    /// Print the report as JSON (disables logging)
    #[arg(long)]
    json: bool,
}

/// JSON document printed by `clean --json`.
#[derive(Serialize)]
struct CleanReport<'a> {
    input: String,
    output: String,
    summary: &'a PipelineSummary,
    diagnostics: &'a [Diagnostic],
    quality: &'a QualityReport,
}

/// JSON document printed by `evaluate --json`.
#[derive(Serialize)]
struct EvaluationReport<'a> {
    timestamp: String,
    dataset: String,
    report: &'a QualityReport,
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

fn main() -> Result<()> {
    let cli = Cli::parse();

    let json_output = match &cli.command {
        Command::Clean(args) => args.json,
        Command::Evaluate(args) => args.json,
    };
    init_logging(&cli.log_level, cli.quiet, json_output);

    let outcome = match &cli.command {
        Command::Clean(args) => run_clean(args),
        Command::Evaluate(args) => run_evaluate(args),
    };

    if let Err(ref e) = outcome {
        error!("{:#}", e);
    }
    outcome
}

fn build_config(args: &CleanArgs) -> Result<CleaningConfig> {
    let config = CleaningConfig::builder()
        .null_drop_threshold(args.null_drop_threshold)
        .numeric_coercion_threshold(args.numeric_coercion_threshold)
        .iqr_multiplier(args.iqr_multiplier)
        .skew_threshold(args.skew_threshold)
        .one_hot_max_cardinality(args.one_hot_max_cardinality)
        .categorical_ratio(args.categorical_ratio)
        .float_tolerance(args.float_tolerance)
        .missing_placeholder(&args.missing_placeholder)
        .enable_encoding(!args.no_encode)
        .enable_scaling(!args.no_scale)
        .build()?;
    Ok(config)
}

fn resolve_input(args: &CleanArgs) -> Result<PathBuf> {
    match &args.input {
        Some(path) => Ok(path.clone()),
        None => {
            let path = find_dataset(&args.raw_dir)
                .with_context(|| format!("No input given and discovery in {} failed", args.raw_dir.display()))?;
            info!("Discovered dataset: {}", path.display());
            Ok(path)
        }
    }
}

fn run_clean(args: &CleanArgs) -> Result<()> {
    let config = build_config(args)?;
    let input = resolve_input(args)?;
    let data = load_csv(&input).with_context(|| format!("Failed to load {}", input.display()))?;

    let pipeline = Pipeline::builder().config(config).build()?;
    let result = pipeline
        .process(&data)
        .map_err(|e| anyhow!("Pipeline failed: {}", e))?;

    write_csv(&result.data, &args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    let quality = pipeline.evaluate(&result.data)?;

    if args.json {
        let report = CleanReport {
            input: input.display().to_string(),
            output: args.output.display().to_string(),
            summary: &result.summary,
            diagnostics: &result.diagnostics,
            quality: &quality,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_clean_summary(&input, &args.output, &result.summary, &result.diagnostics);
    print_quality_report(&args.output, &quality);
    Ok(())
}

fn run_evaluate(args: &EvaluateArgs) -> Result<()> {
    let data = load_csv(&args.input)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;
    let report = QualityEvaluator::default().evaluate(&data)?;

    if args.json {
        let document = EvaluationReport {
            timestamp: Utc::now().to_rfc3339(),
            dataset: args.input.display().to_string(),
            report: &report,
        };
        println!("{}", serde_json::to_string_pretty(&document)?);
        return Ok(());
    }

    if report.score < 50.0 {
        warn!("Low quality score for {}", args.input.display());
    }
    print_quality_report(&args.input, &report);
    Ok(())
}

/// Print the cleaning summary.
///
/// Uses `println!` on purpose: this is the command's output, not a log line,
/// and must stay visible whatever the log level.
fn print_clean_summary(
    input: &Path,
    output: &Path,
    summary: &PipelineSummary,
    diagnostics: &[Diagnostic],
) {
    println!("\n{}", "=".repeat(80));
    println!("CLEANING SUMMARY");
    println!("{}", "=".repeat(80));
    println!("  Input:  {}", input.display());
    println!("  Output: {}", output.display());
    println!(
        "  Shape:  {} x {} -> {} x {}",
        summary.rows_before, summary.columns_before, summary.rows_after, summary.columns_after
    );
    println!("  Duplicates removed: {}", summary.duplicates_removed);
    println!("  Dropped columns:    {}", list_or_none(&summary.dropped_columns));
    println!("  Coerced columns:    {}", list_or_none(&summary.coerced_columns));
    println!("  Skew corrected:     {}", list_or_none(&summary.skew_corrected_columns));
    println!("  Encoded: {}  Scaled: {}", summary.encoded, summary.scaled);
    println!("  Duration: {} ms", summary.duration_ms);

    let warnings: Vec<&Diagnostic> = diagnostics
        .iter()
        .filter(|d| d.level == DiagnosticLevel::Warning)
        .collect();
    if !warnings.is_empty() {
        println!("\n  WARNINGS ({})", warnings.len());
        println!("  {}", "-".repeat(40));
        for diagnostic in warnings {
            println!("  - {}", diagnostic);
        }
    }
}

fn print_quality_report(dataset: &Path, report: &QualityReport) {
    println!("\n{}", "=".repeat(80));
    println!("QUALITY REPORT: {}", dataset.display());
    println!("{}", "=".repeat(80));
    println!("  Rows x Columns:   {} x {}", report.rows, report.columns);
    println!(
        "  Missing cells:    {} ({:.2}%)",
        report.missing_count,
        report.ratios.missing * 100.0
    );
    println!(
        "  Duplicate rows:   {} ({:.2}%)",
        report.duplicate_count,
        report.ratios.duplicate * 100.0
    );
    println!("  Outliers:         {}", report.outlier_count);
    println!(
        "  Skewed columns:   {} / {}",
        report.skewed_column_count, report.numeric_column_count
    );
    println!(
        "  Scaled columns:   {} / {}",
        report.properly_scaled_count, report.numeric_column_count
    );
    println!("  Fully encoded:    {}", report.encoded_ok);
    println!("  Memory:           {:.3} MB", report.memory_mb);
    println!("{}", "-".repeat(40));
    println!("  Quality score:    {:.2}/100", report.score);
    println!("{}", "=".repeat(80));
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}
