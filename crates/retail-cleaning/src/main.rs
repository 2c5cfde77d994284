//! CLI entry point for the retail data cleaning pipelines.

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use retail_cleaning::{CleaningConfig, CleaningOutcome, Entity, EntityCleaner};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// CLI-compatible entity enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliEntity {
    /// Legacy users table
    Users,
    /// Card details from PDF extraction
    Cards,
    /// Store details from the stores API
    Stores,
    /// Products catalogue from object storage
    Products,
    /// Orders fact table
    Orders,
    /// Sale date-times from the events feed
    DateTimes,
}

impl From<CliEntity> for Entity {
    fn from(cli: CliEntity) -> Self {
        match cli {
            CliEntity::Users => Entity::Users,
            CliEntity::Cards => Entity::Cards,
            CliEntity::Stores => Entity::Stores,
            CliEntity::Products => Entity::Products,
            CliEntity::Orders => Entity::Orders,
            CliEntity::DateTimes => Entity::DateTimes,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Retail data cleaning pipelines",
    long_about = "Cleans one extracted retail table into its canonical, typed form.\n\n\
                  EXAMPLES:\n  \
                  # Clean a users extract and write the result\n  \
                  retail-cleaning --entity users -i legacy_users.csv -o dim_users.csv\n\n  \
                  # Products without weight conversion, parquet output\n  \
                  retail-cleaning --entity products -i products.csv -o dim_products.parquet --no-weight-conversion\n\n  \
                  # Machine-readable report\n  \
                  retail-cleaning --entity date-times -i date_details.json --json"
)]
struct Args {
    /// Entity the input table holds
    #[arg(short, long, value_enum)]
    entity: CliEntity,

    /// Path to the raw table (.csv, .json or .parquet)
    #[arg(short, long)]
    input: String,

    /// Where to write the cleaned table (.csv or .parquet)
    ///
    /// If not specified, only the summary is printed
    #[arg(short, long)]
    output: Option<String>,

    /// Regex a cell must match to count as a corrupted placeholder
    #[arg(long)]
    bad_row_pattern: Option<String>,

    /// Leave product weights as extracted
    #[arg(long, default_value = "false")]
    no_weight_conversion: bool,

    /// JSON file with a cleaning configuration
    ///
    /// Flags given on the command line override its values
    #[arg(short, long)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output the cleaning report as JSON to stdout instead of a summary
    ///
    /// Disables all progress logs; only outputs the final JSON report.
    #[arg(long)]
    json: bool,
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
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    if !Path::new(&args.input).exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    let config = resolve_config(&args)?;
    let cleaner = EntityCleaner::builder().config(config).build()?;

    info!("Loading {} table from: {}", Entity::from(args.entity), args.input);
    let data = load_table(&args.input)?;
    info!("Table loaded successfully: {:?}", data.shape());

    let mut outcome = match cleaner.clean(args.entity.into(), data) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Cleaning failed: {}", e);
            return Err(anyhow!("Cleaning failed: {}", e));
        }
    };

    if let Some(ref output) = args.output {
        write_table(&mut outcome.data, output)?;
        info!("Cleaned table written to: {}", output);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome.report)?);
        return Ok(());
    }

    print_human_readable_summary(&outcome, &args);
    Ok(())
}

/// Start from the config file if given, then apply command line overrides.
fn resolve_config(args: &Args) -> Result<CleaningConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Could not read config file {}", path))?;
            serde_json::from_str::<CleaningConfig>(&content)
                .with_context(|| format!("Invalid config file {}", path))?
        }
        None => CleaningConfig::default(),
    };

    if let Some(ref pattern) = args.bad_row_pattern {
        config.bad_row_pattern = pattern.clone();
    }
    if args.no_weight_conversion {
        config.convert_weights = false;
    }

    Ok(config)
}

fn extension(path: &str) -> String {
    Path::new(path)
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

/// Load a raw table. CSV columns are all read as text.
fn load_table(path: &str) -> Result<DataFrame> {
    match extension(path).as_str() {
        "json" => Ok(JsonReader::new(File::open(path)?).finish()?),
        "parquet" => Ok(ParquetReader::new(File::open(path)?).finish()?),
        _ => CsvReadOptions::default()
            .with_infer_schema_length(Some(0))
            .with_has_header(true)
            .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
            .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
            .finish()
            .map_err(|e| anyhow!("Failed to read {}: {}", path, e)),
    }
}

fn write_table(df: &mut DataFrame, path: &str) -> Result<()> {
    if let Some(parent) = Path::new(path).parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)?;
        info!("Created output directory: {}", parent.display());
    }

    let mut file = File::create(path)?;
    match extension(path).as_str() {
        "parquet" => {
            ParquetWriter::new(&mut file).finish(df)?;
        }
        _ => {
            CsvWriter::new(&mut file).include_header(true).finish(df)?;
        }
    }
    Ok(())
}

/// Print a human-readable summary of the cleaning run.
fn print_human_readable_summary(outcome: &CleaningOutcome, args: &Args) {
    let report = &outcome.report;

    println!();
    println!("{}", "=".repeat(80));
    println!("CLEANING COMPLETE: {}", outcome.entity);
    println!("{}", "=".repeat(80));
    println!();

    println!(
        "Input:  {} ({} rows x {} columns)",
        args.input, report.rows_before, report.columns_before
    );
    match args.output {
        Some(ref output) => println!(
            "Output: {} ({} rows x {} columns)",
            output, report.rows_after, report.columns_after
        ),
        None => println!(
            "Output: not written ({} rows x {} columns)",
            report.rows_after, report.columns_after
        ),
    }
    println!("Target Table: {}", outcome.table);
    println!();

    println!("Cleaning Summary:");
    println!("  Duration: {}ms", report.duration_ms);
    println!(
        "  Rows: {} -> {} ({} removed)",
        report.rows_before,
        report.rows_after,
        report.total_rows_removed()
    );
    for (rule, count) in report.rows_removed.iter().filter(|(_, count)| **count > 0) {
        println!("    {}: {}", rule, count);
    }
    println!(
        "  Columns: {} -> {}",
        report.columns_before, report.columns_after
    );
    if !report.dropped_columns.is_empty() {
        println!("    dropped: {}", report.dropped_columns.join(", "));
    }
    for (column, count) in report.unknown_dates.iter().filter(|(_, count)| **count > 0) {
        println!("  Unknown dates in {}: {}", column, count);
    }
    println!();

    if !report.steps.is_empty() {
        println!("Steps:");
        for step in &report.steps {
            println!("  - {}", step);
        }
        println!();
    }

    println!("Use --json for machine-readable output");
    println!("{}", "=".repeat(80));
}
