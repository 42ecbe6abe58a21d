//! SurveyTab - survey response tabulation and statistics
//!
//! A CLI tool that normalizes survey response tallies into a combined
//! table and reports grouped counts, filters, rankings and descriptive
//! statistics.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (config, CSV, shape mismatch, etc.)
//!   2 - Entries were dropped and --strict was set

use anyhow::{Context, Result};
use std::path::Path;
use surveytab::analysis::{self, AnalysisSettings};
use surveytab::cli::{Args, OutputFormat};
use surveytab::config::{Config, DEFAULT_CONFIG_FILE};
use surveytab::models::QuestionDataset;
use surveytab::{ingest, report};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("SurveyTab v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args) {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            error!("Tabulation failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .surveytab.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", DEFAULT_CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml()?;
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with the built-in survey.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to change questions, thresholds and reshape settings.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// `RUST_LOG` overrides the level chosen by `--verbose`/`--quiet`.
fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level().as_str().to_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the tabulation workflow. Returns exit code (0 or 2).
fn run(args: Args) -> Result<i32> {
    let (mut config, config_source) = load_config(&args)?;
    config.merge_with_args(&args);

    let (source, datasets) = load_datasets(&args, &config, config_source)?;

    let mut aggregation = analysis::aggregate(&datasets);
    if let Some(label) = args.question.as_deref() {
        aggregation = aggregation.select(label.trim())?;
    }

    for outcome in aggregation.outcomes.iter().filter(|o| o.respondents == 0) {
        warn!("Question '{}' has no responses", outcome.label);
    }
    for outcome in aggregation.outcomes.iter().filter(|o| !o.dropped.is_empty()) {
        warn!(
            "Dropped {} non-numeric response(s) from '{}': {:?}",
            outcome.dropped.len(),
            outcome.label,
            outcome.dropped
        );
    }

    let settings = AnalysisSettings::from(&config.analysis);
    let report = analysis::summarize(&source, &aggregation, &settings)?;

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
        OutputFormat::Text => report::generate_text_report(&report),
    };

    match config.general.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write report to {}", path))?;

            println!("📊 Survey Summary:");
            println!("   Questions: {}", report.metadata.questions);
            println!("   Rows: {}", report.metadata.rows);
            println!("   Dropped entries: {}", report.metadata.dropped_entries);
            println!("\n✅ Report saved to: {}", path);
        }
        None => print!("{}", output),
    }

    if args.strict && report.has_drops() {
        eprintln!(
            "\n⛔ {} entries were dropped as non-numeric. Failing (exit code 2).",
            report.metadata.dropped_entries
        );
        return Ok(2);
    }

    Ok(0)
}

/// Load configuration from file or use defaults.
///
/// Returns the config and a description of where it came from.
fn load_config(args: &Args) -> Result<(Config, String)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        let config = Config::load(config_path)?;
        return Ok((config, config_path.display().to_string()));
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok((config, DEFAULT_CONFIG_FILE.to_string()))
        }
        Ok(None) => {
            debug!("No config file found, using built-in survey");
            Ok((Config::default(), "built-in survey".to_string()))
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok((Config::default(), "built-in survey".to_string()))
        }
    }
}

/// Get the datasets from the respondent CSV or the configured questions.
fn load_datasets(
    args: &Args,
    config: &Config,
    config_source: String,
) -> Result<(String, Vec<QuestionDataset>)> {
    if let Some(ref input) = args.input {
        let table = ingest::load_csv(input)?;
        let datasets = table
            .tally()
            .with_context(|| format!("Failed to tally {}", input.display()))?;
        return Ok((input.display().to_string(), datasets));
    }

    let datasets = config
        .datasets()
        .with_context(|| format!("Invalid questions in {}", config_source))?;
    info!("Using {} questions from {}", datasets.len(), config_source);
    Ok((config_source, datasets))
}
