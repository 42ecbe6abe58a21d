//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::error::SurveyError;
use clap::Parser;
use std::path::PathBuf;

/// SurveyTab - survey response tabulation and statistics
///
/// Normalizes per-question response tallies into one combined table,
/// then reports grouped counts, filters, rankings and descriptive
/// statistics as Markdown, JSON or plain text.
///
/// Examples:
///   surveytab
///   surveytab --config survey.toml --format json
///   surveytab --input responses.csv --output report.md
///   surveytab --reshape 9x18 --count-threshold 8
///   surveytab --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, looks for .surveytab.toml in the current directory.
    /// Without any config the built-in course feedback survey is used.
    #[arg(short, long, value_name = "FILE", env = "SURVEYTAB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Respondent CSV to tally instead of the configured questions
    ///
    /// The header row names the questions; every other row is one respondent.
    #[arg(short, long, value_name = "CSV")]
    pub input: Option<PathBuf>,

    /// Output file path for the report (stdout when omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json, text)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Reshape the (response, count) array, e.g. 9x18
    ///
    /// Fails if the shape does not hold exactly the available values.
    #[arg(long, value_name = "ROWSxCOLS", value_parser = parse_shape)]
    pub reshape: Option<(usize, usize)>,

    /// List rows whose count exceeds this value
    #[arg(long, value_name = "N")]
    pub count_threshold: Option<u64>,

    /// List rows whose response exceeds this value
    #[arg(long, value_name = "X")]
    pub response_threshold: Option<f64>,

    /// Number of bins in the count histogram
    #[arg(long, value_name = "N")]
    pub bins: Option<usize>,

    /// Rows shown in head/tail previews
    #[arg(long, value_name = "N")]
    pub head: Option<usize>,

    /// Restrict the report to a single question label
    #[arg(long, value_name = "LABEL")]
    pub question: Option<String>,

    /// Exit with code 2 if any response entry was dropped as non-numeric
    #[arg(long)]
    pub strict: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .surveytab.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
    /// Plain text, one section after another
    Text,
}

/// Parse `ROWSxCOLS` (case-insensitive `x`).
pub fn parse_shape(s: &str) -> Result<(usize, usize), SurveyError> {
    let invalid = || SurveyError::InvalidShape(s.to_string());

    let (rows, cols) = s
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(invalid)?;
    let rows = rows.trim().parse::<usize>().map_err(|_| invalid())?;
    let cols = cols.trim().parse::<usize>().map_err(|_| invalid())?;

    if rows == 0 || cols == 0 {
        return Err(invalid());
    }
    Ok((rows, cols))
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.bins == Some(0) {
            return Err("Histogram bins must be at least 1".to_string());
        }

        if let Some(threshold) = self.response_threshold {
            if !threshold.is_finite() {
                return Err("Response threshold must be a finite number".to_string());
            }
        }

        if let Some(ref input) = self.input {
            if !input.is_file() {
                return Err(format!("Input file does not exist: {}", input.display()));
            }
        }

        if let Some(ref question) = self.question {
            if question.trim().is_empty() {
                return Err("Question label must not be empty".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            config: None,
            input: None,
            output: None,
            format: OutputFormat::Markdown,
            reshape: None,
            count_threshold: None,
            response_threshold: None,
            bins: None,
            head: None,
            question: None,
            strict: false,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_shape() {
        assert_eq!(parse_shape("9x18"), Ok((9, 18)));
        assert_eq!(parse_shape(" 4 X 5 "), Ok((4, 5)));
        assert_eq!(
            parse_shape("9by18"),
            Err(SurveyError::InvalidShape("9by18".to_string()))
        );
        assert!(parse_shape("0x5").is_err());
        assert!(parse_shape("x5").is_err());
        assert!(parse_shape("9x").is_err());
    }

    #[test]
    fn test_parse_from_command_line() {
        let args = Args::try_parse_from([
            "surveytab",
            "--reshape",
            "9x18",
            "--format",
            "json",
            "--count-threshold",
            "8",
            "--strict",
        ])
        .unwrap();
        assert_eq!(args.reshape, Some((9, 18)));
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.count_threshold, Some(8));
        assert!(args.strict);
    }

    #[test]
    fn test_invalid_reshape_rejected_by_parser() {
        assert!(Args::try_parse_from(["surveytab", "--reshape", "nine"]).is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_bins() {
        let mut args = make_args();
        args.bins = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_missing_input() {
        let mut args = make_args();
        args.input = Some(PathBuf::from("/nonexistent/responses.csv"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_skipped_for_init_config() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
