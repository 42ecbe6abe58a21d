//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.surveytab.toml` files, including the survey questions themselves.

use crate::error::SurveyError;
use crate::models::{ensure_unique_labels, QuestionDataset, DEFAULT_RESPONSE_LABEL};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".surveytab.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Analysis settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Survey questions. Falls back to the built-in survey when absent.
    #[serde(default = "crate::survey::builtin_questions")]
    pub questions: Vec<QuestionConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            analysis: AnalysisConfig::default(),
            questions: crate::survey::builtin_questions(),
        }
    }
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Report output path. Reports go to stdout when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// Filter, chart and reshape settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Rows with a count above this value are listed.
    #[serde(default = "default_count_threshold")]
    pub count_threshold: u64,

    /// Rows with a response above this value are listed.
    #[serde(default = "default_response_threshold")]
    pub response_threshold: f64,

    /// Number of bins in the count histogram.
    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,

    /// Rows shown in head/tail previews.
    #[serde(default = "default_head_rows")]
    pub head_rows: usize,

    /// Factor applied to the count column in the array section.
    #[serde(default = "default_count_scale")]
    pub count_scale: f64,

    /// Reshape the numeric array to `[rows, cols]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reshape: Option<[usize; 2]>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            count_threshold: default_count_threshold(),
            response_threshold: default_response_threshold(),
            histogram_bins: default_histogram_bins(),
            head_rows: default_head_rows(),
            count_scale: default_count_scale(),
            reshape: None,
        }
    }
}

fn default_count_threshold() -> u64 {
    5
}

fn default_response_threshold() -> f64 {
    3.0
}

fn default_histogram_bins() -> usize {
    10
}

fn default_head_rows() -> usize {
    5
}

fn default_count_scale() -> f64 {
    2.0
}

fn default_response_label() -> String {
    DEFAULT_RESPONSE_LABEL.to_string()
}

/// A response key as written in the config: integer, float or text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseKey {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for ResponseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseKey::Integer(i) => write!(f, "{}", i),
            ResponseKey::Float(x) => write!(f, "{}", x),
            ResponseKey::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for ResponseKey {
    fn from(value: i64) -> Self {
        ResponseKey::Integer(value)
    }
}

impl From<&str> for ResponseKey {
    fn from(value: &str) -> Self {
        ResponseKey::Text(value.to_string())
    }
}

/// One survey question as written in the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionConfig {
    /// Question identity.
    pub label: String,

    /// Column heading for response values.
    #[serde(default = "default_response_label")]
    pub response_label: String,

    /// Ordered `[key, count]` pairs.
    pub responses: Vec<(ResponseKey, u64)>,
}

impl QuestionConfig {
    /// Convert to a dataset, rejecting duplicate keys.
    pub fn to_dataset(&self) -> Result<QuestionDataset, SurveyError> {
        let pairs = self
            .responses
            .iter()
            .map(|(key, count)| (key.to_string(), *count));
        Ok(QuestionDataset::from_pairs(&self.label, pairs)?
            .with_response_label(&self.response_label))
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output) = args.output {
            self.general.output = Some(output.display().to_string());
        }

        if let Some(threshold) = args.count_threshold {
            self.analysis.count_threshold = threshold;
        }
        if let Some(threshold) = args.response_threshold {
            self.analysis.response_threshold = threshold;
        }
        if let Some(bins) = args.bins {
            self.analysis.histogram_bins = bins;
        }
        if let Some(head) = args.head {
            self.analysis.head_rows = head;
        }
        if let Some((rows, cols)) = args.reshape {
            self.analysis.reshape = Some([rows, cols]);
        }
    }

    /// Convert every configured question into a dataset.
    ///
    /// Fails on duplicate response keys or repeated question labels.
    pub fn datasets(&self) -> Result<Vec<QuestionDataset>, SurveyError> {
        let datasets = self
            .questions
            .iter()
            .map(QuestionConfig::to_dataset)
            .collect::<Result<Vec<_>, _>>()?;
        ensure_unique_labels(&datasets)?;
        Ok(datasets)
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> Result<String> {
        let config = Config::default();
        toml::to_string_pretty(&config).context("Failed to serialize default config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.analysis.count_threshold, 5);
        assert_eq!(config.analysis.histogram_bins, 10);
        assert_eq!(config.analysis.reshape, None);
        assert_eq!(config.analysis.count_scale, 2.0);
        assert_eq!(config.questions.len(), 15);
        assert!(config.general.output.is_none());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "custom_report.md"

[analysis]
count_threshold = 8
reshape = [3, 4]

[[questions]]
label = "Year of Study"
response_label = "Year"
responses = [[1, 4], [2, 4], [3, 11], [4, 3]]

[[questions]]
label = "Study Hours"
responses = [["0", 3], ["12 hours", 1], [2.5, 2]]
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output.as_deref(), Some("custom_report.md"));
        assert_eq!(config.analysis.count_threshold, 8);
        assert_eq!(config.analysis.histogram_bins, 10);
        assert_eq!(config.analysis.reshape, Some([3, 4]));
        assert_eq!(config.questions.len(), 2);
        assert_eq!(config.questions[1].response_label, "Response");

        let datasets = config.datasets().unwrap();
        assert_eq!(datasets[0].response_label, "Year");
        let keys: Vec<_> = datasets[1]
            .responses()
            .iter()
            .map(|r| r.key.as_str())
            .collect();
        assert_eq!(keys, vec!["0", "12 hours", "2.5"]);
    }

    #[test]
    fn test_questions_default_to_builtin() {
        let config: Config = toml::from_str("[analysis]\nhistogram_bins = 4\n").unwrap();
        assert_eq!(config.analysis.histogram_bins, 4);
        assert_eq!(config.questions.len(), 15);
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let question = QuestionConfig {
            label: "Q".to_string(),
            response_label: "Rating".to_string(),
            responses: vec![(ResponseKey::Integer(1), 2), (ResponseKey::from("1"), 3)],
        };
        assert!(matches!(
            question.to_dataset(),
            Err(SurveyError::DuplicateResponse { .. })
        ));
    }

    #[test]
    fn test_repeated_question_rejected() {
        let toml_content = r#"
[[questions]]
label = "Rating"
responses = [[1, 4], [2, 5]]

[[questions]]
label = "Rating"
responses = [[1, 4]]
"#;
        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(
            config.datasets().unwrap_err(),
            SurveyError::DuplicateQuestion("Rating".to_string())
        );
    }

    #[test]
    fn test_response_key_display() {
        assert_eq!(ResponseKey::Integer(4).to_string(), "4");
        assert_eq!(ResponseKey::Float(2.5).to_string(), "2.5");
        assert_eq!(ResponseKey::from("4-5 hrs").to_string(), "4-5 hrs");
    }

    #[test]
    fn test_default_toml_round_trip() {
        let toml_str = Config::default_toml().unwrap();
        assert!(toml_str.contains("[analysis]"));
        assert!(toml_str.contains("[[questions]]"));
        assert!(toml_str.contains("Year of Study"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.questions, Config::default().questions);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[analysis]\ncount_threshold = 2").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.analysis.count_threshold, 2);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/surveytab.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
