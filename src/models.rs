//! Data models for survey tabulation.
//!
//! This module contains the core data structures used throughout
//! the application for representing questions, normalized rows, and reports.

use crate::analysis::{
    AnalysisSettings, BoxSummary, CellExtreme, ColumnStats, Describe, Histogram, NumericArray,
    QuestionGroup, RankedRow,
};
use crate::error::SurveyError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Default column heading for response values.
pub const DEFAULT_RESPONSE_LABEL: &str = "Response";

/// A single response category and its tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseCount {
    /// Response category as it arrived (nominally numeric).
    pub key: String,
    /// Number of respondents giving this response.
    pub count: u64,
}

/// One survey question with its ordered response tallies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionDataset {
    /// Question identity, e.g. "Year of Study".
    pub label: String,
    /// Column heading for the response values, e.g. "Rating".
    pub response_label: String,
    responses: Vec<ResponseCount>,
}

impl QuestionDataset {
    /// Build a dataset from `(key, count)` pairs, keeping their order.
    ///
    /// Fails with [`SurveyError::DuplicateResponse`] if a key repeats.
    pub fn from_pairs<L, K, I>(label: L, pairs: I) -> Result<Self, SurveyError>
    where
        L: Into<String>,
        K: Into<String>,
        I: IntoIterator<Item = (K, u64)>,
    {
        let label = label.into();
        let mut seen = HashSet::new();
        let mut responses = Vec::new();

        for (key, count) in pairs {
            let key = key.into();
            if !seen.insert(key.clone()) {
                return Err(SurveyError::DuplicateResponse {
                    question: label,
                    key,
                });
            }
            responses.push(ResponseCount { key, count });
        }

        Ok(Self {
            label,
            response_label: DEFAULT_RESPONSE_LABEL.to_string(),
            responses,
        })
    }

    /// Set the column heading used when displaying response values.
    pub fn with_response_label(mut self, response_label: impl Into<String>) -> Self {
        self.response_label = response_label.into();
        self
    }

    /// Response tallies in original order.
    pub fn responses(&self) -> &[ResponseCount] {
        &self.responses
    }

    /// Number of response categories.
    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    /// Total number of respondents across all categories.
    pub fn total_responses(&self) -> u64 {
        self.responses.iter().map(|r| r.count).sum()
    }

}

/// Fail with [`SurveyError::DuplicateQuestion`] if two datasets share a label.
pub fn ensure_unique_labels(datasets: &[QuestionDataset]) -> Result<(), SurveyError> {
    let mut seen = HashSet::new();
    for dataset in datasets {
        if !seen.insert(dataset.label.as_str()) {
            return Err(SurveyError::DuplicateQuestion(dataset.label.clone()));
        }
    }
    Ok(())
}

/// A response that survived the numeric parse, tagged with its question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRow {
    /// Label of the question this row came from.
    pub question: String,
    /// Numeric response value.
    pub response: f64,
    /// Tally for this response.
    pub count: u64,
}

impl NormalizedRow {
    pub fn new(question: impl Into<String>, response: f64, count: u64) -> Self {
        Self {
            question: question.into(),
            response,
            count,
        }
    }
}

impl fmt::Display for NormalizedRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {} | {}", self.question, self.response, self.count)
    }
}

/// Concatenation of normalized rows across questions, order-preserving.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CombinedTable {
    rows: Vec<NormalizedRow>,
}

impl CombinedTable {
    pub fn new(rows: Vec<NormalizedRow>) -> Self {
        Self { rows }
    }

    /// Rows in dataset order, then entry order.
    pub fn rows(&self) -> &[NormalizedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append rows, keeping their order.
    pub fn extend(&mut self, rows: impl IntoIterator<Item = NormalizedRow>) {
        self.rows.extend(rows);
    }
}

/// Normalized rows of one question as shown in the report.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionSection {
    pub label: String,
    pub response_label: String,
    pub rows: Vec<NormalizedRow>,
    /// Respondents across every category, dropped ones included.
    pub respondents: u64,
    /// Response keys that could not be read as numbers.
    pub dropped: Vec<String>,
}

/// Descriptive statistics over the combined table.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TableStatistics {
    /// Summary of the response column.
    pub response: Option<Describe>,
    /// Summary of the count column.
    pub count: Option<Describe>,
    /// Population statistics per array column (response, count).
    pub columns: Vec<ColumnStats>,
    /// Smallest cell of the numeric array.
    pub min: Option<CellExtreme>,
    /// Largest cell of the numeric array.
    pub max: Option<CellExtreme>,
    /// Pearson correlation between response and count.
    pub correlation: Option<f64>,
}

/// Slices of the `n x 2` numeric array.
#[derive(Debug, Clone, Serialize)]
pub struct ArraySection {
    /// First rows of the array.
    pub head: NumericArray,
    /// Array rows whose count exceeds the count threshold.
    pub count_filtered: NumericArray,
    /// Count column multiplied by the configured factor.
    pub scaled_counts: Vec<f64>,
}

/// Metadata about the survey report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Where the datasets came from (built-in, config path, or CSV path).
    pub source: String,
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Number of questions aggregated.
    pub questions: usize,
    /// Number of normalized rows.
    pub rows: usize,
    /// Rows that exactly repeat an earlier row.
    pub duplicate_rows: usize,
    /// Number of response entries dropped as non-numeric.
    pub dropped_entries: usize,
    /// Shape of the numeric array `(rows, cols)`.
    pub array_shape: (usize, usize),
}

/// The complete survey report.
#[derive(Debug, Clone, Serialize)]
pub struct SurveyReport {
    pub metadata: ReportMetadata,
    pub settings: AnalysisSettings,
    /// Per-question tables in dataset order.
    pub questions: Vec<QuestionSection>,
    /// All normalized rows.
    pub combined: CombinedTable,
    /// Count aggregates per question, ordered by label.
    pub grouped: Vec<QuestionGroup>,
    pub statistics: TableStatistics,
    pub array: ArraySection,
    /// Rows whose count exceeds the configured threshold.
    pub count_filtered: Vec<NormalizedRow>,
    /// Rows whose response exceeds the configured threshold.
    pub response_filtered: Vec<NormalizedRow>,
    /// Rows ordered by count (highest first) with rank and score.
    pub ranked: Vec<RankedRow>,
    /// Histogram of the count column.
    pub count_histogram: Option<Histogram>,
    /// Box summary of the response column.
    pub response_box: Option<BoxSummary>,
    /// Numeric array after the requested reshape.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reshaped: Option<NumericArray>,
}

impl SurveyReport {
    /// Whether any response entry was dropped during normalization.
    pub fn has_drops(&self) -> bool {
        self.metadata.dropped_entries > 0
    }
}
