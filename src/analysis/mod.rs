//! Analysis modules.
//!
//! Aggregation, array reshaping and descriptive statistics, plus the
//! [`summarize`] step that assembles them into a [`SurveyReport`].

pub mod aggregator;
pub mod array;
pub mod stats;

pub use aggregator::*;
pub use array::*;
pub use stats::*;

use crate::config::AnalysisConfig;
use crate::error::SurveyError;
use crate::models::{ArraySection, QuestionSection, ReportMetadata, SurveyReport, TableStatistics};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

/// Knobs controlling which filters and charts end up in the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisSettings {
    /// Keep rows with `count > count_threshold`.
    pub count_threshold: u64,
    /// Keep rows with `response > response_threshold`.
    pub response_threshold: f64,
    /// Number of histogram bins.
    pub histogram_bins: usize,
    /// Rows shown in head/tail previews.
    pub head_rows: usize,
    /// Factor applied to the count column in the array section.
    pub count_scale: f64,
    /// Optional reshape of the numeric array.
    pub reshape: Option<(usize, usize)>,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self::from(&AnalysisConfig::default())
    }
}

impl From<&AnalysisConfig> for AnalysisSettings {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            count_threshold: config.count_threshold,
            response_threshold: config.response_threshold,
            histogram_bins: config.histogram_bins,
            head_rows: config.head_rows,
            count_scale: config.count_scale,
            reshape: config.reshape.map(|[rows, cols]| (rows, cols)),
        }
    }
}

/// Compute every report section from an aggregation.
///
/// Fails only when the requested reshape does not fit the data.
pub fn summarize(
    source: &str,
    aggregation: &Aggregation,
    settings: &AnalysisSettings,
) -> Result<SurveyReport, SurveyError> {
    let table = &aggregation.table;
    let array = table.to_array();

    let reshaped = match settings.reshape {
        Some((rows, cols)) => {
            let reshaped = array.reshape(rows, cols)?;
            info!("Reshaped {:?} array to {}x{}", array.shape(), rows, cols);
            Some(reshaped)
        }
        None => None,
    };

    let questions = aggregation
        .outcomes
        .iter()
        .map(|outcome| QuestionSection {
            label: outcome.label.clone(),
            response_label: outcome.response_label.clone(),
            rows: outcome.rows.clone(),
            respondents: outcome.respondents,
            dropped: outcome.dropped.clone(),
        })
        .collect();

    let responses: Vec<f64> = table.rows().iter().map(|r| r.response).collect();
    let counts: Vec<f64> = table.rows().iter().map(|r| r.count as f64).collect();

    let statistics = TableStatistics {
        response: Describe::compute(&responses),
        count: Describe::compute(&counts),
        columns: array.column_stats(),
        min: array.min(),
        max: array.max(),
        correlation: pearson(&responses, &counts),
    };
    debug!("Computed statistics: {:?}", statistics);

    let array_section = ArraySection {
        head: array.head(settings.head_rows),
        count_filtered: array.filter_rows(1, settings.count_threshold as f64),
        scaled_counts: array.scale_column(1, settings.count_scale).unwrap_or_default(),
    };

    let metadata = ReportMetadata {
        source: source.to_string(),
        generated_at: Utc::now(),
        questions: aggregation.outcomes.len(),
        rows: table.len(),
        duplicate_rows: table.duplicate_rows(),
        dropped_entries: aggregation.dropped_count(),
        array_shape: array.shape(),
    };

    Ok(SurveyReport {
        metadata,
        settings: settings.clone(),
        questions,
        combined: table.clone(),
        grouped: table.group_by_question(),
        statistics,
        array: array_section,
        count_filtered: table.count_above(settings.count_threshold),
        response_filtered: table.response_above(settings.response_threshold),
        ranked: table.ranked(),
        count_histogram: Histogram::new(&counts, settings.histogram_bins),
        response_box: BoxSummary::compute(&responses),
        reshaped,
    })
}
