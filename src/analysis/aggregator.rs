//! Cross-question aggregation and table operations.
//!
//! This module merges per-question normalized rows into one long-form
//! [`CombinedTable`] and provides the filtering, grouping, sorting and
//! reshaping operations consumers apply to it.

use crate::analysis::array::{NumericArray, ResponseGrid};
use crate::error::SurveyError;
use crate::models::{CombinedTable, NormalizedRow, QuestionDataset};
use crate::normalize::normalize;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// What normalization kept and dropped for one question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionOutcome {
    pub label: String,
    pub response_label: String,
    /// Rows this question contributed to the combined table.
    pub rows: Vec<NormalizedRow>,
    /// Respondents across every category, dropped ones included.
    pub respondents: u64,
    /// Keys dropped as non-numeric.
    pub dropped: Vec<String>,
}

/// Result of aggregating a sequence of questions.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub table: CombinedTable,
    /// One outcome per input dataset, in input order.
    pub outcomes: Vec<QuestionOutcome>,
}

impl Aggregation {
    /// Total number of dropped entries across all questions.
    pub fn dropped_count(&self) -> usize {
        self.outcomes.iter().map(|o| o.dropped.len()).sum()
    }

    /// Narrow the aggregation to one question.
    ///
    /// Fails with [`SurveyError::UnknownQuestion`] when no question has that label.
    pub fn select(self, label: &str) -> Result<Aggregation, SurveyError> {
        let outcomes: Vec<QuestionOutcome> = self
            .outcomes
            .into_iter()
            .filter(|o| o.label == label)
            .collect();

        if outcomes.is_empty() {
            return Err(SurveyError::UnknownQuestion(label.to_string()));
        }

        Ok(Aggregation {
            table: CombinedTable::new(self.table.filter_question(label)),
            outcomes,
        })
    }
}

/// Count aggregates for one question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionGroup {
    pub question: String,
    /// Sum of counts.
    pub sum: u64,
    /// Mean count per response category.
    pub mean: f64,
    /// Number of response categories.
    pub count: usize,
}

/// A row together with its count rank and score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRow {
    pub row: NormalizedRow,
    /// Descending rank of the count; ties share the average position.
    pub rank: f64,
    /// Response multiplied by count.
    pub score: f64,
}

/// Normalize each dataset in order and concatenate the rows.
pub fn aggregate(datasets: &[QuestionDataset]) -> Aggregation {
    let mut table = CombinedTable::default();
    let mut outcomes = Vec::with_capacity(datasets.len());

    for dataset in datasets {
        let normalized = normalize(dataset);
        debug!(
            "Aggregated '{}': {} kept, {} dropped",
            normalized.question,
            normalized.rows.len(),
            normalized.dropped.len()
        );

        table.extend(normalized.rows.iter().cloned());
        outcomes.push(QuestionOutcome {
            label: normalized.question,
            response_label: normalized.response_label,
            rows: normalized.rows,
            respondents: dataset.total_responses(),
            dropped: normalized.dropped,
        });
    }

    Aggregation { table, outcomes }
}

impl CombinedTable {
    /// Rows belonging to one question, in original order.
    pub fn filter_question(&self, label: &str) -> Vec<NormalizedRow> {
        self.filter(|row| row.question == label)
    }

    /// Rows matching a predicate, in original order.
    pub fn filter<F>(&self, predicate: F) -> Vec<NormalizedRow>
    where
        F: Fn(&NormalizedRow) -> bool,
    {
        self.rows().iter().filter(|r| predicate(r)).cloned().collect()
    }

    /// Rows whose count is strictly greater than `threshold`.
    pub fn count_above(&self, threshold: u64) -> Vec<NormalizedRow> {
        self.filter(|row| row.count > threshold)
    }

    /// Rows whose response is strictly greater than `threshold`.
    pub fn response_above(&self, threshold: f64) -> Vec<NormalizedRow> {
        self.filter(|row| row.response > threshold)
    }

    /// First `n` rows.
    pub fn head(&self, n: usize) -> &[NormalizedRow] {
        &self.rows()[..n.min(self.len())]
    }

    /// Last `n` rows.
    pub fn tail(&self, n: usize) -> &[NormalizedRow] {
        &self.rows()[self.len().saturating_sub(n)..]
    }

    /// Drop exact duplicate rows, keeping the first occurrence.
    pub fn dedup(&self) -> CombinedTable {
        let mut seen = HashSet::new();
        let rows = self
            .rows()
            .iter()
            .filter(|row| seen.insert((row.question.as_str(), row.response.to_bits(), row.count)))
            .cloned()
            .collect();
        CombinedTable::new(rows)
    }

    /// Number of rows [`CombinedTable::dedup`] would remove.
    pub fn duplicate_rows(&self) -> usize {
        self.len() - self.dedup().len()
    }

    /// Row indices ordered by count, highest first. Ties keep table order.
    fn count_order(&self) -> Vec<usize> {
        let rows = self.rows();
        let mut order: Vec<usize> = (0..rows.len()).collect();
        order.sort_by(|&a, &b| rows[b].count.cmp(&rows[a].count));
        order
    }

    /// Descending rank of each row's count, in table order.
    ///
    /// Rank 1 is the largest count. Tied counts receive the mean of the
    /// positions they occupy.
    pub fn count_ranks(&self) -> Vec<f64> {
        let rows = self.rows();
        let order = self.count_order();

        let mut ranks = vec![0.0; rows.len()];
        let mut start = 0;
        while start < order.len() {
            let count = rows[order[start]].count;
            let mut end = start;
            while end + 1 < order.len() && rows[order[end + 1]].count == count {
                end += 1;
            }
            // Positions start..=end are 0-based; ranks are 1-based.
            let rank = (start + end) as f64 / 2.0 + 1.0;
            for &idx in &order[start..=end] {
                ranks[idx] = rank;
            }
            start = end + 1;
        }

        ranks
    }

    /// Response multiplied by count for each row.
    pub fn scores(&self) -> Vec<f64> {
        self.rows()
            .iter()
            .map(|row| row.response * row.count as f64)
            .collect()
    }

    /// Rows sorted by count (highest first, ties in table order) with rank
    /// and score attached.
    pub fn ranked(&self) -> Vec<RankedRow> {
        let rows = self.rows();
        let ranks = self.count_ranks();
        let scores = self.scores();

        self.count_order()
            .into_iter()
            .map(|idx| RankedRow {
                row: rows[idx].clone(),
                rank: ranks[idx],
                score: scores[idx],
            })
            .collect()
    }

    /// Sum, mean and number of categories per question, ordered by label.
    pub fn group_by_question(&self) -> Vec<QuestionGroup> {
        let mut grouped: BTreeMap<&str, (u64, usize)> = BTreeMap::new();

        for row in self.rows() {
            let entry = grouped.entry(row.question.as_str()).or_default();
            entry.0 += row.count;
            entry.1 += 1;
        }

        grouped
            .into_iter()
            .map(|(question, (sum, count))| QuestionGroup {
                question: question.to_string(),
                sum,
                mean: sum as f64 / count as f64,
                count,
            })
            .collect()
    }

    /// `n x 2` array of (response, count).
    pub fn to_array(&self) -> NumericArray {
        let data = self
            .rows()
            .iter()
            .flat_map(|row| [row.response, row.count as f64])
            .collect();
        NumericArray::from_parts(self.len(), 2, data)
    }

    /// Lay the rows out in a `rows x cols` grid.
    ///
    /// Succeeds only when `rows * cols` equals the number of table rows.
    pub fn reshape(&self, rows: usize, cols: usize) -> Result<ResponseGrid, SurveyError> {
        let cells = self.rows().iter().map(|r| (r.response, r.count)).collect();
        ResponseGrid::new(rows, cols, cells)
    }
}
