//! Respondent CSV ingestion.
//!
//! Reads a survey export where the header row names the questions and
//! every following record is one respondent, then tallies each column
//! into a [`QuestionDataset`].

use crate::error::SurveyError;
use crate::models::{ensure_unique_labels, QuestionDataset};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// Raw respondent answers, one record per respondent.
#[derive(Debug, Clone, Default)]
pub struct RespondentTable {
    headers: Vec<String>,
    records: Vec<Vec<String>>,
}

impl RespondentTable {
    /// Question labels from the header row, trimmed.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of respondents.
    pub fn respondents(&self) -> usize {
        self.records.len()
    }

    /// Answer of one respondent to one column; empty when the record is short.
    fn cell(&self, record: usize, column: usize) -> &str {
        self.records[record]
            .get(column)
            .map(|s| s.trim())
            .unwrap_or("")
    }

    /// Tally every column into a dataset.
    ///
    /// Distinct non-empty answers are kept in first-appearance order.
    /// Fails if two columns share a header.
    pub fn tally(&self) -> Result<Vec<QuestionDataset>, SurveyError> {
        let mut datasets = Vec::with_capacity(self.headers.len());

        for (column, label) in self.headers.iter().enumerate() {
            let mut order: Vec<&str> = Vec::new();
            let mut counts: HashMap<&str, u64> = HashMap::new();

            for record in 0..self.records.len() {
                let answer = self.cell(record, column);
                if answer.is_empty() {
                    continue;
                }
                let count = counts.entry(answer).or_insert(0);
                if *count == 0 {
                    order.push(answer);
                }
                *count += 1;
            }

            let pairs = order.into_iter().map(|answer| (answer, counts[answer]));
            let dataset = QuestionDataset::from_pairs(label.as_str(), pairs)?;
            debug!("Tallied '{}': {} distinct answers", label, dataset.len());
            datasets.push(dataset);
        }

        ensure_unique_labels(&datasets)?;
        Ok(datasets)
    }
}

/// Read a respondent table from any reader.
///
/// Records that fail to parse are skipped with a warning; ragged rows
/// are accepted.
pub fn from_reader<R: Read>(reader: R) -> Result<RespondentTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::None)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .context("Failed to read CSV header row")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.is_empty() {
        anyhow::bail!("CSV has no header row");
    }

    let mut records = Vec::new();
    for (line, result) in reader.records().enumerate() {
        match result {
            Ok(record) => records.push(record.iter().map(String::from).collect()),
            Err(e) => warn!("Skipping malformed record {}: {}", line + 1, e),
        }
    }

    Ok(RespondentTable { headers, records })
}

/// Load a respondent CSV file.
pub fn load_csv(path: &Path) -> Result<RespondentTable> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

    let table = from_reader(file)
        .with_context(|| format!("Failed to parse CSV file: {}", path.display()))?;

    info!(
        "Loaded {} respondents across {} questions from {}",
        table.respondents(),
        table.headers().len(),
        path.display()
    );
    Ok(table)
}
