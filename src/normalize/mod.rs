//! Dictionary-to-table normalization.
//!
//! Turns one question's `response -> count` tallies into numeric rows.
//! Keys that do not read as numbers (free-text ranges such as `"4-5 hrs"`)
//! are dropped rather than treated as errors; the dropped keys are handed
//! back so callers can report them.

use crate::models::{NormalizedRow, QuestionDataset};
use serde::Serialize;
use tracing::debug;

/// Rows surviving normalization for one question, plus what was dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Normalized {
    /// Label of the source question.
    pub question: String,
    /// Column heading for the response values.
    pub response_label: String,
    /// Numeric rows in original key order.
    pub rows: Vec<NormalizedRow>,
    /// Keys that could not be read as numbers, in original order.
    pub dropped: Vec<String>,
}

/// Interpret a response key as a finite number.
///
/// Surrounding whitespace is ignored. Returns `None` for free text and
/// for non-finite values such as `nan` or `inf`.
pub fn parse_response_key(key: &str) -> Option<f64> {
    let value = key.trim().parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

/// Normalize a single question dataset.
pub fn normalize(dataset: &QuestionDataset) -> Normalized {
    let mut rows = Vec::with_capacity(dataset.len());
    let mut dropped = Vec::new();

    for entry in dataset.responses() {
        match parse_response_key(&entry.key) {
            Some(response) => {
                rows.push(NormalizedRow::new(&dataset.label, response, entry.count));
            }
            None => {
                debug!(
                    "Dropping non-numeric response '{}' from '{}'",
                    entry.key, dataset.label
                );
                dropped.push(entry.key.clone());
            }
        }
    }

    Normalized {
        question: dataset.label.clone(),
        response_label: dataset.response_label.clone(),
        rows,
        dropped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_response_key() {
        assert_eq!(parse_response_key("4"), Some(4.0));
        assert_eq!(parse_response_key(" 12 "), Some(12.0));
        assert_eq!(parse_response_key("2.5"), Some(2.5));
        assert_eq!(parse_response_key("1e1"), Some(10.0));
        assert_eq!(parse_response_key("-3"), Some(-3.0));
        assert_eq!(parse_response_key("12 hours"), None);
        assert_eq!(parse_response_key("4-5 hrs"), None);
        assert_eq!(parse_response_key(""), None);
        assert_eq!(parse_response_key("nan"), None);
        assert_eq!(parse_response_key("inf"), None);
    }

    #[test]
    fn test_normalize_drops_free_text() {
        let dataset =
            QuestionDataset::from_pairs("Study Hours", [("0", 3), ("12 hours", 1), ("4", 2)])
                .unwrap();

        let normalized = normalize(&dataset);

        let pairs: Vec<(f64, u64)> = normalized
            .rows
            .iter()
            .map(|r| (r.response, r.count))
            .collect();
        assert_eq!(pairs, vec![(0.0, 3), (4.0, 2)]);
        assert_eq!(normalized.dropped, vec!["12 hours".to_string()]);
        assert!(normalized.rows.iter().all(|r| r.question == "Study Hours"));
    }

    #[test]
    fn test_normalize_keeps_label_and_order() {
        let dataset = QuestionDataset::from_pairs("Year of Study", [("4", 3), ("1", 4)])
            .unwrap()
            .with_response_label("Year");

        let normalized = normalize(&dataset);

        assert_eq!(normalized.question, "Year of Study");
        assert_eq!(normalized.response_label, "Year");
        assert_eq!(normalized.rows[0].response, 4.0);
        assert_eq!(normalized.rows[1].response, 1.0);
        assert!(normalized.dropped.is_empty());
    }

    proptest! {
        #[test]
        fn prop_row_count_matches_parseable_keys(
            keys in prop::collection::hash_set("[0-9]{1,3}|[a-z ]{1,6}", 0..20),
            count in 0u64..50,
        ) {
            let dataset = QuestionDataset::from_pairs(
                "Q",
                keys.iter().map(|k| (k.clone(), count)),
            ).unwrap();

            let expected = keys.iter().filter(|k| parse_response_key(k).is_some()).count();
            let first = normalize(&dataset);
            let second = normalize(&dataset);

            prop_assert_eq!(first.rows.len(), expected);
            prop_assert_eq!(first.rows.len() + first.dropped.len(), dataset.len());
            prop_assert_eq!(first, second);
        }
    }
}
