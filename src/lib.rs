//! SurveyTab - survey response tabulation and statistics.
//!
//! Per-question `response -> count` tallies are normalized into numeric
//! rows ([`normalize`]), concatenated into one combined table and array
//! ([`analysis`]), and rendered as a report ([`report`]). Survey data comes
//! from a TOML config ([`config`]), a respondent CSV ([`ingest`]), or the
//! built-in course feedback survey ([`survey`]).

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod ingest;
pub mod models;
pub mod normalize;
pub mod report;
pub mod survey;

pub use analysis::{aggregate, summarize, Aggregation, AnalysisSettings, NumericArray};
pub use error::SurveyError;
pub use models::{CombinedTable, NormalizedRow, QuestionDataset, ResponseCount};
pub use normalize::{normalize, parse_response_key, Normalized};
