//! Error types for the tabulation core.

use thiserror::Error;

/// Failures raised by dataset construction and array reshaping.
///
/// Unparsable response keys are not represented here: they are dropped
/// by the normalizer and reported through its drop list instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurveyError {
    /// Requested shape does not hold exactly the available values.
    #[error("cannot reshape {len} values into a {rows}x{cols} array")]
    ShapeMismatch { rows: usize, cols: usize, len: usize },

    /// The same response key appears twice in one question.
    #[error("duplicate response '{key}' in question '{question}'")]
    DuplicateResponse { question: String, key: String },

    /// Two questions share the same label.
    #[error("duplicate question '{0}'")]
    DuplicateQuestion(String),

    /// A question label was requested that no dataset carries.
    #[error("unknown question: {0}")]
    UnknownQuestion(String),

    /// Shape text was not of the form `ROWSxCOLS`.
    #[error("invalid shape '{0}', expected ROWSxCOLS (e.g. 9x18)")]
    InvalidShape(String),
}
