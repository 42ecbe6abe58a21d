//! Built-in course feedback survey.
//!
//! Fifteen questions from a course feedback survey. Ratings run 1-5
//! unless noted; categorical questions use integer codes.

use crate::config::{QuestionConfig, ResponseKey};

/// Questions with integer response codes.
const CODED_QUESTIONS: &[(&str, &str, &[(i64, u64)])] = &[
    // 1 = 1st year, 2 = 2nd year, ...
    ("Year of Study", "Year", &[(1, 4), (2, 4), (3, 11), (4, 3)]),
    // 1 = Lecture-based, 2 = Hands-on projects, 3 = Group discussions, 4 = Self-study
    (
        "Preferred Study Method",
        "Study Method",
        &[(1, 9), (2, 8), (3, 2), (4, 3)],
    ),
    (
        "Overall Course Quality",
        "Rating",
        &[(1, 1), (2, 2), (3, 7), (4, 4), (5, 8)],
    ),
    (
        "Instructor Satisfaction",
        "Rating",
        &[(1, 4), (2, 2), (3, 4), (4, 4), (5, 8)],
    ),
    (
        "Engaging Assignments/Projects",
        "Rating",
        &[(1, 1), (2, 1), (3, 4), (4, 9), (5, 7)],
    ),
    (
        "Course Materials",
        "Rating",
        &[(1, 5), (2, 2), (3, 2), (4, 5), (5, 8)],
    ),
    (
        "Instructor Explains Concepts",
        "Rating",
        &[(1, 1), (2, 3), (3, 4), (4, 9), (5, 5)],
    ),
    (
        "Student Participation",
        "Rating",
        &[(1, 2), (2, 2), (3, 5), (4, 5), (5, 8)],
    ),
    (
        "Instructor Approachable for Doubts",
        "Rating",
        &[(1, 1), (2, 2), (3, 4), (4, 9), (5, 6)],
    ),
    (
        "Well-Equipped Classroom",
        "Rating",
        &[(1, 4), (2, 1), (3, 2), (4, 7), (5, 8)],
    ),
    (
        "Effective Lab Sessions",
        "Rating",
        &[(1, 2), (2, 1), (3, 2), (4, 7), (5, 10)],
    ),
    (
        "University Resources",
        "Rating",
        &[(1, 5), (2, 1), (3, 2), (4, 9), (5, 5)],
    ),
];

/// Weekly study hours, entered as free text by respondents.
const STUDY_HOURS: &[(&str, u64)] = &[
    ("0", 3),
    ("2", 1),
    ("3", 1),
    ("4", 2),
    ("5", 2),
    ("6", 1),
    ("7", 1),
    ("8", 1),
    ("10", 1),
    ("12", 2),
    ("14", 1),
    ("20", 2),
    ("24", 1),
    ("26", 1),
    ("12 hours", 1),
    ("4-5 hrs", 1),
];

/// Questions following study hours.
const TRAILING_QUESTIONS: &[(&str, &str, &[(i64, u64)])] = &[
    // 1 = Always, 2 = Frequently, 3 = Occasionally, 4 = Rarely
    (
        "Lecture Attendance",
        "Attendance",
        &[(1, 11), (2, 5), (3, 4), (4, 2)],
    ),
    // 1 = Difficult material, 2 = Ineffective teaching, 3 = Lack of resources,
    // 4 = Time management, 5 = Personal motivation
    (
        "Biggest Challenges",
        "Challenge",
        &[(1, 10), (2, 11), (3, 12), (4, 8), (5, 6)],
    ),
];

fn coded(label: &str, response_label: &str, pairs: &[(i64, u64)]) -> QuestionConfig {
    QuestionConfig {
        label: label.to_string(),
        response_label: response_label.to_string(),
        responses: pairs
            .iter()
            .map(|&(key, count)| (ResponseKey::from(key), count))
            .collect(),
    }
}

/// The built-in survey in question order.
pub fn builtin_questions() -> Vec<QuestionConfig> {
    let mut questions: Vec<QuestionConfig> = CODED_QUESTIONS
        .iter()
        .map(|(label, response_label, pairs)| coded(label, response_label, pairs))
        .collect();

    questions.push(QuestionConfig {
        label: "Study Hours per Week".to_string(),
        response_label: "Hours".to_string(),
        responses: STUDY_HOURS
            .iter()
            .map(|&(key, count)| (ResponseKey::from(key), count))
            .collect(),
    });

    questions.extend(
        TRAILING_QUESTIONS
            .iter()
            .map(|(label, response_label, pairs)| coded(label, response_label, pairs)),
    );

    questions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::aggregate;
    use crate::models::QuestionDataset;

    fn datasets() -> Vec<QuestionDataset> {
        builtin_questions()
            .iter()
            .map(|q| q.to_dataset().unwrap())
            .collect()
    }

    #[test]
    fn test_builtin_question_order() {
        let questions = builtin_questions();
        assert_eq!(questions.len(), 15);
        assert_eq!(questions[0].label, "Year of Study");
        assert_eq!(questions[12].label, "Study Hours per Week");
        assert_eq!(questions[14].label, "Biggest Challenges");
    }

    #[test]
    fn test_builtin_aggregates_to_81_rows() {
        let aggregation = aggregate(&datasets());
        assert_eq!(aggregation.table.len(), 81);
        assert_eq!(aggregation.dropped_count(), 2);
        assert_eq!(
            aggregation.outcomes[12].dropped,
            vec!["12 hours".to_string(), "4-5 hrs".to_string()]
        );
    }

    #[test]
    fn test_builtin_array_reshapes_to_9x18() {
        let array = aggregate(&datasets()).table.to_array();
        assert_eq!(array.shape(), (81, 2));
        assert_eq!(array.len(), 162);
        assert_eq!(array.reshape(9, 18).unwrap().shape(), (9, 18));
        assert!(array.reshape(10, 16).is_err());
    }

    #[test]
    fn test_builtin_count_above_five() {
        let table = aggregate(&datasets()).table;
        let filtered = table.count_above(5);
        assert!(filtered.iter().all(|row| row.count > 5));
        assert!(filtered
            .iter()
            .any(|row| row.question == "Biggest Challenges" && row.count == 12));
    }
}
