//! Report generation.
//!
//! This module renders a [`SurveyReport`] as Markdown, plain text or JSON.
//! Rendering only reads the report; every number comes from the analysis.

use crate::analysis::{BoxSummary, Histogram, NumericArray, QuestionGroup, RankedRow};
use crate::models::{
    ArraySection, NormalizedRow, QuestionSection, ReportMetadata, SurveyReport, TableStatistics,
};
use anyhow::Result;

/// Width of the longest histogram bar, in characters.
const BAR_WIDTH: usize = 40;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &SurveyReport) -> String {
    let mut output = String::new();

    output.push_str("# Survey Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_table_of_contents(report));
    output.push_str(&generate_questions_section(&report.questions));
    output.push_str(&generate_combined_section(report));
    output.push_str(&generate_grouped_section(&report.grouped));
    output.push_str(&generate_statistics_section(&report.statistics));
    output.push_str(&generate_array_section(
        &report.array,
        report.settings.count_threshold,
        report.settings.count_scale,
    ));
    output.push_str(&generate_filters_section(report));
    output.push_str(&generate_ranking_section(
        &report.ranked,
        report.settings.head_rows,
    ));
    output.push_str(&generate_distribution_section(report));

    if let Some(ref reshaped) = report.reshaped {
        output.push_str(&generate_reshape_section(reshaped));
    }

    output.push_str(&generate_dropped_section(&report.questions));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** {}\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Questions:** {}\n", metadata.questions));
    section.push_str(&format!("- **Rows:** {}\n", metadata.rows));
    if metadata.duplicate_rows > 0 {
        section.push_str(&format!(
            "- **Duplicate Rows:** {}\n",
            metadata.duplicate_rows
        ));
    }
    if metadata.dropped_entries > 0 {
        section.push_str(&format!(
            "- **Dropped Entries:** {}\n",
            metadata.dropped_entries
        ));
    }
    section.push_str(&format!(
        "- **Array Shape:** {} x {}\n",
        metadata.array_shape.0, metadata.array_shape.1
    ));
    section.push('\n');

    section
}

/// Generate the table of contents.
fn generate_table_of_contents(report: &SurveyReport) -> String {
    let mut toc = String::new();

    toc.push_str("## Table of Contents\n\n");
    toc.push_str("- [Metadata](#metadata)\n");
    toc.push_str("- [Questions](#questions)\n");

    for question in &report.questions {
        toc.push_str(&format!(
            "  - [{}](#{})\n",
            question.label,
            anchor(&question.label)
        ));
    }

    toc.push_str("- [Combined Table](#combined-table)\n");
    toc.push_str("- [Counts by Question](#counts-by-question)\n");
    toc.push_str("- [Summary Statistics](#summary-statistics)\n");
    toc.push_str("- [Array](#array)\n");
    toc.push_str("- [Filters](#filters)\n");
    toc.push_str("- [Ranking](#ranking)\n");
    toc.push_str("- [Distribution](#distribution)\n");

    if report.reshaped.is_some() {
        toc.push_str("- [Reshaped Array](#reshaped-array)\n");
    }
    if report.has_drops() {
        toc.push_str("- [Dropped Entries](#dropped-entries)\n");
    }

    toc.push('\n');
    toc
}

fn anchor(label: &str) -> String {
    label.replace(['/', '.', ' '], "-").to_lowercase()
}

/// Generate one table per question.
fn generate_questions_section(questions: &[QuestionSection]) -> String {
    let mut section = String::new();

    section.push_str("## Questions\n\n");

    if questions.is_empty() {
        section.push_str("No questions were supplied.\n\n");
        return section;
    }

    for question in questions {
        section.push_str(&format!(
            "### {} {{#{}}}\n\n",
            question.label,
            anchor(&question.label)
        ));
        section.push_str(&format!("| {} | Count |\n", question.response_label));
        section.push_str("|---:|---:|\n");
        for row in &question.rows {
            section.push_str(&format!("| {} | {} |\n", row.response, row.count));
        }
        section.push('\n');
        section.push_str(&format!("*{} respondents.*\n\n", question.respondents));

        if !question.dropped.is_empty() {
            section.push_str(&format!(
                "*{} non-numeric response(s) omitted.*\n\n",
                question.dropped.len()
            ));
        }
    }

    section
}

fn push_row_table(section: &mut String, rows: &[NormalizedRow]) {
    section.push_str("| Question | Response | Count |\n");
    section.push_str("|:---|---:|---:|\n");
    for row in rows {
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            row.question, row.response, row.count
        ));
    }
    section.push('\n');
}

/// Generate the combined table with head and tail previews.
fn generate_combined_section(report: &SurveyReport) -> String {
    let mut section = String::new();
    let table = &report.combined;
    let head = report.settings.head_rows;

    section.push_str("## Combined Table\n\n");

    if table.is_empty() {
        section.push_str("No numeric responses were found.\n\n");
        return section;
    }

    section.push_str(&format!("### First {} Rows\n\n", table.head(head).len()));
    push_row_table(&mut section, table.head(head));
    section.push_str(&format!("### Last {} Rows\n\n", table.tail(head).len()));
    push_row_table(&mut section, table.tail(head));

    section.push_str("<details>\n<summary>All Rows</summary>\n\n");
    push_row_table(&mut section, table.rows());
    section.push_str("</details>\n\n");

    section
}

/// Generate the per-question count aggregates.
fn generate_grouped_section(groups: &[QuestionGroup]) -> String {
    let mut section = String::new();

    section.push_str("## Counts by Question\n\n");
    section.push_str("| Question | Sum | Mean | Responses |\n");
    section.push_str("|:---|---:|---:|---:|\n");
    for group in groups {
        section.push_str(&format!(
            "| {} | {} | {:.2} | {} |\n",
            group.question, group.sum, group.mean, group.count
        ));
    }
    section.push('\n');

    section
}

/// Generate descriptive statistics.
fn generate_statistics_section(stats: &TableStatistics) -> String {
    let mut section = String::new();

    section.push_str("## Summary Statistics\n\n");

    if let (Some(response), Some(count)) = (&stats.response, &stats.count) {
        section.push_str("### Describe\n\n");
        section.push_str("| | Response | Count |\n");
        section.push_str("|:---|---:|---:|\n");
        let rows: [(&str, f64, f64); 8] = [
            ("count", response.count as f64, count.count as f64),
            ("mean", response.mean, count.mean),
            ("std", response.std, count.std),
            ("min", response.min, count.min),
            ("25%", response.q25, count.q25),
            ("50%", response.q50, count.q50),
            ("75%", response.q75, count.q75),
            ("max", response.max, count.max),
        ];
        for (name, r, c) in rows {
            section.push_str(&format!("| {} | {:.3} | {:.3} |\n", name, r, c));
        }
        section.push('\n');
    }

    if stats.columns.len() == 2 {
        let (response, count) = (&stats.columns[0], &stats.columns[1]);
        section.push_str("### Array Columns\n\n");
        section.push_str("| | Response | Count |\n");
        section.push_str("|:---|---:|---:|\n");
        section.push_str(&format!(
            "| mean | {:.3} | {:.3} |\n",
            response.mean, count.mean
        ));
        section.push_str(&format!(
            "| median | {:.3} | {:.3} |\n",
            response.median, count.median
        ));
        section.push_str(&format!(
            "| std dev | {:.3} | {:.3} |\n",
            response.std_dev, count.std_dev
        ));
        section.push_str(&format!(
            "| variance | {:.3} | {:.3} |\n",
            response.variance, count.variance
        ));
        section.push('\n');
    }

    if let (Some(min), Some(max)) = (&stats.min, &stats.max) {
        section.push_str(&format!(
            "- **Minimum:** {} at ({}, {})\n",
            min.value, min.row, min.col
        ));
        section.push_str(&format!(
            "- **Maximum:** {} at ({}, {})\n\n",
            max.value, max.row, max.col
        ));
    }

    section
}

/// Generate the numeric array slices.
fn generate_array_section(array: &ArraySection, threshold: u64, scale: f64) -> String {
    let mut section = String::new();

    section.push_str("## Array

");

    let (rows, _) = array.head.shape();
    section.push_str(&format!("### First {} Rows

```
", rows));
    section.push_str(&render_array(&array.head));
    section.push_str("```

");

    let (rows, _) = array.count_filtered.shape();
    section.push_str(&format!(
        "### Count > {} ({} rows)

```
",
        threshold, rows
    ));
    section.push_str(&render_array(&array.count_filtered));
    section.push_str("```

");

    let scaled: Vec<String> = array.scaled_counts.iter().map(|v| v.to_string()).collect();
    section.push_str(&format!(
        "### Count x {}

```
[{}]
```

",
        scale,
        scaled.join(" ")
    ));

    section
}

/// Generate the threshold filters.
fn generate_filters_section(report: &SurveyReport) -> String {
    let mut section = String::new();

    section.push_str("## Filters\n\n");

    section.push_str(&format!(
        "### Count > {} ({} rows)\n\n",
        report.settings.count_threshold,
        report.count_filtered.len()
    ));
    push_row_table(&mut section, &report.count_filtered);

    section.push_str(&format!(
        "### Response > {} ({} rows)\n\n",
        report.settings.response_threshold,
        report.response_filtered.len()
    ));
    push_row_table(&mut section, &report.response_filtered);

    section
}

/// Generate the count ranking.
fn generate_ranking_section(ranked: &[RankedRow], limit: usize) -> String {
    let mut section = String::new();

    section.push_str("## Ranking\n\n");
    section.push_str("| Rank | Question | Response | Count | Score |\n");
    section.push_str("|---:|:---|---:|---:|---:|\n");
    for ranked in ranked.iter().take(limit) {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            ranked.rank, ranked.row.question, ranked.row.response, ranked.row.count, ranked.score
        ));
    }
    section.push('\n');

    section
}

/// Render histogram bars scaled to [`BAR_WIDTH`].
fn render_histogram(histogram: &Histogram) -> String {
    let mut out = String::new();
    let peak = histogram.peak().max(1);

    for (i, count) in histogram.counts.iter().enumerate() {
        let bar = "█".repeat(count * BAR_WIDTH / peak);
        out.push_str(&format!(
            "[{:>7.2}, {:>7.2}) {:>4} {}\n",
            histogram.edges[i], histogram.edges[i + 1], count, bar
        ));
    }

    out
}

fn render_box(summary: &BoxSummary) -> String {
    let mut out = format!(
        "whiskers {:.2} .. {:.2} | box {:.2} [{:.2}] {:.2} | IQR {:.2}\n",
        summary.lower_whisker,
        summary.upper_whisker,
        summary.q1,
        summary.median,
        summary.q3,
        summary.iqr
    );
    if !summary.outliers.is_empty() {
        let outliers: Vec<String> = summary.outliers.iter().map(|v| v.to_string()).collect();
        out.push_str(&format!("outliers: {}\n", outliers.join(", ")));
    }
    out
}

/// Generate histogram, boxplot and correlation.
fn generate_distribution_section(report: &SurveyReport) -> String {
    let mut section = String::new();

    section.push_str("## Distribution\n\n");

    if let Some(ref histogram) = report.count_histogram {
        section.push_str("### Histogram of Count\n\n```\n");
        section.push_str(&render_histogram(histogram));
        section.push_str("```\n\n");
    }

    if let Some(ref summary) = report.response_box {
        section.push_str("### Boxplot of Response\n\n```\n");
        section.push_str(&render_box(summary));
        section.push_str("```\n\n");
    }

    section.push_str("### Correlation Matrix\n\n");
    match report.statistics.correlation {
        Some(r) => {
            section.push_str("| | Response | Count |\n");
            section.push_str("|:---|---:|---:|\n");
            section.push_str(&format!("| Response | 1.000 | {:.3} |\n", r));
            section.push_str(&format!("| Count | {:.3} | 1.000 |\n\n", r));
        }
        None => section.push_str("Correlation is undefined for this data.\n\n"),
    }

    section
}

fn render_array(array: &NumericArray) -> String {
    let mut out = String::new();
    for row in array.row_slices() {
        let cells: Vec<String> = row.iter().map(|v| format!("{:>5}", v)).collect();
        out.push_str(&format!("[{}]\n", cells.join(" ")));
    }
    out
}

/// Generate the reshaped array block.
fn generate_reshape_section(array: &NumericArray) -> String {
    let (rows, cols) = array.shape();
    format!(
        "## Reshaped Array\n\n*{} rows x {} columns*\n\n```\n{}```\n\n",
        rows,
        cols,
        render_array(array)
    )
}

/// Generate the list of dropped entries.
fn generate_dropped_section(questions: &[QuestionSection]) -> String {
    let dropped: Vec<_> = questions.iter().filter(|q| !q.dropped.is_empty()).collect();
    if dropped.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Dropped Entries\n\n");
    section.push_str("Responses that could not be read as numbers:\n\n");
    for question in dropped {
        let keys: Vec<String> = question
            .dropped
            .iter()
            .map(|k| format!("`{}`", k))
            .collect();
        section.push_str(&format!("- **{}:** {}\n", question.label, keys.join(", ")));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by SurveyTab*\n".to_string()
}

/// Generate a plain-text report.
pub fn generate_text_report(report: &SurveyReport) -> String {
    let mut out = String::new();

    for question in &report.questions {
        out.push_str(&format!("{} Data:\n", question.label));
        out.push_str(&format!("{:>10} {:>8}\n", question.response_label, "Count"));
        for row in &question.rows {
            out.push_str(&format!("{:>10} {:>8}\n", row.response, row.count));
        }
        out.push('\n');
    }

    out.push_str(&format!("Combined Table ({} rows):\n", report.combined.len()));
    for row in report.combined.rows() {
        out.push_str(&format!("  {}\n", row));
    }
    out.push('\n');

    out.push_str("Counts by Question:\n");
    for group in &report.grouped {
        out.push_str(&format!(
            "  {}: sum={} mean={:.2} responses={}\n",
            group.question, group.sum, group.mean, group.count
        ));
    }
    out.push('\n');

    if let Some(ref count) = report.statistics.count {
        out.push_str(&format!(
            "Count: mean={:.3} std={:.3} min={} median={} max={}\n",
            count.mean, count.std, count.min, count.q50, count.max
        ));
    }
    if let Some(ref response) = report.statistics.response {
        out.push_str(&format!(
            "Response: mean={:.3} std={:.3} min={} median={} max={}\n",
            response.mean, response.std, response.min, response.q50, response.max
        ));
    }
    if let Some(r) = report.statistics.correlation {
        out.push_str(&format!("Correlation(Response, Count): {:.3}\n", r));
    }
    out.push('\n');

    out.push_str(&format!(
        "Rows where Count > {}: {}\n",
        report.settings.count_threshold, report.count_filtered.len()
    ));
    for row in &report.count_filtered {
        out.push_str(&format!("  {}\n", row));
    }
    out.push('\n');

    if let Some(ref histogram) = report.count_histogram {
        out.push_str("Histogram of Count:\n");
        out.push_str(&render_histogram(histogram));
        out.push('\n');
    }

    let (rows, cols) = report.array.head.shape();
    out.push_str(&format!("First {} Rows of Array ({} columns):\n", rows, cols));
    out.push_str(&render_array(&report.array.head));
    out.push('\n');

    if let Some(ref reshaped) = report.reshaped {
        let (rows, cols) = reshaped.shape();
        out.push_str(&format!("Reshaped Array ({} rows, {} columns):\n", rows, cols));
        out.push_str(&render_array(reshaped));
        out.push('\n');
    }

    if report.has_drops() {
        out.push_str(&format!(
            "Dropped {} non-numeric entries.\n",
            report.metadata.dropped_entries
        ));
    }

    out
}

/// Generate a JSON report.
pub fn generate_json_report(report: &SurveyReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{aggregate, summarize, AnalysisSettings};
    use crate::models::QuestionDataset;

    fn create_test_report(settings: AnalysisSettings) -> SurveyReport {
        let datasets = vec![
            QuestionDataset::from_pairs("Year of Study", [("1", 4), ("2", 4), ("3", 11), ("4", 3)])
                .unwrap()
                .with_response_label("Year"),
            QuestionDataset::from_pairs("Study Hours", [("0", 3), ("12 hours", 1), ("4", 2)])
                .unwrap()
                .with_response_label("Hours"),
        ];
        summarize("built-in", &aggregate(&datasets), &settings).unwrap()
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report(AnalysisSettings::default());
        let markdown = generate_markdown_report(&report);

        assert!(markdown.contains("# Survey Report"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("## Questions"));
        assert!(markdown.contains("### Year of Study {#year-of-study}"));
        assert!(markdown.contains("| Year | Count |"));
        assert!(markdown.contains("## Counts by Question"));
        assert!(markdown.contains("### Count > 5 (1 rows)"));
        assert!(markdown.contains("## Array"));
        assert!(markdown.contains("### First 5 Rows"));
        assert!(markdown.contains("### Count x 2"));
        assert!(markdown.contains("[8 8 22 6 6 4]"));
        assert!(markdown.contains("*22 respondents.*"));
        assert!(markdown.contains("## Dropped Entries"));
        assert!(markdown.contains("`12 hours`"));
        assert!(!markdown.contains("## Reshaped Array"));
    }

    #[test]
    fn test_generate_metadata_section() {
        let report = create_test_report(AnalysisSettings::default());
        let section = generate_metadata_section(&report.metadata);

        assert!(section.contains("built-in"));
        assert!(section.contains("- **Rows:** 6"));
        assert!(section.contains("Dropped Entries:** 1"));
        assert!(section.contains("6 x 2"));
        assert!(!section.contains("Duplicate Rows"));
    }

    #[test]
    fn test_duplicate_rows_stay_in_combined_table() {
        let datasets = vec![QuestionDataset::from_pairs("Q", [("1", 4), ("1.0", 4)]).unwrap()];
        let report =
            summarize("test", &aggregate(&datasets), &AnalysisSettings::default()).unwrap();

        let text = generate_text_report(&report);
        assert!(text.contains("Combined Table (2 rows):"));

        let markdown = generate_markdown_report(&report);
        assert!(markdown.contains("- **Rows:** 2"));
        assert!(markdown.contains("- **Duplicate Rows:** 1"));
    }

    #[test]
    fn test_reshape_section_rendered() {
        let settings = AnalysisSettings {
            reshape: Some((2, 6)),
            ..AnalysisSettings::default()
        };
        let report = create_test_report(settings);
        let markdown = generate_markdown_report(&report);

        assert!(markdown.contains("## Reshaped Array"));
        assert!(markdown.contains("*2 rows x 6 columns*"));
    }

    #[test]
    fn test_render_histogram_scales_bars() {
        let histogram = Histogram {
            edges: vec![0.0, 1.0, 2.0],
            counts: vec![2, 1],
        };
        let rendered = render_histogram(&histogram);
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].matches('█').count(), BAR_WIDTH);
        assert_eq!(lines[1].matches('█').count(), BAR_WIDTH / 2);
    }

    #[test]
    fn test_generate_text_report() {
        let report = create_test_report(AnalysisSettings::default());
        let text = generate_text_report(&report);

        assert!(text.contains("Year of Study Data:"));
        assert!(text.contains("Combined Table (6 rows):"));
        assert!(text.contains("Rows where Count > 5: 1"));
        assert!(text.contains("First 5 Rows of Array (2 columns):"));
        assert!(text.contains("Dropped 1 non-numeric entries."));
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report(AnalysisSettings::default());
        let json = generate_json_report(&report).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["metadata"]["rows"], 6);
        assert_eq!(value["combined"].as_array().map(|a| a.len()), Some(6));
        assert_eq!(value["metadata"]["duplicate_rows"], 0);
        assert_eq!(value["questions"][0]["respondents"], 22);
        assert_eq!(value["array"]["scaled_counts"][2], 22.0);
        assert_eq!(value["questions"][1]["dropped"][0], "12 hours");
        assert!(value.get("reshaped").is_none());
    }
}
