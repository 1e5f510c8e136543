//! Per-field quality scoring.

use crate::models::{Cell, TableData};

use super::classifier::{
    blank_count, completeness_pct, is_blank, is_numeric, null_count, round_to, unique_count,
};
use super::config::{AnalysisConfig, ValidityConfig};
use super::context::ReportContext;

/// Output headers of the quality report.
pub const QUALITY_HEADERS: [&str; 12] = [
    "Application",
    "Table Name",
    "Field",
    "Total Records",
    "Completeness (%)",
    "Uniqueness (%)",
    "Validity (%)",
    "Anomaly Count",
    "Distinctiveness",
    "Quality Score (%)",
    "Quality Rule (Regex)",
    "Analysis Date",
];

/// Rule emitted for columns whose non-blank cells are all numeric.
pub const NUMERIC_RULE: &str = r"^\d+(\.\d+)?$";

/// Rule emitted for every other column.
pub const MATCH_ALL_RULE: &str = "^.*$";

/// Builds the quality report: one row per input field.
pub fn quality_table(
    table: &TableData,
    context: &ReportContext,
    config: &AnalysisConfig,
) -> TableData {
    let total = table.row_count();
    let analysis_date = context.stamp.timestamp();
    let anomaly_count = placeholder_anomaly_count(total, config.anomaly_rate);

    let rows = table
        .columns()
        .map(|(_, field, column)| {
            let completeness =
                completeness_pct(total, null_count(&column), blank_count(&column));
            let uniqueness = ratio_pct(unique_count(column.iter().copied()), total);
            let valid_count = column.iter().filter(|cell| is_numeric(cell)).count();
            let validity = validity_score(valid_count, total, &config.validity);
            let quality_score = (completeness + validity) / 2.0;

            vec![
                Cell::text(context.application.as_str()),
                Cell::text(context.table_name.as_str()),
                Cell::text(field),
                Cell::from(total),
                Cell::Number(round_to(completeness, 2)),
                Cell::Number(round_to(uniqueness, 2)),
                Cell::Number(round_to(validity, 2)),
                Cell::from(anomaly_count),
                Cell::Number(round_to(uniqueness / 100.0, 2)),
                Cell::Number(round_to(quality_score, 2)),
                Cell::text(quality_rule(&column)),
                Cell::text(analysis_date.as_str()),
            ]
        })
        .collect();

    tracing::debug!(
        "Scored quality of {} fields over {} rows for table '{}'",
        table.column_count(),
        total,
        context.table_name
    );

    TableData::new(QUALITY_HEADERS, rows)
}

/// `100 * count / total`, or 0 for an empty table.
fn ratio_pct(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * (count as f64 / total as f64)
    }
}

/// High score when the numeric share reaches `min_ratio`, low score otherwise.
/// An empty table gets the low score.
pub fn validity_score(valid_count: usize, total: usize, config: &ValidityConfig) -> f64 {
    if total > 0 && valid_count as f64 / total as f64 >= config.min_ratio {
        config.high_score
    } else {
        config.low_score
    }
}

/// `max(1, floor(rate * total))` for a non-empty table, else 0.
///
/// A proportional placeholder, not an observed outlier count.
pub fn placeholder_anomaly_count(total: usize, rate: f64) -> usize {
    if total == 0 {
        return 0;
    }
    let proportional = (rate * total as f64).floor() as usize;
    proportional.max(1)
}

/// Numeric pattern if every non-blank cell is numeric, match-all otherwise.
pub fn quality_rule(column: &[&Cell]) -> &'static str {
    if column.iter().all(|cell| is_blank(cell) || is_numeric(cell)) {
        NUMERIC_RULE
    } else {
        MATCH_ALL_RULE
    }
}
