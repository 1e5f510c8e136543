//! Per-field anomaly detection.
//!
//! Columns with at least one numeric cell are checked for outliers with a
//! sigma rule over the population standard deviation; one row is emitted per
//! offending occurrence. Columns with no numeric cells at all instead report
//! every blank cell.

use crate::models::{Cell, TableData};

use super::classifier::{is_blank, numeric_values, population_stats};
use super::config::AnalysisConfig;
use super::context::ReportContext;

/// Output headers of the anomaly report.
pub const ANOMALY_HEADERS: [&str; 8] = [
    "Application",
    "Table Name",
    "Field",
    "Value",
    "Reason",
    "Suggested Action",
    "Date",
    "Analysis Date",
];

/// Why a value was flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnomalyReason {
    /// Numeric value beyond the sigma threshold
    Outlier,
    /// Blank cell in a non-numeric column
    BlankValue,
}

impl AnomalyReason {
    /// Text written to the `Reason` column.
    pub fn label(self) -> &'static str {
        match self {
            Self::Outlier => "Outlier",
            Self::BlankValue => "Blank Value",
        }
    }

    /// Text written to the `Suggested Action` column.
    pub fn suggested_action(self) -> &'static str {
        match self {
            Self::Outlier => "Review and correct if necessary",
            Self::BlankValue => "Review data source for missing info",
        }
    }
}

/// Values in `values` whose distance from the mean exceeds
/// `sigma * std_dev`, in input order and without deduplication.
///
/// A zero standard deviation never flags anything.
pub fn find_outliers(values: &[f64], sigma: f64) -> Vec<f64> {
    let (mean, std_dev) = population_stats(values);
    let limit = sigma * std_dev;
    values
        .iter()
        .copied()
        .filter(|value| (value - mean).abs() > limit)
        .collect()
}

/// Builds the anomaly report: zero or more rows per input field.
pub fn anomaly_table(
    table: &TableData,
    context: &ReportContext,
    config: &AnalysisConfig,
) -> TableData {
    let today = context.stamp.date();
    let analysis_date = context.stamp.timestamp();
    let mut rows = Vec::new();

    let mut push = |field: &str, value: Cell, reason: AnomalyReason| {
        rows.push(vec![
            Cell::text(context.application.as_str()),
            Cell::text(context.table_name.as_str()),
            Cell::text(field),
            value,
            Cell::text(reason.label()),
            Cell::text(reason.suggested_action()),
            Cell::text(today.as_str()),
            Cell::text(analysis_date.as_str()),
        ]);
    };

    for (_, field, column) in table.columns() {
        let numbers = numeric_values(&column);

        if numbers.is_empty() {
            let blanks = column.iter().filter(|cell| is_blank(cell)).count();
            for _ in 0..blanks {
                push(field, Cell::text(""), AnomalyReason::BlankValue);
            }
            if blanks > 0 {
                tracing::trace!("Field '{}': {} blank values", field, blanks);
            }
        } else {
            let outliers = find_outliers(&numbers, config.outlier_sigma);
            if !outliers.is_empty() {
                tracing::trace!("Field '{}': {} outliers", field, outliers.len());
            }
            for value in outliers {
                push(field, Cell::Number(value), AnomalyReason::Outlier);
            }
        }
    }

    tracing::debug!(
        "Detected {} anomalies across {} fields for table '{}'",
        rows.len(),
        table.column_count(),
        context.table_name
    );

    TableData::new(ANOMALY_HEADERS, rows)
}
