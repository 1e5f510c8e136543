//! Per-field descriptive statistics.

use crate::models::{Cell, TableData};

use super::classifier::{
    blank_count, completeness_pct, null_count, numeric_values, population_stats, round_to,
    unique_count, upper_median,
};
use super::context::ReportContext;

/// Output headers of the profiling report.
pub const PROFILE_HEADERS: [&str; 13] = [
    "Application",
    "Table Name",
    "Field",
    "Record Count",
    "Unique Count",
    "Completeness (%)",
    "Null Count",
    "Blank Count",
    "Minimum",
    "Maximum",
    "Median",
    "Standard Deviation",
    "Analysis Date",
];

/// Builds the profiling report: one row per input field.
///
/// Minimum, maximum, median and standard deviation are computed over the
/// numeric cells only and are empty strings when there are none.
pub fn profile_table(table: &TableData, context: &ReportContext) -> TableData {
    let total = table.row_count();
    let analysis_date = context.stamp.timestamp();

    let rows = table
        .columns()
        .map(|(_, field, column)| {
            let nulls = null_count(&column);
            let blanks = blank_count(&column);
            let completeness = completeness_pct(total, nulls, blanks);
            let numbers = numeric_values(&column);

            let (minimum, maximum, median, std_dev) = if numbers.is_empty() {
                (Cell::text(""), Cell::text(""), Cell::text(""), Cell::text(""))
            } else {
                let minimum = numbers.iter().copied().fold(f64::INFINITY, f64::min);
                let maximum = numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let median = upper_median(&numbers).map_or(Cell::text(""), Cell::Number);
                let (_, std_dev) = population_stats(&numbers);
                (
                    Cell::Number(minimum),
                    Cell::Number(maximum),
                    median,
                    Cell::Number(round_to(std_dev, 4)),
                )
            };

            vec![
                Cell::text(context.application.as_str()),
                Cell::text(context.table_name.as_str()),
                Cell::text(field),
                Cell::from(total),
                Cell::from(unique_count(column.iter().copied())),
                Cell::Number(round_to(completeness, 2)),
                Cell::from(nulls),
                Cell::from(blanks),
                minimum,
                maximum,
                median,
                std_dev,
                Cell::text(analysis_date.as_str()),
            ]
        })
        .collect();

    tracing::debug!(
        "Profiled {} fields over {} rows for table '{}'",
        table.column_count(),
        total,
        context.table_name
    );

    TableData::new(PROFILE_HEADERS, rows)
}
