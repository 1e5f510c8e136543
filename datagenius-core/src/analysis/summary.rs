//! Table summary: size, numeric ranges and the most frequent values.
//!
//! A field is numeric when it has at least one non-blank cell and every
//! non-blank cell is numeric. Numeric fields report minimum, maximum and
//! average; every other field with data lists its most frequent values.
//! Fields with no data at all contribute no rows.

use std::collections::HashMap;

use crate::models::{Cell, TableData};

use super::classifier::{is_blank, is_numeric, numeric_values, population_stats, round_to};
use super::context::ReportContext;

/// Output headers of the summary report.
pub const SUMMARY_HEADERS: [&str; 8] = [
    "Application",
    "Table Name",
    "Section",
    "Field",
    "Metric",
    "Value",
    "Frequency",
    "Analysis Date",
];

/// Number of most frequent values listed per non-numeric field.
pub const TOP_VALUE_LIMIT: usize = 5;

/// Groups of summary rows, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummarySection {
    /// Row and column counts
    Table,
    /// Minimum, maximum and average of numeric fields
    Numeric,
    /// Most frequent values of the other fields
    TopValues,
}

impl SummarySection {
    /// Display name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Table => "Table",
            Self::Numeric => "Numeric",
            Self::TopValues => "Top Values",
        }
    }
}

/// True iff the column has data and all of it is numeric.
pub fn is_numeric_field(column: &[&Cell]) -> bool {
    column.iter().any(|cell| !is_blank(cell))
        && column.iter().all(|cell| is_blank(cell) || is_numeric(cell))
}

/// Up to `limit` non-blank values with their counts, most frequent first.
/// Ties keep the order in which values first appear.
pub fn top_values(column: &[&Cell], limit: usize) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();

    for cell in column.iter().filter(|cell| !is_blank(cell)) {
        let value = cell.to_display_string();
        match slots.get(&value) {
            Some(&slot) => {
                if let Some(entry) = counts.get_mut(slot) {
                    entry.1 = entry.1.saturating_add(1);
                }
            }
            None => {
                slots.insert(value.clone(), counts.len());
                counts.push((value, 1));
            }
        }
    }

    // Stable sort
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(limit);
    counts
}

/// Builds the summary report.
pub fn summary_table(table: &TableData, context: &ReportContext) -> TableData {
    let analysis_date = context.stamp.timestamp();
    let row = |section: SummarySection, field: &str, metric: &str, value: Cell, frequency: Cell| {
        vec![
            Cell::text(context.application.as_str()),
            Cell::text(context.table_name.as_str()),
            Cell::text(section.label()),
            Cell::text(field),
            Cell::text(metric),
            value,
            frequency,
            Cell::text(analysis_date.as_str()),
        ]
    };

    let mut rows = vec![
        row(
            SummarySection::Table,
            "",
            "Rows",
            Cell::from(table.row_count()),
            Cell::text(""),
        ),
        row(
            SummarySection::Table,
            "",
            "Columns",
            Cell::from(table.column_count()),
            Cell::text(""),
        ),
    ];
    let mut top_rows = Vec::new();

    for (_, field, column) in table.columns() {
        if is_numeric_field(&column) {
            let numbers = numeric_values(&column);
            let minimum = numbers.iter().copied().fold(f64::INFINITY, f64::min);
            let maximum = numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let (mean, _) = population_stats(&numbers);

            for (metric, value) in [
                ("Minimum", minimum),
                ("Maximum", maximum),
                ("Average", round_to(mean, 2)),
            ] {
                rows.push(row(
                    SummarySection::Numeric,
                    field,
                    metric,
                    Cell::Number(value),
                    Cell::text(""),
                ));
            }
        } else {
            top_rows.extend(
                top_values(&column, TOP_VALUE_LIMIT)
                    .into_iter()
                    .map(|(value, frequency)| {
                        row(
                            SummarySection::TopValues,
                            field,
                            "Top Value",
                            Cell::Text(value),
                            Cell::from(frequency),
                        )
                    }),
            );
        }
    }
    rows.extend(top_rows);

    tracing::debug!(
        "Summarized {} fields over {} rows for table '{}' ({} report rows)",
        table.column_count(),
        table.row_count(),
        context.table_name,
        rows.len()
    );

    TableData::new(SUMMARY_HEADERS, rows)
}
