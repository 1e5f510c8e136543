//! Per-column classification helpers shared by every analysis.
//!
//! # Numeric coercion
//! A cell is numeric when [`to_number`] yields a finite value:
//! - absent cells and blank text are never numeric (no coercion to zero)
//! - text is trimmed, then parsed as a decimal float literal or an unsigned
//!   `0x`/`0o`/`0b` integer literal
//! - `NaN`, `inf` and `Infinity` are rejected so they cannot poison the
//!   mean and standard deviation

use std::collections::HashSet;

use crate::models::Cell;

/// True iff the cell is `Null` or `Undefined`.
pub fn is_null_like(cell: &Cell) -> bool {
    cell.is_absent()
}

/// True iff the stringified, trimmed cell is empty. Null-like cells are blank.
pub fn is_blank(cell: &Cell) -> bool {
    match cell {
        Cell::Text(s) => s.trim().is_empty(),
        Cell::Number(_) => false,
        Cell::Null | Cell::Undefined => true,
    }
}

/// Coerces a cell to a number, yielding `NaN` when it is not numeric.
pub fn to_number(cell: &Cell) -> f64 {
    let value = match cell {
        Cell::Number(n) => *n,
        Cell::Text(s) => parse_numeric_text(s.trim()),
        Cell::Null | Cell::Undefined => f64::NAN,
    };
    if value.is_finite() { value } else { f64::NAN }
}

/// True iff [`to_number`] succeeds.
pub fn is_numeric(cell: &Cell) -> bool {
    !to_number(cell).is_nan()
}

fn parse_numeric_text(text: &str) -> f64 {
    if text.is_empty() {
        return f64::NAN;
    }

    let radix_literal = [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)]
        .iter()
        .find_map(|(prefix, radix)| text.strip_prefix(prefix).map(|digits| (digits, *radix)));
    if let Some((digits, radix)) = radix_literal {
        return u64::from_str_radix(digits, radix).map_or(f64::NAN, |n| n as f64);
    }

    // Rust accepts "inf"/"nan" spellings here; to_number drops non-finite results.
    text.parse::<f64>().unwrap_or(f64::NAN)
}

/// Number of distinct stringified values, excluding blank cells.
pub fn unique_count<'a>(column: impl IntoIterator<Item = &'a Cell>) -> usize {
    column
        .into_iter()
        .filter(|cell| !is_blank(cell))
        .map(Cell::to_display_string)
        .collect::<HashSet<_>>()
        .len()
}

/// Numeric values of the column in row order, one per numeric cell.
pub fn numeric_values(column: &[&Cell]) -> Vec<f64> {
    column
        .iter()
        .map(|cell| to_number(cell))
        .filter(|n| !n.is_nan())
        .collect()
}

/// Count of null-like cells.
pub fn null_count(column: &[&Cell]) -> usize {
    column.iter().filter(|cell| is_null_like(cell)).count()
}

/// Count of blank cells (null-like cells included).
pub fn blank_count(column: &[&Cell]) -> usize {
    column.iter().filter(|cell| is_blank(cell)).count()
}

/// `100 * (total - nulls - blanks) / total`, or 0 for an empty column.
///
/// Null-like cells are counted in both `nulls` and `blanks`, so a column with
/// nulls can go below zero. The result is not clamped.
pub fn completeness_pct(total: usize, nulls: usize, blanks: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    100.0 * ((total - nulls as f64 - blanks as f64) / total)
}

/// Population mean and standard deviation (denominator n).
///
/// Returns `(0.0, 0.0)` for an empty slice.
pub fn population_stats(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;

    (mean, variance.sqrt())
}

/// Element at index `floor(n / 2)` after an ascending sort.
///
/// For an even count this is the upper-middle value, not the average of the
/// two middle values.
pub fn upper_median(values: &[f64]) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.get(sorted.len() / 2).copied()
}

/// Rounds half away from zero to `digits` decimal places.
pub fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}
