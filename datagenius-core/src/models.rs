//! Tabular data model shared by every analysis and renderer.
//!
//! A [`TableData`] is an ordered list of header names plus rows of nullable
//! scalar [`Cell`]s. Rows are not required to be rectangular: a short row is
//! read as if its missing trailing cells were absent, and cells past the last
//! header are ignored. Columns are always bound to headers by position, never
//! by name, so duplicate header names are legal.

use serde::{Deserialize, Serialize};

/// A single scalar value in a table.
///
/// `Null` and `Undefined` are both "absent"; they carry the same meaning in
/// every analysis. `Undefined` marks cells that were never supplied (such as
/// the padding of a short row) and is never produced by deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Cell {
    /// Text value
    Text(String),
    /// Numeric value; whole numbers serialize as JSON integers
    #[serde(serialize_with = "serialize_number")]
    Number(f64),
    /// Explicit null
    #[default]
    Null,
    /// Omitted value
    #[serde(skip_deserializing)]
    Undefined,
}

/// Padding cell returned for positions past the end of a short row.
static MISSING: Cell = Cell::Undefined;

impl Cell {
    /// Creates a text cell.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Returns true for `Null` and `Undefined`.
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Null | Self::Undefined)
    }

    /// Stringifies the cell. Absent cells become the empty string.
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => format_number(*n),
            Self::Null | Self::Undefined => String::new(),
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<usize> for Cell {
    fn from(value: usize) -> Self {
        Self::Number(value as f64)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Largest magnitude below which every whole `f64` is an exact integer.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Writes whole, finite numbers as integers so counts read `4`, not `4.0`.
fn serialize_number<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// Formats a number the way it is shown to users: shortest round-trip
/// decimal, no trailing `.0`, no negative zero.
fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}

/// An in-memory rectangular dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    /// Ordered field names; the authoritative column count
    pub headers: Vec<String>,
    /// Ordered records of cells
    pub rows: Vec<Vec<Cell>>,
}

impl TableData {
    /// Creates a table from headers and rows.
    pub fn new<H, S>(headers: H, rows: Vec<Vec<Cell>>) -> Self
    where
        H: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows,
        }
    }

    /// Creates an empty table with the given headers.
    pub fn with_headers<H, S>(headers: H) -> Self
    where
        H: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(headers, Vec::new())
    }

    /// Number of columns, as defined by the headers.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Number of records.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the cell at `(row, column)`, padding short rows with an
    /// absent cell.
    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&MISSING)
    }

    /// Projects the column at `index` across all rows.
    ///
    /// The projection always has `row_count()` entries.
    pub fn column(&self, index: usize) -> Vec<&Cell> {
        self.rows
            .iter()
            .map(|row| row.get(index).unwrap_or(&MISSING))
            .collect()
    }

    /// Iterates over `(index, header, cells)` for every column.
    pub fn columns(&self) -> impl Iterator<Item = (usize, &str, Vec<&Cell>)> + '_ {
        self.headers
            .iter()
            .enumerate()
            .map(move |(index, name)| (index, name.as_str(), self.column(index)))
    }

    /// Appends a row.
    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heroes() -> TableData {
        TableData::new(
            ["name", "power"],
            vec![
                vec![Cell::text("A"), Cell::text("Flight")],
                vec![Cell::text("B")],
                vec![Cell::text("C"), Cell::text("Fire"), Cell::text("extra")],
            ],
        )
    }

    #[test]
    fn test_column_projection_pads_short_rows() {
        let table = heroes();
        let power = table.column(1);

        assert_eq!(power.len(), 3);
        assert_eq!(power[0], &Cell::text("Flight"));
        assert_eq!(power[1], &Cell::Undefined);
        assert_eq!(power[2], &Cell::text("Fire"));
    }

    #[test]
    fn test_column_projection_ignores_excess_cells() {
        let table = heroes();
        let columns: Vec<_> = table.columns().collect();

        assert_eq!(columns.len(), 2);
        assert!(
            columns
                .iter()
                .all(|(_, _, cells)| !cells.contains(&&Cell::text("extra")))
        );
    }

    #[test]
    fn test_duplicate_headers_bind_by_position() {
        let table = TableData::new(
            ["x", "x"],
            vec![vec![Cell::from(1.0), Cell::from(2.0)]],
        );
        let columns: Vec<_> = table.columns().collect();

        assert_eq!(columns[0].2, vec![&Cell::Number(1.0)]);
        assert_eq!(columns[1].2, vec![&Cell::Number(2.0)]);
    }

    #[test]
    fn test_cell_display_strings() {
        assert_eq!(Cell::Null.to_display_string(), "");
        assert_eq!(Cell::Undefined.to_display_string(), "");
        assert_eq!(Cell::Number(10.0).to_display_string(), "10");
        assert_eq!(Cell::Number(66.67).to_display_string(), "66.67");
        assert_eq!(Cell::Number(-0.0).to_display_string(), "0");
        assert_eq!(Cell::Number(f64::INFINITY).to_display_string(), "Infinity");
        assert_eq!(Cell::text(" x ").to_string(), " x ");
    }

    #[test]
    fn test_cell_out_of_range() {
        let table = heroes();
        assert_eq!(table.cell(10, 0), &Cell::Undefined);
        assert_eq!(table.cell(0, 0), &Cell::text("A"));
    }

    #[test]
    fn test_cell_serde_untagged() {
        let row = vec![
            Cell::text("a"),
            Cell::Number(1.5),
            Cell::Null,
            Cell::Undefined,
        ];
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"["a",1.5,null,null]"#);

        let parsed: Vec<Cell> = serde_json::from_str(r#"["a", 2, null]"#).unwrap();
        assert_eq!(parsed, vec![Cell::text("a"), Cell::Number(2.0), Cell::Null]);
    }

    #[test]
    fn test_whole_numbers_serialize_as_integers() {
        let row = vec![
            Cell::Number(4.0),
            Cell::Number(-0.0),
            Cell::Number(97.5),
            Cell::Number(1e20),
        ];
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, "[4,0,97.5,1e20]");

        // Integers read back as the same number
        let parsed: Vec<Cell> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0], Cell::Number(4.0));
        assert_eq!(parsed[2], Cell::Number(97.5));
    }

    #[test]
    fn test_table_serde_shape() {
        let table = TableData::new(["age"], vec![vec![Cell::text("10")]]);
        let value = serde_json::to_value(&table).unwrap();

        assert_eq!(value["headers"][0], "age");
        assert_eq!(value["rows"][0][0], "10");
    }

    #[test]
    fn test_option_into_cell() {
        assert_eq!(Cell::from(None::<i64>), Cell::Null);
        assert_eq!(Cell::from(Some(3_i64)), Cell::Number(3.0));
    }
}
