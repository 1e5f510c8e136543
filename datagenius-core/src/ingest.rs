//! Delimited text ingestion.
//!
//! Uploaded CSV/TXT files are turned into a [`TableData`] without any type
//! inference: every value stays a trimmed text cell and numeric coercion
//! happens later, inside the analyses.

use std::path::Path;

use crate::Result;
use crate::error::DataGeniusError;
use crate::models::{Cell, TableData};

/// Field delimiter detected from the header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// `,`
    Comma,
    /// `|`
    Pipe,
}

impl Delimiter {
    /// The delimiter character.
    pub fn as_char(self) -> char {
        match self {
            Self::Comma => ',',
            Self::Pipe => '|',
        }
    }
}

/// Picks a comma if the header line has one, otherwise a pipe.
pub fn detect_delimiter(header_line: &str) -> Delimiter {
    if header_line.contains(',') {
        Delimiter::Comma
    } else {
        Delimiter::Pipe
    }
}

/// Parses comma- or pipe-delimited text into a table.
///
/// The first non-empty line supplies the headers. Empty lines are dropped.
/// Quoting is not interpreted.
pub fn parse_delimited(text: &str) -> TableData {
    let mut lines = text
        .trim()
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.is_empty());

    let Some(header_line) = lines.next() else {
        return TableData::default();
    };

    let delimiter = detect_delimiter(header_line).as_char();
    let split = |line: &str| -> Vec<String> {
        line.split(delimiter).map(|v| v.trim().to_string()).collect()
    };

    let headers = split(header_line);
    let rows: Vec<Vec<Cell>> = lines
        .map(|line| split(line).into_iter().map(Cell::Text).collect())
        .collect();

    tracing::debug!(
        "Parsed delimited text: {} columns, {} rows, delimiter '{}'",
        headers.len(),
        rows.len(),
        delimiter
    );

    TableData { headers, rows }
}

/// Reads a UTF-8 delimited file and parses it.
pub fn read_delimited_file(path: impl AsRef<Path>) -> Result<TableData> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|e| DataGeniusError::io(format!("Failed to read {}", path.display()), e))?;
    Ok(parse_delimited(&text))
}
