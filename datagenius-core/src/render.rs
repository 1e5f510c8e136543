//! Table rendering.
//!
//! Every renderer treats `headers.len()` as the column count: short rows are
//! padded and extra cells are dropped. Absent cells render as empty strings in
//! the text formats and as `null` in JSON.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::error::DataGeniusError;
use crate::models::{Cell, TableData};

/// Output formats for rendered tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderFormat {
    /// Column-aligned plain text
    #[default]
    Text,
    /// GitHub-flavoured Markdown table
    Markdown,
    /// RFC 4180 CSV
    Csv,
    /// Tab-separated values
    Tsv,
    /// `{"headers": [...], "rows": [[...]]}`
    Json,
}

impl RenderFormat {
    /// Conventional file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Markdown => "md",
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for RenderFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Markdown => "markdown",
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Json => "json",
        })
    }
}

impl FromStr for RenderFormat {
    type Err = DataGeniusError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "markdown" | "md" => Ok(Self::Markdown),
            "csv" => Ok(Self::Csv),
            "tsv" => Ok(Self::Tsv),
            "json" => Ok(Self::Json),
            other => Err(DataGeniusError::configuration(format!(
                "Unknown output format '{}'",
                other
            ))),
        }
    }
}

/// Renders a table in the requested format.
pub fn render(table: &TableData, format: RenderFormat) -> Result<String> {
    match format {
        RenderFormat::Text => Ok(render_text(table)),
        RenderFormat::Markdown => Ok(render_markdown(table)),
        RenderFormat::Csv => render_csv(table),
        RenderFormat::Tsv => Ok(render_tsv(table)),
        RenderFormat::Json => render_json(table),
    }
}

/// Rows cut or padded to the header width.
fn normalized_rows(table: &TableData) -> impl Iterator<Item = Vec<&Cell>> + '_ {
    (0..table.row_count()).map(move |row| {
        (0..table.column_count())
            .map(|column| table.cell(row, column))
            .collect()
    })
}

fn display_rows(table: &TableData) -> Vec<Vec<String>> {
    normalized_rows(table)
        .map(|row| row.into_iter().map(Cell::to_display_string).collect())
        .collect()
}

fn render_text(table: &TableData) -> String {
    let rows = display_rows(table);
    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, value) in widths.iter_mut().zip(row) {
            *width = (*width).max(value.chars().count());
        }
    }

    let format_line = |values: &[String]| -> String {
        values
            .iter()
            .zip(&widths)
            .map(|(value, width)| format!("{:<width$}", value, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&format_line(&table.headers));
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    out.push('\n');
    for row in &rows {
        out.push_str(&format_line(row));
        out.push('\n');
    }
    let count = rows.len();
    out.push_str(&format!("{} row{}\n", count, if count == 1 { "" } else { "s" }));
    out
}

fn escape_markdown(value: &str) -> String {
    value
        .replace('|', "\\|")
        .replace("\r\n", " ")
        .replace('\n', " ")
}

fn render_markdown(table: &TableData) -> String {
    let line = |values: Vec<String>| format!("| {} |\n", values.join(" | "));

    let mut out = line(table.headers.iter().map(|h| escape_markdown(h)).collect());
    out.push_str(&line(
        table.headers.iter().map(|_| "---".to_string()).collect(),
    ));
    for row in display_rows(table) {
        out.push_str(&line(row.iter().map(|v| escape_markdown(v)).collect()));
    }
    out
}

fn render_csv(table: &TableData) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(&table.headers)
        .map_err(|e| DataGeniusError::render_failed("Failed to write CSV header", e))?;
    for row in display_rows(table) {
        writer
            .write_record(&row)
            .map_err(|e| DataGeniusError::render_failed("Failed to write CSV row", e))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| DataGeniusError::render_failed("Failed to flush CSV", e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| DataGeniusError::render_failed("CSV is not UTF-8", e))
}

fn render_tsv(table: &TableData) -> String {
    let clean = |value: &str| value.replace(['\t', '\n', '\r'], " ");
    let mut out = table
        .headers
        .iter()
        .map(|h| clean(h))
        .collect::<Vec<_>>()
        .join("\t");
    out.push('\n');
    for row in display_rows(table) {
        out.push_str(&row.iter().map(|v| clean(v)).collect::<Vec<_>>().join("\t"));
        out.push('\n');
    }
    out
}

fn render_json(table: &TableData) -> Result<String> {
    let normalized = TableData {
        headers: table.headers.clone(),
        rows: normalized_rows(table)
            .map(|row| row.into_iter().cloned().collect())
            .collect(),
    };
    serde_json::to_string_pretty(&normalized).map_err(|e| DataGeniusError::Serialization {
        context: "Failed to serialize table".to_string(),
        source: e,
    })
}
