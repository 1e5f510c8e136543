//! Inline chart tags.
//!
//! Assistant replies may embed chart requests such as
//! `[CHART: type=bar; x=["A","B"]; y=[10,20]; title="Sales"]`. This module
//! turns those tags into [`ChartSpec`] values; drawing them is left to the
//! presentation layer.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::analysis::classifier::to_number;
use crate::models::{Cell, TableData};

const TAG_PREFIX: &str = "[chart:";

/// Default chart title.
pub const DEFAULT_TITLE: &str = "Data Visualization";
/// Default x-axis label.
pub const DEFAULT_XLABEL: &str = "X-Axis";
/// Default y-axis label.
pub const DEFAULT_YLABEL: &str = "Y-Axis";

/// Chart flavours understood by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    /// Categorical bars
    Bar,
    /// Connected series, also the fallback for unknown types
    #[default]
    Line,
    /// Unconnected points
    Scatter,
}

impl ChartKind {
    /// Parses a `type=` value; anything unknown falls back to `Line`.
    pub fn from_tag_value(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "bar" => Self::Bar,
            "scatter" => Self::Scatter,
            _ => Self::Line,
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bar => "bar",
            Self::Line => "line",
            Self::Scatter => "scatter",
        })
    }
}

/// A parsed chart request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    /// Chart flavour, serialized as `type`
    #[serde(rename = "type")]
    pub kind: ChartKind,
    /// Category or coordinate series, taken as written
    pub x: Vec<Cell>,
    /// Numeric series; entries that fail numeric coercion are `NaN`.
    pub y: Vec<f64>,
    /// Chart title
    pub title: String,
    /// X-axis label
    pub xlabel: String,
    /// Y-axis label
    pub ylabel: String,
}

impl ChartSpec {
    /// Scatter coordinates: numeric `x` values are used as-is, anything else
    /// is replaced by its index. Pairs stop at the shorter series.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.x
            .iter()
            .zip(&self.y)
            .enumerate()
            .map(|(index, (x, y))| match x {
                Cell::Number(n) => (*n, *y),
                _ => (index as f64, *y),
            })
            .collect()
    }

    /// Two-column table of the series, labelled with the axis names.
    pub fn to_table(&self) -> TableData {
        let rows = self
            .x
            .iter()
            .zip(&self.y)
            .map(|(x, y)| vec![x.clone(), Cell::Number(*y)])
            .collect();
        TableData::new([self.xlabel.as_str(), self.ylabel.as_str()], rows)
    }
}

#[derive(Debug)]
enum TagValue {
    Array(Vec<serde_json::Value>),
    Text(String),
}

/// Parses a single `[CHART: ...]` tag.
///
/// Returns `None` when either `x` or `y` is missing, is not a JSON array, or
/// is empty.
pub fn parse_chart_tag(tag: &str) -> Option<ChartSpec> {
    let trimmed = tag.trim();
    let body = match trimmed.get(..TAG_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(TAG_PREFIX) => &trimmed[TAG_PREFIX.len()..],
        _ => trimmed,
    };
    let body = body.strip_suffix(']').unwrap_or(body);

    let mut kind = None;
    let mut x = None;
    let mut y = None;
    let mut title = None;
    let mut xlabel = None;
    let mut ylabel = None;

    for part in split_outside_quotes(body, ';') {
        let Some((key, raw)) = part.split_once('=') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let value = parse_value(raw.trim());
        match (key.as_str(), value) {
            ("type", TagValue::Text(s)) => kind = Some(ChartKind::from_tag_value(&s)),
            ("x", TagValue::Array(items)) => x = Some(items),
            ("y", TagValue::Array(items)) => y = Some(items),
            ("title", TagValue::Text(s)) => title = Some(s),
            ("xlabel", TagValue::Text(s)) => xlabel = Some(s),
            ("ylabel", TagValue::Text(s)) => ylabel = Some(s),
            (other, _) => tracing::trace!("Ignoring chart tag key '{}'", other),
        }
    }

    let x: Vec<Cell> = x?.into_iter().map(json_to_cell).collect();
    let y: Vec<f64> = y?
        .into_iter()
        .map(|value| to_number(&json_to_cell(value)))
        .collect();
    if x.is_empty() || y.is_empty() {
        return None;
    }

    let or_default = |value: Option<String>, default: &str| {
        value
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| default.to_string())
    };

    Some(ChartSpec {
        kind: kind.unwrap_or_default(),
        x,
        y,
        title: or_default(title, DEFAULT_TITLE),
        xlabel: or_default(xlabel, DEFAULT_XLABEL),
        ylabel: or_default(ylabel, DEFAULT_YLABEL),
    })
}

/// Finds and parses every chart tag in free text, in order of appearance.
/// Malformed tags are skipped.
pub fn extract_chart_tags(text: &str) -> Vec<ChartSpec> {
    // ASCII lower-casing keeps byte offsets aligned with `text`.
    let lowered = text.to_ascii_lowercase();
    let mut specs = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = lowered[cursor..].find(TAG_PREFIX) {
        let start = cursor + offset;
        match tag_end(&text[start..]) {
            Some(len) => {
                let tag = &text[start..start + len];
                match parse_chart_tag(tag) {
                    Some(spec) => specs.push(spec),
                    None => tracing::debug!("Skipping malformed chart tag at offset {}", start),
                }
                cursor = start + len;
            }
            None => break,
        }
    }

    specs
}

/// Byte length of the tag starting at `text[0] == '['`, including the closing
/// bracket, or `None` if it is never closed.
fn tag_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_quotes = false;
    let mut escaped = false;

    for (index, ch) in text.char_indices() {
        if in_quotes {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_quotes = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_quotes = true,
            '[' => depth += 1,
            ']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(index + ch.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}

/// Splits on `separator` when it is outside quotes and brackets.
fn split_outside_quotes(body: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut in_quotes = false;
    let mut escaped = false;
    let mut start = 0;

    for (index, ch) in body.char_indices() {
        if in_quotes {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_quotes = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_quotes = true,
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            c if c == separator && depth == 0 => {
                parts.push(body[start..index].trim());
                start = index + ch.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(body[start..].trim());
    parts.retain(|part| !part.is_empty());
    parts
}

fn parse_value(raw: &str) -> TagValue {
    if raw.starts_with('[') && raw.ends_with(']') {
        if let Ok(items) = serde_json::from_str::<Vec<serde_json::Value>>(raw) {
            return TagValue::Array(items);
        }
    }
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        return TagValue::Text(raw[1..raw.len() - 1].to_string());
    }
    TagValue::Text(raw.to_string())
}

fn json_to_cell(value: serde_json::Value) -> Cell {
    match value {
        serde_json::Value::Null => Cell::Null,
        serde_json::Value::String(s) => Cell::Text(s),
        serde_json::Value::Number(n) => n.as_f64().map_or(Cell::Null, Cell::Number),
        other => Cell::Text(other.to_string()),
    }
}
