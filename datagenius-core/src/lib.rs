//! Core data structures and analyses for DataGenius.
//!
//! This crate turns any rectangular dataset into report tables: profiling,
//! quality scoring, anomaly detection, a compliance summary and a table
//! summary of numeric ranges and most frequent values.
//! Inputs arrive as [`TableData`], either parsed from delimited text or
//! fetched from a read-only [`source::RowSource`], and every report is itself
//! a `TableData` that [`render()`] can print as text, Markdown, CSV, TSV or JSON.
//!
//! # Guarantees
//! - Analyses are pure and deterministic for a fixed analysis timestamp
//! - Input tables are never mutated
//! - Row sources only run single `SELECT` statements, and read-only sources
//!   refuse writes on every connection
//! - Connection credentials are redacted in logs and errors
//!
//! # Example
//! ```rust
//! use datagenius_core::{AnalysisKind, ReportContext, TableAnalyzer, parse_delimited};
//!
//! let table = parse_delimited("name,power\nAstra,Flight\nBolt,");
//! let report = TableAnalyzer::with_defaults().run(
//!     AnalysisKind::Anomalies,
//!     &table,
//!     &ReportContext::new("App", "heroes"),
//! );
//! assert_eq!(report.rows.len(), 1);
//! ```

pub mod analysis;
pub mod chart;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod models;
pub mod render;
pub mod source;

// Re-export commonly used types
pub use analysis::{AnalysisConfig, AnalysisKind, ReportContext, TableAnalyzer};
pub use chart::{ChartKind, ChartSpec, extract_chart_tags, parse_chart_tag};
pub use error::{DataGeniusError, Result};
pub use ingest::{parse_delimited, read_delimited_file};
pub use logging::init_logging;
pub use models::{Cell, TableData};
pub use render::{RenderFormat, render};
pub use source::{RowSource, SampleLimit, SourceConfig, create_source};
