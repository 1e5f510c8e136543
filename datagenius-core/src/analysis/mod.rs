//! Tabular data analysis.
//!
//! Five deterministic reports are built from a [`TableData`]:
//! - **Profiling**: counts, completeness, min/max/median/std-dev per field
//! - **Quality**: completeness, uniqueness, validity and a composite score
//! - **Anomalies**: sigma-rule outliers and blank values
//! - **Compliance**: a fixed summary keyed only by table identity
//! - **Summary**: row and column counts, numeric ranges and the most
//!   frequent values of the other fields
//!
//! Every report is itself a `TableData`, so one renderer handles all of them.
//! The analyses are pure: they borrow the input, perform no I/O and can run
//! concurrently.
//!
//! # Example
//! ```rust
//! use datagenius_core::analysis::profile;
//! use datagenius_core::ingest::parse_delimited;
//!
//! let table = parse_delimited("age\n10\n20\n30\n1000");
//! let report = profile(&table, "App", "T");
//! assert_eq!(report.rows.len(), 1);
//! ```

mod analyzer;
mod anomaly;
pub mod classifier;
mod compliance;
mod config;
mod context;
mod profiling;
mod quality;
mod summary;

use crate::models::TableData;

// Re-export public API
pub use analyzer::{AnalysisKind, TableAnalyzer};
pub use anomaly::{ANOMALY_HEADERS, AnomalyReason, anomaly_table, find_outliers};
pub use compliance::{
    COMPLIANCE_HEADERS, ComplianceAspect, LAYER, SLA_THRESHOLD, compliance_table,
};
pub use config::{AnalysisConfig, ConfigValidationError, ValidityConfig};
pub use context::{AnalysisStamp, ReportContext};
pub use profiling::{PROFILE_HEADERS, profile_table};
pub use quality::{
    MATCH_ALL_RULE, NUMERIC_RULE, QUALITY_HEADERS, placeholder_anomaly_count, quality_rule,
    quality_table, validity_score,
};
pub use summary::{
    SUMMARY_HEADERS, SummarySection, TOP_VALUE_LIMIT, is_numeric_field, summary_table, top_values,
};

/// Profiles `table` with the current time as analysis date.
pub fn profile(table: &TableData, application: &str, table_name: &str) -> TableData {
    profile_table(table, &ReportContext::new(application, table_name))
}

/// Scores the quality of `table` with the default configuration.
pub fn quality(table: &TableData, application: &str, table_name: &str) -> TableData {
    quality_table(
        table,
        &ReportContext::new(application, table_name),
        &AnalysisConfig::default(),
    )
}

/// Detects anomalies in `table` with the default configuration.
pub fn anomalies(table: &TableData, application: &str, table_name: &str) -> TableData {
    anomaly_table(
        table,
        &ReportContext::new(application, table_name),
        &AnalysisConfig::default(),
    )
}

/// Builds the compliance summary for a table identity.
pub fn compliance(application: &str, table_name: &str) -> TableData {
    compliance_table(&ReportContext::new(application, table_name))
}

/// Summarizes the size, numeric ranges and most frequent values of `table`.
pub fn summary(table: &TableData, application: &str, table_name: &str) -> TableData {
    summary_table(table, &ReportContext::new(application, table_name))
}
