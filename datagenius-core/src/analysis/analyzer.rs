//! Analyzer facade.
//!
//! `TableAnalyzer` holds an [`AnalysisConfig`] and dispatches to the report
//! builders. Every report is a fresh [`TableData`]; the input table is
//! only borrowed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DataGeniusError;
use crate::models::TableData;

use super::anomaly::anomaly_table;
use super::compliance::compliance_table;
use super::config::AnalysisConfig;
use super::context::ReportContext;
use super::profiling::profile_table;
use super::quality::quality_table;
use super::summary::summary_table;

/// The available reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    /// Descriptive statistics per field
    Profile,
    /// Quality scoring per field
    Quality,
    /// Outliers and blank values
    Anomalies,
    /// Static compliance summary
    Compliance,
    /// Table size, numeric ranges and most frequent values
    Summary,
}

impl AnalysisKind {
    /// All reports in their canonical order.
    pub const ALL: [Self; 5] = [
        Self::Profile,
        Self::Quality,
        Self::Anomalies,
        Self::Compliance,
        Self::Summary,
    ];

    /// Lower-case name used on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Profile => "profile",
            Self::Quality => "quality",
            Self::Anomalies => "anomalies",
            Self::Compliance => "compliance",
            Self::Summary => "summary",
        }
    }

    /// Human-readable report title.
    pub fn title(self) -> &'static str {
        match self {
            Self::Profile => "Data Profiling",
            Self::Quality => "Data Quality",
            Self::Anomalies => "Anomaly Detection",
            Self::Compliance => "Compliance Summary",
            Self::Summary => "Table Summary",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisKind {
    type Err = DataGeniusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "profile" | "profiling" => Ok(Self::Profile),
            "quality" => Ok(Self::Quality),
            "anomalies" | "anomaly" => Ok(Self::Anomalies),
            "compliance" => Ok(Self::Compliance),
            "summary" | "overview" => Ok(Self::Summary),
            other => Err(DataGeniusError::configuration(format!(
                "Unknown analysis '{}'",
                other
            ))),
        }
    }
}

/// Runs the analyses with a shared configuration.
///
/// # Example
///
/// ```rust
/// use datagenius_core::analysis::{AnalysisKind, ReportContext, TableAnalyzer};
/// use datagenius_core::ingest::parse_delimited;
///
/// let table = parse_delimited("name,power\nA,Flight\nB,Fire");
/// let analyzer = TableAnalyzer::with_defaults();
/// let report = analyzer.run(AnalysisKind::Quality, &table, &ReportContext::new("App", "heroes"));
/// assert_eq!(report.rows.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TableAnalyzer {
    config: AnalysisConfig,
}

impl TableAnalyzer {
    /// Creates a new analyzer with the given configuration.
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Creates a new analyzer with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(AnalysisConfig::default())
    }

    /// Returns a reference to the analyzer configuration.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Builds the profiling report.
    pub fn profile(&self, table: &TableData, context: &ReportContext) -> TableData {
        profile_table(table, context)
    }

    /// Builds the quality report.
    pub fn quality(&self, table: &TableData, context: &ReportContext) -> TableData {
        quality_table(table, context, &self.config)
    }

    /// Builds the anomaly report.
    pub fn anomalies(&self, table: &TableData, context: &ReportContext) -> TableData {
        anomaly_table(table, context, &self.config)
    }

    /// Builds the compliance summary. The table itself is not consulted.
    pub fn compliance(&self, context: &ReportContext) -> TableData {
        compliance_table(context)
    }

    /// Builds the table summary.
    pub fn summary(&self, table: &TableData, context: &ReportContext) -> TableData {
        summary_table(table, context)
    }

    /// Builds one report.
    pub fn run(&self, kind: AnalysisKind, table: &TableData, context: &ReportContext) -> TableData {
        let _span = tracing::debug_span!("analysis", kind = kind.as_str()).entered();
        match kind {
            AnalysisKind::Profile => self.profile(table, context),
            AnalysisKind::Quality => self.quality(table, context),
            AnalysisKind::Anomalies => self.anomalies(table, context),
            AnalysisKind::Compliance => self.compliance(context),
            AnalysisKind::Summary => self.summary(table, context),
        }
    }

    /// Builds every report, in [`AnalysisKind::ALL`] order, sharing one
    /// context.
    pub fn run_all(
        &self,
        table: &TableData,
        context: &ReportContext,
    ) -> Vec<(AnalysisKind, TableData)> {
        AnalysisKind::ALL
            .iter()
            .map(|&kind| (kind, self.run(kind, table, context)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Cell;

    fn sample() -> TableData {
        TableData::new(
            ["id", "name"],
            vec![
                vec![Cell::text("1"), Cell::text("Astra Nova")],
                vec![Cell::text("2"), Cell::text("")],
            ],
        )
    }

    #[test]
    fn test_analyzer_creation() {
        let config = AnalysisConfig::new().with_outlier_sigma(2.0);
        let analyzer = TableAnalyzer::new(config.clone());
        assert_eq!(analyzer.config(), &config);
        assert_eq!(TableAnalyzer::with_defaults().config(), &AnalysisConfig::default());
    }

    #[test]
    fn test_run_dispatches_by_kind() {
        let analyzer = TableAnalyzer::with_defaults();
        let context = ReportContext::new("App", "heroes");
        let table = sample();

        assert_eq!(analyzer.run(AnalysisKind::Profile, &table, &context).headers.len(), 13);
        assert_eq!(analyzer.run(AnalysisKind::Quality, &table, &context).headers.len(), 12);
        assert_eq!(analyzer.run(AnalysisKind::Anomalies, &table, &context).headers.len(), 8);
        assert_eq!(analyzer.run(AnalysisKind::Compliance, &table, &context).rows.len(), 4);
        assert_eq!(analyzer.run(AnalysisKind::Summary, &table, &context).headers.len(), 8);
    }

    #[test]
    fn test_run_all_order_and_shared_stamp() {
        let analyzer = TableAnalyzer::with_defaults();
        let context = ReportContext::new("App", "heroes");
        let reports = analyzer.run_all(&sample(), &context);

        let kinds: Vec<_> = reports.iter().map(|(k, _)| *k).collect();
        assert_eq!(kinds, AnalysisKind::ALL.to_vec());

        let stamp = Cell::text(context.stamp.timestamp());
        let (_, profile) = &reports[0];
        assert!(profile.rows.iter().all(|r| r[12] == stamp));
        let (_, compliance) = &reports[3];
        assert!(compliance.rows.iter().all(|r| r[9] == stamp));
        let (_, summary) = &reports[4];
        assert!(summary.rows.iter().all(|r| r[7] == stamp));
    }

    #[test]
    fn test_analysis_kind_parsing() {
        assert_eq!("profile".parse::<AnalysisKind>().unwrap(), AnalysisKind::Profile);
        assert_eq!(" Quality ".parse::<AnalysisKind>().unwrap(), AnalysisKind::Quality);
        assert_eq!("anomaly".parse::<AnalysisKind>().unwrap(), AnalysisKind::Anomalies);
        assert_eq!("summary".parse::<AnalysisKind>().unwrap(), AnalysisKind::Summary);
        assert!("forecast".parse::<AnalysisKind>().is_err());
        assert_eq!(AnalysisKind::Compliance.to_string(), "compliance");
    }
}
