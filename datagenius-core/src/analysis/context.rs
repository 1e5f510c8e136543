//! Report identity and timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Instant at which an analysis ran, captured once per call so every row of
/// one report carries the same stamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisStamp {
    /// Capture time (UTC)
    pub at: DateTime<Utc>,
}

impl AnalysisStamp {
    /// Captures the current time.
    pub fn now() -> Self {
        Self { at: Utc::now() }
    }

    /// Uses a fixed instant.
    pub fn at(at: DateTime<Utc>) -> Self {
        Self { at }
    }

    /// `YYYY-MM-DD HH:MM:SS`, second precision.
    pub fn timestamp(&self) -> String {
        self.at.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// `YYYY-MM-DD`.
    pub fn date(&self) -> String {
        self.at.format("%Y-%m-%d").to_string()
    }
}

/// Identity strings and stamp written into every report row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportContext {
    /// Application the table belongs to
    pub application: String,
    /// Name of the analysed table
    pub table_name: String,
    /// When the analysis ran
    pub stamp: AnalysisStamp,
}

impl ReportContext {
    /// Creates a context stamped with the current time.
    pub fn new(application: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            application: application.into(),
            table_name: table_name.into(),
            stamp: AnalysisStamp::now(),
        }
    }

    /// Replaces the stamp.
    pub fn with_stamp(mut self, stamp: AnalysisStamp) -> Self {
        self.stamp = stamp;
        self
    }
}
