//! Analysis configuration.
//!
//! Defaults reproduce the fixed constants of the reports: a 3-sigma outlier
//! rule, validity of 95/80 split at a 90% numeric ratio, and a 1% placeholder
//! anomaly rate.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validity heuristic used by the quality report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidityConfig {
    /// Share of numeric cells needed for the high score (0.0-1.0)
    pub min_ratio: f64,
    /// Validity (%) when the ratio is met
    pub high_score: f64,
    /// Validity (%) otherwise, including empty tables
    pub low_score: f64,
}

impl Default for ValidityConfig {
    fn default() -> Self {
        Self {
            min_ratio: 0.9,
            high_score: 95.0,
            low_score: 80.0,
        }
    }
}

impl ValidityConfig {
    /// Clamps the ratio to `0.0..=1.0` and the scores to `0..=100`. `NaN`
    /// fields take their default.
    pub fn clamped(&self) -> Self {
        let defaults = Self::default();
        Self {
            min_ratio: clamp_or(self.min_ratio, 0.0, 1.0, defaults.min_ratio),
            high_score: clamp_or(self.high_score, 0.0, 100.0, defaults.high_score),
            low_score: clamp_or(self.low_score, 0.0, 100.0, defaults.low_score),
        }
    }
}

fn clamp_or(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}

/// Configuration shared by the profiling, quality and anomaly analyses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Values further than this many population standard deviations from the
    /// mean are reported as outliers
    pub outlier_sigma: f64,
    /// Validity heuristic
    pub validity: ValidityConfig,
    /// Proportional anomaly count reported by the quality analysis (0.0-1.0)
    pub anomaly_rate: f64,
}

/// Validation errors for analysis configuration.
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    /// Sigma threshold is zero, negative or not finite
    #[error("outlier_sigma must be a positive finite number, got {0}")]
    InvalidOutlierSigma(f64),
    /// Numeric ratio outside `0.0..=1.0`
    #[error("validity.min_ratio must be between 0.0 and 1.0, got {0}")]
    InvalidValidityRatio(f64),
    /// A validity score outside `0..=100`
    #[error("validity scores must be between 0 and 100, got high={high} low={low}")]
    InvalidValidityScore {
        /// Configured high score
        high: f64,
        /// Configured low score
        low: f64,
    },
    /// Anomaly rate outside `0.0..=1.0`
    #[error("anomaly_rate must be between 0.0 and 1.0, got {0}")]
    InvalidAnomalyRate(f64),
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            outlier_sigma: 3.0,
            validity: ValidityConfig::default(),
            anomaly_rate: 0.01,
        }
    }
}

impl AnalysisConfig {
    /// Creates a new analysis config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the outlier threshold in standard deviations.
    ///
    /// Non-positive or non-finite values fall back to the default.
    pub fn with_outlier_sigma(mut self, sigma: f64) -> Self {
        if sigma.is_finite() && sigma > 0.0 {
            self.outlier_sigma = sigma;
        } else {
            tracing::warn!(
                "outlier_sigma {} is not positive, keeping {}",
                sigma,
                self.outlier_sigma
            );
        }
        self
    }

    /// Builder method to set the validity heuristic.
    ///
    /// Out-of-range fields are clamped, see [`ValidityConfig::clamped`].
    pub fn with_validity(mut self, validity: ValidityConfig) -> Self {
        let clamped = validity.clamped();
        if clamped != validity {
            tracing::warn!(
                "validity {:?} clamped to valid ranges as {:?}",
                validity,
                clamped
            );
        }
        self.validity = clamped;
        self
    }

    /// Builder method to set the placeholder anomaly rate.
    pub fn with_anomaly_rate(mut self, rate: f64) -> Self {
        if !(0.0..=1.0).contains(&rate) {
            tracing::warn!("anomaly_rate {} clamped to valid range [0.0, 1.0]", rate);
        }
        self.anomaly_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(self.outlier_sigma.is_finite() && self.outlier_sigma > 0.0) {
            return Err(ConfigValidationError::InvalidOutlierSigma(
                self.outlier_sigma,
            ));
        }
        if !(0.0..=1.0).contains(&self.validity.min_ratio) {
            return Err(ConfigValidationError::InvalidValidityRatio(
                self.validity.min_ratio,
            ));
        }
        let score_range = 0.0..=100.0;
        if !score_range.contains(&self.validity.high_score)
            || !score_range.contains(&self.validity.low_score)
        {
            return Err(ConfigValidationError::InvalidValidityScore {
                high: self.validity.high_score,
                low: self.validity.low_score,
            });
        }
        if !(0.0..=1.0).contains(&self.anomaly_rate) {
            return Err(ConfigValidationError::InvalidAnomalyRate(self.anomaly_rate));
        }
        Ok(())
    }
}
