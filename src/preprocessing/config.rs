//! Preprocessing configuration

use crate::error::{PredictorError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the feature transformer's training-time filters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessingConfig {
    /// Lower target quantile kept by the outlier trim (inclusive)
    pub lower_quantile: f64,

    /// Upper target quantile kept by the outlier trim (inclusive)
    pub upper_quantile: f64,

    /// Rows with this mileage or more are dropped
    pub max_kms_driven: i64,

    /// Whether exact-duplicate rows are removed before fitting
    pub drop_duplicates: bool,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            lower_quantile: 0.05,
            upper_quantile: 0.95,
            max_kms_driven: 500_000,
            drop_duplicates: true,
        }
    }
}

impl PreprocessingConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the target quantile window
    pub fn with_quantiles(mut self, lower: f64, upper: f64) -> Self {
        self.lower_quantile = lower;
        self.upper_quantile = upper;
        self
    }

    /// Builder method to set the mileage cap
    pub fn with_max_kms_driven(mut self, max_kms: i64) -> Self {
        self.max_kms_driven = max_kms;
        self
    }

    /// Builder method to toggle duplicate removal
    pub fn with_drop_duplicates(mut self, drop: bool) -> Self {
        self.drop_duplicates = drop;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let in_unit = |q: f64| (0.0..=1.0).contains(&q);
        if !in_unit(self.lower_quantile)
            || !in_unit(self.upper_quantile)
            || self.lower_quantile > self.upper_quantile
        {
            return Err(PredictorError::ConfigError(format!(
                "invalid quantile window [{}, {}]",
                self.lower_quantile, self.upper_quantile
            )));
        }
        if self.max_kms_driven <= 0 {
            return Err(PredictorError::ConfigError(
                "max_kms_driven must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
