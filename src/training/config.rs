//! Training configuration

use crate::error::{PredictorError, Result};
use serde::{Deserialize, Serialize};

use super::grid_search::ParamGrid;

/// Configuration for model training
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Fraction of rows held out for the final metrics
    pub test_size: f64,

    /// Seed for the hold-out split and the boosting subsamples
    pub random_state: u64,

    /// Number of cross-validation folds
    pub cv_folds: usize,

    /// Hyperparameter search space
    pub param_grid: ParamGrid,

    /// Minimum samples per tree leaf
    pub min_samples_leaf: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            random_state: 42,
            cv_folds: 5,
            param_grid: ParamGrid::default(),
            min_samples_leaf: 1,
        }
    }
}

impl TrainingConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the held-out fraction
    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    /// Builder method to set random state
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Builder method to set CV folds
    pub fn with_cv(mut self, folds: usize) -> Self {
        self.cv_folds = folds;
        self
    }

    /// Builder method to replace the search space
    pub fn with_param_grid(mut self, grid: ParamGrid) -> Self {
        self.param_grid = grid;
        self
    }

    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(PredictorError::ConfigError(format!(
                "test_size must be in (0, 1), got {}",
                self.test_size
            )));
        }
        if self.cv_folds < 2 {
            return Err(PredictorError::ConfigError(
                "cv_folds must be at least 2".to_string(),
            ));
        }
        if self.param_grid.is_empty() {
            return Err(PredictorError::ConfigError(
                "parameter grid has no candidates".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TrainingConfig::default();
        assert_eq!(config.test_size, 0.2);
        assert_eq!(config.cv_folds, 5);
        assert_eq!(config.random_state, 42);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = TrainingConfig::new().with_cv(3).with_test_size(0.25).with_random_state(7);
        assert_eq!(config.cv_folds, 3);
        assert_eq!(config.test_size, 0.25);
        assert_eq!(config.random_state, 7);
    }

    #[test]
    fn test_invalid_values() {
        assert!(TrainingConfig::new().with_cv(1).validate().is_err());
        assert!(TrainingConfig::new().with_test_size(1.0).validate().is_err());

        let empty = ParamGrid {
            max_depth: vec![],
            ..ParamGrid::default()
        };
        assert!(matches!(
            TrainingConfig::new().with_param_grid(empty).validate(),
            Err(PredictorError::ConfigError(_))
        ));
    }
}
