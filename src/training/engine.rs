//! Training engine: split, search, refit, evaluate

use crate::error::{PredictorError, Result};
use chrono::{DateTime, Utc};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;
use uuid::Uuid;

use super::config::TrainingConfig;
use super::cross_validation::train_test_split;
use super::gradient_boosting::GradientBoostingRegressor;
use super::grid_search::{GridSearchCV, HyperParameters};
use super::metrics::{RegressionMetrics, TrainingMetrics};

/// Name reported for the estimator family
pub const ALGORITHM: &str = "Gradient Boosting Regressor";

/// Importance of a single feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// A trained estimator plus everything needed to describe it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedModel {
    pub algorithm: String,
    pub estimator: GradientBoostingRegressor,
    pub best_params: HyperParameters,
    pub metrics: TrainingMetrics,
    pub feature_names: Vec<String>,
    /// Shared with the transformer artifact saved alongside
    pub run_id: Uuid,
    pub trained_at: DateTime<Utc>,
}

impl FittedModel {
    /// Score one aligned feature vector
    pub fn predict_one(&self, features: &Array1<f64>) -> Result<f64> {
        if features.len() != self.feature_names.len() {
            return Err(PredictorError::ShapeError {
                expected: format!("{} features", self.feature_names.len()),
                actual: format!("{} features", features.len()),
            });
        }
        self.estimator.predict_one(features.view())
    }

    /// Score a batch of aligned feature rows
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.estimator.predict(x)
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Importances paired with feature names, highest first
    pub fn feature_importance(&self) -> Vec<FeatureImportance> {
        let mut ranked: Vec<FeatureImportance> = self
            .feature_names
            .iter()
            .zip(self.estimator.feature_importances().iter())
            .map(|(name, &importance)| FeatureImportance {
                feature: name.clone(),
                importance,
            })
            .collect();
        ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
        ranked
    }
}

/// Runs the full model-selection procedure on an encoded matrix
#[derive(Debug, Clone, Default)]
pub struct ModelTrainer {
    config: TrainingConfig,
}

impl ModelTrainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Split, grid-search on the training part, refit the winner and measure it
    /// on the held-out part.
    pub fn train(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        feature_names: Vec<String>,
    ) -> Result<FittedModel> {
        let start = Instant::now();
        self.config.validate()?;

        let n_samples = x.nrows();
        if n_samples == 0 {
            return Err(PredictorError::ValidationError(
                "no rows to train on".to_string(),
            ));
        }
        if n_samples != y.len() {
            return Err(PredictorError::ValidationError(format!(
                "feature matrix has {} rows but target has {}",
                n_samples,
                y.len()
            )));
        }
        if feature_names.len() != x.ncols() {
            return Err(PredictorError::ShapeError {
                expected: format!("{} feature names", x.ncols()),
                actual: format!("{} feature names", feature_names.len()),
            });
        }

        let split = train_test_split(n_samples, self.config.test_size, self.config.random_state)?;
        let n_train = split.train_indices.len();
        let n_test = split.test_indices.len();
        if n_train < self.config.cv_folds {
            return Err(PredictorError::ValidationError(format!(
                "{} training rows are too few for {}-fold cross-validation",
                n_train, self.config.cv_folds
            )));
        }

        let x_train = x.select(Axis(0), &split.train_indices);
        let y_train = y.select(Axis(0), &split.train_indices);
        let x_test = x.select(Axis(0), &split.test_indices);
        let y_test = y.select(Axis(0), &split.test_indices);

        info!(n_train, n_test, features = x.ncols(), "Training gradient boosting model");

        let search = GridSearchCV::new(self.config.param_grid.clone(), self.config.cv_folds)
            .with_min_samples_leaf(self.config.min_samples_leaf)
            .with_random_state(self.config.random_state)
            .search(&x_train, &y_train)?;

        let mut estimator = GradientBoostingRegressor::new(
            search
                .best_params
                .to_config(self.config.min_samples_leaf, self.config.random_state),
        );
        estimator.fit(&x_train, &y_train)?;

        let y_pred = estimator.predict(&x_test)?;
        let held_out = RegressionMetrics::compute(&y_test, &y_pred);
        let metrics = TrainingMetrics::from_parts(
            held_out,
            search.best_params,
            n_train,
            n_test,
            search.best_score,
            start.elapsed().as_secs_f64(),
        );

        info!(
            r2 = metrics.r2_score,
            rmse = metrics.rmse,
            mae = metrics.mae,
            secs = metrics.training_time_secs,
            "Model evaluated on held-out split"
        );

        Ok(FittedModel {
            algorithm: ALGORITHM.to_string(),
            estimator,
            best_params: search.best_params,
            metrics,
            feature_names,
            run_id: Uuid::new_v4(),
            trained_at: Utc::now(),
        })
    }
}
