//! Regression metrics

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::grid_search::HyperParameters;

/// Coefficient of determination.
///
/// A constant target scores 1.0 when predicted exactly and 0.0 otherwise.
pub fn r2_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    let n = y_true.len() as f64;
    if n == 0.0 {
        return 0.0;
    }
    let y_mean = y_true.sum() / n;
    let ss_tot: f64 = y_true.iter().map(|y| (y - y_mean).powi(2)).sum();
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();

    if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else if ss_res == 0.0 {
        1.0
    } else {
        0.0
    }
}

/// Held-out error metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub mae: f64,
    pub mse: f64,
    pub rmse: f64,
    pub r2_score: f64,
}

impl RegressionMetrics {
    pub fn compute(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Self {
        let n = y_true.len().max(1) as f64;
        let errors: Vec<f64> = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(t, p)| t - p)
            .collect();

        let mse = errors.iter().map(|e| e * e).sum::<f64>() / n;
        let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;

        Self {
            mae,
            mse,
            rmse: mse.sqrt(),
            r2_score: r2_score(y_true, y_pred),
        }
    }
}

/// Summary of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetrics {
    pub mae: f64,
    pub mse: f64,
    pub rmse: f64,
    pub r2_score: f64,
    pub best_params: HyperParameters,
    /// Rows used to fit the final model
    pub n_train: usize,
    /// Held-out rows the metrics were measured on
    pub n_test: usize,
    /// Mean cross-validated R² of the winning candidate
    pub cv_best_score: f64,
    pub training_time_secs: f64,
}

impl TrainingMetrics {
    pub fn from_parts(
        held_out: RegressionMetrics,
        best_params: HyperParameters,
        n_train: usize,
        n_test: usize,
        cv_best_score: f64,
        training_time_secs: f64,
    ) -> Self {
        Self {
            mae: held_out.mae,
            mse: held_out.mse,
            rmse: held_out.rmse,
            r2_score: held_out.r2_score,
            best_params,
            n_train,
            n_test,
            cv_best_score,
            training_time_secs,
        }
    }
}
