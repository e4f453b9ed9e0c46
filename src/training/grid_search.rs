//! Exhaustive hyperparameter search with k-fold cross-validation

use crate::error::{PredictorError, Result};
use ndarray::{Array1, Array2, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::cross_validation::{CVResults, CrossValidator};
use super::gradient_boosting::{GradientBoostingConfig, GradientBoostingRegressor};
use super::metrics::r2_score;

/// One point of the search space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HyperParameters {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub learning_rate: f64,
    pub min_samples_split: usize,
    pub subsample: f64,
}

impl HyperParameters {
    /// Estimator configuration for these parameters
    pub fn to_config(&self, min_samples_leaf: usize, random_state: u64) -> GradientBoostingConfig {
        GradientBoostingConfig {
            n_estimators: self.n_estimators,
            learning_rate: self.learning_rate,
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf,
            subsample: self.subsample,
            random_state: Some(random_state),
        }
    }
}

impl std::fmt::Display for HyperParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "n_estimators={}, max_depth={}, learning_rate={}, min_samples_split={}, subsample={}",
            self.n_estimators, self.max_depth, self.learning_rate, self.min_samples_split, self.subsample
        )
    }
}

/// Candidate values per hyperparameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamGrid {
    pub n_estimators: Vec<usize>,
    pub max_depth: Vec<usize>,
    pub learning_rate: Vec<f64>,
    pub min_samples_split: Vec<usize>,
    pub subsample: Vec<f64>,
}

impl Default for ParamGrid {
    fn default() -> Self {
        Self {
            n_estimators: vec![100, 200, 300],
            max_depth: vec![3, 5, 7, 10],
            learning_rate: vec![0.01, 0.05, 0.1],
            min_samples_split: vec![2, 5],
            subsample: vec![0.8, 1.0],
        }
    }
}

impl ParamGrid {
    /// A grid with exactly one candidate
    pub fn single(params: HyperParameters) -> Self {
        Self {
            n_estimators: vec![params.n_estimators],
            max_depth: vec![params.max_depth],
            learning_rate: vec![params.learning_rate],
            min_samples_split: vec![params.min_samples_split],
            subsample: vec![params.subsample],
        }
    }

    pub fn len(&self) -> usize {
        self.n_estimators.len()
            * self.max_depth.len()
            * self.learning_rate.len()
            * self.min_samples_split.len()
            * self.subsample.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All combinations; the last parameter varies fastest
    pub fn candidates(&self) -> Vec<HyperParameters> {
        let mut out = Vec::with_capacity(self.len());
        for &n_estimators in &self.n_estimators {
            for &max_depth in &self.max_depth {
                for &learning_rate in &self.learning_rate {
                    for &min_samples_split in &self.min_samples_split {
                        for &subsample in &self.subsample {
                            out.push(HyperParameters {
                                n_estimators,
                                max_depth,
                                learning_rate,
                                min_samples_split,
                                subsample,
                            });
                        }
                    }
                }
            }
        }
        out
    }
}

/// Outcome of a search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub best_params: HyperParameters,
    pub best_score: f64,
    pub cv_results: Vec<(HyperParameters, CVResults)>,
}

/// Grid search scored by mean R² over unshuffled folds
#[derive(Debug, Clone)]
pub struct GridSearchCV {
    grid: ParamGrid,
    cv_folds: usize,
    min_samples_leaf: usize,
    random_state: u64,
}

impl GridSearchCV {
    pub fn new(grid: ParamGrid, cv_folds: usize) -> Self {
        Self {
            grid,
            cv_folds,
            min_samples_leaf: 1,
            random_state: 42,
        }
    }

    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Evaluate every candidate on every fold.
    ///
    /// (candidate, fold) pairs run in parallel over a shared read-only view of
    /// the data. The best mean score wins; ties keep the earlier candidate.
    pub fn search(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<SearchResult> {
        let candidates = self.grid.candidates();
        if candidates.is_empty() {
            return Err(PredictorError::ConfigError(
                "parameter grid has no candidates".to_string(),
            ));
        }
        if x.nrows() != y.len() {
            return Err(PredictorError::ShapeError {
                expected: format!("y length = {}", x.nrows()),
                actual: format!("y length = {}", y.len()),
            });
        }

        let splits = CrossValidator::k_fold(self.cv_folds).split(x.nrows())?;
        let folds: Vec<_> = splits
            .iter()
            .map(|split| {
                (
                    x.select(Axis(0), &split.train_indices),
                    y.select(Axis(0), &split.train_indices),
                    x.select(Axis(0), &split.test_indices),
                    y.select(Axis(0), &split.test_indices),
                )
            })
            .collect();

        info!(
            candidates = candidates.len(),
            folds = folds.len(),
            "Starting grid search"
        );

        let n_folds = folds.len();
        let scores: Vec<f64> = (0..candidates.len() * n_folds)
            .into_par_iter()
            .map(|job| -> Result<f64> {
                let params = &candidates[job / n_folds];
                let (x_train, y_train, x_test, y_test) = &folds[job % n_folds];
                let mut model = GradientBoostingRegressor::new(
                    params.to_config(self.min_samples_leaf, self.random_state),
                );
                model.fit(x_train, y_train)?;
                let y_pred = model.predict(x_test)?;
                Ok(r2_score(y_test, &y_pred))
            })
            .collect::<Result<Vec<f64>>>()?;

        let cv_results: Vec<(HyperParameters, CVResults)> = candidates
            .iter()
            .zip(scores.chunks(n_folds))
            .map(|(params, fold_scores)| (*params, CVResults::from_scores(fold_scores.to_vec())))
            .collect();

        let mut best_idx = 0;
        for (idx, (params, result)) in cv_results.iter().enumerate() {
            debug!(%params, mean_r2 = result.mean_score, "Candidate scored");
            if result.mean_score > cv_results[best_idx].1.mean_score {
                best_idx = idx;
            }
        }

        let (best_params, best) = &cv_results[best_idx];
        info!(best_params = %best_params, best_score = best.mean_score, "Grid search complete");

        Ok(SearchResult {
            best_params: *best_params,
            best_score: best.mean_score,
            cv_results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_grid() -> ParamGrid {
        ParamGrid {
            n_estimators: vec![5, 40],
            max_depth: vec![3],
            learning_rate: vec![0.1],
            min_samples_split: vec![2],
            subsample: vec![1.0],
        }
    }

    fn data() -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((60, 2), |(i, j)| ((i * 7 + j * 13) % 60) as f64);
        let y = x.column(0).mapv(|v| 3.0 * v + 1.0);
        (x, y)
    }

    #[test]
    fn test_default_grid_size() {
        let grid = ParamGrid::default();
        assert_eq!(grid.len(), 144);
        assert_eq!(grid.candidates().len(), 144);
        assert_eq!(grid.candidates()[0].n_estimators, 100);
        assert_eq!(grid.candidates()[1].subsample, 1.0);
    }

    #[test]
    fn test_search_prefers_more_rounds() {
        let (x, y) = data();
        let result = GridSearchCV::new(small_grid(), 3).search(&x, &y).unwrap();
        assert_eq!(result.cv_results.len(), 2);
        assert_eq!(result.best_params.n_estimators, 40);
        assert!(result.best_score > 0.5);
    }

    #[test]
    fn test_ties_keep_first_candidate() {
        let (x, y) = data();
        let params = small_grid().candidates()[1];
        let grid = ParamGrid {
            n_estimators: vec![params.n_estimators, params.n_estimators],
            ..small_grid()
        };
        let result = GridSearchCV::new(grid, 3).search(&x, &y).unwrap();
        assert_eq!(result.cv_results[0].1.mean_score, result.cv_results[1].1.mean_score);
        assert_eq!(result.best_params, result.cv_results[0].0);
    }

    #[test]
    fn test_empty_grid() {
        let (x, y) = data();
        let grid = ParamGrid {
            subsample: vec![],
            ..small_grid()
        };
        let result = GridSearchCV::new(grid, 3).search(&x, &y);
        assert!(matches!(result, Err(PredictorError::ConfigError(_))));
    }
}
