//! Z-score feature scaling

use crate::error::{PredictorError, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Fitted parameters for one column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    /// Column mean
    pub mean: f64,
    /// Population standard deviation (1.0 when the column is constant)
    pub std: f64,
}

/// Standard scaler: (x - mean) / std, column by column.
///
/// Columns are identified by name and position; the input matrix passed to
/// `transform` must have the same column order as the one used for `fit`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandardScaler {
    columns: Vec<String>,
    params: Vec<ScalerParams>,
    is_fitted: bool,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit the scaler to the columns of `x`
    pub fn fit(&mut self, x: &Array2<f64>, columns: &[&str]) -> Result<&mut Self> {
        if x.ncols() != columns.len() {
            return Err(PredictorError::ShapeError {
                expected: format!("{} columns", columns.len()),
                actual: format!("{} columns", x.ncols()),
            });
        }
        if x.nrows() == 0 {
            return Err(PredictorError::ValidationError(
                "cannot fit scaler on an empty matrix".to_string(),
            ));
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(PredictorError::ValidationError(
                "cannot fit scaler on non-finite values".to_string(),
            ));
        }

        self.params = x
            .axis_iter(Axis(1))
            .map(|col| {
                let mean = col.mean().unwrap_or(0.0);
                let std = col.std(0.0);
                ScalerParams {
                    mean,
                    std: if std == 0.0 || !std.is_finite() { 1.0 } else { std },
                }
            })
            .collect();
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self.is_fitted = true;
        Ok(self)
    }

    /// Scale a matrix with the stored parameters
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_width(x.ncols())?;
        let mut out = x.clone();
        for (mut col, p) in out.axis_iter_mut(Axis(1)).zip(self.params.iter()) {
            col.mapv_inplace(|v| (v - p.mean) / p.std);
        }
        Ok(out)
    }

    /// Scale a single row with the stored parameters
    pub fn transform_row(&self, row: &[f64]) -> Result<Array1<f64>> {
        self.check_width(row.len())?;
        Ok(row
            .iter()
            .zip(self.params.iter())
            .map(|(v, p)| (v - p.mean) / p.std)
            .collect())
    }

    pub fn fit_transform(&mut self, x: &Array2<f64>, columns: &[&str]) -> Result<Array2<f64>> {
        self.fit(x, columns)?;
        self.transform(x)
    }

    /// Undo the scaling
    pub fn inverse_transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_width(x.ncols())?;
        let mut out = x.clone();
        for (mut col, p) in out.axis_iter_mut(Axis(1)).zip(self.params.iter()) {
            col.mapv_inplace(|v| v * p.std + p.mean);
        }
        Ok(out)
    }

    /// Fitted parameters of a column
    pub fn params(&self, column: &str) -> Option<ScalerParams> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.params[i])
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    fn check_width(&self, width: usize) -> Result<()> {
        if !self.is_fitted {
            return Err(PredictorError::ConfigError("scaler is not fitted".to_string()));
        }
        if width != self.params.len() {
            return Err(PredictorError::ShapeError {
                expected: format!("{} columns", self.params.len()),
                actual: format!("{} columns", width),
            });
        }
        Ok(())
    }
}
