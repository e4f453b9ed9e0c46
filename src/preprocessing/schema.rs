//! Feature schema: the ordered column contract between training and scoring

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Ordered feature columns fixed at training time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    columns: Vec<String>,
}

impl FeatureSchema {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Reindex named values onto the schema.
    ///
    /// Output follows schema order. Schema columns missing from `values` are 0.
    /// Values whose name is not in the schema are dropped; an unseen category
    /// therefore scores as its column's reference category.
    pub fn align(&self, values: &[(String, f64)]) -> Vec<f64> {
        let index: HashMap<&str, usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i))
            .collect();

        let mut row = vec![0.0; self.columns.len()];
        for (name, value) in values {
            match index.get(name.as_str()) {
                Some(&i) => row[i] = *value,
                None => debug!(column = %name, "Dropping column not present in feature schema"),
            }
        }
        row
    }
}
