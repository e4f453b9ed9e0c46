//! Drop-first one-hot encoding of the categorical vehicle columns

use super::record::{TrainingRecord, VehicleRecord};
use crate::error::{PredictorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Categories seen for one column during fit, sorted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub column: String,
    pub categories: Vec<String>,
}

impl CategoryGroup {
    /// The implicit baseline: first category in sort order, never given a column
    pub fn reference(&self) -> Option<&str> {
        self.categories.first().map(String::as_str)
    }

    fn indicator_name(&self, category: &str) -> String {
        format!("{}_{}", self.column, category)
    }
}

/// One-hot encoder that drops the first category of every column.
///
/// `encode` emits an indicator for whatever value the record carries, known or
/// not. Reconciling that output with the training columns is the job of
/// [`FeatureSchema::align`](super::FeatureSchema::align).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OneHotEncoder {
    columns: Vec<String>,
    groups: Vec<CategoryGroup>,
    is_fitted: bool,
}

impl OneHotEncoder {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            groups: Vec::new(),
            is_fitted: false,
        }
    }

    /// Collect the category set of every configured column
    pub fn fit(&mut self, rows: &[TrainingRecord]) -> Result<&mut Self> {
        let mut groups = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let mut seen = BTreeSet::new();
            for row in rows {
                let value = row
                    .vehicle
                    .category(column)
                    .ok_or_else(|| PredictorError::FeatureNotFound(column.clone()))?;
                seen.insert(value.to_string());
            }
            groups.push(CategoryGroup {
                column: column.clone(),
                categories: seen.into_iter().collect(),
            });
        }
        self.groups = groups;
        self.is_fitted = true;
        Ok(self)
    }

    /// Indicator columns produced for the training data, in output order
    pub fn feature_names(&self) -> Vec<String> {
        self.groups
            .iter()
            .flat_map(|g| {
                g.categories
                    .iter()
                    .skip(1)
                    .map(move |c| g.indicator_name(c))
            })
            .collect()
    }

    /// Encode one record as named indicator values.
    ///
    /// A value equal to its column's reference category yields no indicator.
    /// Any other value yields `<column>_<value> = 1.0`, including values the
    /// encoder never saw.
    pub fn encode(&self, record: &VehicleRecord) -> Result<Vec<(String, f64)>> {
        if !self.is_fitted {
            return Err(PredictorError::ConfigError("encoder is not fitted".to_string()));
        }
        let mut encoded = Vec::with_capacity(self.groups.len());
        for group in &self.groups {
            let value = record
                .category(&group.column)
                .ok_or_else(|| PredictorError::FeatureNotFound(group.column.clone()))?;
            if group.reference() != Some(value) {
                encoded.push((group.indicator_name(value), 1.0));
            }
        }
        Ok(encoded)
    }

    pub fn groups(&self) -> &[CategoryGroup] {
        &self.groups
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::record::{FUEL_TYPE, SELLER_TYPE, TRANSMISSION};

    fn row(fuel: &str, seller: &str, transmission: &str) -> TrainingRecord {
        TrainingRecord {
            vehicle: VehicleRecord {
                year: 2016,
                present_price: 6.0,
                kms_driven: 40_000,
                fuel_type: fuel.into(),
                seller_type: seller.into(),
                transmission: transmission.into(),
                owner: 0,
            },
            selling_price: 3.5,
            car_name: None,
        }
    }

    fn fitted() -> OneHotEncoder {
        let rows = vec![
            row("Petrol", "Dealer", "Manual"),
            row("Diesel", "Individual", "Automatic"),
            row("CNG", "Dealer", "Manual"),
        ];
        let mut encoder = OneHotEncoder::new(&[FUEL_TYPE, SELLER_TYPE, TRANSMISSION]);
        encoder.fit(&rows).unwrap();
        encoder
    }

    #[test]
    fn test_drop_first_feature_names() {
        assert_eq!(
            fitted().feature_names(),
            vec![
                "Fuel_Type_Diesel",
                "Fuel_Type_Petrol",
                "Seller_Type_Individual",
                "Transmission_Manual",
            ]
        );
    }

    #[test]
    fn test_reference_categories_emit_nothing() {
        let encoder = fitted();
        let encoded = encoder.encode(&row("CNG", "Dealer", "Automatic").vehicle).unwrap();
        assert!(encoded.is_empty());
    }

    #[test]
    fn test_encode_known_values() {
        let encoder = fitted();
        let encoded = encoder.encode(&row("Petrol", "Individual", "Manual").vehicle).unwrap();
        let names: Vec<&str> = encoded.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["Fuel_Type_Petrol", "Seller_Type_Individual", "Transmission_Manual"]);
    }

    #[test]
    fn test_unknown_value_produces_unscheduled_column() {
        let encoder = fitted();
        let encoded = encoder.encode(&row("Electric", "Dealer", "Automatic").vehicle).unwrap();
        assert_eq!(encoded, vec![("Fuel_Type_Electric".to_string(), 1.0)]);
        assert!(!encoder.feature_names().contains(&"Fuel_Type_Electric".to_string()));
    }

    #[test]
    fn test_encode_before_fit() {
        let encoder = OneHotEncoder::new(&[FUEL_TYPE]);
        assert!(encoder.encode(&row("Petrol", "Dealer", "Manual").vehicle).is_err());
    }
}
