//! Feature transformer: raw vehicle records to an aligned numeric matrix

use super::config::PreprocessingConfig;
use super::encoder::OneHotEncoder;
use super::features::{DerivedFeatures, AGE_SQUARED, KMS_PER_YEAR, VEHICLE_AGE};
use super::outlier::OutlierBounds;
use super::record::{
    TrainingRecord, VehicleRecord, FUEL_TYPE, KMS_DRIVEN, OWNER, PRESENT_PRICE, SELLER_TYPE,
    TRANSMISSION,
};
use super::scaler::StandardScaler;
use super::schema::FeatureSchema;
use crate::error::{PredictorError, Result};
use chrono::NaiveDate;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Numeric columns fitted by the z-score scaler, in scaler order
pub const SCALED_COLUMNS: [&str; 5] = [PRESENT_PRICE, KMS_DRIVEN, VEHICLE_AGE, KMS_PER_YEAR, AGE_SQUARED];

/// Numeric feature columns in output order; `Owner` passes through unscaled
pub const NUMERIC_FEATURES: [&str; 6] = [
    PRESENT_PRICE,
    KMS_DRIVEN,
    OWNER,
    VEHICLE_AGE,
    KMS_PER_YEAR,
    AGE_SQUARED,
];

/// Categorical columns, one-hot encoded with drop-first semantics
pub const CATEGORICAL_COLUMNS: [&str; 3] = [FUEL_TYPE, SELLER_TYPE, TRANSMISSION];

/// Row counts removed by the training-time filters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSummary {
    pub input_rows: usize,
    /// Rows outside the raw-record domain: future or implausible year,
    /// non-positive list price, negative mileage, non-finite target
    pub invalid_removed: usize,
    pub duplicates_removed: usize,
    pub outliers_removed: usize,
    pub high_mileage_removed: usize,
    pub output_rows: usize,
}

/// Fitted state: scaler parameters, category sets and the feature schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureTransformer {
    config: PreprocessingConfig,
    scaler: Option<StandardScaler>,
    encoder: Option<OneHotEncoder>,
    schema: Option<FeatureSchema>,
    is_fitted: bool,
}

impl Default for FeatureTransformer {
    fn default() -> Self {
        Self::new(PreprocessingConfig::default())
    }
}

impl FeatureTransformer {
    pub fn new(config: PreprocessingConfig) -> Self {
        Self {
            config,
            scaler: None,
            encoder: None,
            schema: None,
            is_fitted: false,
        }
    }

    /// Apply the training-only filters: invalid rows, duplicates, target
    /// outliers, extreme mileage.
    pub fn filter_training_rows(
        &self,
        rows: &[TrainingRecord],
        reference_date: NaiveDate,
    ) -> Result<(Vec<TrainingRecord>, FilterSummary)> {
        self.config.validate()?;
        let mut summary = FilterSummary {
            input_rows: rows.len(),
            ..Default::default()
        };

        let valid: Vec<&TrainingRecord> = rows
            .iter()
            .filter(|r| r.is_trainable(reference_date))
            .collect();
        summary.invalid_removed = rows.len() - valid.len();
        if summary.invalid_removed > 0 {
            warn!(
                rows = summary.invalid_removed,
                reference_date = %reference_date,
                "Dropped training rows outside the valid record domain"
            );
        }

        let mut kept: Vec<TrainingRecord> = if self.config.drop_duplicates {
            let mut seen = HashSet::with_capacity(valid.len());
            valid
                .into_iter()
                .filter(|r| seen.insert(r.duplicate_key()))
                .cloned()
                .collect()
        } else {
            valid.into_iter().cloned().collect()
        };
        summary.duplicates_removed = rows.len() - summary.invalid_removed - kept.len();

        let targets: Vec<f64> = kept.iter().map(|r| r.selling_price).collect();
        if let Some(bounds) = OutlierBounds::percentile(
            &targets,
            self.config.lower_quantile,
            self.config.upper_quantile,
        ) {
            let before = kept.len();
            kept.retain(|r| bounds.contains(r.selling_price));
            summary.outliers_removed = before - kept.len();
            debug!(lower = bounds.lower, upper = bounds.upper, "Target outlier bounds");
        }

        let before = kept.len();
        let max_kms = self.config.max_kms_driven;
        kept.retain(|r| r.vehicle.kms_driven < max_kms);
        summary.high_mileage_removed = before - kept.len();

        summary.output_rows = kept.len();
        Ok((kept, summary))
    }

    /// Filter the training rows, fit scaler and encoder, and return the aligned
    /// feature matrix with its target vector.
    pub fn fit_transform(
        &mut self,
        rows: &[TrainingRecord],
        reference_date: NaiveDate,
    ) -> Result<(Array2<f64>, Array1<f64>)> {
        if rows.is_empty() {
            return Err(PredictorError::ValidationError(
                "training data contains no rows".to_string(),
            ));
        }

        let (kept, summary) = self.filter_training_rows(rows, reference_date)?;
        info!(
            input_rows = summary.input_rows,
            invalid = summary.invalid_removed,
            duplicates = summary.duplicates_removed,
            outliers = summary.outliers_removed,
            high_mileage = summary.high_mileage_removed,
            output_rows = summary.output_rows,
            "Filtered training rows"
        );
        if kept.is_empty() {
            return Err(PredictorError::ValidationError(
                "no rows left after filtering duplicates and outliers".to_string(),
            ));
        }

        let flat: Vec<f64> = kept
            .iter()
            .flat_map(|r| scaled_inputs(&r.vehicle, reference_date))
            .collect();
        let raw = Array2::from_shape_vec((kept.len(), SCALED_COLUMNS.len()), flat)?;
        let mut scaler = StandardScaler::new();
        scaler.fit(&raw, &SCALED_COLUMNS)?;

        let mut encoder = OneHotEncoder::new(&CATEGORICAL_COLUMNS);
        encoder.fit(&kept)?;

        let mut columns: Vec<String> = NUMERIC_FEATURES.iter().map(|c| c.to_string()).collect();
        columns.extend(encoder.feature_names());
        let schema = FeatureSchema::new(columns);

        self.scaler = Some(scaler);
        self.encoder = Some(encoder);
        self.schema = Some(schema);
        self.is_fitted = true;

        let vehicles: Vec<VehicleRecord> = kept.iter().map(|r| r.vehicle.clone()).collect();
        let x = self.transform_batch(&vehicles, reference_date)?;
        let y: Array1<f64> = kept.iter().map(|r| r.selling_price).collect();
        Ok((x, y))
    }

    /// Transform one record with the stored scaler and schema
    pub fn transform(&self, record: &VehicleRecord, reference_date: NaiveDate) -> Result<Array1<f64>> {
        let named = self.named_features(record, reference_date)?;
        let schema = self.schema()?;
        Ok(Array1::from_vec(schema.align(&named)))
    }

    /// Transform several records; rows follow input order
    pub fn transform_batch(
        &self,
        records: &[VehicleRecord],
        reference_date: NaiveDate,
    ) -> Result<Array2<f64>> {
        let schema = self.schema()?;
        let mut x = Array2::zeros((records.len(), schema.len()));
        for (i, record) in records.iter().enumerate() {
            let row = schema.align(&self.named_features(record, reference_date)?);
            x.row_mut(i).assign(&Array1::from_vec(row));
        }
        Ok(x)
    }

    /// Scaled numeric values and encoded indicators of one record, by column
    /// name, before schema alignment.
    pub fn named_features(
        &self,
        record: &VehicleRecord,
        reference_date: NaiveDate,
    ) -> Result<Vec<(String, f64)>> {
        let (scaler, encoder) = match (&self.scaler, &self.encoder, self.is_fitted) {
            (Some(s), Some(e), true) => (s, e),
            _ => {
                return Err(PredictorError::ConfigError(
                    "feature transformer is not fitted".to_string(),
                ))
            }
        };

        let scaled = scaler.transform_row(&scaled_inputs(record, reference_date))?;
        let mut named = vec![
            (PRESENT_PRICE.to_string(), scaled[0]),
            (KMS_DRIVEN.to_string(), scaled[1]),
            (OWNER.to_string(), record.owner as f64),
            (VEHICLE_AGE.to_string(), scaled[2]),
            (KMS_PER_YEAR.to_string(), scaled[3]),
            (AGE_SQUARED.to_string(), scaled[4]),
        ];
        named.extend(encoder.encode(record)?);
        Ok(named)
    }

    pub fn schema(&self) -> Result<&FeatureSchema> {
        self.schema.as_ref().filter(|_| self.is_fitted).ok_or_else(|| {
            PredictorError::ConfigError("feature transformer is not fitted".to_string())
        })
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.schema
            .as_ref()
            .map(|s| s.columns().to_vec())
            .unwrap_or_default()
    }

    pub fn scaler(&self) -> Option<&StandardScaler> {
        self.scaler.as_ref()
    }

    pub fn encoder(&self) -> Option<&OneHotEncoder> {
        self.encoder.as_ref()
    }

    pub fn config(&self) -> &PreprocessingConfig {
        &self.config
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }
}

/// Raw values of the scaled columns, in `SCALED_COLUMNS` order
fn scaled_inputs(record: &VehicleRecord, reference_date: NaiveDate) -> [f64; 5] {
    let derived = DerivedFeatures::compute(record, reference_date);
    [
        record.present_price,
        record.kms_driven as f64,
        derived.vehicle_age,
        derived.kms_per_year,
        derived.age_squared,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn row(year: i32, price: f64, kms: i64, fuel: &str, target: f64) -> TrainingRecord {
        TrainingRecord {
            vehicle: VehicleRecord {
                year,
                present_price: price,
                kms_driven: kms,
                fuel_type: fuel.into(),
                seller_type: if kms % 2 == 0 { "Dealer" } else { "Individual" }.into(),
                transmission: if year % 2 == 0 { "Manual" } else { "Automatic" }.into(),
                owner: 0,
            },
            selling_price: target,
            car_name: Some("swift".into()),
        }
    }

    fn dataset() -> Vec<TrainingRecord> {
        let fuels = ["Petrol", "Diesel", "CNG"];
        (0..40)
            .map(|i| {
                row(
                    2010 + (i % 12),
                    4.0 + i as f64 * 0.25,
                    10_000 + i as i64 * 1_501,
                    fuels[i as usize % 3],
                    2.0 + i as f64 * 0.1,
                )
            })
            .collect()
    }

    #[test]
    fn test_fit_transform_shape_and_schema() {
        let mut transformer = FeatureTransformer::default();
        let (x, y) = transformer.fit_transform(&dataset(), date()).unwrap();
        let schema = transformer.schema().unwrap();
        assert_eq!(x.ncols(), schema.len());
        assert_eq!(x.nrows(), y.len());
        assert_eq!(
            schema.columns(),
            &[
                "Present_Price",
                "Kms_Driven",
                "Owner",
                "Vehicle_Age",
                "Kms_Per_Year",
                "Age_Squared",
                "Fuel_Type_Diesel",
                "Fuel_Type_Petrol",
                "Seller_Type_Individual",
                "Transmission_Manual",
            ]
        );
    }

    #[test]
    fn test_filters_duplicates_and_mileage() {
        let mut rows = dataset();
        rows.push(rows[10].clone());
        rows.push(row(2015, 6.0, 650_000, "Petrol", 3.0));
        let transformer = FeatureTransformer::default();
        let (kept, summary) = transformer.filter_training_rows(&rows, date()).unwrap();
        assert_eq!(summary.duplicates_removed, 1);
        assert_eq!(summary.high_mileage_removed, 1);
        assert_eq!(summary.output_rows, kept.len());
        assert!(kept.iter().all(|r| r.vehicle.kms_driven < 500_000));
    }

    #[test]
    fn test_quantile_trim_drops_both_tails() {
        let transformer = FeatureTransformer::default();
        let (kept, summary) = transformer.filter_training_rows(&dataset(), date()).unwrap();
        // 40 evenly spaced targets: the two lowest and two highest fall outside [q05, q95]
        assert_eq!(summary.outliers_removed, 4);
        let min = kept.iter().map(|r| r.selling_price).fold(f64::INFINITY, f64::min);
        assert!(min > 2.1);
    }

    #[test]
    fn test_transform_before_fit_is_config_error() {
        let transformer = FeatureTransformer::default();
        let err = transformer.transform(&dataset()[0].vehicle, date()).unwrap_err();
        assert!(matches!(err, PredictorError::ConfigError(_)));
        assert!(err.to_string().contains("not fitted"));
    }

    #[test]
    fn test_single_record_matches_batch_row() {
        let rows = dataset();
        let mut transformer = FeatureTransformer::default();
        transformer.fit_transform(&rows, date()).unwrap();

        let vehicles: Vec<VehicleRecord> = rows.iter().map(|r| r.vehicle.clone()).collect();
        let batch = transformer.transform_batch(&vehicles, date()).unwrap();
        let single = transformer.transform(&vehicles[7], date()).unwrap();
        assert_eq!(batch.row(7).to_vec(), single.to_vec());
    }

    #[test]
    fn test_owner_is_not_scaled() {
        let mut transformer = FeatureTransformer::default();
        transformer.fit_transform(&dataset(), date()).unwrap();
        let mut vehicle = dataset()[3].vehicle.clone();
        vehicle.owner = 2;
        let x = transformer.transform(&vehicle, date()).unwrap();
        let idx = transformer.schema().unwrap().position(OWNER).unwrap();
        assert_eq!(x[idx], 2.0);
    }

    #[test]
    fn test_future_year_row_is_dropped_before_scaling() {
        let mut rows = dataset();
        rows.push(row(2025, 7.0, 12_000, "Diesel", 3.5));
        let mut transformer = FeatureTransformer::default();

        let (kept, summary) = transformer.filter_training_rows(&rows, date()).unwrap();
        assert_eq!(summary.invalid_removed, 1);
        assert!(kept.iter().all(|r| r.vehicle.year <= 2024));

        let (x, _) = transformer.fit_transform(&rows, date()).unwrap();
        let scaler = transformer.scaler().unwrap();
        for column in SCALED_COLUMNS {
            let p = scaler.params(column).unwrap();
            assert!(p.mean.is_finite() && p.std.is_finite(), "{} {:?}", column, p);
        }
        assert!(x.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_empty_after_filtering() {
        let rows = vec![row(2015, 5.0, 900_000, "Petrol", 2.0)];
        let mut transformer = FeatureTransformer::default();
        let err = transformer.fit_transform(&rows, date()).unwrap_err();
        assert!(err.is_data_validation());
        assert!(!transformer.is_fitted());
    }
}
