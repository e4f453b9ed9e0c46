//! Feature preprocessing
//!
//! Turns raw vehicle records into the numeric matrix consumed by the model:
//! - Derived age and usage features computed against a reference date
//! - Training-only filtering (duplicates, target outliers, extreme mileage)
//! - Z-score scaling of the numeric columns
//! - Drop-first one-hot encoding of fuel, seller and transmission
//! - Alignment of every encoded row onto the training-time feature schema

mod config;
mod encoder;
mod features;
mod pipeline;
pub mod outlier;
pub mod record;
mod scaler;
mod schema;

pub use config::PreprocessingConfig;
pub use encoder::{CategoryGroup, OneHotEncoder};
pub use features::{DerivedFeatures, AGE_SQUARED, KMS_PER_YEAR, VEHICLE_AGE};
pub use outlier::OutlierBounds;
pub use pipeline::{FeatureTransformer, FilterSummary, CATEGORICAL_COLUMNS, NUMERIC_FEATURES, SCALED_COLUMNS};
pub use record::{TrainingRecord, VehicleRecord};
pub use scaler::{ScalerParams, StandardScaler};
pub use schema::FeatureSchema;
