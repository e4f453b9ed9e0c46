//! Car Price Predictor - Used vehicle resale price estimation
//!
//! This crate trains a gradient-boosted regression model on historical
//! listings and scores individual vehicles against it.
//!
//! # Modules
//!
//! - [`preprocessing`] - Derived features, filtering, scaling, encoding and the feature schema
//! - [`training`] - Regression trees, gradient boosting, cross-validated grid search
//! - [`persistence`] - Paired model and transformer artifacts on disk
//! - [`predictor`] - The service facade holding the live model
//! - [`utils`] - CSV loading
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Core ML modules
pub mod preprocessing;
pub mod training;

// Services
pub mod persistence;
pub mod predictor;
pub mod cli;

// Utilities
pub mod utils;

pub use error::{PredictorError, Result};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{PredictorError, Result};
    pub use crate::persistence::ArtifactStore;
    pub use crate::predictor::{ModelInfo, PredictorConfig, PricePredictor, TrainOutcome};
    pub use crate::preprocessing::{FeatureSchema, FeatureTransformer, PreprocessingConfig, TrainingRecord, VehicleRecord};
    pub use crate::training::{FittedModel, ModelTrainer, ParamGrid, TrainingConfig, TrainingMetrics};
    pub use crate::utils::DataLoader;
}
