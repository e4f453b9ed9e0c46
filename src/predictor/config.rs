//! Predictor configuration

use crate::error::{PredictorError, Result};
use crate::preprocessing::PreprocessingConfig;
use crate::training::TrainingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_MODELS_DIR: &str = "models";
pub const MODEL_FILE_NAME: &str = "car_price_model.json";
pub const SCALER_FILE_NAME: &str = "scaler.json";

/// Where artifacts live and how training runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    /// Path of the fitted model artifact
    pub model_path: PathBuf,
    /// Path of the fitted feature transformer artifact
    pub scaler_path: PathBuf,
    pub preprocessing: PreprocessingConfig,
    pub training: TrainingConfig,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        let models_dir = std::env::var("MODELS_DIR").unwrap_or_else(|_| DEFAULT_MODELS_DIR.to_string());
        let models_dir = PathBuf::from(models_dir);
        Self {
            model_path: std::env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| models_dir.join(MODEL_FILE_NAME)),
            scaler_path: std::env::var("SCALER_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| models_dir.join(SCALER_FILE_NAME)),
            preprocessing: PreprocessingConfig::default(),
            training: TrainingConfig::default(),
        }
    }
}

impl PredictorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place both artifacts under `dir` with their default file names
    pub fn with_models_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.model_path = dir.as_ref().join(MODEL_FILE_NAME);
        self.scaler_path = dir.as_ref().join(SCALER_FILE_NAME);
        self
    }

    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }

    pub fn with_scaler_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.scaler_path = path.into();
        self
    }

    pub fn with_preprocessing(mut self, config: PreprocessingConfig) -> Self {
        self.preprocessing = config;
        self
    }

    pub fn with_training(mut self, config: TrainingConfig) -> Self {
        self.training = config;
        self
    }

    /// Load a JSON configuration file; absent fields take their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            PredictorError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&json).map_err(|e| {
            PredictorError::ConfigError(format!("invalid config {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.model_path == self.scaler_path {
            return Err(PredictorError::ConfigError(
                "model and scaler artifacts must use different paths".to_string(),
            ));
        }
        self.preprocessing.validate()?;
        self.training.validate()
    }
}
