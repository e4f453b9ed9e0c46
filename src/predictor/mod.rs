//! Price predictor service
//!
//! Owns the live model. The fitted model and its transformer are published
//! together as one immutable [`ModelSnapshot`]; readers clone the `Arc` and
//! score without holding the lock, and a retrain swaps in a whole new snapshot.

mod config;

pub use config::{PredictorConfig, DEFAULT_MODELS_DIR, MODEL_FILE_NAME, SCALER_FILE_NAME};

use crate::error::{PredictorError, Result};
use crate::persistence::ArtifactStore;
use crate::preprocessing::{FeatureSchema, FeatureTransformer, TrainingRecord, VehicleRecord};
use crate::training::{FeatureImportance, FittedModel, ModelTrainer, TrainingMetrics};
use crate::utils::DataLoader;
use chrono::{Local, NaiveDate};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Everything needed to score a record, fixed at training time
#[derive(Debug)]
pub struct ModelSnapshot {
    model: FittedModel,
    transformer: FeatureTransformer,
}

impl ModelSnapshot {
    pub fn new(model: FittedModel, transformer: FeatureTransformer) -> Result<Self> {
        if transformer.feature_names() != model.feature_names {
            return Err(PredictorError::ShapeError {
                expected: format!("{:?}", model.feature_names),
                actual: format!("{:?}", transformer.feature_names()),
            });
        }
        Ok(Self { model, transformer })
    }

    pub fn model(&self) -> &FittedModel {
        &self.model
    }

    pub fn transformer(&self) -> &FeatureTransformer {
        &self.transformer
    }

    pub fn schema(&self) -> Result<&FeatureSchema> {
        self.transformer.schema()
    }

    /// Transform and score one record
    pub fn predict_at(&self, record: &VehicleRecord, reference_date: NaiveDate) -> Result<f64> {
        let features = self.transformer.transform(record, reference_date)?;
        self.model.predict_one(&features)
    }
}

/// Whether a model is available
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictorStatus {
    pub trained: bool,
}

/// Result of a training request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainOutcome {
    pub metrics: TrainingMetrics,
    /// Set when the new model is live but could not be written to disk
    pub persistence_warning: Option<String>,
}

/// Description of the live model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub algorithm: String,
    pub n_features: usize,
    pub feature_names: Vec<String>,
    pub metrics: TrainingMetrics,
    pub trained: bool,
}

/// Facade used by the calling layer
pub struct PricePredictor {
    config: PredictorConfig,
    store: ArtifactStore,
    current: RwLock<Option<Arc<ModelSnapshot>>>,
}

impl PricePredictor {
    /// Build a predictor, restoring a previously saved model when one exists.
    ///
    /// Anything wrong with the saved artifacts leaves the predictor untrained.
    pub fn new(config: PredictorConfig) -> Self {
        let store = ArtifactStore::new(config.model_path.clone(), config.scaler_path.clone());

        let restored = match store.load() {
            Ok(Some((model, transformer))) => match ModelSnapshot::new(model, transformer) {
                Ok(snapshot) => Some(Arc::new(snapshot)),
                Err(e) => {
                    warn!(error = %e, "Saved model is inconsistent; starting untrained");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Failed to load saved model; starting untrained");
                None
            }
        };

        Self {
            config,
            store,
            current: RwLock::new(restored),
        }
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    /// The live snapshot, if any
    pub fn snapshot(&self) -> Option<Arc<ModelSnapshot>> {
        self.current.read().clone()
    }

    pub fn status(&self) -> PredictorStatus {
        PredictorStatus {
            trained: self.current.read().is_some(),
        }
    }

    pub fn is_trained(&self) -> bool {
        self.status().trained
    }

    /// Train on a CSV file using today's date for vehicle ages
    pub fn train(&self, csv_path: impl AsRef<Path>) -> Result<TrainOutcome> {
        self.train_at(csv_path, today())
    }

    /// Train on a CSV file with an explicit reference date.
    ///
    /// The previous model stays live unless a new one is fully built.
    pub fn train_at(&self, csv_path: impl AsRef<Path>, reference_date: NaiveDate) -> Result<TrainOutcome> {
        let start = Instant::now();
        let records = DataLoader::new().load_training_records(csv_path.as_ref())?;
        self.train_records(&records, reference_date).map(|outcome| {
            info!(
                secs = start.elapsed().as_secs_f64(),
                r2 = outcome.metrics.r2_score,
                "Training finished"
            );
            outcome
        })
    }

    /// Train on already-loaded rows
    pub fn train_records(
        &self,
        records: &[TrainingRecord],
        reference_date: NaiveDate,
    ) -> Result<TrainOutcome> {
        let mut transformer = FeatureTransformer::new(self.config.preprocessing.clone());
        let (x, y) = transformer.fit_transform(records, reference_date)?;

        let trainer = ModelTrainer::new(self.config.training.clone());
        let model = trainer.train(&x, &y, transformer.feature_names())?;
        let metrics = model.metrics.clone();
        let snapshot = Arc::new(ModelSnapshot::new(model, transformer)?);

        let persistence_warning = match self.store.save(&snapshot.model, &snapshot.transformer) {
            Ok(()) => None,
            Err(e) => {
                warn!(error = %e, "Model trained but could not be saved");
                Some(format!("model trained but not saved: {}", e))
            }
        };

        *self.current.write() = Some(snapshot);

        Ok(TrainOutcome {
            metrics,
            persistence_warning,
        })
    }

    /// Score a record using today's date
    pub fn predict(&self, record: &VehicleRecord) -> Result<f64> {
        self.predict_at(record, today())
    }

    /// Score a record against an explicit reference date
    pub fn predict_at(&self, record: &VehicleRecord, reference_date: NaiveDate) -> Result<f64> {
        let snapshot = self.snapshot().ok_or(PredictorError::ModelNotFitted)?;
        snapshot.predict_at(record, reference_date)
    }

    /// Held-out R² of the live model, or 0 when untrained
    pub fn confidence(&self) -> f64 {
        self.snapshot()
            .map(|s| s.model.metrics.r2_score)
            .unwrap_or(0.0)
    }

    pub fn model_info(&self) -> Option<ModelInfo> {
        self.snapshot().map(|s| ModelInfo {
            algorithm: s.model.algorithm.clone(),
            n_features: s.model.n_features(),
            feature_names: s.model.feature_names.clone(),
            metrics: s.model.metrics.clone(),
            trained: true,
        })
    }

    /// Feature importances of the live model, highest first
    pub fn feature_importance(&self) -> Option<Vec<FeatureImportance>> {
        self.snapshot().map(|s| s.model.feature_importance())
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
