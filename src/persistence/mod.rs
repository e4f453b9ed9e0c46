//! On-disk storage for the fitted model and its feature transformer
//!
//! The two halves are written as separate JSON artifacts and only ever loaded
//! together. Both carry the run id of the training run that produced them, so a
//! pair left behind by an interrupted save is detected and ignored.

use crate::error::{PredictorError, Result};
use crate::preprocessing::FeatureTransformer;
use crate::training::FittedModel;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Bumped when the artifact layout changes incompatibly
pub const FORMAT_VERSION: u32 = 1;

/// Wrapper written around each persisted half
#[derive(Debug, Serialize, Deserialize)]
struct Artifact<T> {
    format_version: u32,
    run_id: Uuid,
    saved_at: DateTime<Utc>,
    payload: T,
}

/// Reads and writes the model/transformer pair at fixed paths
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    model_path: PathBuf,
    scaler_path: PathBuf,
}

impl ArtifactStore {
    pub fn new(model_path: impl Into<PathBuf>, scaler_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            scaler_path: scaler_path.into(),
        }
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn scaler_path(&self) -> &Path {
        &self.scaler_path
    }

    /// Persist both artifacts, each through a temporary sibling and a rename.
    pub fn save(&self, model: &FittedModel, transformer: &FeatureTransformer) -> Result<()> {
        if !transformer.is_fitted() {
            return Err(PredictorError::PersistenceError(
                "refusing to save an unfitted feature transformer".to_string(),
            ));
        }

        let saved_at = Utc::now();
        let scaler_json = serde_json::to_string_pretty(&Artifact {
            format_version: FORMAT_VERSION,
            run_id: model.run_id,
            saved_at,
            payload: transformer,
        })?;
        let model_json = serde_json::to_string_pretty(&Artifact {
            format_version: FORMAT_VERSION,
            run_id: model.run_id,
            saved_at,
            payload: model,
        })?;

        write_atomic(&self.scaler_path, scaler_json.as_bytes())?;
        write_atomic(&self.model_path, model_json.as_bytes())?;

        info!(
            run_id = %model.run_id,
            model = %self.model_path.display(),
            scaler = %self.scaler_path.display(),
            "Saved model artifacts"
        );
        Ok(())
    }

    /// Load the pair if a complete, matching one exists.
    ///
    /// Missing, partial, corrupt or mismatched artifacts are logged and yield
    /// `Ok(None)`.
    pub fn load(&self) -> Result<Option<(FittedModel, FeatureTransformer)>> {
        let model_exists = self.model_path.exists();
        let scaler_exists = self.scaler_path.exists();

        match (model_exists, scaler_exists) {
            (false, false) => {
                debug!(model = %self.model_path.display(), "No saved model found");
                return Ok(None);
            }
            (true, false) | (false, true) => {
                warn!(
                    model_exists,
                    scaler_exists,
                    "Only one of the model artifacts exists; starting untrained"
                );
                return Ok(None);
            }
            (true, true) => {}
        }

        let Some(model) = read_artifact::<FittedModel>(&self.model_path) else {
            return Ok(None);
        };
        let Some(transformer) = read_artifact::<FeatureTransformer>(&self.scaler_path) else {
            return Ok(None);
        };

        if model.run_id != transformer.run_id || model.run_id != model.payload.run_id {
            warn!(
                model_run = %model.run_id,
                scaler_run = %transformer.run_id,
                "Model artifacts come from different training runs; starting untrained"
            );
            return Ok(None);
        }
        if !transformer.payload.is_fitted()
            || transformer.payload.feature_names() != model.payload.feature_names
        {
            warn!("Saved transformer does not match the saved model schema; starting untrained");
            return Ok(None);
        }

        info!(
            run_id = %model.run_id,
            saved_at = %model.saved_at,
            "Loaded model artifacts"
        );
        Ok(Some((model.payload, transformer.payload)))
    }
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> Option<Artifact<T>> {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not read model artifact");
            return None;
        }
    };
    match serde_json::from_str::<Artifact<T>>(&json) {
        Ok(artifact) if artifact.format_version == FORMAT_VERSION => Some(artifact),
        Ok(artifact) => {
            warn!(
                path = %path.display(),
                found = artifact.format_version,
                expected = FORMAT_VERSION,
                "Unsupported artifact format version"
            );
            None
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Corrupt model artifact");
            None
        }
    }
}

/// Sibling path used while writing `path`
pub(crate) fn temp_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.file_name().map(|n| n.to_owned()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let temp = temp_path(path);
    let written = File::create(&temp).and_then(|mut file| {
        file.write_all(bytes)?;
        file.sync_all()
    });
    if let Err(e) = written.and_then(|_| fs::rename(&temp, path)) {
        let _ = fs::remove_file(&temp);
        return Err(PredictorError::PersistenceError(format!(
            "failed to write {}: {}",
            path.display(),
            e
        )));
    }
    Ok(())
}
