//! Artifact store: locates and loads scalers and models by naming convention.
//!
//! Layout under the store root:
//!
//! ```text
//! Scalers/ScalerX_{variable}_{model}.json
//! Scalers/ScalerY_{variable}_{model}.json
//! {variable}/{variable}_{model}.{json|onnx}
//! ```

use super::forest::TreeEnsemble;
use super::network::OnnxNetwork;
use super::scaler::{Scaler, ScalerPair};
use super::Regressor;
use crate::error::{PredictError, Result};
use crate::types::key::{ArtifactKey, ModelKind};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read-only view of a directory of exported artifacts.
///
/// Nothing is cached; every load reads the file again.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    /// Directory containing `Scalers/` and one directory per output variable
    root: PathBuf,
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ArtifactStore {
    /// Create a store rooted at `root` with single-threaded ONNX inference
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self::with_threads(root, 1)
    }

    /// Create a store with the given number of ONNX intra-op threads
    pub fn with_threads<P: AsRef<Path>>(root: P, onnx_threads: usize) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            onnx_threads: onnx_threads.max(1),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn scaler_x_path(&self, key: ArtifactKey) -> PathBuf {
        self.root
            .join("Scalers")
            .join(format!("ScalerX_{}_{}.json", key.variable, key.model))
    }

    pub fn scaler_y_path(&self, key: ArtifactKey) -> PathBuf {
        self.root
            .join("Scalers")
            .join(format!("ScalerY_{}_{}.json", key.variable, key.model))
    }

    pub fn model_path(&self, key: ArtifactKey) -> PathBuf {
        self.root.join(key.variable.as_str()).join(format!(
            "{}_{}.{}",
            key.variable,
            key.model,
            key.model.extension()
        ))
    }

    /// Load the input and output scaler of `key`
    pub fn load_scalers(&self, key: ArtifactKey) -> Result<ScalerPair> {
        let input = self.load_scaler(key, &self.scaler_x_path(key))?;
        let output = self.load_scaler(key, &self.scaler_y_path(key))?;
        Ok(ScalerPair { input, output })
    }

    /// Load the model of `key` with the deserializer of its model kind
    pub fn load_model(&self, key: ArtifactKey) -> Result<Box<dyn Regressor>> {
        let path = self.model_path(key);
        require_file(key, &path)?;

        debug!(artifact = %key, path = %path.display(), "Loading model");

        match key.model {
            ModelKind::RandomForest => {
                let text = read_text(&path)?;
                let forest = TreeEnsemble::from_json(&text)
                    .map_err(|e| PredictError::invalid_artifact(&path, e))?;
                Ok(Box::new(forest))
            }
            ModelKind::NeuralNetwork => Ok(Box::new(OnnxNetwork::load(&path, self.onnx_threads)?)),
        }
    }

    fn load_scaler(&self, key: ArtifactKey, path: &Path) -> Result<Scaler> {
        require_file(key, path)?;

        debug!(artifact = %key, path = %path.display(), "Loading scaler");

        let text = read_text(path)?;
        let scaler: Scaler =
            serde_json::from_str(&text).map_err(|e| PredictError::invalid_artifact(path, e))?;
        scaler
            .validate()
            .map_err(|e| PredictError::invalid_artifact(path, e))?;
        Ok(scaler)
    }
}

fn require_file(key: ArtifactKey, path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(PredictError::ArtifactNotFound {
            key,
            path: path.to_path_buf(),
        })
    }
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| PredictError::invalid_artifact(path, e))
}
