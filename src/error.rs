//! Error types for artifact loading and prediction.

use crate::types::key::ArtifactKey;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised by the prediction dispatcher and its collaborators.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("Artifact not found for {key}: {}", path.display())]
    ArtifactNotFound { key: ArtifactKey, path: PathBuf },

    #[error("Invalid artifact {}: {source}", path.display())]
    InvalidArtifact {
        path: PathBuf,
        source: ArtifactError,
    },

    #[error("Feature table columns {found:?} do not match the required columns {expected:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Table has {columns} column names but {width} data columns")]
    ColumnCountMismatch { columns: usize, width: usize },

    #[error("Transform error: {0}")]
    TransformError(String),

    #[error("No {0} selected")]
    EmptySelection(&'static str),

    #[error("Feature table has no rows")]
    EmptyInput,

    #[error("Unknown output variable: {0}")]
    UnknownVariable(String),

    #[error("Unknown model kind: {0}")]
    UnknownModel(String),
}

/// Reasons an artifact file exists but cannot be used.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("ONNX Runtime: {0}")]
    Onnx(String),

    #[error("graph has no {0}")]
    MissingGraphPort(&'static str),

    #[error("scaler has no columns")]
    EmptyScaler,

    #[error("offset has {offset} entries but scale has {scale}")]
    ScalerLength { offset: usize, scale: usize },

    #[error("scaler parameters must be finite")]
    NonFiniteParameter,

    #[error("scale contains zero")]
    ZeroScale,

    #[error("{names} feature names for {columns} columns")]
    FeatureNameCount { names: usize, columns: usize },

    #[error("forest has no estimators")]
    NoEstimators,

    #[error("estimator {estimator}: tree has no nodes")]
    EmptyTree { estimator: usize },

    #[error("estimator {estimator}: node arrays have different lengths")]
    NodeArrayLength { estimator: usize },

    #[error("estimator {estimator}: node {node} has invalid children ({left}, {right})")]
    InvalidChildren {
        estimator: usize,
        node: usize,
        left: i64,
        right: i64,
    },

    #[error("estimator {estimator}: node {node} splits on unknown feature {feature}")]
    UnknownFeature {
        estimator: usize,
        node: usize,
        feature: i64,
    },
}

/// Result type for prediction operations.
pub type Result<T> = std::result::Result<T, PredictError>;

impl PredictError {
    pub(crate) fn invalid_artifact(path: &Path, source: impl Into<ArtifactError>) -> Self {
        PredictError::InvalidArtifact {
            path: path.to_path_buf(),
            source: source.into(),
        }
    }
}
