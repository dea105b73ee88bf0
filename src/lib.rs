//! Wall ML Prediction Library
//!
//! Predicts the peak floor acceleration (`PFA_max`) and roof drift ratio
//! (`rDR_max`) of structural wall buildings under ground motions, using
//! pretrained random-forest and neural-network regressors together with the
//! scalers they were trained with.

pub mod config;
pub mod dataset;
pub mod error;
pub mod feature_extractor;
pub mod models;
pub mod types;

pub use config::AppConfig;
pub use error::{ArtifactError, PredictError, Result};
pub use feature_extractor::FeatureExtractor;
pub use models::inference::Predictor;
pub use models::loader::ArtifactStore;
pub use types::{
    ArtifactKey, BatchPrediction, FeatureTable, FeatureVector, IndividualPrediction, ModelKind,
    OutputVariable,
};
