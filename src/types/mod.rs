//! Type definitions for wall response prediction

pub mod features;
pub mod key;
pub mod prediction;

pub use features::{FeatureTable, FeatureVector};
pub use key::{ArtifactKey, ModelKind, OutputVariable};
pub use prediction::{BatchPrediction, IndividualPrediction, PredictionColumn};
