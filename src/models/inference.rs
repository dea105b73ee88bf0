//! Prediction dispatcher for individual and batch requests

use crate::config::AppConfig;
use crate::error::{PredictError, Result};
use crate::feature_extractor::FeatureExtractor;
use crate::models::loader::ArtifactStore;
use crate::types::features::{FeatureTable, FeatureVector};
use crate::types::key::{artifact_keys, dedup, ArtifactKey, ModelKind, OutputVariable};
use crate::types::prediction::{BatchPrediction, IndividualPrediction, PredictionColumn};
use ndarray::{arr2, ArrayView2};
use std::time::Instant;
use tracing::{debug, info};

/// Runs the scaler/model/inverse-scaler chain for every requested
/// (variable, model) pair.
///
/// Artifacts are loaded on every call and dropped when it returns. A failure
/// for any pair aborts the whole call without a partial result.
pub struct Predictor {
    store: ArtifactStore,
    extractor: FeatureExtractor,
}

impl Predictor {
    /// Create a predictor reading artifacts from `store`
    pub fn new(store: ArtifactStore) -> Self {
        Self {
            store,
            extractor: FeatureExtractor::new(),
        }
    }

    /// Create a predictor from configuration
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(ArtifactStore::with_threads(
            &config.artifacts.models_dir,
            config.artifacts.onnx_threads,
        ))
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Predict every requested variable with every requested model for one
    /// feature vector.
    pub fn predict_individual(
        &self,
        features: &FeatureVector,
        variables: &[OutputVariable],
        models: &[ModelKind],
    ) -> Result<IndividualPrediction> {
        let keys = artifact_keys(variables, models)?;
        let start_time = Instant::now();

        let x = arr2(&[self.extractor.extract(features)]);
        let columns = self.extractor.artifact_columns();

        let mut prediction = IndividualPrediction::new(dedup(models), dedup(variables));
        for key in keys {
            let values = self.predict_pair(key, x.view(), &columns)?;
            prediction.insert(key, values[0]);
        }

        info!(
            pairs = prediction.len(),
            elapsed_us = start_time.elapsed().as_micros() as u64,
            "Individual prediction complete"
        );

        Ok(prediction)
    }

    /// Predict every requested variable with every requested model for each
    /// row of `table`. Output rows follow input rows.
    pub fn predict_batch(
        &self,
        table: &FeatureTable,
        variables: &[OutputVariable],
        models: &[ModelKind],
    ) -> Result<BatchPrediction> {
        let keys = artifact_keys(variables, models)?;
        let columns = self.extractor.rename_columns(table.columns())?;
        if table.is_empty() {
            return Err(PredictError::EmptyInput);
        }
        let start_time = Instant::now();

        let mut prediction = BatchPrediction::new(table.n_rows());
        for key in keys {
            let values = self.predict_pair(key, table.data().view(), &columns)?;
            prediction.push(PredictionColumn { key, values });
        }

        info!(
            rows = prediction.n_rows(),
            columns = prediction.columns().len(),
            elapsed_us = start_time.elapsed().as_micros() as u64,
            "Batch prediction complete"
        );

        Ok(prediction)
    }

    /// Load the artifacts of one pair and run them over `x`
    fn predict_pair(
        &self,
        key: ArtifactKey,
        x: ArrayView2<'_, f64>,
        columns: &[&str],
    ) -> Result<Vec<f64>> {
        let scalers = self.store.load_scalers(key)?;
        let mut model = self.store.load_model(key)?;

        scalers.input.check_feature_names(columns)?;
        let x_scaled = scalers.input.transform(x)?;

        if let Some(expected) = model.n_features() {
            if expected != x_scaled.ncols() {
                return Err(PredictError::TransformError(format!(
                    "{key} model expects {expected} features, got {}",
                    x_scaled.ncols()
                )));
            }
        }

        let prediction_scaled = model.predict(x_scaled.view())?;
        if prediction_scaled.len() != x.nrows() {
            return Err(PredictError::TransformError(format!(
                "{key} model returned {} predictions for {} rows",
                prediction_scaled.len(),
                x.nrows()
            )));
        }

        let prediction = scalers.output.inverse_transform_column(&prediction_scaled)?;

        debug!(artifact = %key, rows = prediction.len(), "Pair prediction complete");

        Ok(prediction)
    }
}
