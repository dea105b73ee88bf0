//! Neural-network regressor backed by ONNX Runtime

use super::Regressor;
use crate::error::{ArtifactError, PredictError, Result};
use ndarray::ArrayView2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use std::fmt::Display;
use std::path::Path;
use tracing::debug;

/// Feed-forward network exported to ONNX, with a single regression output
pub struct OnnxNetwork {
    /// ONNX Runtime session
    session: Session,
    /// Input name for the model
    input_name: String,
    /// Output name for the prediction
    output_name: String,
    /// Width of the input tensor, when the graph fixes it
    n_features: Option<usize>,
}

impl OnnxNetwork {
    /// Load a network from an `.onnx` file
    pub fn load(path: &Path, onnx_threads: usize) -> Result<Self> {
        let invalid = |e: &dyn Display| {
            PredictError::invalid_artifact(path, ArtifactError::Onnx(e.to_string()))
        };

        let session = Session::builder()
            .map_err(|e| invalid(&e))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| invalid(&e))?
            .with_intra_threads(onnx_threads)
            .map_err(|e| invalid(&e))?
            .commit_from_file(path)
            .map_err(|e| invalid(&e))?;

        let input = session
            .inputs
            .first()
            .ok_or_else(|| {
                PredictError::invalid_artifact(path, ArtifactError::MissingGraphPort("inputs"))
            })?;
        let input_name = input.name.clone();

        // Symbolic dimensions are reported as -1; only a fixed last axis is usable.
        let n_features = input.input_type.tensor_shape().and_then(|shape| {
            let dims: Vec<i64> = shape.iter().copied().collect();
            match dims.as_slice() {
                [_, width] if *width > 0 => Some(*width as usize),
                _ => None,
            }
        });

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| {
                PredictError::invalid_artifact(path, ArtifactError::MissingGraphPort("outputs"))
            })?;

        debug!(
            path = %path.display(),
            input = %input_name,
            output = %output_name,
            n_features = ?n_features,
            threads = onnx_threads,
            "ONNX network loaded"
        );

        Ok(Self {
            session,
            input_name,
            output_name,
            n_features,
        })
    }
}

fn transform_error(e: impl Display) -> PredictError {
    PredictError::TransformError(e.to_string())
}

impl Regressor for OnnxNetwork {
    fn predict(&mut self, x: ArrayView2<'_, f64>) -> Result<Vec<f64>> {
        let n_rows = x.nrows();

        // Prepare input tensor - shape [n_rows, n_features]
        let shape = vec![n_rows as i64, x.ncols() as i64];
        let data: Vec<f32> = x.iter().map(|&v| v as f32).collect();
        let input_tensor = Tensor::from_array((shape, data)).map_err(transform_error)?;

        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => input_tensor])
            .map_err(transform_error)?;

        let output = outputs
            .get(self.output_name.as_str())
            .ok_or_else(|| transform_error(format!("missing output '{}'", self.output_name)))?;
        let (_, values) = output.try_extract_tensor::<f32>().map_err(transform_error)?;

        // Regression heads emit [n_rows, 1] or [n_rows]
        if values.len() != n_rows {
            return Err(transform_error(format!(
                "network produced {} values for {} rows",
                values.len(),
                n_rows
            )));
        }

        Ok(values.iter().map(|&v| v as f64).collect())
    }

    fn n_features(&self) -> Option<usize> {
        self.n_features
    }
}
