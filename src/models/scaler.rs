//! Fitted per-column scalers applied around model inference

use crate::error::{ArtifactError, PredictError, Result};
use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

/// A fitted, invertible column-wise transform.
///
/// Parameters follow the fitted attributes of the scikit-learn scalers the
/// artifacts are exported from (`mean_`/`scale_` and `min_`/`scale_`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Scaler {
    /// `(x - mean) / scale`
    Standard {
        mean: Vec<f64>,
        scale: Vec<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        feature_names_in: Option<Vec<String>>,
    },
    /// `x * scale + min`
    MinMax {
        min: Vec<f64>,
        scale: Vec<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        feature_names_in: Option<Vec<String>>,
    },
}

impl Scaler {
    /// Number of columns the scaler was fitted on
    pub fn n_features(&self) -> usize {
        self.scale().len()
    }

    /// Column names seen at fit time, when the export recorded them
    pub fn feature_names(&self) -> Option<&[String]> {
        match self {
            Scaler::Standard { feature_names_in, .. } | Scaler::MinMax { feature_names_in, .. } => {
                feature_names_in.as_deref()
            }
        }
    }

    fn offset(&self) -> &[f64] {
        match self {
            Scaler::Standard { mean, .. } => mean,
            Scaler::MinMax { min, .. } => min,
        }
    }

    fn scale(&self) -> &[f64] {
        match self {
            Scaler::Standard { scale, .. } | Scaler::MinMax { scale, .. } => scale,
        }
    }

    /// Structural checks run once after deserialization
    pub fn validate(&self) -> std::result::Result<(), ArtifactError> {
        let (offset, scale) = (self.offset(), self.scale());

        if scale.is_empty() {
            return Err(ArtifactError::EmptyScaler);
        }
        if offset.len() != scale.len() {
            return Err(ArtifactError::ScalerLength {
                offset: offset.len(),
                scale: scale.len(),
            });
        }
        if offset.iter().chain(scale).any(|v| !v.is_finite()) {
            return Err(ArtifactError::NonFiniteParameter);
        }
        if scale.iter().any(|&s| s == 0.0) {
            return Err(ArtifactError::ZeroScale);
        }
        if let Some(names) = self.feature_names() {
            if names.len() != scale.len() {
                return Err(ArtifactError::FeatureNameCount {
                    names: names.len(),
                    columns: scale.len(),
                });
            }
        }
        Ok(())
    }

    /// Check the recorded fit-time column names, if any, against `columns`
    pub fn check_feature_names(&self, columns: &[&str]) -> Result<()> {
        match self.feature_names() {
            Some(names) if names.iter().map(String::as_str).ne(columns.iter().copied()) => {
                Err(PredictError::TransformError(format!(
                    "feature names {:?} do not match the names seen at fit time {:?}",
                    columns, names
                )))
            }
            _ => Ok(()),
        }
    }

    /// Scale raw values
    pub fn transform(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        self.check_input(x)?;
        let (offset, scale) = (self.offset(), self.scale());
        let standard = matches!(self, Scaler::Standard { .. });

        let mut out = x.to_owned();
        for mut row in out.rows_mut() {
            for ((v, &o), &s) in row.iter_mut().zip(offset).zip(scale) {
                *v = if standard { (*v - o) / s } else { *v * s + o };
            }
        }
        Ok(out)
    }

    /// Recover raw values from scaled ones
    pub fn inverse_transform(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        self.check_input(x)?;
        let (offset, scale) = (self.offset(), self.scale());
        let standard = matches!(self, Scaler::Standard { .. });

        let mut out = x.to_owned();
        for mut row in out.rows_mut() {
            for ((v, &o), &s) in row.iter_mut().zip(offset).zip(scale) {
                *v = if standard { *v * s + o } else { (*v - o) / s };
            }
        }
        Ok(out)
    }

    /// Inverse-transform a single model output column
    pub fn inverse_transform_column(&self, values: &[f64]) -> Result<Vec<f64>> {
        let column = ArrayView2::from_shape((values.len(), 1), values)
            .map_err(|e| PredictError::TransformError(e.to_string()))?;
        Ok(self.inverse_transform(column)?.into_iter().collect())
    }

    fn check_input(&self, x: ArrayView2<'_, f64>) -> Result<()> {
        if x.ncols() != self.n_features() {
            return Err(PredictError::TransformError(format!(
                "input has {} columns but the scaler was fitted on {}",
                x.ncols(),
                self.n_features()
            )));
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(PredictError::TransformError(
                "input contains NaN or infinity".to_string(),
            ));
        }
        Ok(())
    }
}

/// Input and output scaler belonging to one artifact key
#[derive(Debug, Clone, PartialEq)]
pub struct ScalerPair {
    pub input: Scaler,
    pub output: Scaler,
}
