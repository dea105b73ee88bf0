//! Feature vectors describing a structural wall system and a ground motion

use crate::error::{PredictError, Result};
use crate::feature_extractor::{FeatureExtractor, FEATURE_COUNT};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// One prediction request: building descriptors plus ground-motion intensity measures
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Wall index
    #[serde(rename = "WI")]
    pub wi: f64,

    /// Fundamental period
    #[serde(rename = "T1")]
    pub t1: f64,

    /// Stiffness index
    #[serde(rename = "H_Tcr")]
    pub h_tcr: f64,

    /// Mean wall aspect ratio
    #[serde(rename = "Ar")]
    pub ar: f64,

    /// Average axial load ratio for gravity loads (%)
    #[serde(rename = "ALR_G")]
    pub alr_g: f64,

    /// Arias intensity
    #[serde(rename = "AI")]
    pub ai: f64,

    /// Spectral acceleration
    #[serde(rename = "Sa")]
    pub sa: f64,

    /// Spectral velocity
    #[serde(rename = "Sv")]
    pub sv: f64,
}

impl FeatureVector {
    #[allow(clippy::too_many_arguments)]
    pub fn new(wi: f64, t1: f64, h_tcr: f64, ar: f64, alr_g: f64, ai: f64, sa: f64, sv: f64) -> Self {
        Self {
            wi,
            t1,
            h_tcr,
            ar,
            alr_g,
            ai,
            sa,
            sv,
        }
    }
}

/// Rows of features under named columns.
///
/// Built without checking the column names so that a malformed table can be
/// handed to batch prediction, which rejects it before loading any artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    columns: Vec<String>,
    data: Array2<f64>,
}

impl FeatureTable {
    /// Create a table from column names and an `n_rows x n_columns` matrix
    pub fn new(columns: Vec<String>, data: Array2<f64>) -> Result<Self> {
        if columns.len() != data.ncols() {
            return Err(PredictError::ColumnCountMismatch {
                columns: columns.len(),
                width: data.ncols(),
            });
        }
        Ok(Self { columns, data })
    }

    /// Create a table with the canonical input columns, one row per vector
    pub fn from_vectors(vectors: &[FeatureVector]) -> Self {
        let extractor = FeatureExtractor::new();
        let mut data = Array2::zeros((vectors.len(), FEATURE_COUNT));
        for (mut row, vector) in data.rows_mut().into_iter().zip(vectors) {
            for (cell, value) in row.iter_mut().zip(extractor.extract(vector)) {
                *cell = value;
            }
        }

        Self {
            columns: extractor
                .input_columns()
                .iter()
                .map(|c| c.to_string())
                .collect(),
            data,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    pub fn n_rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }
}
