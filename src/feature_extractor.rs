//! Feature schema shared by the scalers and models.
//!
//! Requests name their features `WI, T1, H_Tcr, ...`, while the artifacts were
//! fitted on the column names of the training dataset. The two are related by
//! a fixed one-to-one table, checked at compile time.

use crate::error::{PredictError, Result};
use crate::types::features::FeatureVector;

/// Number of features every scaler and model expects
pub const FEATURE_COUNT: usize = 8;

/// (request column, artifact column), in the order the artifacts were fitted on
pub const FEATURE_COLUMNS: [(&str, &str); FEATURE_COUNT] = [
    ("WI", "IM-Arq"),
    ("T1", "T-Arq"),
    ("H_Tcr", "H/Tcr-Arq"),
    ("Ar", "Ar_Mean"),
    ("ALR_G", "ALR-G (%)"),
    ("AI", "IA"),
    ("Sa", "Sa"),
    ("Sv", "Sv"),
];

const fn str_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

const fn is_bijection(table: &[(&str, &str)]) -> bool {
    let mut i = 0;
    while i < table.len() {
        let mut j = i + 1;
        while j < table.len() {
            if str_eq(table[i].0, table[j].0) || str_eq(table[i].1, table[j].1) {
                return false;
            }
            j += 1;
        }
        i += 1;
    }
    true
}

const _: () = assert!(
    is_bijection(&FEATURE_COLUMNS),
    "feature column mapping must be one-to-one"
);

/// Turns feature vectors into rows laid out the way the artifacts expect.
pub struct FeatureExtractor;

impl FeatureExtractor {
    /// Create a new feature extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extract the features of a vector in artifact column order.
    pub fn extract(&self, features: &FeatureVector) -> [f64; FEATURE_COUNT] {
        [
            features.wi,
            features.t1,
            features.h_tcr,
            features.ar,
            features.alr_g,
            features.ai,
            features.sa,
            features.sv,
        ]
    }

    /// Get the number of features produced.
    pub fn feature_count(&self) -> usize {
        FEATURE_COUNT
    }

    /// Column names a batch table must carry, in order.
    pub fn input_columns(&self) -> [&'static str; FEATURE_COUNT] {
        FEATURE_COLUMNS.map(|(input, _)| input)
    }

    /// Column names the scalers and models were fitted on, in order.
    pub fn artifact_columns(&self) -> [&'static str; FEATURE_COUNT] {
        FEATURE_COLUMNS.map(|(_, artifact)| artifact)
    }

    /// Artifact column name for a request column name.
    pub fn to_artifact_name(&self, input: &str) -> Option<&'static str> {
        FEATURE_COLUMNS
            .iter()
            .find(|(name, _)| *name == input)
            .map(|(_, artifact)| *artifact)
    }

    /// Check that `columns` are exactly the request columns, in order.
    pub fn validate_columns(&self, columns: &[String]) -> Result<()> {
        let expected = self.input_columns();
        let matches = columns.len() == expected.len()
            && columns.iter().zip(expected.iter()).all(|(c, e)| c == e);

        if matches {
            Ok(())
        } else {
            Err(PredictError::SchemaMismatch {
                expected: expected.iter().map(|c| c.to_string()).collect(),
                found: columns.to_vec(),
            })
        }
    }

    /// Rename validated request columns to their artifact names.
    pub fn rename_columns(&self, columns: &[String]) -> Result<Vec<&'static str>> {
        self.validate_columns(columns)?;
        Ok(columns
            .iter()
            .filter_map(|c| self.to_artifact_name(c))
            .collect())
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}
