//! Output variables, model kinds and the artifact keys built from them

use crate::error::PredictError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Response quantity predicted by the models
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OutputVariable {
    /// Peak floor acceleration
    #[serde(rename = "PFA_max")]
    PfaMax,
    /// Roof drift ratio
    #[serde(rename = "rDR_max")]
    RdrMax,
}

impl OutputVariable {
    /// Every supported output variable, in default prediction order
    pub const ALL: [OutputVariable; 2] = [OutputVariable::PfaMax, OutputVariable::RdrMax];

    /// Name used in artifact paths and result columns
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputVariable::PfaMax => "PFA_max",
            OutputVariable::RdrMax => "rDR_max",
        }
    }
}

impl fmt::Display for OutputVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputVariable {
    type Err = PredictError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OutputVariable::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| PredictError::UnknownVariable(s.to_string()))
    }
}

/// Regressor family used for a prediction
///
/// Each kind has its own on-disk representation: tree ensembles are exported
/// as JSON node arrays, neural networks as ONNX graphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    /// Random forest (tree ensemble)
    #[serde(rename = "RF")]
    RandomForest,
    /// Artificial neural network
    #[serde(rename = "ANN")]
    NeuralNetwork,
}

impl ModelKind {
    /// Every supported model kind, in default prediction order
    pub const ALL: [ModelKind; 2] = [ModelKind::RandomForest, ModelKind::NeuralNetwork];

    /// Short name used in artifact paths and result labels
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::RandomForest => "RF",
            ModelKind::NeuralNetwork => "ANN",
        }
    }

    /// File extension of the model artifact
    pub fn extension(&self) -> &'static str {
        match self {
            ModelKind::RandomForest => "json",
            ModelKind::NeuralNetwork => "onnx",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = PredictError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelKind::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| PredictError::UnknownModel(s.to_string()))
    }
}

/// Identifies the scaler pair and model belonging to one (variable, model) combination
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArtifactKey {
    pub variable: OutputVariable,
    pub model: ModelKind,
}

impl ArtifactKey {
    pub fn new(variable: OutputVariable, model: ModelKind) -> Self {
        Self { variable, model }
    }

    /// Result column name used in batch mode, e.g. `PFA_max - RF`
    pub fn column_name(&self) -> String {
        format!("{} - {}", self.variable, self.model)
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.variable, self.model)
    }
}

/// Expand variable and model selections into artifact keys, variables outer
/// and models inner. Duplicates keep their first position.
pub fn artifact_keys(
    variables: &[OutputVariable],
    models: &[ModelKind],
) -> Result<Vec<ArtifactKey>, PredictError> {
    let variables = dedup(variables);
    let models = dedup(models);

    if variables.is_empty() {
        return Err(PredictError::EmptySelection("output variables"));
    }
    if models.is_empty() {
        return Err(PredictError::EmptySelection("models"));
    }

    Ok(variables
        .iter()
        .flat_map(|&variable| models.iter().map(move |&model| ArtifactKey::new(variable, model)))
        .collect())
}

pub(crate) fn dedup<T: Copy + PartialEq>(items: &[T]) -> Vec<T> {
    let mut unique = Vec::with_capacity(items.len());
    for &item in items {
        if !unique.contains(&item) {
            unique.push(item);
        }
    }
    unique
}
