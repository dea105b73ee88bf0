//! Prediction results for individual and batch mode

use crate::types::key::{ArtifactKey, ModelKind, OutputVariable};
use std::collections::HashMap;
use std::fmt;

/// Result of an individual prediction: one value per (model, variable),
/// laid out with model kinds as rows and output variables as columns.
#[derive(Debug, Clone, PartialEq)]
pub struct IndividualPrediction {
    models: Vec<ModelKind>,
    variables: Vec<OutputVariable>,
    values: HashMap<ArtifactKey, f64>,
}

impl IndividualPrediction {
    pub(crate) fn new(models: Vec<ModelKind>, variables: Vec<OutputVariable>) -> Self {
        let capacity = models.len() * variables.len();
        Self {
            models,
            variables,
            values: HashMap::with_capacity(capacity),
        }
    }

    pub(crate) fn insert(&mut self, key: ArtifactKey, value: f64) {
        self.values.insert(key, value);
    }

    /// Row labels
    pub fn models(&self) -> &[ModelKind] {
        &self.models
    }

    /// Column labels
    pub fn variables(&self) -> &[OutputVariable] {
        &self.variables
    }

    /// Predicted value for one model and variable
    pub fn get(&self, model: ModelKind, variable: OutputVariable) -> Option<f64> {
        self.values.get(&ArtifactKey::new(variable, model)).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over entries, variables outer and models inner
    pub fn iter(&self) -> impl Iterator<Item = (ArtifactKey, f64)> + '_ {
        self.variables.iter().flat_map(move |&variable| {
            self.models.iter().filter_map(move |&model| {
                let key = ArtifactKey::new(variable, model);
                self.values.get(&key).map(|&value| (key, value))
            })
        })
    }
}

impl fmt::Display for IndividualPrediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<6}", "")?;
        for variable in &self.variables {
            write!(f, " {:>14}", variable.as_str())?;
        }
        writeln!(f)?;

        for &model in &self.models {
            write!(f, "{:<6}", model.as_str())?;
            for &variable in &self.variables {
                match self.get(model, variable) {
                    Some(value) => write!(f, " {:>14.6}", value)?,
                    None => write!(f, " {:>14}", "NaN")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// One prediction column of a batch result
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionColumn {
    pub key: ArtifactKey,
    pub values: Vec<f64>,
}

impl PredictionColumn {
    /// Column header, e.g. `rDR_max - ANN`
    pub fn name(&self) -> String {
        self.key.column_name()
    }
}

/// Result of a batch prediction: one row per input row, one column per
/// requested (variable, model) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchPrediction {
    n_rows: usize,
    columns: Vec<PredictionColumn>,
}

impl BatchPrediction {
    pub(crate) fn new(n_rows: usize) -> Self {
        Self {
            n_rows,
            columns: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, column: PredictionColumn) {
        debug_assert_eq!(column.values.len(), self.n_rows);
        self.columns.push(column);
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn columns(&self) -> &[PredictionColumn] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(PredictionColumn::name).collect()
    }

    /// Predicted values of one (variable, model) pair, in input row order
    pub fn column(&self, variable: OutputVariable, model: ModelKind) -> Option<&[f64]> {
        let key = ArtifactKey::new(variable, model);
        self.columns
            .iter()
            .find(|c| c.key == key)
            .map(|c| c.values.as_slice())
    }

    /// All predictions for one input row, in column order
    pub fn row(&self, index: usize) -> Option<Vec<f64>> {
        if index >= self.n_rows {
            return None;
        }
        Some(self.columns.iter().map(|c| c.values[index]).collect())
    }
}
