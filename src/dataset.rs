//! CSV input and output for batch prediction

use crate::types::features::FeatureTable;
use crate::types::prediction::BatchPrediction;
use anyhow::{bail, Context, Result};
use ndarray::Array2;
use std::io::{Read, Write};
use std::path::Path;

/// Read a feature table from a CSV file.
///
/// Header names are kept verbatim; schema validation happens at prediction
/// time.
pub fn read_feature_table(path: &Path) -> Result<FeatureTable> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening feature table {}", path.display()))?;
    read_feature_table_from(file).with_context(|| format!("reading {}", path.display()))
}

/// Read a feature table from any CSV reader
pub fn read_feature_table_from<R: Read>(reader: R) -> Result<FeatureTable> {
    // Only cells are trimmed; a padded header must still fail the schema check.
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::Fields)
        .from_reader(reader);

    let columns: Vec<String> = rdr
        .headers()
        .context("reading CSV header")?
        .iter()
        .map(|h| h.to_string())
        .collect();
    if columns.is_empty() {
        bail!("CSV has no columns");
    }

    let mut values = Vec::new();
    let mut n_rows = 0;
    for (i, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("reading CSV row {}", i + 1))?;
        if record.len() != columns.len() {
            bail!(
                "Row {}: expected {} fields, found {}",
                i + 1,
                columns.len(),
                record.len()
            );
        }
        for (field, column) in record.iter().zip(&columns) {
            let value: f64 = field
                .parse()
                .with_context(|| format!("Row {}, column '{column}': '{field}' is not a number", i + 1))?;
            values.push(value);
        }
        n_rows += 1;
    }

    let data = Array2::from_shape_vec((n_rows, columns.len()), values)
        .context("assembling feature matrix")?;
    Ok(FeatureTable::new(columns, data)?)
}

/// Write batch predictions as CSV, one row per input row
pub fn write_predictions<W: Write>(writer: W, prediction: &BatchPrediction) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(prediction.column_names())
        .context("writing CSV header")?;

    for i in 0..prediction.n_rows() {
        let row = prediction.row(i).unwrap_or_default();
        wtr.write_record(row.iter().map(|v| v.to_string()))
            .with_context(|| format!("writing CSV row {}", i + 1))?;
    }

    wtr.flush().context("flushing CSV output")?;
    Ok(())
}
