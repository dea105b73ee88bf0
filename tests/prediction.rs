//! End-to-end prediction against a fixture artifact store.
//!
//! Fixture values are chosen so every prediction is an exact binary fraction.

use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use wall_ml_prediction::models::{OnnxNetwork, Regressor};
use wall_ml_prediction::{
    dataset, ArtifactKey, ArtifactStore, FeatureTable, FeatureVector, ModelKind, OutputVariable,
    PredictError, Predictor,
};

/// `Y = X · W + B` with `W = [0, 0, 0.5, 0.25, 1, 0, 0.25, 0]`, `B = 0.25`
const PFA_MAX_ANN: &[u8] = include_bytes!("fixtures/PFA_max/PFA_max_ANN.onnx");

const ARTIFACT_COLUMNS: [&str; 8] = [
    "IM-Arq", "T-Arq", "H/Tcr-Arq", "Ar_Mean", "ALR-G (%)", "IA", "Sa", "Sv",
];

fn write_json(path: &Path, value: &Value) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn input_scaler() -> Value {
    json!({
        "type": "standard",
        "mean": [1.0, 1.0, 2.0, 1.0, 4.0, 0.0, 0.5, 0.2],
        "scale": [0.5, 0.5, 1.0, 0.5, 2.0, 0.01, 0.2, 0.1],
        "feature_names_in": ARTIFACT_COLUMNS,
    })
}

/// A tree splitting on one scaled feature at `threshold`
fn stump(feature: i64, threshold: f64, left: f64, right: f64) -> Value {
    json!({
        "children_left": [1, -1, -1],
        "children_right": [2, -1, -1],
        "feature": [feature, -2, -2],
        "threshold": [threshold, -2.0, -2.0],
        "value": [0.0, left, right],
    })
}

/// Writes RF artifacts for both output variables.
///
/// PFA_max: mean of a stump on Sa (-1 / 1) and a stump on WI (0 / 0.5),
/// inverse-scaled by `y * 0.25 + 0.5`.
/// rDR_max: a stump on T1 (0.5 / 1.5), inverse-scaled by `(y + 1) / 2`.
///
/// PFA_max also has an ANN (see `tests/fixtures/README.md`), inverse-scaled
/// by `y * 0.25 + 0.5`. rDR_max has no ANN artifacts.
fn fixture_store() -> TempDir {
    let dir = TempDir::new().unwrap();
    let store = ArtifactStore::new(dir.path());

    let pfa = ArtifactKey::new(OutputVariable::PfaMax, ModelKind::RandomForest);
    write_json(&store.scaler_x_path(pfa), &input_scaler());
    write_json(
        &store.scaler_y_path(pfa),
        &json!({"type": "standard", "mean": [0.5], "scale": [0.25]}),
    );
    write_json(
        &store.model_path(pfa),
        &json!({
            "n_features_in": 8,
            "estimators": [stump(6, 1.0, -1.0, 1.0), stump(0, 0.0, 0.0, 0.5)],
        }),
    );

    let rdr = ArtifactKey::new(OutputVariable::RdrMax, ModelKind::RandomForest);
    write_json(&store.scaler_x_path(rdr), &input_scaler());
    write_json(
        &store.scaler_y_path(rdr),
        &json!({"type": "min_max", "min": [-1.0], "scale": [2.0]}),
    );
    write_json(
        &store.model_path(rdr),
        &json!({"n_features_in": 8, "estimators": [stump(1, 0.0, 0.5, 1.5)]}),
    );

    let pfa_ann = ArtifactKey::new(OutputVariable::PfaMax, ModelKind::NeuralNetwork);
    write_json(&store.scaler_x_path(pfa_ann), &input_scaler());
    write_json(
        &store.scaler_y_path(pfa_ann),
        &json!({"type": "standard", "mean": [0.5], "scale": [0.25]}),
    );
    let network_path = store.model_path(pfa_ann);
    fs::create_dir_all(network_path.parent().unwrap()).unwrap();
    fs::write(&network_path, PFA_MAX_ANN).unwrap();

    dir
}

fn sample() -> FeatureVector {
    FeatureVector::new(1.2, 0.8, 3.0, 1.5, 5.0, 0.02, 0.9, 0.4)
}

fn low_intensity_sample() -> FeatureVector {
    FeatureVector::new(0.8, 1.5, 3.0, 1.5, 5.0, 0.02, 0.1, 0.4)
}

#[test]
fn test_individual_single_pair() {
    let dir = fixture_store();
    let predictor = Predictor::new(ArtifactStore::new(dir.path()));

    let prediction = predictor
        .predict_individual(&sample(), &[OutputVariable::PfaMax], &[ModelKind::RandomForest])
        .unwrap();

    assert_eq!(prediction.len(), 1);
    assert_eq!(prediction.models(), &[ModelKind::RandomForest]);
    assert_eq!(prediction.variables(), &[OutputVariable::PfaMax]);
    assert_eq!(
        prediction.get(ModelKind::RandomForest, OutputVariable::PfaMax),
        Some(0.6875)
    );
}

#[test]
fn test_individual_all_variables() {
    let dir = fixture_store();
    let predictor = Predictor::new(ArtifactStore::new(dir.path()));

    let prediction = predictor
        .predict_individual(&sample(), &OutputVariable::ALL, &[ModelKind::RandomForest])
        .unwrap();

    assert_eq!(prediction.len(), 2);
    assert_eq!(prediction.get(ModelKind::RandomForest, OutputVariable::PfaMax), Some(0.6875));
    assert_eq!(prediction.get(ModelKind::RandomForest, OutputVariable::RdrMax), Some(0.75));
    assert_eq!(prediction.get(ModelKind::NeuralNetwork, OutputVariable::RdrMax), None);
}

#[test]
fn test_batch_preserves_row_order() {
    let dir = fixture_store();
    let predictor = Predictor::new(ArtifactStore::new(dir.path()));
    let table = FeatureTable::from_vectors(&[sample(), low_intensity_sample(), sample()]);

    let prediction = predictor
        .predict_batch(&table, &OutputVariable::ALL, &[ModelKind::RandomForest])
        .unwrap();

    assert_eq!(prediction.n_rows(), 3);
    assert_eq!(prediction.column_names(), vec!["PFA_max - RF", "rDR_max - RF"]);
    assert_eq!(
        prediction.column(OutputVariable::PfaMax, ModelKind::RandomForest),
        Some(&[0.6875, 0.375, 0.6875][..])
    );
    assert_eq!(
        prediction.column(OutputVariable::RdrMax, ModelKind::RandomForest),
        Some(&[0.75, 1.25, 0.75][..])
    );
}

#[test]
fn test_individual_matches_single_row_batch() {
    let dir = fixture_store();
    let predictor = Predictor::new(ArtifactStore::new(dir.path()));

    for features in [sample(), low_intensity_sample()] {
        let individual = predictor
            .predict_individual(&features, &OutputVariable::ALL, &[ModelKind::RandomForest])
            .unwrap();
        let batch = predictor
            .predict_batch(
                &FeatureTable::from_vectors(&[features]),
                &OutputVariable::ALL,
                &[ModelKind::RandomForest],
            )
            .unwrap();

        for variable in OutputVariable::ALL {
            let single = individual.get(ModelKind::RandomForest, variable).unwrap();
            let column = batch.column(variable, ModelKind::RandomForest).unwrap();
            assert_eq!(single.to_bits(), column[0].to_bits());
        }
    }
}

#[test]
fn test_repeated_calls_are_identical() {
    let dir = fixture_store();
    let predictor = Predictor::new(ArtifactStore::new(dir.path()));
    let table = FeatureTable::from_vectors(&[sample(), low_intensity_sample()]);

    let first = predictor
        .predict_batch(&table, &OutputVariable::ALL, &[ModelKind::RandomForest])
        .unwrap();
    let second = predictor
        .predict_batch(&table, &OutputVariable::ALL, &[ModelKind::RandomForest])
        .unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_missing_model_kind_fails_whole_call() {
    let dir = fixture_store();
    let predictor = Predictor::new(ArtifactStore::new(dir.path()));

    // RF artifacts exist for rDR_max, ANN artifacts do not.
    let result = predictor.predict_individual(
        &sample(),
        &[OutputVariable::RdrMax],
        &[ModelKind::RandomForest, ModelKind::NeuralNetwork],
    );

    match result {
        Err(PredictError::ArtifactNotFound { key, path }) => {
            assert_eq!(key.model, ModelKind::NeuralNetwork);
            assert!(path.ends_with("Scalers/ScalerX_rDR_max_ANN.json"));
        }
        other => panic!("expected ArtifactNotFound, got {other:?}"),
    }
}

#[test]
fn test_network_reports_input_width() {
    let dir = fixture_store();
    let store = ArtifactStore::new(dir.path());
    let key = ArtifactKey::new(OutputVariable::PfaMax, ModelKind::NeuralNetwork);

    let network = OnnxNetwork::load(&store.model_path(key), 1).unwrap();
    assert_eq!(network.n_features(), Some(8));
}

#[test]
fn test_individual_neural_network() {
    let dir = fixture_store();
    let predictor = Predictor::new(ArtifactStore::new(dir.path()));

    let prediction = predictor
        .predict_individual(
            &sample(),
            &[OutputVariable::PfaMax],
            &[ModelKind::RandomForest, ModelKind::NeuralNetwork],
        )
        .unwrap();

    assert_eq!(prediction.len(), 2);
    assert_eq!(
        prediction.models(),
        &[ModelKind::RandomForest, ModelKind::NeuralNetwork]
    );
    assert_eq!(prediction.get(ModelKind::RandomForest, OutputVariable::PfaMax), Some(0.6875));
    assert_eq!(prediction.get(ModelKind::NeuralNetwork, OutputVariable::PfaMax), Some(1.0));
}

#[test]
fn test_batch_neural_network() {
    let dir = fixture_store();
    let predictor = Predictor::new(ArtifactStore::new(dir.path()));
    let table = FeatureTable::from_vectors(&[sample(), low_intensity_sample(), sample()]);

    let prediction = predictor
        .predict_batch(&table, &[OutputVariable::PfaMax], &[ModelKind::NeuralNetwork])
        .unwrap();

    assert_eq!(prediction.n_rows(), 3);
    assert_eq!(prediction.column_names(), vec!["PFA_max - ANN"]);
    assert_eq!(
        prediction.column(OutputVariable::PfaMax, ModelKind::NeuralNetwork),
        Some(&[1.0, 0.75, 1.0][..])
    );
}

#[test]
fn test_neural_network_individual_matches_single_row_batch() {
    let dir = fixture_store();
    let predictor = Predictor::new(ArtifactStore::new(dir.path()));
    let models = [ModelKind::NeuralNetwork];

    for features in [sample(), low_intensity_sample()] {
        let individual = predictor
            .predict_individual(&features, &[OutputVariable::PfaMax], &models)
            .unwrap();
        let batch = predictor
            .predict_batch(
                &FeatureTable::from_vectors(&[features]),
                &[OutputVariable::PfaMax],
                &models,
            )
            .unwrap();

        let single = individual
            .get(ModelKind::NeuralNetwork, OutputVariable::PfaMax)
            .unwrap();
        let column = batch
            .column(OutputVariable::PfaMax, ModelKind::NeuralNetwork)
            .unwrap();
        assert_eq!(single.to_bits(), column[0].to_bits());
    }
}

#[test]
fn test_reordered_csv_rejected() {
    let dir = fixture_store();
    let predictor = Predictor::new(ArtifactStore::new(dir.path()));

    let csv = "WI,H_Tcr,T1,Ar,ALR_G,AI,Sa,Sv\n1.2,3.0,0.8,1.5,5.0,0.02,0.9,0.4\n";
    let table = dataset::read_feature_table_from(csv.as_bytes()).unwrap();

    let result = predictor.predict_batch(&table, &[OutputVariable::PfaMax], &[ModelKind::RandomForest]);
    assert!(matches!(result, Err(PredictError::SchemaMismatch { .. })));
}

#[test]
fn test_padded_csv_header_rejected() {
    let dir = fixture_store();
    let predictor = Predictor::new(ArtifactStore::new(dir.path()));

    let csv = " WI ,T1,H_Tcr,Ar,ALR_G,AI,Sa,Sv\n1.2,0.8,3.0,1.5,5.0,0.02,0.9,0.4\n";
    let table = dataset::read_feature_table_from(csv.as_bytes()).unwrap();

    let result = predictor.predict_batch(&table, &[OutputVariable::PfaMax], &[ModelKind::RandomForest]);
    assert!(matches!(result, Err(PredictError::SchemaMismatch { .. })));
}

#[test]
fn test_csv_round_trip_through_predictor() {
    let dir = fixture_store();
    let predictor = Predictor::new(ArtifactStore::new(dir.path()));

    let csv = "WI,T1,H_Tcr,Ar,ALR_G,AI,Sa,Sv\n\
               1.2,0.8,3.0,1.5,5.0,0.02,0.9,0.4\n\
               0.8,1.5,3.0,1.5,5.0,0.02,0.1,0.4\n";
    let table = dataset::read_feature_table_from(csv.as_bytes()).unwrap();
    let prediction = predictor
        .predict_batch(&table, &[OutputVariable::PfaMax], &[ModelKind::RandomForest])
        .unwrap();

    let mut out = Vec::new();
    dataset::write_predictions(&mut out, &prediction).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "PFA_max - RF\n0.6875\n0.375\n");
}

#[test]
fn test_scaler_fitted_on_other_names_rejected() {
    let dir = fixture_store();
    let store = ArtifactStore::new(dir.path());
    let key = ArtifactKey::new(OutputVariable::PfaMax, ModelKind::RandomForest);

    let mut scaler = input_scaler();
    scaler["feature_names_in"] = json!(["WI", "T1", "H_Tcr", "Ar", "ALR_G", "AI", "Sa", "Sv"]);
    write_json(&store.scaler_x_path(key), &scaler);

    let predictor = Predictor::new(store);
    let result = predictor.predict_individual(&sample(), &[OutputVariable::PfaMax], &[ModelKind::RandomForest]);
    assert!(matches!(result, Err(PredictError::TransformError(_))));
}
