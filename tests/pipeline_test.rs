//! Tests for the prediction pipeline: regressors, metrics, selection and the
//! persisted artifact

use ehr_board::predict::models::{
    DecisionTreeRegressor, GradientBoostingRegressor, KNeighborsRegressor, RidgeRegression,
};
use ehr_board::predict::metrics::{mean_absolute_error, r2_score, root_mean_squared_error};
use ehr_board::predict::pipeline::train_test_split;
use ehr_board::predict::{train_and_select, ModelArtifact, PatientFeatures};
use ehr_board::synthetic;

#[test]
fn metrics_on_known_vectors() {
    let y_true = [3.0, -0.5, 2.0, 7.0];
    let y_pred = [2.5, 0.0, 2.0, 8.0];

    assert!((mean_absolute_error(&y_true, &y_pred) - 0.5).abs() < 1e-9);
    assert!((root_mean_squared_error(&y_true, &y_pred) - 0.612_372).abs() < 1e-5);
    assert!(r2_score(&y_true, &y_pred) > 0.94);

    // a perfect fit
    assert_eq!(r2_score(&y_true, &y_true), 1.0);
    assert_eq!(mean_absolute_error(&y_true, &y_true), 0.0);
}

#[test]
fn ridge_recovers_a_noiseless_linear_target() {
    let x: Vec<Vec<f64>> = (0..60)
        .map(|i| vec![i as f64, (i % 7) as f64])
        .collect();
    let y: Vec<f64> = x.iter().map(|row| 3.0 * row[0] - 2.0 * row[1] + 5.0).collect();

    let model = RidgeRegression::fit(&x, &y, 1e-6).unwrap();
    assert!((model.weights[0] - 3.0).abs() < 1e-3);
    assert!((model.weights[1] + 2.0).abs() < 1e-3);
    assert!((model.intercept - 5.0).abs() < 1e-2);

    let predictions: Vec<f64> = x.iter().map(|row| model.predict_row(row)).collect();
    assert!(r2_score(&y, &predictions) > 0.9999);
}

#[test]
fn ridge_rejects_degenerate_input() {
    assert!(RidgeRegression::fit(&[], &[], 1.0).is_none());
    let x = vec![vec![1.0, 2.0]];
    assert!(RidgeRegression::fit(&x, &[1.0, 2.0], 1.0).is_none());
}

#[test]
fn knn_predicts_the_neighbourhood_mean() {
    let x = vec![
        vec![0.0],
        vec![0.1],
        vec![0.2],
        vec![10.0],
        vec![10.1],
        vec![10.2],
    ];
    let y = vec![1.0, 1.0, 1.0, 9.0, 9.0, 9.0];
    let model = KNeighborsRegressor::fit(&x, &y, 3).unwrap();

    assert!((model.predict_row(&[0.05]) - 1.0).abs() < 1e-9);
    assert!((model.predict_row(&[10.05]) - 9.0).abs() < 1e-9);
}

#[test]
fn tree_splits_a_step_function() {
    let x: Vec<Vec<f64>> = (0..40).map(|i| vec![i as f64]).collect();
    let y: Vec<f64> = (0..40).map(|i| if i < 20 { 2.0 } else { 8.0 }).collect();

    let tree = DecisionTreeRegressor::fit(&x, &y, 3, 2).unwrap();
    assert!((tree.predict_row(&[5.0]) - 2.0).abs() < 1e-9);
    assert!((tree.predict_row(&[30.0]) - 8.0).abs() < 1e-9);
}

#[test]
fn boosting_beats_its_own_base_estimate() {
    let x: Vec<Vec<f64>> = (0..80).map(|i| vec![(i % 10) as f64, (i % 4) as f64]).collect();
    let y: Vec<f64> = x.iter().map(|row| row[0] * 1.5 + row[1]).collect();

    let model = GradientBoostingRegressor::fit(&x, &y, 50, 0.1, 3).unwrap();
    let predictions: Vec<f64> = x.iter().map(|row| model.predict_row(row)).collect();
    let base_only: Vec<f64> = vec![model.base; y.len()];

    assert!(
        root_mean_squared_error(&y, &predictions) < root_mean_squared_error(&y, &base_only) / 2.0
    );
}

#[test]
fn split_is_disjoint_and_complete() {
    let (train, test) = train_test_split(100, 0.2, 42);
    assert_eq!(train.len(), 80);
    assert_eq!(test.len(), 20);

    let mut all: Vec<usize> = train.iter().chain(test.iter()).copied().collect();
    all.sort_unstable();
    assert_eq!(all, (0..100).collect::<Vec<_>>());

    // seeded, so reproducible
    let (train_again, _) = train_test_split(100, 0.2, 42);
    assert_eq!(train, train_again);
}

#[test]
fn training_selects_and_persists_the_best_family() {
    let admissions = synthetic::synthesize_admissions(80, 260, 42);
    let (artifact, scores) = train_and_select(&admissions, 42, 2).unwrap();

    assert_eq!(scores.len(), 4);
    // scores come back best-first and the artifact carries the winner
    for pair in scores.windows(2) {
        assert!(pair[0].r2 >= pair[1].r2);
    }
    assert_eq!(artifact.score.name, scores[0].name);

    // the generator encodes real structure; the winner should find some of it
    assert!(artifact.score.r2 > 0.0);

    let dir = std::env::temp_dir().join(format!("ehr_board_model_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("discharge_model.json");

    artifact.save(&path).unwrap();
    let reloaded = ModelArtifact::load(&path).unwrap();

    let features = sample_features();
    let a = artifact.predict(&features).unwrap();
    let b = reloaded.predict(&features).unwrap();
    assert_eq!(a, b);
    assert!(a.is_finite());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn prediction_with_unknown_severity_fails() {
    let admissions = synthetic::synthesize_admissions(60, 150, 7);
    let (artifact, _) = train_and_select(&admissions, 7, 2).unwrap();

    let mut features = sample_features();
    features.severity = "critical".to_string();
    assert!(artifact.predict(&features).is_err());
}

#[test]
fn prediction_with_unknown_diagnosis_still_works() {
    let admissions = synthetic::synthesize_admissions(60, 150, 7);
    let (artifact, _) = train_and_select(&admissions, 7, 2).unwrap();

    let mut features = sample_features();
    features.diagnosis = "Sindrome sconosciuta".to_string();
    let days = artifact.predict(&features).unwrap();
    assert!(days.is_finite());
}

#[test]
fn missing_artifact_is_a_terminal_error() {
    assert!(ModelArtifact::load(std::path::Path::new("no_such_model.json")).is_err());
}

fn sample_features() -> PatientFeatures {
    PatientFeatures {
        age: 72,
        sex: "F".to_string(),
        diagnosis: "Polmonite".to_string(),
        department: "Pneumologia".to_string(),
        prior_admissions: 4,
        from_emergency: true,
        severity: "low".to_string(),
        comorbidities: "Diabete;Ipertensione".to_string(),
        systolic_bp: 138,
        diastolic_bp: 85,
        heart_rate: 92,
        oxygen_saturation: 94,
        creatinine: 1.5,
        white_cell_count: 12800,
        crp: 65.0,
        surgery: false,
    }
}
