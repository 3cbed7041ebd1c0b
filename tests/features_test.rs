//! Tests for the feature-engineering layer

use ehr_board::predict::{
    build_training_data, count_comorbidities, encode_severity, OneHotEncoder, PatientFeatures,
};
use ehr_board::synthetic;

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

#[test]
fn comorbidity_counting_deduplicates_case_insensitively() {
    assert_eq!(count_comorbidities("Diabete;Ipertensione;diabete"), 2);
    assert_eq!(count_comorbidities("None"), 0);
    assert_eq!(count_comorbidities(""), 0);
    assert_eq!(count_comorbidities("nessuna"), 0);
    // commas are normalized to the canonical separator
    assert_eq!(count_comorbidities("BPCO, Obesità"), 2);
    assert_eq!(count_comorbidities("BPCO; none ; Obesità"), 2);
}

#[test]
fn severity_is_ordinal() {
    assert_eq!(encode_severity("low"), Some(0.0));
    assert_eq!(encode_severity("moderate"), Some(1.0));
    assert_eq!(encode_severity("HIGH"), Some(2.0));
    assert_eq!(encode_severity("critical"), None);
    assert_eq!(encode_severity(""), None);
}

#[test]
fn transform_matches_feature_names() {
    let rows = vec![sample_features()];
    let encoder = OneHotEncoder::fit(&rows);
    let encoded = encoder.transform(&rows[0]).unwrap();
    assert_eq!(encoded.len(), encoder.feature_names().len());
}

#[test]
fn unknown_categories_encode_to_zero_block() {
    let rows = vec![sample_features()];
    let encoder = OneHotEncoder::fit(&rows);

    let mut unknown = sample_features();
    unknown.diagnosis = "Mai vista".to_string();
    unknown.department = "Reparto Fantasma".to_string();
    let encoded = encoder.transform(&unknown).unwrap();

    // the numeric block is untouched, every categorical bit is off except sex
    let names = encoder.feature_names();
    for (name, value) in names.iter().zip(&encoded) {
        if name.starts_with("diagnosis=") || name.starts_with("department=") {
            assert_eq!(*value, 0.0, "bit '{name}' should be off");
        }
    }
    assert!(encoded.iter().any(|v| *v != 0.0));
}

#[test]
fn unknown_severity_drops_the_row() {
    let rows = vec![sample_features()];
    let encoder = OneHotEncoder::fit(&rows);
    let mut bad = sample_features();
    bad.severity = "critical".to_string();
    assert!(encoder.transform(&bad).is_none());
}

#[test]
fn training_data_uses_length_days_as_target() {
    let admissions = synthetic::synthesize_admissions(50, 120, 11);
    let data = build_training_data(&admissions).unwrap();

    assert_eq!(data.x.len(), data.y.len());
    assert!(!data.x.is_empty());
    assert_eq!(data.x[0].len(), data.feature_names.len());
    // every target honors the one-day floor of the generator
    assert!(data.y.iter().all(|&days| days >= 1.0));
}
