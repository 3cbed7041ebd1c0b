//! Feature engineering for the length-of-stay model
//!
//! Admission records are turned into flat numeric rows: engineered counts
//! and ordinal codes first, then a one-hot block per categorical column with
//! categories learned at fit time. Identifiers, names, raw dates and the
//! target never enter the matrix.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{EhrBoardError, Result};
use crate::models::Admission;

/// Names of the numeric features, in matrix order
pub const NUMERIC_FEATURES: [&str; 13] = [
    "age",
    "prior_admissions",
    "from_emergency",
    "severity_level",
    "comorbidity_count",
    "systolic_bp",
    "diastolic_bp",
    "heart_rate",
    "oxygen_saturation",
    "creatinine",
    "white_cell_count",
    "crp",
    "surgery",
];

/// Names of the one-hot encoded categorical features, in matrix order
pub const CATEGORICAL_FEATURES: [&str; 3] = ["sex", "diagnosis", "department"];

/// Count distinct real comorbidities in a delimited string
///
/// Commas are normalized to semicolons, items are trimmed and lowercased,
/// and `""`, `"none"` and `"nessuna"` are not comorbidities. Duplicates
/// count once.
#[must_use]
pub fn count_comorbidities(raw: &str) -> usize {
    raw.replace(',', ";")
        .split(';')
        .map(|item| item.trim().to_lowercase())
        .filter(|item| !matches!(item.as_str(), "" | "none" | "nessuna"))
        .collect::<FxHashSet<_>>()
        .len()
}

/// Ordinal-encode a severity tier; `None` for anything unknown
#[must_use]
pub fn encode_severity(raw: &str) -> Option<f64> {
    match raw.trim().to_lowercase().as_str() {
        "low" => Some(0.0),
        "moderate" => Some(1.0),
        "high" => Some(2.0),
        _ => None,
    }
}

/// The single-row prediction input: everything the model may look at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientFeatures {
    pub age: i64,
    pub sex: String,
    pub diagnosis: String,
    pub department: String,
    pub prior_admissions: i64,
    pub from_emergency: bool,
    pub severity: String,
    pub comorbidities: String,
    pub systolic_bp: i64,
    pub diastolic_bp: i64,
    pub heart_rate: i64,
    pub oxygen_saturation: i64,
    pub creatinine: f64,
    pub white_cell_count: i64,
    pub crp: f64,
    pub surgery: bool,
}

impl From<&Admission> for PatientFeatures {
    fn from(admission: &Admission) -> Self {
        Self {
            age: admission.age,
            sex: admission.sex.clone(),
            diagnosis: admission.diagnosis.clone(),
            department: admission.department.clone(),
            prior_admissions: admission.prior_admissions,
            from_emergency: admission.from_emergency,
            severity: admission.severity.clone(),
            comorbidities: admission.comorbidities.clone(),
            systolic_bp: admission.systolic_bp,
            diastolic_bp: admission.diastolic_bp,
            heart_rate: admission.heart_rate,
            oxygen_saturation: admission.oxygen_saturation,
            creatinine: admission.creatinine,
            white_cell_count: admission.white_cell_count,
            crp: admission.crp,
            surgery: admission.surgery,
        }
    }
}

/// One-hot encoder with fit-time categories
///
/// Unknown categories at transform time encode to an all-zero block, so a
/// diagnosis the training set never saw degrades instead of failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    /// Per categorical column: sorted distinct categories seen during fit
    pub categories: Vec<(String, Vec<String>)>,
}

impl OneHotEncoder {
    /// Learn the category sets from training rows
    #[must_use]
    pub fn fit(rows: &[PatientFeatures]) -> Self {
        let mut categories = Vec::with_capacity(CATEGORICAL_FEATURES.len());
        for column in CATEGORICAL_FEATURES {
            let mut values: Vec<String> = rows
                .iter()
                .map(|row| categorical_value(row, column))
                .collect::<FxHashSet<_>>()
                .into_iter()
                .collect();
            values.sort();
            categories.push((column.to_string(), values));
        }
        Self { categories }
    }

    /// Names of every output feature, numeric first, in matrix order
    #[must_use]
    pub fn feature_names(&self) -> Vec<String> {
        let mut names: Vec<String> = NUMERIC_FEATURES.iter().map(|&n| n.to_string()).collect();
        for (column, values) in &self.categories {
            for value in values {
                names.push(format!("{column}={value}"));
            }
        }
        names
    }

    /// Encode one row; `None` when the severity tier is unknown
    #[must_use]
    pub fn transform(&self, row: &PatientFeatures) -> Option<Vec<f64>> {
        let severity = encode_severity(&row.severity)?;
        let mut encoded = vec![
            row.age as f64,
            row.prior_admissions as f64,
            f64::from(row.from_emergency),
            severity,
            count_comorbidities(&row.comorbidities) as f64,
            row.systolic_bp as f64,
            row.diastolic_bp as f64,
            row.heart_rate as f64,
            row.oxygen_saturation as f64,
            row.creatinine,
            row.white_cell_count as f64,
            row.crp,
            f64::from(row.surgery),
        ];
        for (column, values) in &self.categories {
            let value = categorical_value(row, column);
            let position = values.iter().position(|v| *v == value);
            for idx in 0..values.len() {
                encoded.push(if position == Some(idx) { 1.0 } else { 0.0 });
            }
        }
        Some(encoded)
    }
}

fn categorical_value(row: &PatientFeatures, column: &str) -> String {
    match column {
        "sex" => row.sex.clone(),
        "diagnosis" => row.diagnosis.clone(),
        _ => row.department.clone(),
    }
}

/// The encoded training set
#[derive(Debug, Clone)]
pub struct TrainingData {
    pub x: Vec<Vec<f64>>,
    pub y: Vec<f64>,
    pub feature_names: Vec<String>,
    pub encoder: OneHotEncoder,
}

/// Encode admission records into a training matrix
///
/// Rows with an unknown severity tier are dropped, mirroring the cleaning
/// step of the training data preparation.
pub fn build_training_data(admissions: &[Admission]) -> Result<TrainingData> {
    let rows: Vec<PatientFeatures> = admissions.iter().map(PatientFeatures::from).collect();
    let encoder = OneHotEncoder::fit(&rows);

    let mut x = Vec::with_capacity(rows.len());
    let mut y = Vec::with_capacity(rows.len());
    for (row, admission) in rows.iter().zip(admissions) {
        if let Some(encoded) = encoder.transform(row) {
            x.push(encoded);
            y.push(admission.length_days as f64);
        }
    }

    if x.len() < 10 {
        return Err(EhrBoardError::TrainingError(format!(
            "not enough usable admission rows to train on ({} after cleaning)",
            x.len()
        )));
    }

    let feature_names = encoder.feature_names();
    Ok(TrainingData {
        x,
        y,
        feature_names,
        encoder,
    })
}
