//! Nested patient documents and their flattened stay records
//!
//! The document database and the local JSON fallback both serve patients as
//! nested documents: a patient with a list of admissions. The dashboard works
//! on the flattened per-stay form, with the length of stay derived from the
//! admission and discharge dates. Documents with missing or unparseable
//! dates keep `None` and are excluded from the KPI means.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::utils;

/// One admission inside a patient document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StayDocument {
    #[serde(default)]
    pub diagnosis: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub admission_date: Option<String>,
    #[serde(default)]
    pub discharge_date: Option<String>,
}

/// A patient document with its list of admissions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub admissions: Vec<StayDocument>,
}

/// One flattened hospital stay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StayRecord {
    pub patient_name: String,
    pub diagnosis: Option<String>,
    pub department: String,
    pub admission_date: Option<NaiveDate>,
    pub discharge_date: Option<NaiveDate>,
    /// Discharge minus admission in days; `None` when either date is missing
    pub length_days: Option<i64>,
}

impl StayRecord {
    /// Flatten patient documents into per-stay rows
    #[must_use]
    pub fn flatten(patients: &[PatientDocument]) -> Vec<Self> {
        let mut records = Vec::new();
        for patient in patients {
            let name = if patient.name.is_empty() {
                "N/A".to_string()
            } else {
                patient.name.clone()
            };
            for stay in &patient.admissions {
                let admission_date = stay.admission_date.as_deref().and_then(parse_date);
                let discharge_date = stay.discharge_date.as_deref().and_then(parse_date);
                let length_days = match (admission_date, discharge_date) {
                    (Some(adm), Some(dis)) => Some((dis - adm).num_days()),
                    _ => None,
                };
                records.push(Self {
                    patient_name: name.clone(),
                    diagnosis: stay.diagnosis.clone(),
                    department: stay
                        .department
                        .clone()
                        .unwrap_or_else(|| "N/A".to_string()),
                    admission_date,
                    discharge_date,
                    length_days,
                });
            }
        }
        records
    }

    /// Whether both dates were present and parseable
    #[must_use]
    pub fn has_dates(&self) -> bool {
        self.admission_date.is_some() && self.discharge_date.is_some()
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .ok()
        .or_else(|| utils::parse_timestamp(raw).map(|ts| ts.date()))
}
