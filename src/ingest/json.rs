//! Local JSON sources
//!
//! Two fixed shapes: nested patient documents (the document-database
//! fallback) and flat admission records (the training set).

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{ensure_file, Result};
use crate::models::{Admission, PatientDocument};

/// Load nested patient documents from a local JSON file
pub fn load_patients_json(path: &Path) -> Result<Vec<PatientDocument>> {
    ensure_file(path, "the patient-document JSON fallback")?;
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Load flat admission records from a local JSON file
pub fn load_admissions_json(path: &Path) -> Result<Vec<Admission>> {
    ensure_file(path, "the admission-record training set")?;
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}
