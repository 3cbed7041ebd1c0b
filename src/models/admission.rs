//! Admission record model
//!
//! One row per hospital stay, with demographics, clinical context and the
//! vital-sign and lab values the length-of-stay model trains on. Record
//! batches for exports and snapshots are produced through `serde_arrow`, so
//! the Arrow schema is traced directly from the struct.

use arrow::record_batch::RecordBatch;
use arrow_schema::FieldRef;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_arrow::schema::{SchemaLike, TracingOptions};

use crate::error::Result;

/// Severity tiers an admission can carry, in ordinal order
pub const SEVERITY_TIERS: [&str; 3] = ["low", "moderate", "high"];

/// One hospital stay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Admission {
    pub admission_id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub age: i64,
    /// "M" or "F"
    pub sex: String,
    /// Clinical macro-group the department belongs to
    pub group: String,
    pub department: String,
    pub admission_date: NaiveDate,
    pub discharge_date: NaiveDate,
    /// Derived length of stay in days; always at least 1
    pub length_days: i64,
    pub diagnosis: String,
    /// Semicolon-delimited comorbidity list; "None" when there are none
    pub comorbidities: String,
    /// One of `SEVERITY_TIERS`
    pub severity: String,
    pub prior_admissions: i64,
    pub from_emergency: bool,
    pub ai_note: bool,
    pub systolic_bp: i64,
    pub diastolic_bp: i64,
    pub heart_rate: i64,
    pub oxygen_saturation: i64,
    pub creatinine: f64,
    pub white_cell_count: i64,
    pub crp: f64,
    pub surgery: bool,
}

impl Admission {
    /// Arrow fields traced from the struct definition
    pub fn fields() -> Result<Vec<FieldRef>> {
        Ok(Vec::<FieldRef>::from_type::<Self>(TracingOptions::default())?)
    }

    /// Convert admission rows into a record batch
    pub fn to_record_batch(rows: &[Self]) -> Result<RecordBatch> {
        let fields = Self::fields()?;
        Ok(serde_arrow::to_record_batch(&fields, &rows)?)
    }

    /// Convert a record batch back into admission rows
    pub fn from_record_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        Ok(serde_arrow::from_record_batch::<Vec<Self>>(batch)?)
    }
}
