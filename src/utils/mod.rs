//! Utility functions for working with Arrow record batches
//!
//! The loaders in this crate accept tables from sources with loose typing
//! (CSV uploads, PDF tables, JSON documents), so the helpers here come in two
//! flavors: strict typed column accessors for the canonical event table, and
//! lenient per-value readers used while normalizing a freshly ingested batch.

pub mod progress;

use arrow::array::{
    Array, ArrayRef, BooleanArray, Date32Array, Float64Array, Int64Array, LargeStringArray,
    StringArray, TimestampMillisecondArray, TimestampSecondArray,
};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::{EhrBoardError, Result};

/// Look a column up by name
#[must_use]
pub fn get_column(batch: &RecordBatch, name: &str) -> Option<ArrayRef> {
    batch
        .schema()
        .index_of(name)
        .ok()
        .map(|idx| batch.column(idx).clone())
}

/// Downcast an array to a concrete Arrow array type
///
/// # Arguments
/// * `array` - The array to downcast
/// * `column_name` - The column name (for error context)
/// * `type_name` - A string representation of the expected type
pub fn downcast_array<'a, T: Array + 'static>(
    array: &'a dyn Array,
    column_name: &str,
    type_name: &str,
) -> Result<&'a T> {
    array.as_any().downcast_ref::<T>().ok_or_else(|| {
        EhrBoardError::SchemaError(format!(
            "Column '{column_name}' is not a {type_name} array"
        ))
    })
}

/// Get a string column if present and correctly typed
#[must_use]
pub fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Option<&'a StringArray> {
    let idx = batch.schema().index_of(name).ok()?;
    batch.column(idx).as_any().downcast_ref::<StringArray>()
}

/// Get a float64 column if present and correctly typed
#[must_use]
pub fn float64_column<'a>(batch: &'a RecordBatch, name: &str) -> Option<&'a Float64Array> {
    let idx = batch.schema().index_of(name).ok()?;
    batch.column(idx).as_any().downcast_ref::<Float64Array>()
}

/// Get a boolean column if present and correctly typed
#[must_use]
pub fn boolean_column<'a>(batch: &'a RecordBatch, name: &str) -> Option<&'a BooleanArray> {
    let idx = batch.schema().index_of(name).ok()?;
    batch.column(idx).as_any().downcast_ref::<BooleanArray>()
}

/// Read a value as a string, whatever the source column type
///
/// Accepts Utf8, LargeUtf8, Int64, Float64 and Boolean columns. Returns
/// `None` for nulls, out-of-range rows and unsupported types.
#[must_use]
pub fn value_as_string(array: &dyn Array, row: usize) -> Option<String> {
    if row >= array.len() || array.is_null(row) {
        return None;
    }
    let any = array.as_any();
    if let Some(a) = any.downcast_ref::<StringArray>() {
        return Some(a.value(row).to_string());
    }
    if let Some(a) = any.downcast_ref::<LargeStringArray>() {
        return Some(a.value(row).to_string());
    }
    if let Some(a) = any.downcast_ref::<Int64Array>() {
        return Some(a.value(row).to_string());
    }
    if let Some(a) = any.downcast_ref::<Float64Array>() {
        return Some(a.value(row).to_string());
    }
    if let Some(a) = any.downcast_ref::<BooleanArray>() {
        return Some(a.value(row).to_string());
    }
    None
}

/// Read a value as f64, accepting Float64, Int64 and numeric strings
#[must_use]
pub fn value_as_f64(array: &dyn Array, row: usize) -> Option<f64> {
    if row >= array.len() || array.is_null(row) {
        return None;
    }
    let any = array.as_any();
    if let Some(a) = any.downcast_ref::<Float64Array>() {
        return Some(a.value(row));
    }
    if let Some(a) = any.downcast_ref::<Int64Array>() {
        return Some(a.value(row) as f64);
    }
    if let Some(a) = any.downcast_ref::<StringArray>() {
        return a.value(row).trim().parse::<f64>().ok();
    }
    if let Some(a) = any.downcast_ref::<LargeStringArray>() {
        return a.value(row).trim().parse::<f64>().ok();
    }
    None
}

/// Read a value as bool, coercing `0/1` integers and `true/1/yes/y` strings
#[must_use]
pub fn value_as_bool(array: &dyn Array, row: usize) -> Option<bool> {
    if row >= array.len() || array.is_null(row) {
        return None;
    }
    let any = array.as_any();
    if let Some(a) = any.downcast_ref::<BooleanArray>() {
        return Some(a.value(row));
    }
    if let Some(a) = any.downcast_ref::<Int64Array>() {
        return Some(a.value(row) != 0);
    }
    if let Some(a) = any.downcast_ref::<Float64Array>() {
        return Some(a.value(row) != 0.0);
    }
    if let Some(a) = any.downcast_ref::<StringArray>() {
        return Some(parse_bool(a.value(row)));
    }
    if let Some(a) = any.downcast_ref::<LargeStringArray>() {
        return Some(parse_bool(a.value(row)));
    }
    None
}

fn parse_bool(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "y")
}

/// Read a value as a naive timestamp from Timestamp or string columns
#[must_use]
pub fn value_as_timestamp(array: &dyn Array, row: usize) -> Option<NaiveDateTime> {
    if row >= array.len() || array.is_null(row) {
        return None;
    }
    let any = array.as_any();
    if let Some(a) = any.downcast_ref::<TimestampMillisecondArray>() {
        return timestamp_from_millis(a.value(row));
    }
    if let Some(a) = any.downcast_ref::<TimestampSecondArray>() {
        return timestamp_from_millis(a.value(row) * 1000);
    }
    if let Some(a) = any.downcast_ref::<StringArray>() {
        return parse_timestamp(a.value(row));
    }
    if let Some(a) = any.downcast_ref::<LargeStringArray>() {
        return parse_timestamp(a.value(row));
    }
    None
}

/// Parse a timestamp string in the formats CSV and PDF sources use
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
    ];
    let raw = raw.trim();
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// Convert a naive timestamp to epoch milliseconds
#[must_use]
pub fn timestamp_to_millis(ts: NaiveDateTime) -> i64 {
    ts.and_utc().timestamp_millis()
}

/// Convert epoch milliseconds back to a naive timestamp
#[must_use]
pub fn timestamp_from_millis(millis: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(millis).map(|dt| dt.naive_utc())
}

/// Read a `Date32` value as a `NaiveDate`
#[must_use]
pub fn value_as_date(array: &dyn Array, row: usize) -> Option<NaiveDate> {
    if row >= array.len() || array.is_null(row) {
        return None;
    }
    let any = array.as_any();
    if let Some(a) = any.downcast_ref::<Date32Array>() {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
        return epoch.checked_add_signed(chrono::Duration::days(i64::from(a.value(row))));
    }
    if let Some(a) = any.downcast_ref::<StringArray>() {
        return NaiveDate::parse_from_str(a.value(row).trim(), "%Y-%m-%d").ok();
    }
    if let Some(a) = any.downcast_ref::<LargeStringArray>() {
        return NaiveDate::parse_from_str(a.value(row).trim(), "%Y-%m-%d").ok();
    }
    None
}

/// Concatenate batches sharing a schema into one working table
pub fn concat_batches(batches: &[RecordBatch]) -> Result<RecordBatch> {
    let Some(first) = batches.first() else {
        return Err(EhrBoardError::EmptyTable(
            "no record batches to concatenate".to_string(),
        ));
    };
    Ok(arrow::compute::concat_batches(&first.schema(), batches)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_common_timestamp_shapes() {
        assert!(parse_timestamp("2025-03-10T09:00:00").is_some());
        assert!(parse_timestamp("2025-03-10 09:00:00").is_some());
        assert!(parse_timestamp("2025-03-10 09:00:00.250").is_some());
        assert!(parse_timestamp("10/03/2025").is_none());
    }

    #[test]
    fn boolean_coercion_accepts_spreadsheet_encodings() {
        for raw in ["true", "1", "yes", "Y", "TRUE"] {
            assert!(parse_bool(raw), "'{raw}' should coerce to true");
        }
        for raw in ["false", "0", "no", "", "maybe"] {
            assert!(!parse_bool(raw), "'{raw}' should coerce to false");
        }
    }
}
