//! Source loaders for the two dashboard tables
//!
//! Activity events arrive as CSV or PDF uploads and are normalized into one
//! canonical Arrow schema, whatever the source typed its columns as.
//! Admission documents come from the document database when one is
//! configured and reachable, with a local JSON file as the fallback.
//!
//! Available sources:
//! - CSV upload: the canonical event-table columns, loosely typed
//! - PDF upload: embedded table text coerced into the same columns
//! - JSON file: nested patient documents (fallback for the document DB)
//! - Document database: read-only patient and admission collections

pub mod csv;
pub mod json;
pub mod mongo;
pub mod pdf;

pub use csv::CsvSource;
pub use mongo::MongoSource;
pub use pdf::PdfSource;

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

use arrow::array::{
    ArrayRef, BooleanBuilder, Float64Builder, StringBuilder, TimestampMillisecondBuilder,
};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};
use arrow::record_batch::RecordBatch;

use crate::config::DashboardConfig;
use crate::error::{EhrBoardError, Result};
use crate::models::event;
use crate::models::{ActivityEvent, PatientDocument};
use crate::utils;

/// Base trait for event-table sources
pub trait SourceLoader: Send + Sync {
    /// Get the name of the source
    fn source_name(&self) -> &'static str;

    /// Get the canonical schema the source normalizes into
    fn schema(&self) -> SchemaRef {
        Arc::new(ActivityEvent::schema())
    }

    /// Load event batches from the source
    fn load(&self, path: &Path) -> Result<Vec<RecordBatch>> {
        // Check if we're already in a tokio runtime
        let current = tokio::runtime::Handle::try_current();

        if current.is_ok() {
            // We're already in a tokio runtime, use futures executor
            futures::executor::block_on(self.load_async(path))
        } else {
            // Create a blocking runtime to run the async code
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(self.load_async(path))
        }
    }

    /// Load event batches from the source asynchronously
    fn load_async<'a>(
        &'a self,
        path: &'a Path,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<RecordBatch>>> + Send + 'a>>;
}

/// Create a source loader from a source name
pub fn source_from_name(name: &str) -> Result<Arc<dyn SourceLoader>> {
    match name.to_lowercase().as_str() {
        "csv" => Ok(Arc::new(CsvSource)),
        "pdf" => Ok(Arc::new(PdfSource)),
        _ => Err(EhrBoardError::SchemaError(format!(
            "Unknown source: {name}"
        ))),
    }
}

/// Create a source loader based on a file's extension
pub fn source_from_path(path: &Path) -> Result<Arc<dyn SourceLoader>> {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .as_deref()
    {
        Some("csv") => Ok(Arc::new(CsvSource)),
        Some("pdf") => Ok(Arc::new(PdfSource)),
        _ => Err(EhrBoardError::SchemaError(format!(
            "Cannot infer a source from path: {}",
            path.display()
        ))),
    }
}

/// Fetch patient documents: document database first, local JSON fallback
///
/// A missing URI silently selects the fallback; a configured but unreachable
/// database is reported and then falls back.
pub async fn load_patient_documents(config: &DashboardConfig) -> Result<Vec<PatientDocument>> {
    if let Some(uri) = &config.mongo_uri {
        match MongoSource::connect(uri, config.mongo_timeout, &config.database).await {
            Ok(source) => {
                log::info!("Connected to the document database");
                return source.fetch_patients().await;
            }
            Err(e) => {
                log::warn!("Document database unavailable, falling back to JSON: {e}");
            }
        }
    }
    log::info!(
        "Loading patient documents from {}",
        config.patients_json.display()
    );
    json::load_patients_json(&config.patients_json)
}

/// Normalize a loosely typed batch into the canonical event columns
///
/// Only columns the canonical schema knows are kept, each coerced to its
/// canonical type value by value; unreadable values become nulls. When the
/// `minutes` column is absent it is derived from the timestamps, whole
/// minutes rounded down.
pub fn normalize_events(batch: &RecordBatch) -> Result<RecordBatch> {
    let n = batch.num_rows();
    let mut fields: Vec<Field> = Vec::new();
    let mut arrays: Vec<ArrayRef> = Vec::new();

    for name in [
        event::VISIT_ID,
        event::CLINICIAN_ID,
        event::DEPARTMENT,
        event::ACTIVITY,
    ] {
        if let Some(col) = utils::get_column(batch, name) {
            let mut builder = StringBuilder::new();
            for row in 0..n {
                builder.append_option(utils::value_as_string(col.as_ref(), row));
            }
            fields.push(Field::new(name, DataType::Utf8, true));
            arrays.push(Arc::new(builder.finish()));
        }
    }

    let start_col = utils::get_column(batch, event::START_TIME);
    let end_col = utils::get_column(batch, event::END_TIME);
    for (name, col) in [(event::START_TIME, &start_col), (event::END_TIME, &end_col)] {
        if let Some(col) = col {
            let mut builder = TimestampMillisecondBuilder::new();
            for row in 0..n {
                builder.append_option(
                    utils::value_as_timestamp(col.as_ref(), row).map(utils::timestamp_to_millis),
                );
            }
            fields.push(Field::new(
                name,
                DataType::Timestamp(TimeUnit::Millisecond, None),
                true,
            ));
            arrays.push(Arc::new(builder.finish()));
        }
    }

    let minutes_col = utils::get_column(batch, event::MINUTES);
    if minutes_col.is_some() || (start_col.is_some() && end_col.is_some()) {
        let mut builder = Float64Builder::new();
        for row in 0..n {
            let minutes = match &minutes_col {
                Some(col) => utils::value_as_f64(col.as_ref(), row),
                None => derive_minutes(start_col.as_deref(), end_col.as_deref(), row),
            };
            builder.append_option(minutes);
        }
        fields.push(Field::new(event::MINUTES, DataType::Float64, true));
        arrays.push(Arc::new(builder.finish()));
    }

    for name in [event::IS_AFTER_HOURS, event::IS_AI_NOTE] {
        if let Some(col) = utils::get_column(batch, name) {
            let mut builder = BooleanBuilder::new();
            for row in 0..n {
                builder.append_option(utils::value_as_bool(col.as_ref(), row));
            }
            fields.push(Field::new(name, DataType::Boolean, true));
            arrays.push(Arc::new(builder.finish()));
        }
    }

    if let Some(col) = utils::get_column(batch, event::AI_EDIT_MINUTES) {
        let mut builder = Float64Builder::new();
        for row in 0..n {
            builder.append_option(utils::value_as_f64(col.as_ref(), row));
        }
        fields.push(Field::new(event::AI_EDIT_MINUTES, DataType::Float64, true));
        arrays.push(Arc::new(builder.finish()));
    }

    if fields.is_empty() {
        return Err(EhrBoardError::SchemaError(
            "no recognized event-table columns in the uploaded data".to_string(),
        ));
    }

    Ok(RecordBatch::try_new(
        Arc::new(Schema::new(fields)),
        arrays,
    )?)
}

fn derive_minutes(
    start: Option<&dyn arrow::array::Array>,
    end: Option<&dyn arrow::array::Array>,
    row: usize,
) -> Option<f64> {
    let start = utils::value_as_timestamp(start?, row)?;
    let end = utils::value_as_timestamp(end?, row)?;
    Some(((end - start).num_seconds() / 60) as f64)
}
