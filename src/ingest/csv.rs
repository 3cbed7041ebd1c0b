//! CSV source for the event table
//!
//! The reader infers the uploaded file's schema, then the batch is coerced
//! into the canonical event columns. This keeps the loader tolerant of the
//! encodings spreadsheet exports actually produce: `0/1` flags, integer
//! minutes, quoted timestamps.

use std::fs::File;
use std::future::Future;
use std::io::Seek;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

use arrow::record_batch::RecordBatch;

use super::{normalize_events, SourceLoader};
use crate::error::{ensure_file, EhrBoardError, Result};

/// Event-table source backed by a CSV upload
pub struct CsvSource;

impl SourceLoader for CsvSource {
    fn source_name(&self) -> &'static str {
        "csv"
    }

    fn load_async<'a>(
        &'a self,
        path: &'a Path,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<RecordBatch>>> + Send + 'a>> {
        Box::pin(async move {
            let path = path.to_path_buf();
            tokio::task::spawn_blocking(move || load_events_csv(&path))
                .await
                .map_err(|e| {
                    EhrBoardError::SchemaError(format!("CSV loader task failed: {e}"))
                })?
        })
    }
}

/// Load and normalize an activity CSV file
pub fn load_events_csv(path: &Path) -> Result<Vec<RecordBatch>> {
    ensure_file(path, "the activity CSV upload")?;
    log::info!("Loading activity CSV from {}", path.display());

    let mut file = File::open(path)?;
    let format = arrow::csv::reader::Format::default().with_header(true);
    let (schema, _) = format.infer_schema(&mut file, None)?;
    file.rewind()?;

    let reader = arrow::csv::ReaderBuilder::new(Arc::new(schema))
        .with_header(true)
        .build(file)?;

    let mut batches = Vec::new();
    for batch in reader {
        batches.push(normalize_events(&batch?)?);
    }
    if batches.iter().map(RecordBatch::num_rows).sum::<usize>() == 0 {
        return Err(EhrBoardError::EmptyTable(format!(
            "CSV file has no data rows: {}",
            path.display()
        )));
    }
    Ok(batches)
}
