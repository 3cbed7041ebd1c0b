//! PDF source for the event table
//!
//! Extracts the text of every page, locates the embedded table by its header
//! row and re-assembles the cells into a loosely typed batch, which then goes
//! through the same normalization as a CSV upload. A PDF without an
//! extractable table is a terminal error for the interaction.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

use arrow::array::{ArrayRef, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use lopdf::Document;

use super::{normalize_events, SourceLoader};
use crate::error::{ensure_file, EhrBoardError, Result};
use crate::models::event;

/// Event-table source backed by a PDF upload with embedded tables
pub struct PdfSource;

impl SourceLoader for PdfSource {
    fn source_name(&self) -> &'static str {
        "pdf"
    }

    fn load_async<'a>(
        &'a self,
        path: &'a Path,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<RecordBatch>>> + Send + 'a>> {
        Box::pin(async move {
            let path = path.to_path_buf();
            tokio::task::spawn_blocking(move || load_events_pdf(&path))
                .await
                .map_err(|e| {
                    EhrBoardError::SchemaError(format!("PDF loader task failed: {e}"))
                })?
        })
    }
}

/// Load and normalize the table embedded in a PDF file
pub fn load_events_pdf(path: &Path) -> Result<Vec<RecordBatch>> {
    ensure_file(path, "the activity PDF upload")?;
    log::info!("Extracting table text from {}", path.display());

    let document = Document::load(path)?;
    let mut text = String::new();
    for page_number in document.get_pages().keys() {
        text.push_str(&document.extract_text(&[*page_number])?);
        text.push('\n');
    }

    let batch = parse_table_text(&text)?;
    Ok(vec![normalize_events(&batch)?])
}

/// Re-assemble extracted page text into a loosely typed batch
///
/// The header row is located by the `visit_id` column name; the delimiter is
/// whatever the header itself uses. Rows that do not split into the header's
/// cell count are dropped.
fn parse_table_text(text: &str) -> Result<RecordBatch> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

    let header_line = lines
        .by_ref()
        .find(|line| line.contains(event::VISIT_ID))
        .ok_or_else(|| {
            EhrBoardError::EmptyTable(
                "no table header found in the PDF text".to_string(),
            )
        })?;
    let delimiter = detect_delimiter(header_line);
    let header: Vec<String> = split_cells(header_line, delimiter);

    let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); header.len()];
    for line in lines {
        // tables spanning pages repeat their header
        if line == header_line {
            continue;
        }
        let cells = split_cells(line, delimiter);
        if cells.len() != header.len() {
            continue;
        }
        for (column, cell) in columns.iter_mut().zip(cells) {
            column.push(if cell.is_empty() { None } else { Some(cell) });
        }
    }

    if columns.first().is_none_or(Vec::is_empty) {
        return Err(EhrBoardError::EmptyTable(
            "no table rows could be extracted from the PDF".to_string(),
        ));
    }

    let fields: Vec<Field> = header
        .iter()
        .map(|name| Field::new(name, DataType::Utf8, true))
        .collect();
    let arrays: Vec<ArrayRef> = columns
        .into_iter()
        .map(|column| {
            let mut builder = StringBuilder::new();
            for cell in column {
                builder.append_option(cell);
            }
            Arc::new(builder.finish()) as ArrayRef
        })
        .collect();

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
}

fn detect_delimiter(header: &str) -> Option<char> {
    if header.contains(',') {
        Some(',')
    } else if header.contains(';') {
        Some(';')
    } else {
        None
    }
}

fn split_cells(line: &str, delimiter: Option<char>) -> Vec<String> {
    match delimiter {
        Some(ch) => line.split(ch).map(|cell| cell.trim().to_string()).collect(),
        None => line.split_whitespace().map(str::to_string).collect(),
    }
}
