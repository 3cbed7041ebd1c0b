//! Tests for ingestion normalization and the CSV round trip

use std::sync::Arc;

use arrow::array::{Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;

use ehr_board::ingest::{self, csv::load_events_csv};
use ehr_board::models::ActivityEvent;
use ehr_board::{kpi, report, synthetic, utils};

fn loose_batch() -> RecordBatch {
    // the shape a spreadsheet export typically lands in: string timestamps,
    // 0/1 flags, no minutes column
    let schema = Arc::new(Schema::new(vec![
        Field::new("visit_id", DataType::Utf8, false),
        Field::new("clinician_id", DataType::Utf8, false),
        Field::new("department", DataType::Utf8, false),
        Field::new("activity", DataType::Utf8, false),
        Field::new("start_time", DataType::Utf8, false),
        Field::new("end_time", DataType::Utf8, false),
        Field::new("is_after_hours", DataType::Int64, false),
        Field::new("is_ai_note", DataType::Utf8, false),
        Field::new("ai_edit_minutes", DataType::Int64, false),
    ]));
    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from(vec!["V1", "V1", "V2"])),
            Arc::new(StringArray::from(vec!["C01", "C01", "C02"])),
            Arc::new(StringArray::from(vec![
                "Cardiologia",
                "Cardiologia",
                "Neurologia",
            ])),
            Arc::new(StringArray::from(vec![
                "documentation",
                "orders",
                "documentation",
            ])),
            Arc::new(StringArray::from(vec![
                "2025-03-10 09:00:00",
                "2025-03-10 09:08:00",
                "2025-03-10T10:00:00",
            ])),
            Arc::new(StringArray::from(vec![
                "2025-03-10 09:08:00",
                "2025-03-10 09:12:00",
                "2025-03-10T10:06:00",
            ])),
            Arc::new(Int64Array::from(vec![0, 0, 1])),
            Arc::new(StringArray::from(vec!["yes", "no", "0"])),
            Arc::new(Int64Array::from(vec![2, 0, 0])),
        ],
    )
    .unwrap()
}

#[test]
fn normalization_derives_minutes_and_coerces_flags() {
    let normalized = ingest::normalize_events(&loose_batch()).unwrap();

    let events = ActivityEvent::from_record_batch(&normalized).unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].minutes, 8.0);
    assert_eq!(events[1].minutes, 4.0);
    assert_eq!(events[2].minutes, 6.0);
    assert!(events[0].is_ai_note);
    assert!(!events[1].is_ai_note);
    assert!(events[2].is_after_hours);
    assert_eq!(events[0].ai_edit_minutes, 2.0);

    // the KPI layer accepts the normalized table directly
    assert!((kpi::avg_minutes_per_visit(&normalized) - 9.0).abs() < 1e-9);
}

#[test]
fn csv_round_trip_preserves_rows_and_minutes() {
    let events = synthetic::synthesize_events(35, 4, 123);
    let batch = ActivityEvent::to_record_batch(&events).unwrap();

    let dir = std::env::temp_dir().join(format!("ehr_board_roundtrip_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("clinical_logs.csv");

    report::write_events_csv(&batch, &path).unwrap();
    let reloaded = load_events_csv(&path).unwrap();
    let reloaded = utils::concat_batches(&reloaded).unwrap();

    assert_eq!(reloaded.num_rows(), batch.num_rows());

    let original = kpi::total_minutes_per_visit(&batch);
    let roundtripped = kpi::total_minutes_per_visit(&reloaded);
    assert_eq!(original, roundtripped);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn unrecognized_columns_are_a_schema_error() {
    let schema = Arc::new(Schema::new(vec![Field::new(
        "not_a_column",
        DataType::Utf8,
        false,
    )]));
    let batch = RecordBatch::try_new(
        schema,
        vec![Arc::new(StringArray::from(vec!["x"])) as arrow::array::ArrayRef],
    )
    .unwrap();
    assert!(ingest::normalize_events(&batch).is_err());
}

#[test]
fn missing_files_are_terminal_errors() {
    assert!(load_events_csv(std::path::Path::new("no_such_file.csv")).is_err());
    assert!(
        ingest::json::load_patients_json(std::path::Path::new("no_such_file.json")).is_err()
    );
}
