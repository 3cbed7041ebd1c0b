//! Tests for the KPI aggregation layer
//!
//! Covers the summation and fencing properties the dashboard relies on, and
//! the silent degradation to zero/empty results on thin tables.

use std::sync::Arc;

use arrow::array::StringArray;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;

use ehr_board::kpi;
use ehr_board::models::ActivityEvent;

fn event(
    visit: &str,
    clinician: &str,
    activity: &str,
    minutes: f64,
    after_hours: bool,
    ai_note: bool,
    ai_edit: f64,
) -> ActivityEvent {
    let start = NaiveDate::from_ymd_opt(2025, 3, 10)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();
    ActivityEvent {
        visit_id: visit.to_string(),
        clinician_id: clinician.to_string(),
        department: "Cardiologia".to_string(),
        activity: activity.to_string(),
        start_time: start,
        end_time: start + chrono::Duration::minutes(minutes as i64),
        minutes,
        is_after_hours: after_hours,
        is_ai_note: ai_note,
        ai_edit_minutes: ai_edit,
    }
}

#[test]
fn activity_shares_sum_to_table_total() {
    let events = vec![
        event("V1", "C01", "documentation", 10.0, false, false, 0.0),
        event("V1", "C01", "orders", 5.0, false, false, 0.0),
        event("V2", "C02", "documentation", 7.0, false, false, 0.0),
        event("V2", "C02", "inbox", 3.0, false, false, 0.0),
    ];
    let batch = ActivityEvent::to_record_batch(&events).unwrap();

    let shares = kpi::share_time_by_activity(&batch);
    let total_minutes: f64 = shares.iter().map(|s| s.minutes).sum();
    assert!((total_minutes - 25.0).abs() < 1e-9);

    let total_percent: f64 = shares.iter().map(|s| s.percent).sum();
    assert!((total_percent - 100.0).abs() < 0.5);

    // descending by minutes
    assert_eq!(shares[0].activity, "documentation");
    assert!((shares[0].minutes - 17.0).abs() < 1e-9);
}

#[test]
fn outliers_are_strictly_above_the_tukey_fence() {
    // nineteen ordinary visits and one extreme one
    let mut events = Vec::new();
    for idx in 0..19 {
        events.push(event(
            &format!("V{idx:02}"),
            "C01",
            "documentation",
            10.0 + (idx % 3) as f64,
            false,
            false,
            0.0,
        ));
    }
    events.push(event("V99", "C01", "documentation", 500.0, false, false, 0.0));
    let batch = ActivityEvent::to_record_batch(&events).unwrap();

    let outliers = kpi::outlier_visits(&batch);
    assert_eq!(outliers.len(), 1);
    assert_eq!(outliers[0].0, "V99");
    assert!((outliers[0].1 - 500.0).abs() < 1e-9);
}

#[test]
fn uniform_visits_have_no_outliers() {
    let events: Vec<ActivityEvent> = (0..10)
        .map(|idx| event(&format!("V{idx}"), "C01", "orders", 12.0, false, false, 0.0))
        .collect();
    let batch = ActivityEvent::to_record_batch(&events).unwrap();
    assert!(kpi::outlier_visits(&batch).is_empty());
}

#[test]
fn empty_table_degrades_to_zero() {
    let batch = ActivityEvent::to_record_batch(&[]).unwrap();
    assert_eq!(kpi::avg_minutes_per_visit(&batch), 0.0);
    assert_eq!(kpi::avg_after_hours_minutes_per_visit(&batch), 0.0);
    assert_eq!(kpi::ai_note_share(&batch), 0.0);
    assert_eq!(kpi::ai_correction_avg_minutes(&batch), 0.0);
    assert!(kpi::share_time_by_activity(&batch).is_empty());
    assert!(kpi::clinicians_workload(&batch).is_empty());
    assert!(kpi::outlier_visits(&batch).is_empty());
}

#[test]
fn missing_columns_degrade_to_zero() {
    // a table with nothing but visit identifiers
    let schema = Arc::new(Schema::new(vec![Field::new(
        "visit_id",
        DataType::Utf8,
        false,
    )]));
    let batch = RecordBatch::try_new(
        schema,
        vec![Arc::new(StringArray::from(vec!["V1", "V2", "V3"]))],
    )
    .unwrap();

    assert_eq!(kpi::avg_minutes_per_visit(&batch), 0.0);
    assert_eq!(kpi::avg_after_hours_minutes_per_visit(&batch), 0.0);
    assert_eq!(kpi::ai_note_share(&batch), 0.0);
    assert_eq!(kpi::ai_correction_avg_minutes(&batch), 0.0);
    assert!(kpi::share_time_by_activity(&batch).is_empty());
    assert!(kpi::clinicians_workload(&batch).is_empty());
    assert!(kpi::total_minutes_per_visit(&batch).is_empty());
}

#[test]
fn after_hours_mean_counts_quiet_visits_as_zero() {
    let events = vec![
        event("V1", "C01", "documentation", 20.0, true, false, 0.0),
        event("V2", "C01", "documentation", 10.0, false, false, 0.0),
    ];
    let batch = ActivityEvent::to_record_batch(&events).unwrap();
    // (20 + 0) / 2 visits
    assert!((kpi::avg_after_hours_minutes_per_visit(&batch) - 10.0).abs() < 1e-9);
}

#[test]
fn ai_metrics_only_look_at_flagged_documentation() {
    let events = vec![
        event("V1", "C01", "documentation", 6.0, false, true, 2.0),
        event("V1", "C01", "orders", 4.0, false, false, 0.0),
        event("V2", "C01", "documentation", 5.0, false, false, 0.0),
        // a flagged non-documentation row must not count towards corrections
        event("V3", "C01", "inbox", 2.0, false, true, 9.0),
    ];
    let batch = ActivityEvent::to_record_batch(&events).unwrap();

    // two of three visits carry an AI flag somewhere
    assert!((kpi::ai_note_share(&batch) - 66.666).abs() < 0.01);
    // only V1's documentation row counts
    assert!((kpi::ai_correction_avg_minutes(&batch) - 2.0).abs() < 1e-9);
}

#[test]
fn workload_is_sorted_descending() {
    let events = vec![
        event("V1", "C02", "documentation", 5.0, false, false, 0.0),
        event("V2", "C01", "documentation", 20.0, false, false, 0.0),
        event("V3", "C02", "orders", 4.0, false, false, 0.0),
        event("V4", "C03", "orders", 11.0, false, false, 0.0),
    ];
    let batch = ActivityEvent::to_record_batch(&events).unwrap();

    let workload = kpi::clinicians_workload(&batch);
    assert_eq!(workload.len(), 3);
    assert_eq!(workload[0], ("C01".to_string(), 20.0));
    assert_eq!(workload[1], ("C03".to_string(), 11.0));
    assert_eq!(workload[2], ("C02".to_string(), 9.0));
}

#[test]
fn overview_rounds_for_display() {
    let events = vec![
        event("V1", "C01", "documentation", 7.0, false, true, 1.0),
        event("V2", "C01", "documentation", 6.0, false, false, 0.0),
        event("V3", "C01", "documentation", 6.0, false, false, 0.0),
    ];
    let batch = ActivityEvent::to_record_batch(&events).unwrap();

    let overview = kpi::kpi_overview(&batch);
    assert!((overview.avg_minutes_per_visit - 6.3).abs() < 1e-9);
    assert!((overview.ai_note_share_percent - 33.3).abs() < 1e-9);
    assert!((overview.ai_correction_avg_minutes - 1.0).abs() < 1e-9);
}
