//! Activity event model
//!
//! One row of the EHR activity log: a single activity performed by a
//! clinician during a visit, with its duration and documentation flags.

use std::sync::Arc;

use arrow::array::{
    BooleanBuilder, Float64Builder, StringBuilder, TimestampMillisecondBuilder,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{EhrBoardError, Result};
use crate::utils;

/// The activity kinds an event row can carry
pub const ACTIVITIES: [&str; 4] = ["documentation", "chart_review", "orders", "inbox"];

/// Column names of the canonical event table
pub const VISIT_ID: &str = "visit_id";
pub const CLINICIAN_ID: &str = "clinician_id";
pub const DEPARTMENT: &str = "department";
pub const ACTIVITY: &str = "activity";
pub const START_TIME: &str = "start_time";
pub const END_TIME: &str = "end_time";
pub const MINUTES: &str = "minutes";
pub const IS_AFTER_HOURS: &str = "is_after_hours";
pub const IS_AI_NOTE: &str = "is_ai_note";
pub const AI_EDIT_MINUTES: &str = "ai_edit_minutes";

/// One row of the EHR activity log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEvent {
    /// Identifier of the visit the activity belongs to
    pub visit_id: String,
    /// Identifier of the clinician performing the activity
    pub clinician_id: String,
    /// Department the visit took place in
    pub department: String,
    /// Activity kind (documentation, chart_review, orders, inbox)
    pub activity: String,
    /// When the activity started
    pub start_time: NaiveDateTime,
    /// When the activity ended; never before `start_time`
    pub end_time: NaiveDateTime,
    /// Duration in minutes
    pub minutes: f64,
    /// Whether the activity ended after regular hours
    pub is_after_hours: bool,
    /// Whether the documentation entry was machine-assisted
    pub is_ai_note: bool,
    /// Minutes spent correcting a machine-assisted note
    pub ai_edit_minutes: f64,
}

impl ActivityEvent {
    /// Get the Arrow schema of the canonical event table
    #[must_use]
    pub fn schema() -> Schema {
        Schema::new(vec![
            Field::new(VISIT_ID, DataType::Utf8, false),
            Field::new(CLINICIAN_ID, DataType::Utf8, false),
            Field::new(DEPARTMENT, DataType::Utf8, false),
            Field::new(ACTIVITY, DataType::Utf8, false),
            Field::new(START_TIME, DataType::Timestamp(TimeUnit::Millisecond, None), false),
            Field::new(END_TIME, DataType::Timestamp(TimeUnit::Millisecond, None), false),
            Field::new(MINUTES, DataType::Float64, false),
            Field::new(IS_AFTER_HOURS, DataType::Boolean, false),
            Field::new(IS_AI_NOTE, DataType::Boolean, false),
            Field::new(AI_EDIT_MINUTES, DataType::Float64, false),
        ])
    }

    /// Convert event rows into a record batch with the canonical schema
    pub fn to_record_batch(events: &[Self]) -> Result<RecordBatch> {
        let mut visit_id = StringBuilder::new();
        let mut clinician_id = StringBuilder::new();
        let mut department = StringBuilder::new();
        let mut activity = StringBuilder::new();
        let mut start_time = TimestampMillisecondBuilder::new();
        let mut end_time = TimestampMillisecondBuilder::new();
        let mut minutes = Float64Builder::new();
        let mut is_after_hours = BooleanBuilder::new();
        let mut is_ai_note = BooleanBuilder::new();
        let mut ai_edit_minutes = Float64Builder::new();

        for event in events {
            visit_id.append_value(&event.visit_id);
            clinician_id.append_value(&event.clinician_id);
            department.append_value(&event.department);
            activity.append_value(&event.activity);
            start_time.append_value(utils::timestamp_to_millis(event.start_time));
            end_time.append_value(utils::timestamp_to_millis(event.end_time));
            minutes.append_value(event.minutes);
            is_after_hours.append_value(event.is_after_hours);
            is_ai_note.append_value(event.is_ai_note);
            ai_edit_minutes.append_value(event.ai_edit_minutes);
        }

        Ok(RecordBatch::try_new(
            Arc::new(Self::schema()),
            vec![
                Arc::new(visit_id.finish()),
                Arc::new(clinician_id.finish()),
                Arc::new(department.finish()),
                Arc::new(activity.finish()),
                Arc::new(start_time.finish()),
                Arc::new(end_time.finish()),
                Arc::new(minutes.finish()),
                Arc::new(is_after_hours.finish()),
                Arc::new(is_ai_note.finish()),
                Arc::new(ai_edit_minutes.finish()),
            ],
        )?)
    }

    /// Convert a record batch back into event rows
    ///
    /// Columns are read leniently, so batches coming straight from a CSV or
    /// PDF source convert too: `minutes` is derived from the timestamps when
    /// the column is absent, flag columns accept `0/1` and `true/false`
    /// encodings, and rows missing a required value are skipped.
    pub fn from_record_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        for required in [VISIT_ID, CLINICIAN_ID, DEPARTMENT, ACTIVITY, START_TIME, END_TIME] {
            if batch.schema().index_of(required).is_err() {
                return Err(EhrBoardError::SchemaError(format!(
                    "event table is missing required column '{required}'"
                )));
            }
        }

        let visit_id = utils::get_column(batch, VISIT_ID);
        let clinician_id = utils::get_column(batch, CLINICIAN_ID);
        let department = utils::get_column(batch, DEPARTMENT);
        let activity = utils::get_column(batch, ACTIVITY);
        let start_time = utils::get_column(batch, START_TIME);
        let end_time = utils::get_column(batch, END_TIME);
        let minutes = utils::get_column(batch, MINUTES);
        let is_after_hours = utils::get_column(batch, IS_AFTER_HOURS);
        let is_ai_note = utils::get_column(batch, IS_AI_NOTE);
        let ai_edit_minutes = utils::get_column(batch, AI_EDIT_MINUTES);

        let mut events = Vec::with_capacity(batch.num_rows());
        for row in 0..batch.num_rows() {
            let Some(event) = Self::from_row(
                row,
                visit_id.as_deref(),
                clinician_id.as_deref(),
                department.as_deref(),
                activity.as_deref(),
                start_time.as_deref(),
                end_time.as_deref(),
                minutes.as_deref(),
                is_after_hours.as_deref(),
                is_ai_note.as_deref(),
                ai_edit_minutes.as_deref(),
            ) else {
                continue;
            };
            events.push(event);
        }
        Ok(events)
    }

    #[allow(clippy::too_many_arguments)]
    fn from_row(
        row: usize,
        visit_id: Option<&dyn arrow::array::Array>,
        clinician_id: Option<&dyn arrow::array::Array>,
        department: Option<&dyn arrow::array::Array>,
        activity: Option<&dyn arrow::array::Array>,
        start_time: Option<&dyn arrow::array::Array>,
        end_time: Option<&dyn arrow::array::Array>,
        minutes: Option<&dyn arrow::array::Array>,
        is_after_hours: Option<&dyn arrow::array::Array>,
        is_ai_note: Option<&dyn arrow::array::Array>,
        ai_edit_minutes: Option<&dyn arrow::array::Array>,
    ) -> Option<Self> {
        let start = utils::value_as_timestamp(start_time?, row)?;
        let end = utils::value_as_timestamp(end_time?, row)?;
        let minutes = minutes
            .and_then(|col| utils::value_as_f64(col, row))
            .unwrap_or_else(|| ((end - start).num_seconds() / 60) as f64);

        Some(Self {
            visit_id: utils::value_as_string(visit_id?, row)?,
            clinician_id: utils::value_as_string(clinician_id?, row)?,
            department: utils::value_as_string(department?, row)?,
            activity: utils::value_as_string(activity?, row)?,
            start_time: start,
            end_time: end,
            minutes,
            is_after_hours: is_after_hours
                .and_then(|col| utils::value_as_bool(col, row))
                .unwrap_or(false),
            is_ai_note: is_ai_note
                .and_then(|col| utils::value_as_bool(col, row))
                .unwrap_or(false),
            ai_edit_minutes: ai_edit_minutes
                .and_then(|col| utils::value_as_f64(col, row))
                .unwrap_or(0.0),
        })
    }
}
