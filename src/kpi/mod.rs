//! KPI aggregations over the event table
//!
//! Every function here takes the working event table and degrades to a
//! zero or empty result when a column it needs is absent or the table is
//! empty. That silent substitution is deliberate: an uploaded CSV missing a
//! column should thin the dashboard out, not fail the render pass.

use arrow::array::Array;
use arrow::record_batch::RecordBatch;
use itertools::Itertools;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::models::event;
use crate::models::StayRecord;
use crate::utils;

/// Headline KPI cards for the activity dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiOverview {
    pub avg_minutes_per_visit: f64,
    pub avg_after_hours_minutes_per_visit: f64,
    pub ai_note_share_percent: f64,
    pub ai_correction_avg_minutes: f64,
}

/// Total time one activity kind accounts for
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityShare {
    pub activity: String,
    pub minutes: f64,
    /// Share of the table's total minutes, rounded to one decimal
    pub percent: f64,
}

/// Headline figures for the admissions dashboard
#[derive(Debug, Clone, PartialEq)]
pub struct StayOverview {
    pub unique_patients: usize,
    pub total_stays: usize,
    pub mean_length_days: f64,
}

/// Total minutes per visit, sorted by visit identifier
#[must_use]
pub fn total_minutes_per_visit(batch: &RecordBatch) -> Vec<(String, f64)> {
    let Some(visits) = utils::string_column(batch, event::VISIT_ID) else {
        return Vec::new();
    };
    let Some(minutes) = utils::float64_column(batch, event::MINUTES) else {
        return Vec::new();
    };

    let mut totals: FxHashMap<String, f64> = FxHashMap::default();
    for row in 0..batch.num_rows() {
        if visits.is_null(row) || minutes.is_null(row) {
            continue;
        }
        *totals.entry(visits.value(row).to_string()).or_insert(0.0) += minutes.value(row);
    }

    totals
        .into_iter()
        .sorted_by(|a, b| a.0.cmp(&b.0))
        .collect()
}

/// Mean of the per-visit totals; 0.0 on an empty table
#[must_use]
pub fn avg_minutes_per_visit(batch: &RecordBatch) -> f64 {
    let totals = total_minutes_per_visit(batch);
    if totals.is_empty() {
        return 0.0;
    }
    totals.iter().map(|(_, m)| m).sum::<f64>() / totals.len() as f64
}

/// Time share by activity kind, descending by total minutes
///
/// Minute values sum to the table's total and the percentages to 100
/// (within rounding). Empty when the table has no minutes at all.
#[must_use]
pub fn share_time_by_activity(batch: &RecordBatch) -> Vec<ActivityShare> {
    let Some(activities) = utils::string_column(batch, event::ACTIVITY) else {
        return Vec::new();
    };
    let Some(minutes) = utils::float64_column(batch, event::MINUTES) else {
        return Vec::new();
    };

    let mut by_activity: FxHashMap<String, f64> = FxHashMap::default();
    let mut total = 0.0;
    for row in 0..batch.num_rows() {
        if activities.is_null(row) || minutes.is_null(row) {
            continue;
        }
        let value = minutes.value(row);
        *by_activity
            .entry(activities.value(row).to_string())
            .or_insert(0.0) += value;
        total += value;
    }
    if total == 0.0 {
        return Vec::new();
    }

    by_activity
        .into_iter()
        .sorted_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
        .map(|(activity, mins)| ActivityShare {
            activity,
            minutes: mins,
            percent: round_to(mins / total * 100.0, 1),
        })
        .collect()
}

/// Mean after-hours minutes per visit; visits without after-hours work count as 0
#[must_use]
pub fn avg_after_hours_minutes_per_visit(batch: &RecordBatch) -> f64 {
    let Some(visits) = utils::string_column(batch, event::VISIT_ID) else {
        return 0.0;
    };
    let Some(after_hours) = utils::boolean_column(batch, event::IS_AFTER_HOURS) else {
        return 0.0;
    };
    let Some(minutes) = utils::float64_column(batch, event::MINUTES) else {
        return 0.0;
    };

    let mut per_visit: FxHashMap<String, f64> = FxHashMap::default();
    for row in 0..batch.num_rows() {
        if visits.is_null(row) {
            continue;
        }
        let entry = per_visit.entry(visits.value(row).to_string()).or_insert(0.0);
        if !after_hours.is_null(row) && after_hours.value(row) && !minutes.is_null(row) {
            *entry += minutes.value(row);
        }
    }
    if per_visit.is_empty() {
        return 0.0;
    }
    per_visit.values().sum::<f64>() / per_visit.len() as f64
}

/// Percentage of visits with at least one machine-assisted note
#[must_use]
pub fn ai_note_share(batch: &RecordBatch) -> f64 {
    let Some(visits) = utils::string_column(batch, event::VISIT_ID) else {
        return 0.0;
    };
    let Some(ai_notes) = utils::boolean_column(batch, event::IS_AI_NOTE) else {
        return 0.0;
    };

    let mut per_visit: FxHashMap<String, bool> = FxHashMap::default();
    for row in 0..batch.num_rows() {
        if visits.is_null(row) {
            continue;
        }
        let entry = per_visit.entry(visits.value(row).to_string()).or_insert(false);
        if !ai_notes.is_null(row) && ai_notes.value(row) {
            *entry = true;
        }
    }
    if per_visit.is_empty() {
        return 0.0;
    }
    let flagged = per_visit.values().filter(|&&ai| ai).count();
    flagged as f64 / per_visit.len() as f64 * 100.0
}

/// Mean correction minutes over machine-assisted documentation rows
#[must_use]
pub fn ai_correction_avg_minutes(batch: &RecordBatch) -> f64 {
    let Some(activities) = utils::string_column(batch, event::ACTIVITY) else {
        return 0.0;
    };
    let Some(ai_notes) = utils::boolean_column(batch, event::IS_AI_NOTE) else {
        return 0.0;
    };
    let Some(edit_minutes) = utils::float64_column(batch, event::AI_EDIT_MINUTES) else {
        return 0.0;
    };

    let mut sum = 0.0;
    let mut count = 0usize;
    for row in 0..batch.num_rows() {
        if activities.is_null(row) || ai_notes.is_null(row) || edit_minutes.is_null(row) {
            continue;
        }
        if activities.value(row) == "documentation" && ai_notes.value(row) {
            sum += edit_minutes.value(row);
            count += 1;
        }
    }
    if count == 0 {
        return 0.0;
    }
    sum / count as f64
}

/// Total minutes per clinician, descending
#[must_use]
pub fn clinicians_workload(batch: &RecordBatch) -> Vec<(String, f64)> {
    let Some(clinicians) = utils::string_column(batch, event::CLINICIAN_ID) else {
        return Vec::new();
    };
    let Some(minutes) = utils::float64_column(batch, event::MINUTES) else {
        return Vec::new();
    };

    let mut totals: FxHashMap<String, f64> = FxHashMap::default();
    for row in 0..batch.num_rows() {
        if clinicians.is_null(row) || minutes.is_null(row) {
            continue;
        }
        *totals
            .entry(clinicians.value(row).to_string())
            .or_insert(0.0) += minutes.value(row);
    }

    totals
        .into_iter()
        .sorted_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
        .collect()
}

/// Visits whose total minutes exceed the upper Tukey fence (Q3 + 1.5×IQR),
/// descending by total minutes
#[must_use]
pub fn outlier_visits(batch: &RecordBatch) -> Vec<(String, f64)> {
    let totals = total_minutes_per_visit(batch);
    if totals.is_empty() {
        return Vec::new();
    }

    let sorted: Vec<f64> = totals
        .iter()
        .map(|(_, m)| *m)
        .sorted_by(f64::total_cmp)
        .collect();
    let q1 = quantile(&sorted, 0.25);
    let q3 = quantile(&sorted, 0.75);
    let fence = q3 + 1.5 * (q3 - q1);

    totals
        .into_iter()
        .filter(|(_, m)| *m > fence)
        .sorted_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
        .collect()
}

/// The four headline KPI cards, rounded for display
#[must_use]
pub fn kpi_overview(batch: &RecordBatch) -> KpiOverview {
    KpiOverview {
        avg_minutes_per_visit: round_to(avg_minutes_per_visit(batch), 1),
        avg_after_hours_minutes_per_visit: round_to(avg_after_hours_minutes_per_visit(batch), 2),
        ai_note_share_percent: round_to(ai_note_share(batch), 1),
        ai_correction_avg_minutes: round_to(ai_correction_avg_minutes(batch), 2),
    }
}

/// Headline figures for the admissions table
#[must_use]
pub fn stay_overview(stays: &[StayRecord]) -> StayOverview {
    let unique_patients = stays
        .iter()
        .map(|s| s.patient_name.as_str())
        .collect::<rustc_hash::FxHashSet<_>>()
        .len();
    let lengths: Vec<f64> = stays
        .iter()
        .filter_map(|s| s.length_days)
        .map(|d| d as f64)
        .collect();
    let mean_length_days = if lengths.is_empty() {
        0.0
    } else {
        lengths.iter().sum::<f64>() / lengths.len() as f64
    };
    StayOverview {
        unique_patients,
        total_stays: stays.len(),
        mean_length_days,
    }
}

/// Quantile by linear interpolation over a sorted slice
fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (pos - lo as f64) * (sorted[hi] - sorted[lo])
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
