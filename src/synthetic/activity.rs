//! Synthetic EHR activity logs
//!
//! Mirrors the shape of real clinician activity: every visit gets one row
//! per activity kind with consecutive timestamps, a minority of visits carry
//! a machine-assisted documentation note, and roughly one visit in ten picks
//! up an extra after-hours documentation block ("pajama time").

use chrono::{Duration, Local, NaiveDateTime, Timelike};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use super::sample_normal;
use crate::models::event::ACTIVITIES;
use crate::models::ActivityEvent;

/// Departments synthetic visits are spread across
pub const DEPARTMENTS: [&str; 7] = [
    "Cardiologia",
    "Pronto Soccorso",
    "Medicina Generale / Interna",
    "Neurologia",
    "Chirurgia Generale",
    "Pediatria",
    "Ortopedia e Traumatologia",
];

/// Generate a synthetic activity log
///
/// Visits are spread evenly across the departments, so the row count is a
/// multiple of four per visit actually generated (plus the after-hours
/// extras). Visit identifiers are unique and zero-padded.
#[must_use]
pub fn synthesize_events(n_visits: usize, n_clinicians: usize, seed: u64) -> Vec<ActivityEvent> {
    let mut rng = StdRng::seed_from_u64(seed);
    let clinicians: Vec<String> = (1..=n_clinicians).map(|idx| format!("C{idx:02}")).collect();

    let base_day = Local::now()
        .date_naive()
        .and_hms_opt(9, 0, 0)
        .expect("09:00 is a valid time of day");

    let mut rows = Vec::new();
    let mut visit_counter = 0usize;
    let visits_per_department = n_visits / DEPARTMENTS.len();

    for department in DEPARTMENTS {
        for _ in 0..visits_per_department {
            let visit_id = format!("V{visit_counter:05}");
            let clinician = clinicians
                .choose(&mut rng)
                .cloned()
                .unwrap_or_else(|| "C01".to_string());

            // minute buckets per activity, roughly 12-20 min per visit
            let documentation = sample_normal(&mut rng, 6.0, 2.0).trunc().max(4.0);
            let chart_review = sample_normal(&mut rng, 5.0, 2.0).trunc().max(3.0);
            let orders = sample_normal(&mut rng, 4.0, 1.0).trunc().max(2.0);
            let inbox = sample_normal(&mut rng, 2.0, 1.0).trunc().max(1.0);
            let buckets = [documentation, chart_review, orders, inbox];

            // visit starts somewhere in the 9-15 window
            let start = base_day + Duration::minutes(rng.random_range(0..60 * 6));
            let mut cursor = start;

            // 20-35% of visits carry a machine-assisted note
            let ai_flag = rng.random::<f64>() < rng.random_range(0.2..0.35);
            let ai_edit = if ai_flag {
                sample_normal(&mut rng, 1.5, 0.8).trunc().max(0.0)
            } else {
                0.0
            };

            for (activity, minutes) in ACTIVITIES.iter().zip(buckets) {
                let end = cursor + Duration::minutes(minutes as i64);
                let is_documentation = *activity == "documentation";
                rows.push(ActivityEvent {
                    visit_id: visit_id.clone(),
                    clinician_id: clinician.clone(),
                    department: department.to_string(),
                    activity: (*activity).to_string(),
                    start_time: cursor,
                    end_time: end,
                    minutes,
                    is_after_hours: end.hour() >= 18,
                    is_ai_note: is_documentation && ai_flag,
                    ai_edit_minutes: if is_documentation && ai_flag { ai_edit } else { 0.0 },
                });
                cursor = end;
            }

            // ~10% of visits spill into the evening
            if rng.random::<f64>() < 0.1 {
                let extra = sample_normal(&mut rng, 12.0, 5.0).trunc().max(5.0);
                let evening = evening_slot(cursor, rng.random_range(0..60));
                rows.push(ActivityEvent {
                    visit_id: visit_id.clone(),
                    clinician_id: clinician.clone(),
                    department: department.to_string(),
                    activity: "documentation".to_string(),
                    start_time: evening,
                    end_time: evening + Duration::minutes(extra as i64),
                    minutes: extra,
                    is_after_hours: true,
                    is_ai_note: false,
                    ai_edit_minutes: 0.0,
                });
            }

            visit_counter += 1;
        }
    }

    rows
}

fn evening_slot(reference: NaiveDateTime, minute: u32) -> NaiveDateTime {
    reference
        .date()
        .and_hms_opt(19, minute, 0)
        .unwrap_or(reference)
}
