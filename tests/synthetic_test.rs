//! Tests for the synthetic generators
//!
//! The visit identifiers in particular: they must be interpolated, unique
//! values, not a literal template string.

use ehr_board::models::event::ACTIVITIES;
use ehr_board::synthetic;
use rustc_hash::FxHashSet;

#[test]
fn visit_ids_are_interpolated_and_unique() {
    let events = synthetic::synthesize_events(70, 8, 42);

    let visit_ids: FxHashSet<&str> = events.iter().map(|e| e.visit_id.as_str()).collect();
    // 70 visits over 7 departments → all 70 generated
    assert_eq!(visit_ids.len(), 70);
    for id in &visit_ids {
        assert!(!id.contains('{'), "unexpanded template token in '{id}'");
        assert!(id.starts_with('V') && id.len() == 6, "malformed id '{id}'");
        assert!(id[1..].chars().all(|c| c.is_ascii_digit()));
    }
}

#[test]
fn every_visit_gets_the_four_activity_rows() {
    let events = synthetic::synthesize_events(70, 8, 42);
    // four activities per visit, plus the occasional after-hours extra
    assert!(events.len() >= 70 * 4);
    assert!(events.len() <= 70 * 5);

    let activities: FxHashSet<&str> = events.iter().map(|e| e.activity.as_str()).collect();
    for activity in ACTIVITIES {
        assert!(activities.contains(activity));
    }
}

#[test]
fn events_are_internally_consistent() {
    let events = synthetic::synthesize_events(140, 10, 7);
    for event in &events {
        assert!(event.end_time >= event.start_time);
        assert!(event.minutes >= 1.0);
        if event.is_ai_note {
            assert_eq!(event.activity, "documentation");
        }
        if event.ai_edit_minutes > 0.0 {
            assert!(event.is_ai_note);
        }
    }
}

#[test]
fn same_seed_reproduces_the_log() {
    let a = synthetic::synthesize_events(70, 5, 99);
    let b = synthetic::synthesize_events(70, 5, 99);
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(&b) {
        assert_eq!(x.visit_id, y.visit_id);
        assert_eq!(x.clinician_id, y.clinician_id);
        assert_eq!(x.minutes, y.minutes);
    }
}

#[test]
fn admissions_honor_the_one_day_floor() {
    let admissions = synthetic::synthesize_admissions(100, 300, 42);
    assert_eq!(admissions.len(), 300);
    for admission in &admissions {
        assert!(admission.length_days >= 1);
        let derived = (admission.discharge_date - admission.admission_date).num_days();
        assert_eq!(derived, admission.length_days);
        assert!(ehr_board::models::admission::SEVERITY_TIERS
            .contains(&admission.severity.as_str()));
        assert!(admission.age >= 18 && admission.age <= 95);
    }
}

#[test]
fn comorbidity_strings_are_well_formed() {
    let admissions = synthetic::synthesize_admissions(80, 200, 5);
    for admission in &admissions {
        if admission.comorbidities == "None" {
            continue;
        }
        for item in admission.comorbidities.split(';') {
            assert!(!item.trim().is_empty());
        }
    }
}

#[test]
fn admissions_survive_the_record_batch_round_trip() {
    let admissions = synthetic::synthesize_admissions(30, 60, 21);
    let batch = ehr_board::models::Admission::to_record_batch(&admissions).unwrap();
    assert_eq!(batch.num_rows(), admissions.len());

    let restored = ehr_board::models::Admission::from_record_batch(&batch).unwrap();
    assert_eq!(restored, admissions);
}

#[test]
fn maternity_admissions_are_rerouted_for_implausible_patients() {
    let admissions = synthetic::synthesize_admissions(200, 600, 13);
    for admission in &admissions {
        if admission.group == "Maternita_Pediatria" {
            assert_eq!(admission.sex, "F");
            assert!(admission.age <= 45);
        }
    }
}
