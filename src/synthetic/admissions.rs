//! Synthetic clinical admission records
//!
//! A pool of patients is generated first, then admissions are drawn against
//! it with correlated clinical logic: the diagnosis fixes the department
//! group and a base length of stay, severity and comorbidities stretch the
//! stay, and the vital-sign and lab values shift with diagnosis, surgery and
//! severity. Length of stay never drops below one day.

use chrono::{Duration, Local, NaiveDate};
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use super::sample_normal;
use crate::models::Admission;

const FIRST_NAMES_M: [&str; 9] = [
    "Marco", "Paolo", "Andrea", "Giovanni", "Giuseppe", "Raffaele", "Luca", "Alessandro", "Davide",
];
const FIRST_NAMES_F: [&str; 7] = [
    "Giulia", "Chiara", "Maria", "Laura", "Sara", "Francesca", "Elena",
];
const LAST_NAMES: [&str; 11] = [
    "Romano", "Russo", "Marino", "Rossi", "Ferrari", "Bianchi", "Gallo", "Giordano", "Ricci",
    "Verdi", "Esposito",
];

/// Diagnosis, clinical macro-group and base length of stay in days
const DIAGNOSES: [(&str, &str, i64); 10] = [
    ("Polmonite", "Medicina", 8),
    ("Insufficienza Renale", "Medicina", 7),
    ("Frattura", "Chirurgia", 5),
    ("Diabete", "Medicina", 4),
    ("Ipertensione", "Medicina", 3),
    ("Neoplasia", "Chirurgia", 12),
    ("Ictus", "Neurologia", 10),
    ("Asma", "Medicina", 3),
    ("Parto", "Maternita_Pediatria", 3),
    ("Riabilitazione post-op", "Riabilitazione", 15),
];

const COMORBIDITY_OPTIONS: [&str; 6] = [
    "Diabete",
    "Ipertensione",
    "Insufficienza Renale",
    "BPCO",
    "Fibrillazione Atriale",
    "Obesità",
];

fn departments_for_group(group: &str) -> &'static [&'static str] {
    match group {
        "Medicina" => &[
            "Cardiologia",
            "Gastroenterologia",
            "Endocrinologia",
            "Nefrologia",
            "Geriatria",
            "Medicina Interna",
            "Medicina d'Urgenza",
            "Pneumologia",
        ],
        "Chirurgia" => &[
            "Chirurgia Generale",
            "Chirurgia Toracica",
            "Chirurgia Vascolare",
            "Chirurgia Plastica",
            "Ortopedia e Traumatologia",
            "Neurochirurgia",
        ],
        "Riabilitazione" => &["Fisioterapia", "Logopedia", "Riabilitazione Generale"],
        "Maternita_Pediatria" => &["Sala Parto", "Ostetricia e Ginecologia", "Pediatria"],
        "Neurologia" => &["Neurologia", "Neuropsichiatria Infantile"],
        _ => &["Dermatologia", "Otorinolaringoiatria (ORL)"],
    }
}

struct SyntheticPatient {
    patient_id: String,
    patient_name: String,
    age: i64,
    sex: &'static str,
}

fn generate_patient_pool(n_patients: usize, rng: &mut StdRng) -> Vec<SyntheticPatient> {
    (1..=n_patients)
        .map(|idx| {
            let sex = if rng.random::<f64>() < 0.5 { "M" } else { "F" };
            let first = if sex == "M" {
                FIRST_NAMES_M.choose(rng)
            } else {
                FIRST_NAMES_F.choose(rng)
            };
            let last = LAST_NAMES.choose(rng);
            SyntheticPatient {
                patient_id: format!("P{idx:04}"),
                patient_name: format!(
                    "{} {}",
                    first.copied().unwrap_or("Andrea"),
                    last.copied().unwrap_or("Rossi")
                ),
                age: rng.random_range(18..=95),
                sex,
            }
        })
        .collect()
}

/// Generate correlated admission records against a synthetic patient pool
#[must_use]
pub fn synthesize_admissions(n_patients: usize, n_admissions: usize, seed: u64) -> Vec<Admission> {
    let mut rng = StdRng::seed_from_u64(seed);
    let pool = generate_patient_pool(n_patients.max(1), &mut rng);
    let today = Local::now().date_naive();

    (1..=n_admissions)
        .filter_map(|idx| {
            let patient = pool.choose(&mut rng)?;
            Some(generate_admission(
                format!("A{idx:05}"),
                patient,
                today,
                &mut rng,
            ))
        })
        .collect()
}

fn generate_admission(
    admission_id: String,
    patient: &SyntheticPatient,
    today: NaiveDate,
    rng: &mut StdRng,
) -> Admission {
    let (mut diagnosis, mut group, mut base_los) = DIAGNOSES
        .choose(rng)
        .copied()
        .unwrap_or(("Frattura", "Chirurgia", 5));

    // maternity admissions only make sense for younger female patients
    if group == "Maternita_Pediatria" && (patient.sex == "M" || patient.age > 45) {
        diagnosis = "Frattura";
        group = "Chirurgia";
        base_los = 5;
    }
    let department = departments_for_group(group)
        .choose(rng)
        .copied()
        .unwrap_or("Medicina Interna");

    let comorbidity_weights =
        WeightedIndex::new([0.3, 0.4, 0.2, 0.1]).expect("static weights are valid");
    let n_comorbidities = comorbidity_weights.sample(rng);
    let comorbidities = if n_comorbidities == 0 {
        "None".to_string()
    } else {
        COMORBIDITY_OPTIONS
            .choose_multiple(rng, n_comorbidities)
            .copied()
            .collect::<Vec<_>>()
            .join(";")
    };

    let severity_weights = WeightedIndex::new([0.5, 0.35, 0.15]).expect("static weights are valid");
    let severity = ["low", "moderate", "high"][severity_weights.sample(rng)];

    let mut los = base_los;
    match severity {
        "moderate" => los += rng.random_range(2..=6),
        "high" => los += rng.random_range(5..=15),
        _ => {}
    }
    if patient.age > 75 {
        los += rng.random_range(1..=5);
    }
    los += n_comorbidities as i64 * rng.random_range(1..=3);

    let surgery = group == "Chirurgia" && rng.random::<f64>() > 0.2;
    if surgery {
        los += rng.random_range(3..=7);
    }
    los += rng.random_range(-2..=2);
    let length_days = los.max(1);

    let admission_date = today - Duration::days(rng.random_range(1..=1095));
    let discharge_date = admission_date + Duration::days(length_days);

    // healthy baselines, shifted below by diagnosis, surgery and severity
    let mut systolic_bp = rng.random_range(115..=130) as f64;
    let mut diastolic_bp = rng.random_range(75..=85) as f64;
    let mut heart_rate = rng.random_range(65..=85) as f64;
    let mut oxygen_saturation = rng.random_range(96..=99) as f64;
    let mut creatinine: f64 = rng.random_range(0.7..1.1);
    let mut white_cell_count = rng.random_range(5000..=9000) as f64;
    let mut crp = rng.random_range(1.0..8.0);

    if diagnosis == "Polmonite" {
        oxygen_saturation = rng.random_range(90..=95) as f64;
        white_cell_count = rng.random_range(11000..=18000) as f64;
        crp = rng.random_range(50.0..150.0);
    } else if diagnosis == "Insufficienza Renale" || comorbidities.contains("Insufficienza Renale")
    {
        creatinine = rng.random_range(1.5..3.5);
        systolic_bp += rng.random_range(10..=20) as f64;
    } else if diagnosis == "Ictus" {
        systolic_bp = rng.random_range(150..=190) as f64;
        heart_rate = rng.random_range(90..=115) as f64;
        crp = rng.random_range(20.0..60.0);
    } else if diagnosis == "Ipertensione" || comorbidities.contains("Ipertensione") {
        systolic_bp += rng.random_range(15..=30) as f64;
        diastolic_bp += rng.random_range(5..=15) as f64;
    }

    if surgery {
        crp += rng.random_range(20.0..50.0);
        white_cell_count += rng.random_range(1000..=4000) as f64;
    }

    match severity {
        "moderate" => {
            systolic_bp += rng.random_range(5..=10) as f64;
            heart_rate += rng.random_range(5..=10) as f64;
            crp *= 1.2;
        }
        "high" => {
            systolic_bp += rng.random_range(10..=25) as f64;
            heart_rate += rng.random_range(10..=20) as f64;
            oxygen_saturation = (oxygen_saturation - 5.0).max(88.0);
            crp *= 1.8;
            white_cell_count += rng.random_range(2000..=6000) as f64;
            creatinine *= 1.2;
        }
        _ => {}
    }

    // keep a little unexplained variance on top of the correlations
    let noise = sample_normal(rng, 0.0, 0.5);
    crp = (crp + noise.abs()).max(0.1);

    Admission {
        admission_id,
        patient_id: patient.patient_id.clone(),
        patient_name: patient.patient_name.clone(),
        age: patient.age,
        sex: patient.sex.to_string(),
        group: group.to_string(),
        department: department.to_string(),
        admission_date,
        discharge_date,
        length_days,
        diagnosis: diagnosis.to_string(),
        comorbidities,
        severity: severity.to_string(),
        prior_admissions: rng.random_range(0..=5),
        from_emergency: rng.random::<f64>() < 0.4,
        ai_note: rng.random::<f64>() < 0.3,
        systolic_bp: systolic_bp as i64,
        diastolic_bp: diastolic_bp as i64,
        heart_rate: heart_rate as i64,
        oxygen_saturation: oxygen_saturation as i64,
        creatinine: (creatinine * 10.0).round() / 10.0,
        white_cell_count: white_cell_count as i64,
        crp: (crp * 10.0).round() / 10.0,
        surgery,
    }
}
