//! Row filters for the event table
//!
//! Department filters understand the hospital's area grouping, so the
//! dashboard can narrow to one clinical area or one specific department;
//! clinician filters take an explicit list. Filtering a batch that lacks the
//! filtered column leaves the batch unchanged and logs the fact.

use arrow::array::Array;
use arrow::array::BooleanArray;
use arrow::record_batch::RecordBatch;

use crate::error::Result;
use crate::models::event;
use crate::utils;

/// Department areas and the departments they group
pub const DEPARTMENT_AREAS: [(&str, &[&str]); 9] = [
    (
        "Internal Medicine and Medical Specialties",
        &[
            "Medicina Generale / Interna",
            "Cardiologia",
            "Pneumologia",
            "Gastroenterologia",
            "Endocrinologia",
            "Nefrologia",
            "Reumatologia",
            "Ematologia",
            "Malattie Infettive",
            "Allergologia e Immunologia",
            "Geriatria",
        ],
    ),
    (
        "Neurology and Psychiatry",
        &[
            "Neurologia",
            "Neurofisiopatologia",
            "Psichiatria",
            "Neuropsichiatria Infantile",
        ],
    ),
    (
        "Surgery and Surgical Specialties",
        &[
            "Chirurgia Generale",
            "Chirurgia Vascolare",
            "Chirurgia Toracica",
            "Chirurgia Plastica e Ricostruttiva",
            "Chirurgia Maxillo-Facciale",
            "Ortopedia e Traumatologia",
            "Neurochirurgia",
            "Urologia",
            "Proctologia",
        ],
    ),
    (
        "Obstetrics, Gynaecology and Paediatrics",
        &[
            "Ostetricia e Ginecologia",
            "Sala Parto",
            "Neonatologia",
            "Terapia Intensiva Neonatale (TIN)",
            "Pediatria",
            "Pediatria Specialistica",
        ],
    ),
    (
        "Sensory and Dermatological Specialties",
        &[
            "Oculistica (Oftalmologia)",
            "Otorinolaringoiatria (ORL)",
            "Dermatologia",
        ],
    ),
    (
        "Oncology and Therapies",
        &[
            "Oncologia Medica",
            "Radioterapia",
            "Medicina Nucleare",
            "Terapia del Dolore",
            "Cure Palliative",
        ],
    ),
    (
        "Diagnostics and Laboratories",
        &[
            "Radiologia / Diagnostica per Immagini",
            "Laboratorio Analisi",
            "Anatomia Patologica",
            "Medicina di Laboratorio",
        ],
    ),
    (
        "Emergency and Intensive Care",
        &[
            "Pronto Soccorso",
            "Medicina d'Urgenza",
            "Terapia Intensiva",
            "Rianimazione",
            "Unità Coronarica (UTIC)",
            "Stroke Unit",
        ],
    ),
    (
        "Rehabilitation and Support Services",
        &[
            "Medicina Fisica e Riabilitativa",
            "Fisioterapia",
            "Logopedia",
            "Nutrizione Clinica",
            "Psicologia Clinica",
            "Servizi Sociali Ospedalieri",
        ],
    ),
];

/// Departments grouped under an area, if the area is known
#[must_use]
pub fn departments_in_area(area: &str) -> Option<&'static [&'static str]> {
    DEPARTMENT_AREAS
        .iter()
        .find(|(name, _)| *name == area)
        .map(|(_, departments)| *departments)
}

/// Every known area name
#[must_use]
pub fn areas() -> Vec<&'static str> {
    DEPARTMENT_AREAS.iter().map(|(name, _)| *name).collect()
}

/// Keep rows belonging to a single department
pub fn filter_by_department(batch: &RecordBatch, department: &str) -> Result<RecordBatch> {
    filter_on_string_column(batch, event::DEPARTMENT, |value| value == department)
}

/// Keep rows whose department belongs to an area
pub fn filter_by_area(batch: &RecordBatch, area: &str) -> Result<RecordBatch> {
    let Some(departments) = departments_in_area(area) else {
        log::warn!("Unknown department area '{area}', leaving table unfiltered");
        return Ok(batch.clone());
    };
    filter_on_string_column(batch, event::DEPARTMENT, |value| {
        departments.contains(&value)
    })
}

/// Keep rows produced by the listed clinicians
pub fn filter_by_clinicians(batch: &RecordBatch, clinicians: &[String]) -> Result<RecordBatch> {
    filter_on_string_column(batch, event::CLINICIAN_ID, |value| {
        clinicians.iter().any(|c| c == value)
    })
}

fn filter_on_string_column<F>(batch: &RecordBatch, column: &str, keep: F) -> Result<RecordBatch>
where
    F: Fn(&str) -> bool,
{
    let Some(values) = utils::string_column(batch, column) else {
        log::warn!("Column '{column}' not present, leaving table unfiltered");
        return Ok(batch.clone());
    };
    let mask: BooleanArray = (0..batch.num_rows())
        .map(|row| Some(!values.is_null(row) && keep(values.value(row))))
        .collect();
    Ok(arrow::compute::filter_record_batch(batch, &mask)?)
}
