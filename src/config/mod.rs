//! Configuration for the dashboard pipeline.

use std::path::PathBuf;
use std::time::Duration;

/// Environment variable holding the document-database connection string
pub const MONGO_URI_ENV: &str = "EHR_BOARD_MONGO_URI";

/// Configuration for the dashboard pipeline
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Document-database connection string, if configured
    pub mongo_uri: Option<String>,
    /// Server-selection timeout for the document database
    pub mongo_timeout: Duration,
    /// Database name holding the patient and admission collections
    pub database: String,
    /// Local JSON fallback with nested patient documents
    pub patients_json: PathBuf,
    /// Local JSON file with flat admission records for training
    pub admissions_json: PathBuf,
    /// Directory for charts and CSV/Parquet exports
    pub out_dir: PathBuf,
    /// Path of the persisted model artifact
    pub model_path: PathBuf,
    /// Upper bound on concurrently trained model families
    pub training_parallelism: usize,
    /// Default number of synthetic visits
    pub synthetic_visits: usize,
    /// Default number of synthetic clinicians
    pub synthetic_clinicians: usize,
    /// Default seed for synthetic data
    pub seed: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            mongo_uri: None,
            mongo_timeout: Duration::from_secs(5),
            database: "clinical_records".to_string(),
            patients_json: PathBuf::from("patients.json"),
            admissions_json: PathBuf::from("simulated_admissions.json"),
            out_dir: PathBuf::from("reports"),
            model_path: PathBuf::from("discharge_model.json"),
            training_parallelism: num_cpus::get(),
            synthetic_visits: 400,
            synthetic_clinicians: 12,
            seed: 42,
        }
    }
}

impl DashboardConfig {
    /// Build a configuration, picking the document-database URI up from the
    /// environment when present
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            mongo_uri: std::env::var(MONGO_URI_ENV).ok().filter(|v| !v.is_empty()),
            ..Self::default()
        }
    }
}
