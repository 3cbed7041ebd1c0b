//! A Rust library for hospital-operations analytics: ingesting EHR activity
//! logs and clinical admission records, computing descriptive KPIs, and
//! training a length-of-stay prediction model.

pub mod config;
pub mod error;
pub mod filter;
pub mod ingest;
pub mod kpi;
pub mod models;
pub mod predict;
pub mod report;
pub mod synthetic;
pub mod utils;

// Re-export the most common types for easier use
// Core types
pub use config::DashboardConfig;
pub use error::{EhrBoardError, Result};
pub use models::{ActivityEvent, Admission, StayRecord};

// Arrow types
pub use arrow::datatypes::Schema as ArrowSchema;
pub use arrow::record_batch::RecordBatch;

// KPI layer
pub use kpi::{KpiOverview, StayOverview};

// Prediction pipeline
pub use predict::{ModelArtifact, PatientFeatures};
