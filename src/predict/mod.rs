//! Length-of-stay prediction pipeline
//!
//! Feature engineering over admission records, a small set of regression
//! families trained on an 80/20 split and compared by R², MAE and RMSE, and
//! a persisted artifact serving single-row predictions.

pub mod features;
pub mod metrics;
pub mod models;
pub mod pipeline;

pub use features::{
    build_training_data, count_comorbidities, encode_severity, OneHotEncoder, PatientFeatures,
    TrainingData,
};
pub use models::TrainedModel;
pub use pipeline::{train_and_select, ModelArtifact, ModelScore};
