//! Row models for the two tables the dashboard works with
//!
//! `ActivityEvent` is one row of the EHR activity log (one row per visit and
//! activity). `Admission` is one row per hospital stay, as produced by the
//! synthetic generator and consumed by the prediction pipeline. `StayRecord`
//! is the flattened form of the nested patient documents served by the
//! document database and the local JSON fallback.

pub mod admission;
pub mod event;
pub mod stay;

pub use admission::Admission;
pub use event::ActivityEvent;
pub use stay::{PatientDocument, StayDocument, StayRecord};
